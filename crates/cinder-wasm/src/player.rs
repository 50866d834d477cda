//! JavaScript-facing player handle

use crate::fullscreen::WebFullscreen;
use crate::hls::HlsFactory;
use crate::media::WebMedia;
use cinder_core::{Coordinator, MediaId, PlayerConfig, PlayerState, RenderView};
use js_sys::Function;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlMediaElement};

fn to_js(err: cinder_core::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One video player: attach it to a `<video>` and its container, then drive
/// it from the controls.
///
/// ```javascript
/// const player = new CinderPlayer({ streamBase: "http://127.0.0.1:8000" });
/// player.onChange((view) => render(view));
/// player.attach("809716870", videoEl, containerEl);
/// ```
#[wasm_bindgen]
pub struct CinderPlayer {
    coordinator: Coordinator<HlsFactory>,
    on_change: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl CinderPlayer {
    /// Create a player; `config` is optional and uses camelCase keys
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<CinderPlayer, JsValue> {
        let config: PlayerConfig = if config.is_undefined() || config.is_null() {
            PlayerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        config.validate().map_err(to_js)?;

        let on_change: Rc<RefCell<Option<Function>>> = Rc::default();
        let sink = on_change.clone();

        let mut coordinator = Coordinator::new(config, HlsFactory);
        coordinator.set_observer(move |state: &PlayerState| {
            // Release the borrow before calling out; the callback may replace itself
            let callback = sink.borrow().clone();
            let Some(callback) = callback else {
                return;
            };
            match serde_wasm_bindgen::to_value(&RenderView::project(state)) {
                Ok(view) => {
                    if let Err(err) = callback.call1(&JsValue::NULL, &view) {
                        web_sys::console::error_2(&"[Cinder] onChange threw:".into(), &err);
                    }
                }
                Err(err) => web_sys::console::error_1(&JsValue::from(err)),
            }
        });

        Ok(Self {
            coordinator,
            on_change,
        })
    }

    /// Register the render callback; receives a view object after every change
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: Option<Function>) {
        *self.on_change.borrow_mut() = callback;
    }

    /// Attach to `video_id`, replacing any current video. Returns the session id.
    pub fn attach(
        &mut self,
        video_id: &str,
        video: HtmlMediaElement,
        container: Element,
    ) -> Result<String, JsValue> {
        let media_id = MediaId::new(video_id).map_err(to_js)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;

        let media = Rc::new(WebMedia::new(video));
        let surface = Rc::new(WebFullscreen::new(container, document));
        let session_id = self
            .coordinator
            .attach(media_id, media, surface)
            .map_err(to_js)?;

        web_sys::console::log_1(&format!("[Cinder] Attached {} ({})", video_id, session_id).into());
        Ok(session_id.to_string())
    }

    /// Release the engine and every listener
    pub fn detach(&mut self) {
        if self.coordinator.is_attached() {
            self.coordinator.detach();
            web_sys::console::log_1(&"[Cinder] Detached".into());
        }
    }

    #[wasm_bindgen(getter, js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.coordinator.is_attached()
    }

    #[wasm_bindgen(getter, js_name = fullscreenAvailable)]
    pub fn fullscreen_available(&self) -> bool {
        self.coordinator.fullscreen_available()
    }

    #[wasm_bindgen(js_name = togglePlay)]
    pub fn toggle_play(&self) {
        self.coordinator.toggle_play();
    }

    /// Select a level by id; `-1` returns to automatic
    #[wasm_bindgen(js_name = selectQuality)]
    pub fn select_quality(&self, id: i32) -> Result<(), JsValue> {
        self.coordinator.select_quality(id).map_err(to_js)
    }

    pub fn seek(&self, position: f64) {
        self.coordinator.seek(position);
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.coordinator.set_volume(volume);
    }

    #[wasm_bindgen(js_name = toggleFullscreen)]
    pub fn toggle_fullscreen(&self) {
        self.coordinator.toggle_fullscreen();
    }

    /// Current view object, or `null` when detached
    pub fn view(&self) -> Result<JsValue, JsValue> {
        match self.coordinator.view() {
            Some(view) => Ok(serde_wasm_bindgen::to_value(&view)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Raw state, or `null` when detached
    pub fn state(&self) -> Result<JsValue, JsValue> {
        match self.coordinator.state() {
            Some(state) => Ok(serde_wasm_bindgen::to_value(&state)?),
            None => Ok(JsValue::NULL),
        }
    }
}
