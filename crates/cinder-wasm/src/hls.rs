//! hls.js engine adapter
//!
//! Expects hls.js to be loaded as the global `Hls`.

use crate::media::WebMedia;
use cinder_core::platform::EngineListener;
use cinder_core::{EngineConfig, EngineEvent, EngineEventKind, EngineFactory, LevelInfo, StreamingEngine};
use js_sys::{Array, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlMediaElement;

#[wasm_bindgen]
extern "C" {
    /// hls.js player instance
    pub type Hls;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported, catch)]
    fn is_supported() -> Result<bool, JsValue>;

    #[wasm_bindgen(constructor)]
    fn new(config: &JsValue) -> Hls;

    #[wasm_bindgen(method, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str);

    #[wasm_bindgen(method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement);

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method)]
    fn off(this: &Hls, event: &str, callback: &js_sys::Function);

    #[wasm_bindgen(method, setter, js_name = currentLevel)]
    fn set_current_level(this: &Hls, level: i32);

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);
}

struct EngineBinding {
    kind: EngineEventKind,
    listener: EngineListener,
    closure: Closure<dyn FnMut(JsValue, JsValue)>,
}

/// [`StreamingEngine`] over one hls.js instance
pub struct HlsEngine {
    hls: Hls,
    bindings: RefCell<Vec<EngineBinding>>,
}

impl HlsEngine {
    fn new(config: &EngineConfig) -> Self {
        let options = serde_wasm_bindgen::to_value(config).unwrap_or(JsValue::UNDEFINED);
        Self {
            hls: Hls::new(&options),
            bindings: RefCell::new(Vec::new()),
        }
    }
}

impl StreamingEngine for HlsEngine {
    type Media = WebMedia;

    fn load_source(&self, url: &Url) {
        self.hls.load_source(url.as_str());
    }

    fn attach_media(&self, media: &WebMedia) {
        self.hls.attach_media(media.element());
    }

    fn on(&self, kind: EngineEventKind, listener: &EngineListener) {
        let handler = listener.clone();
        let closure = Closure::<dyn FnMut(JsValue, JsValue)>::new(move |_event: JsValue, data: JsValue| {
            if let Some(event) = decode_event(kind, &data) {
                handler(event);
            }
        });
        self.hls.on(kind.event_name(), closure.as_ref().unchecked_ref());
        self.bindings.borrow_mut().push(EngineBinding {
            kind,
            listener: listener.clone(),
            closure,
        });
    }

    fn off(&self, kind: EngineEventKind, listener: &EngineListener) {
        let binding = {
            let mut bindings = self.bindings.borrow_mut();
            bindings
                .iter()
                .position(|b| b.kind == kind && Rc::ptr_eq(&b.listener, listener))
                .map(|pos| bindings.remove(pos))
        };
        if let Some(binding) = binding {
            self.hls.off(kind.event_name(), binding.closure.as_ref().unchecked_ref());
        }
    }

    fn set_level(&self, id: i32) {
        self.hls.set_current_level(id);
    }

    fn destroy(&self) {
        self.hls.destroy();
        self.bindings.borrow_mut().clear();
    }
}

/// Creates [`HlsEngine`]s when the global `Hls` reports support
#[derive(Debug, Default, Clone, Copy)]
pub struct HlsFactory;

impl EngineFactory for HlsFactory {
    type Engine = HlsEngine;

    fn is_supported(&self) -> bool {
        Hls::is_supported().unwrap_or(false)
    }

    fn create(&self, config: &EngineConfig) -> Rc<HlsEngine> {
        Rc::new(HlsEngine::new(config))
    }
}

fn decode_event(kind: EngineEventKind, data: &JsValue) -> Option<EngineEvent> {
    match kind {
        EngineEventKind::ManifestParsed => {
            let levels = Reflect::get(data, &"levels".into())
                .ok()
                .map(|v| v.unchecked_into::<Array>())
                .filter(|a| Array::is_array(a))
                .map(|a| a.iter().map(|level| decode_level(&level)).collect())
                .unwrap_or_default();
            Some(EngineEvent::ManifestParsed { levels })
        }
        EngineEventKind::LevelSwitched => {
            let level = number(data, "level")?;
            Some(EngineEvent::LevelSwitched { level: level as i32 })
        }
    }
}

/// hls.js `Level` exposes its fields as getters, so read them one by one
fn decode_level(level: &JsValue) -> LevelInfo {
    let positive = |key: &str| number(level, key).filter(|v| *v > 0.0);
    LevelInfo {
        width: positive("width").map(|v| v as u32),
        height: positive("height").map(|v| v as u32),
        bitrate: positive("bitrate").map(|v| v as u64),
    }
}

fn number(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &key.into())
        .ok()
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
}
