//! `HTMLMediaElement` adapter

use cinder_core::platform::Listener;
use cinder_core::{MediaElement, MediaEventKind};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlMediaElement;

const HLS_MIME: &str = "application/vnd.apple.mpegurl";

struct MediaBinding {
    kind: MediaEventKind,
    listener: Listener,
    closure: Closure<dyn FnMut()>,
}

/// [`MediaElement`] over a `<video>` or `<audio>` element
pub struct WebMedia {
    element: HtmlMediaElement,
    bindings: RefCell<Vec<MediaBinding>>,
}

impl WebMedia {
    pub fn new(element: HtmlMediaElement) -> Self {
        Self {
            element,
            bindings: RefCell::new(Vec::new()),
        }
    }

    pub fn element(&self) -> &HtmlMediaElement {
        &self.element
    }
}

impl MediaElement for WebMedia {
    fn set_src(&self, url: &Url) {
        self.element.set_src(url.as_str());
    }

    fn can_play_native_hls(&self) -> bool {
        !self.element.can_play_type(HLS_MIME).is_empty()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&self, position: f64) {
        self.element.set_current_time(position);
    }

    fn duration(&self) -> f64 {
        self.element.duration()
    }

    fn paused(&self) -> bool {
        self.element.paused()
    }

    fn set_volume(&self, volume: f64) {
        self.element.set_volume(volume);
    }

    fn play(&self) {
        match self.element.play() {
            // Autoplay policy rejections surface here; the state simply never
            // sees a `play` event
            Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    web_sys::console::warn_2(&"[Cinder] play() rejected:".into(), &err);
                }
            }),
            Err(err) => web_sys::console::warn_2(&"[Cinder] play() failed:".into(), &err),
        }
    }

    fn pause(&self) {
        if let Err(err) = self.element.pause() {
            web_sys::console::warn_2(&"[Cinder] pause() failed:".into(), &err);
        }
    }

    fn add_listener(&self, kind: MediaEventKind, listener: &Listener) {
        let handler = listener.clone();
        let closure = Closure::<dyn FnMut()>::new(move || handler());
        if let Err(err) = self
            .element
            .add_event_listener_with_callback(kind.dom_name(), closure.as_ref().unchecked_ref())
        {
            web_sys::console::warn_2(&"[Cinder] addEventListener failed:".into(), &err);
            return;
        }
        self.bindings.borrow_mut().push(MediaBinding {
            kind,
            listener: listener.clone(),
            closure,
        });
    }

    fn remove_listener(&self, kind: MediaEventKind, listener: &Listener) {
        let binding = {
            let mut bindings = self.bindings.borrow_mut();
            bindings
                .iter()
                .position(|b| b.kind == kind && Rc::ptr_eq(&b.listener, listener))
                .map(|pos| bindings.remove(pos))
        };
        if let Some(binding) = binding {
            let _ = self.element.remove_event_listener_with_callback(
                kind.dom_name(),
                binding.closure.as_ref().unchecked_ref(),
            );
        }
    }
}
