//! Fullscreen adapter over the container element and the document
//!
//! Members are looked up by name with `Reflect`, so vendor-prefixed APIs
//! that `web-sys` does not bind are reachable too.

use cinder_core::platform::Listener;
use cinder_core::FullscreenSurface;
use js_sys::{Function, Reflect};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

struct ChangeBinding {
    event: String,
    listener: Listener,
    closure: Closure<dyn FnMut()>,
}

/// [`FullscreenSurface`] for one player container
pub struct WebFullscreen {
    container: Element,
    document: Document,
    bindings: RefCell<Vec<ChangeBinding>>,
}

impl WebFullscreen {
    pub fn new(container: Element, document: Document) -> Self {
        Self {
            container,
            document,
            bindings: RefCell::new(Vec::new()),
        }
    }
}

fn method(target: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(target, &name.into())
        .ok()
        .and_then(|v| v.dyn_into::<Function>().ok())
}

fn call(target: &JsValue, name: &str) {
    let Some(f) = method(target, name) else {
        return;
    };
    if let Err(err) = f.call0(target) {
        web_sys::console::warn_2(&format!("[Cinder] {}() failed:", name).into(), &err);
    }
}

impl FullscreenSurface for WebFullscreen {
    fn container_supports(&self, method_name: &str) -> bool {
        method(&self.container, method_name).is_some()
    }

    fn document_supports(&self, member: &str) -> bool {
        Reflect::has(&self.document, &member.into()).unwrap_or(false)
    }

    fn request(&self, method_name: &str) {
        call(&self.container, method_name);
    }

    fn exit(&self, method_name: &str) {
        call(&self.document, method_name);
    }

    fn has_fullscreen_element(&self, property: &str) -> bool {
        Reflect::get(&self.document, &property.into())
            .map(|v| !v.is_null() && !v.is_undefined())
            .unwrap_or(false)
    }

    fn add_change_listener(&self, event: &str, listener: &Listener) {
        let handler = listener.clone();
        let closure = Closure::<dyn FnMut()>::new(move || handler());
        if let Err(err) = self
            .document
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            web_sys::console::warn_2(&"[Cinder] addEventListener failed:".into(), &err);
            return;
        }
        self.bindings.borrow_mut().push(ChangeBinding {
            event: event.to_string(),
            listener: listener.clone(),
            closure,
        });
    }

    fn remove_change_listener(&self, event: &str, listener: &Listener) {
        let binding = {
            let mut bindings = self.bindings.borrow_mut();
            bindings
                .iter()
                .position(|b| b.event == event && Rc::ptr_eq(&b.listener, listener))
                .map(|pos| bindings.remove(pos))
        };
        if let Some(binding) = binding {
            let _ = self
                .document
                .remove_event_listener_with_callback(event, binding.closure.as_ref().unchecked_ref());
        }
    }
}
