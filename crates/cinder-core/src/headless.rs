//! In-memory collaborators
//!
//! Stand-ins for the streaming engine, the media element and the fullscreen
//! document that run without a browser. They record every call, keep
//! listeners by pointer identity like the DOM does, and let the caller fire
//! raw events. The test suites and the CLI `replay` command drive the
//! coordinator through them.

use crate::fullscreen::FullscreenVendor;
use crate::platform::{
    EngineEvent, EngineEventKind, EngineFactory, EngineListener, FullscreenSurface, Listener,
    MediaElement, MediaEventKind, StreamingEngine,
};
use crate::types::{EngineConfig, LevelInfo};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use url::Url;

/// A call received by [`HeadlessEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    LoadSource(String),
    AttachMedia,
    On(EngineEventKind),
    Off(EngineEventKind),
    SetLevel(i32),
    Destroy,
}

/// In-memory streaming engine
pub struct HeadlessEngine {
    config: EngineConfig,
    calls: RefCell<Vec<EngineCall>>,
    listeners: RefCell<Vec<(EngineEventKind, EngineListener)>>,
    /// Level reported back on every `set_level`
    confirm_level: Cell<Option<i32>>,
    /// Echo the requested level back on `set_level`
    auto_confirm: Cell<bool>,
    registered: Cell<usize>,
    /// Only counts `off` calls that matched a registered listener
    removed: Cell<usize>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            calls: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            confirm_level: Cell::new(None),
            auto_confirm: Cell::new(false),
            registered: Cell::new(0),
            removed: Cell::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    /// Report this level on every subsequent `set_level`
    pub fn set_confirm_level(&self, level: Option<i32>) {
        self.confirm_level.set(level);
    }

    /// Confirm each `set_level` with the requested level
    pub fn set_auto_confirm(&self, enabled: bool) {
        self.auto_confirm.set(enabled);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Listeners ever registered
    pub fn registered_total(&self) -> usize {
        self.registered.get()
    }

    /// Listeners removed through `off`. `destroy` drops the rest without
    /// counting them.
    pub fn removed_total(&self) -> usize {
        self.removed.get()
    }

    /// Registered listeners of `kind`, for delivering events by hand
    pub fn listeners(&self, kind: EngineEventKind) -> Vec<EngineListener> {
        self.listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| l.clone())
            .collect()
    }

    pub fn destroy_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| **c == EngineCall::Destroy)
            .count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroy_count() > 0
    }

    /// Deliver an event to the current listeners
    pub fn emit(&self, event: EngineEvent) {
        // Listeners may call back into the engine
        for listener in self.listeners(event.kind()) {
            listener(event.clone());
        }
    }

    pub fn emit_manifest(&self, levels: Vec<LevelInfo>) {
        self.emit(EngineEvent::ManifestParsed { levels });
    }

    pub fn emit_level_switched(&self, level: i32) {
        self.emit(EngineEvent::LevelSwitched { level });
    }

    fn record(&self, call: EngineCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingEngine for HeadlessEngine {
    type Media = HeadlessMedia;

    fn load_source(&self, url: &Url) {
        self.record(EngineCall::LoadSource(url.to_string()));
    }

    fn attach_media(&self, _media: &HeadlessMedia) {
        self.record(EngineCall::AttachMedia);
    }

    fn on(&self, kind: EngineEventKind, listener: &EngineListener) {
        self.record(EngineCall::On(kind));
        self.listeners.borrow_mut().push((kind, listener.clone()));
        self.registered.set(self.registered.get() + 1);
    }

    fn off(&self, kind: EngineEventKind, listener: &EngineListener) {
        self.record(EngineCall::Off(kind));
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners
            .iter()
            .position(|(k, l)| *k == kind && Rc::ptr_eq(l, listener))
        {
            listeners.remove(pos);
            self.removed.set(self.removed.get() + 1);
        }
    }

    fn set_level(&self, id: i32) {
        self.record(EngineCall::SetLevel(id));
        if let Some(level) = self.confirm_level.get() {
            self.emit_level_switched(level);
        } else if self.auto_confirm.get() {
            self.emit_level_switched(id);
        }
    }

    fn destroy(&self) {
        self.record(EngineCall::Destroy);
        self.listeners.borrow_mut().clear();
    }
}

/// Creates [`HeadlessEngine`]s and keeps a handle to each
pub struct HeadlessEngineFactory {
    supported: bool,
    engines: RefCell<Vec<Rc<HeadlessEngine>>>,
}

impl HeadlessEngineFactory {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            engines: RefCell::new(Vec::new()),
        }
    }

    /// Most recently created engine
    pub fn last_engine(&self) -> Option<Rc<HeadlessEngine>> {
        self.engines.borrow().last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.engines.borrow().len()
    }
}

impl EngineFactory for HeadlessEngineFactory {
    type Engine = HeadlessEngine;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, config: &EngineConfig) -> Rc<HeadlessEngine> {
        let engine = Rc::new(HeadlessEngine::with_config(config.clone()));
        self.engines.borrow_mut().push(engine.clone());
        engine
    }
}

/// In-memory media element
pub struct HeadlessMedia {
    src: RefCell<Option<String>>,
    native_hls: Cell<bool>,
    current_time: Cell<f64>,
    duration: Cell<f64>,
    paused: Cell<bool>,
    volume: Cell<f64>,
    play_calls: Cell<usize>,
    pause_calls: Cell<usize>,
    /// Fire `play`/`pause`/`timeupdate` synchronously from the matching call
    auto_confirm: Cell<bool>,
    listeners: RefCell<Vec<(MediaEventKind, Listener)>>,
    registered: Cell<usize>,
    removed: Cell<usize>,
}

impl HeadlessMedia {
    pub fn new() -> Self {
        Self {
            src: RefCell::new(None),
            native_hls: Cell::new(true),
            current_time: Cell::new(0.0),
            duration: Cell::new(f64::NAN),
            paused: Cell::new(true),
            volume: Cell::new(1.0),
            play_calls: Cell::new(0),
            pause_calls: Cell::new(0),
            auto_confirm: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            registered: Cell::new(0),
            removed: Cell::new(0),
        }
    }

    pub fn set_native_hls(&self, supported: bool) {
        self.native_hls.set(supported);
    }

    pub fn set_auto_confirm(&self, enabled: bool) {
        self.auto_confirm.set(enabled);
    }

    /// Source assigned for native playback
    pub fn src(&self) -> Option<String> {
        self.src.borrow().clone()
    }

    pub fn volume(&self) -> f64 {
        self.volume.get()
    }

    /// Position last written to or reported by the element
    pub fn current_time_value(&self) -> f64 {
        self.current_time.get()
    }

    pub fn play_calls(&self) -> usize {
        self.play_calls.get()
    }

    pub fn pause_calls(&self) -> usize {
        self.pause_calls.get()
    }

    /// Listeners currently registered
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Listeners ever registered
    pub fn registered_total(&self) -> usize {
        self.registered.get()
    }

    /// Listeners ever removed
    pub fn removed_total(&self) -> usize {
        self.removed.get()
    }

    /// Registered listeners of `kind`, for delivering events by hand
    pub fn listeners(&self, kind: MediaEventKind) -> Vec<Listener> {
        self.listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, l)| l.clone())
            .collect()
    }

    /// Fire `kind` to the current listeners
    pub fn fire(&self, kind: MediaEventKind) {
        for listener in self.listeners(kind) {
            listener();
        }
    }

    pub fn emit_time(&self, position: f64) {
        self.current_time.set(position);
        self.fire(MediaEventKind::TimeUpdate);
    }

    pub fn emit_duration(&self, duration: f64) {
        self.duration.set(duration);
        self.fire(MediaEventKind::DurationChange);
    }

    pub fn emit_play(&self) {
        self.paused.set(false);
        self.fire(MediaEventKind::Play);
    }

    pub fn emit_pause(&self) {
        self.paused.set(true);
        self.fire(MediaEventKind::Pause);
    }
}

impl Default for HeadlessMedia {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for HeadlessMedia {
    fn set_src(&self, url: &Url) {
        *self.src.borrow_mut() = Some(url.to_string());
    }

    fn can_play_native_hls(&self) -> bool {
        self.native_hls.get()
    }

    fn current_time(&self) -> f64 {
        self.current_time.get()
    }

    fn set_current_time(&self, position: f64) {
        if self.auto_confirm.get() {
            self.emit_time(position);
        } else {
            self.current_time.set(position);
        }
    }

    fn duration(&self) -> f64 {
        self.duration.get()
    }

    fn paused(&self) -> bool {
        self.paused.get()
    }

    fn set_volume(&self, volume: f64) {
        self.volume.set(volume);
    }

    fn play(&self) {
        self.play_calls.set(self.play_calls.get() + 1);
        if self.auto_confirm.get() {
            self.emit_play();
        }
    }

    fn pause(&self) {
        self.pause_calls.set(self.pause_calls.get() + 1);
        if self.auto_confirm.get() {
            self.emit_pause();
        }
    }

    fn add_listener(&self, kind: MediaEventKind, listener: &Listener) {
        self.registered.set(self.registered.get() + 1);
        self.listeners.borrow_mut().push((kind, listener.clone()));
    }

    fn remove_listener(&self, kind: MediaEventKind, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners
            .iter()
            .position(|(k, l)| *k == kind && Rc::ptr_eq(l, listener))
        {
            listeners.remove(pos);
            self.removed.set(self.removed.get() + 1);
        }
    }
}

/// In-memory fullscreen container and document
pub struct HeadlessSurface {
    vendors: Vec<FullscreenVendor>,
    fullscreen: Cell<bool>,
    /// Enter/leave synchronously on request/exit
    auto_confirm: Cell<bool>,
    requests: RefCell<Vec<String>>,
    exits: RefCell<Vec<String>>,
    listeners: RefCell<Vec<(String, Listener)>>,
}

impl HeadlessSurface {
    /// Surface exposing the given vendor APIs
    pub fn with_vendors(vendors: &[FullscreenVendor]) -> Self {
        Self {
            vendors: vendors.to_vec(),
            fullscreen: Cell::new(false),
            auto_confirm: Cell::new(false),
            requests: RefCell::new(Vec::new()),
            exits: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Surface exposing the unprefixed API only
    pub fn standard() -> Self {
        Self::with_vendors(&[FullscreenVendor::Standard])
    }

    pub fn set_auto_confirm(&self, enabled: bool) {
        self.auto_confirm.set(enabled);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    pub fn exits(&self) -> Vec<String> {
        self.exits.borrow().clone()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Document enters fullscreen and fires its change event
    pub fn enter_fullscreen(&self) {
        self.fullscreen.set(true);
        self.fire_change();
    }

    /// Document leaves fullscreen and fires its change event
    pub fn leave_fullscreen(&self) {
        self.fullscreen.set(false);
        self.fire_change();
    }

    fn fire_change(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl FullscreenSurface for HeadlessSurface {
    fn container_supports(&self, method: &str) -> bool {
        self.vendors.iter().any(|v| v.request_method() == method)
    }

    fn document_supports(&self, member: &str) -> bool {
        self.vendors.iter().any(|v| {
            v.exit_method() == member
                || v.element_property() == member
                || v.change_handler_slot() == member
        })
    }

    fn request(&self, method: &str) {
        self.requests.borrow_mut().push(method.to_string());
        if self.auto_confirm.get() {
            self.enter_fullscreen();
        }
    }

    fn exit(&self, method: &str) {
        self.exits.borrow_mut().push(method.to_string());
        if self.auto_confirm.get() {
            self.leave_fullscreen();
        }
    }

    fn has_fullscreen_element(&self, property: &str) -> bool {
        self.fullscreen.get() && self.vendors.iter().any(|v| v.element_property() == property)
    }

    fn add_change_listener(&self, event: &str, listener: &Listener) {
        self.listeners
            .borrow_mut()
            .push((event.to_string(), listener.clone()));
    }

    fn remove_change_listener(&self, event: &str, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(pos) = listeners
            .iter()
            .position(|(e, l)| e == event && Rc::ptr_eq(l, listener))
        {
            listeners.remove(pos);
        }
    }
}
