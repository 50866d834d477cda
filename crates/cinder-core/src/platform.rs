//! Collaborator interfaces
//!
//! The coordinator never talks to a browser, a streaming library or a
//! document directly. It is handed implementations of these traits at attach
//! time and drops them at detach. `cinder-wasm` implements them over hls.js
//! and `web-sys`; [`crate::headless`] implements them in memory.
//!
//! Listener identity matters: a listener is removed by passing the very same
//! `Rc` that was registered. Implementations compare with [`Rc::ptr_eq`].

use crate::types::{EngineConfig, LevelInfo};
use std::rc::Rc;
use url::Url;

/// Payload-free listener; the handler reads whatever it needs from its source
pub type Listener = Rc<dyn Fn()>;

/// Listener for streaming engine events
pub type EngineListener = Rc<dyn Fn(EngineEvent)>;

/// Streaming engine event kinds the coordinator subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineEventKind {
    ManifestParsed,
    LevelSwitched,
}

impl EngineEventKind {
    pub const ALL: [EngineEventKind; 2] = [EngineEventKind::ManifestParsed, EngineEventKind::LevelSwitched];

    /// Event name as hls.js spells it
    pub fn event_name(&self) -> &'static str {
        match self {
            EngineEventKind::ManifestParsed => "hlsManifestParsed",
            EngineEventKind::LevelSwitched => "hlsLevelSwitched",
        }
    }
}

/// Raw streaming engine event
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Manifest parsed; levels in the engine's own order
    ManifestParsed { levels: Vec<LevelInfo> },
    /// Engine now plays `level` (negative means automatic)
    LevelSwitched { level: i32 },
}

impl EngineEvent {
    pub fn kind(&self) -> EngineEventKind {
        match self {
            EngineEvent::ManifestParsed { .. } => EngineEventKind::ManifestParsed,
            EngineEvent::LevelSwitched { .. } => EngineEventKind::LevelSwitched,
        }
    }
}

/// Native media element event kinds the coordinator subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
    TimeUpdate,
    DurationChange,
    Play,
    Pause,
}

impl MediaEventKind {
    pub const ALL: [MediaEventKind; 4] = [
        MediaEventKind::TimeUpdate,
        MediaEventKind::DurationChange,
        MediaEventKind::Play,
        MediaEventKind::Pause,
    ];

    /// DOM event type
    pub fn dom_name(&self) -> &'static str {
        match self {
            MediaEventKind::TimeUpdate => "timeupdate",
            MediaEventKind::DurationChange => "durationchange",
            MediaEventKind::Play => "play",
            MediaEventKind::Pause => "pause",
        }
    }
}

/// The native playback element
pub trait MediaElement {
    /// Assign a source for native playback
    fn set_src(&self, url: &Url);

    /// Whether the element can play HLS without a streaming engine
    fn can_play_native_hls(&self) -> bool;

    fn current_time(&self) -> f64;

    fn set_current_time(&self, position: f64);

    /// `NaN` until metadata is loaded
    fn duration(&self) -> f64;

    fn paused(&self) -> bool;

    fn set_volume(&self, volume: f64);

    fn play(&self);

    fn pause(&self);

    fn add_listener(&self, kind: MediaEventKind, listener: &Listener);

    fn remove_listener(&self, kind: MediaEventKind, listener: &Listener);
}

/// An adaptive streaming engine instance (one per attach)
pub trait StreamingEngine {
    /// Element type this engine renders into
    type Media: MediaElement + 'static;

    fn load_source(&self, url: &Url);

    fn attach_media(&self, media: &Self::Media);

    fn on(&self, kind: EngineEventKind, listener: &EngineListener);

    fn off(&self, kind: EngineEventKind, listener: &EngineListener);

    /// Switch level; `-1` hands the choice back to the engine
    fn set_level(&self, id: i32);

    /// Stop loading and release every resource held by the engine
    fn destroy(&self);
}

/// Creates streaming engines and reports whether the runtime supports them
pub trait EngineFactory {
    type Engine: StreamingEngine + 'static;

    /// Whether adaptive streaming works in this runtime at all
    fn is_supported(&self) -> bool;

    fn create(&self, config: &EngineConfig) -> Rc<Self::Engine>;
}

/// The fullscreen-capable container together with its document.
///
/// Members are addressed by their vendor-specific names; see
/// [`crate::fullscreen::FullscreenVendor`] for the table of names.
pub trait FullscreenSurface {
    /// Whether the container exposes the request method `method`
    fn container_supports(&self, method: &str) -> bool;

    /// Whether the document exposes `member` (a method, a property or an `on*` handler slot)
    fn document_supports(&self, member: &str) -> bool;

    /// Call a request method on the container
    fn request(&self, method: &str);

    /// Call an exit method on the document
    fn exit(&self, method: &str);

    /// Whether the document's fullscreen element property is set
    fn has_fullscreen_element(&self, property: &str) -> bool;

    fn add_change_listener(&self, event: &str, listener: &Listener);

    fn remove_change_listener(&self, event: &str, listener: &Listener);
}
