//! Cinder Core - playback coordinator for adaptive HLS video
//!
//! This crate reconciles three independent event sources into one
//! [`PlayerState`]:
//! - The adaptive streaming engine (manifest parsed, level switched)
//! - The native media element (time, duration, play, pause)
//! - The fullscreen document (fullscreen changed)
//!
//! and turns user intents back into calls on those collaborators.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Cinder Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │    Engine    │  │    Media     │  │  Fullscreen  │           │
//! │  │   (hls.js)   │  │   Element    │  │   Document   │           │
//! │  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘           │
//! │         │                 │                 │                   │
//! │         └────────── Event Bridge ───────────┘                   │
//! │                           │ Transition                          │
//! │                    ┌──────┴──────┐                              │
//! │                    │ PlayerState │◄──── Command Dispatcher      │
//! │                    │  (reducer)  │                              │
//! │                    └──────┬──────┘                              │
//! │                           │                                     │
//! │                    ┌──────┴──────┐                              │
//! │                    │ RenderView  │                              │
//! │                    └─────────────┘                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod catalog;
pub mod clock;
pub mod state;
pub mod platform;
pub mod fullscreen;
pub mod bridge;
pub mod session;
pub mod dispatcher;
pub mod projection;
pub mod manifest;
pub mod headless;

pub use error::{Error, Result};
pub use types::*;
pub use catalog::QualityCatalog;
pub use clock::PlaybackClock;
pub use state::{PlayerState, Transition};
pub use platform::{
    EngineEvent, EngineEventKind, EngineFactory, FullscreenSurface, MediaElement, MediaEventKind,
    StreamingEngine,
};
pub use fullscreen::{FullscreenCapabilities, FullscreenVendor};
pub use session::{Coordinator, MediaOf};
pub use projection::{format_time, RenderView};
pub use manifest::MasterPlaylist;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log library startup
pub fn init() {
    tracing::info!(version = VERSION, "Cinder Core initialized");
}
