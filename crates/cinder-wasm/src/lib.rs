//! Cinder WASM - browser bindings for the Cinder playback coordinator
//!
//! Wires the coordinator to the browser:
//! - hls.js as the adaptive streaming engine
//! - `HTMLMediaElement` for time, duration and play state
//! - The document's (possibly vendor-prefixed) Fullscreen API
//!
//! ## Integration with hls.js
//!
//! ```javascript
//! import init, { CinderPlayer } from '@cinder/wasm';
//!
//! await init();
//! const player = new CinderPlayer();
//! player.onChange((view) => render(view));
//! player.attach(videoId, document.querySelector('video'), container);
//! ```

use wasm_bindgen::prelude::*;

mod fullscreen;
mod hls;
mod media;
mod player;

pub use fullscreen::WebFullscreen;
pub use hls::{HlsEngine, HlsFactory};
pub use media::WebMedia;
pub use player::CinderPlayer;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[Cinder WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    cinder_core::VERSION.to_string()
}

/// Format seconds as `MM:SS`
#[wasm_bindgen(js_name = formatTime)]
pub fn format_time(seconds: f64) -> String {
    cinder_core::format_time(seconds)
}
