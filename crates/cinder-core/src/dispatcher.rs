//! Command Dispatcher - user intents turned into collaborator calls
//!
//! Optimistic writes (seek position, requested quality, volume) are applied
//! to the state before the collaborator is called. A collaborator that
//! confirms synchronously therefore has the last word, exactly as one that
//! confirms later does.

use crate::{
    platform::{EngineFactory, MediaElement, StreamingEngine},
    session::Coordinator,
    state::{clamp_volume, Transition},
    types::{QualitySelector, AUTOMATIC_LEVEL},
    Error, Result,
};
use tracing::{debug, info};

impl<F: EngineFactory> Coordinator<F> {
    /// Pause when playing, play otherwise.
    ///
    /// `is_playing` is left alone; it follows the element's `play`/`pause`
    /// events only.
    pub fn toggle_play(&self) {
        let Some(session) = &self.session else {
            debug!("toggle_play ignored: no session");
            return;
        };

        let playing = session.cell.with_state(|s| s.is_playing);
        let media = session.bridge.media();
        if playing {
            debug!("Requesting pause");
            media.pause();
        } else {
            debug!("Requesting play");
            media.play();
        }
    }

    /// Switch to level `id`, or back to automatic with `-1`
    pub fn select_quality(&self, id: i32) -> Result<()> {
        let session = self.session.as_ref().ok_or(Error::NotAttached)?;
        let engine = session
            .bridge
            .engine()
            .ok_or(Error::QualitySwitchUnsupported)?;

        if id < AUTOMATIC_LEVEL {
            return Err(Error::UnknownQuality { id });
        }
        let selector = QualitySelector::from_engine_id(id);
        if !selector.is_automatic() && !session.cell.with_state(|s| s.qualities.contains(id)) {
            return Err(Error::UnknownQuality { id });
        }

        info!(session_id = %session.id(), level = id, "Quality selected");
        session.cell.dispatch(Transition::QualityRequested { selector });
        engine.set_level(selector.engine_id());
        Ok(())
    }

    /// Seek to `position` seconds, clamped to the known duration
    pub fn seek(&self, position: f64) {
        let Some(session) = &self.session else {
            debug!("seek ignored: no session");
            return;
        };

        let Some(target) = session.cell.with_state(|s| s.clock.seek_target(position)) else {
            debug!(position, "seek ignored: not a finite position");
            return;
        };

        debug!(requested = position, position = target, "Seeking");
        session.cell.dispatch(Transition::SeekRequested { position: target });
        session.bridge.media().set_current_time(target);
    }

    /// Set the volume, clamped to `[0, 1]`
    pub fn set_volume(&self, volume: f64) {
        let Some(session) = &self.session else {
            debug!("set_volume ignored: no session");
            return;
        };

        let Some(volume) = clamp_volume(volume) else {
            debug!(volume, "set_volume ignored: not a finite volume");
            return;
        };

        session.cell.dispatch(Transition::VolumeSet { volume });
        session.bridge.media().set_volume(volume);
    }

    /// Enter or leave fullscreen.
    ///
    /// `is_fullscreen` changes only when the document reports it.
    pub fn toggle_fullscreen(&self) {
        let Some(session) = &self.session else {
            debug!("toggle_fullscreen ignored: no session");
            return;
        };

        let fullscreen = session.cell.with_state(|s| s.is_fullscreen);
        let surface = session.bridge.surface();
        let entry = if fullscreen {
            session.fullscreen.exit_method()
        } else {
            session.fullscreen.request_method()
        };

        match entry {
            Some(method) if fullscreen => surface.exit(method),
            Some(method) => surface.request(method),
            None => debug!(fullscreen, "toggle_fullscreen ignored: no entry point"),
        }
    }
}
