//! Canonical player state and its transition function
//!
//! Every change to [`PlayerState`] goes through [`PlayerState::apply`]. The
//! event bridge produces the confirmed transitions; the dispatcher produces
//! the three local ones (`SeekRequested`, `VolumeSet`, `QualityRequested`)
//! that are applied ahead of, or instead of, external confirmation.

use crate::catalog::QualityCatalog;
use crate::clock::PlaybackClock;
use crate::types::{LevelInfo, QualitySelector};
use serde::{Deserialize, Serialize};

/// State transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transition {
    /// Engine parsed the manifest and reported its levels
    ManifestReady { levels: Vec<LevelInfo> },
    /// Engine switched to a level
    QualityConfirmed { selector: QualitySelector },
    /// Element reported a new position
    TimeAdvanced { position: f64 },
    /// Element reported a new duration
    DurationKnown { duration: f64 },
    /// Element started playing
    PlaybackStarted,
    /// Element paused
    PlaybackStopped,
    /// Document fullscreen element changed
    FullscreenChanged { fullscreen: bool },

    /// User seek, applied before the element confirms it
    SeekRequested { position: f64 },
    /// User volume change; the element never confirms volume
    VolumeSet { volume: f64 },
    /// User quality choice, applied before the engine confirms it
    QualityRequested { selector: QualitySelector },
}

impl Transition {
    /// Short name for log fields
    pub fn name(&self) -> &'static str {
        match self {
            Transition::ManifestReady { .. } => "manifest_ready",
            Transition::QualityConfirmed { .. } => "quality_confirmed",
            Transition::TimeAdvanced { .. } => "time_advanced",
            Transition::DurationKnown { .. } => "duration_known",
            Transition::PlaybackStarted => "playback_started",
            Transition::PlaybackStopped => "playback_stopped",
            Transition::FullscreenChanged { .. } => "fullscreen_changed",
            Transition::SeekRequested { .. } => "seek_requested",
            Transition::VolumeSet { .. } => "volume_set",
            Transition::QualityRequested { .. } => "quality_requested",
        }
    }
}

/// Everything the controls render from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub qualities: QualityCatalog,
    pub current_quality: QualitySelector,
    pub is_playing: bool,
    pub volume: f64,
    pub clock: PlaybackClock,
    pub is_fullscreen: bool,
    /// False in degraded mode, where the runtime plays the stream natively
    pub switching_supported: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            qualities: QualityCatalog::automatic_only(),
            current_quality: QualitySelector::Automatic,
            is_playing: false,
            volume: 1.0,
            clock: PlaybackClock::new(),
            is_fullscreen: false,
            switching_supported: true,
        }
    }
}

impl PlayerState {
    /// Fresh state for a new attach
    pub fn new(switching_supported: bool, volume: f64) -> Self {
        Self {
            switching_supported,
            volume: clamp_volume(volume).unwrap_or(1.0),
            ..Default::default()
        }
    }

    /// Apply one transition
    pub fn apply(mut self, transition: Transition) -> Self {
        match transition {
            Transition::ManifestReady { levels } => {
                // Full replacement; a selector pointing past the new list is
                // left alone and simply renders as automatic.
                self.qualities = if self.switching_supported {
                    QualityCatalog::from_levels(&levels)
                } else {
                    QualityCatalog::automatic_only()
                };
            }
            Transition::QualityConfirmed { selector } | Transition::QualityRequested { selector } => {
                self.current_quality = selector;
            }
            Transition::TimeAdvanced { position } => self.clock.advance(position),
            Transition::DurationKnown { duration } => self.clock.set_duration(duration),
            Transition::PlaybackStarted => self.is_playing = true,
            Transition::PlaybackStopped => self.is_playing = false,
            Transition::FullscreenChanged { fullscreen } => self.is_fullscreen = fullscreen,
            Transition::SeekRequested { position } => {
                if let Some(target) = self.clock.seek_target(position) {
                    self.clock.seek(target);
                }
            }
            Transition::VolumeSet { volume } => {
                if let Some(volume) = clamp_volume(volume) {
                    self.volume = volume;
                }
            }
        }
        self
    }

    /// Position in seconds
    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    /// Duration in seconds, if known
    pub fn duration(&self) -> Option<f64> {
        self.clock.duration()
    }

    /// Label of the active quality
    pub fn quality_label(&self) -> &str {
        self.qualities.label_for(self.current_quality)
    }
}

/// Clamp to `[0, 1]`; `None` for a non-finite value
pub fn clamp_volume(volume: f64) -> Option<f64> {
    volume.is_finite().then(|| volume.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> Vec<LevelInfo> {
        vec![
            LevelInfo::new(640, 360, 800_000),
            LevelInfo::new(1280, 720, 2_500_000),
            LevelInfo::new(1920, 1080, 5_000_000),
        ]
    }

    #[test]
    fn test_manifest_then_confirmation() {
        let state = PlayerState::default()
            .apply(Transition::ManifestReady { levels: ladder() })
            .apply(Transition::QualityConfirmed { selector: QualitySelector::Level(1) });

        assert_eq!(state.qualities.len(), 4);
        assert_eq!(state.quality_label(), "720p");
    }

    #[test]
    fn test_confirmation_before_manifest() {
        let state = PlayerState::default()
            .apply(Transition::QualityConfirmed { selector: QualitySelector::Level(2) });
        assert_eq!(state.current_quality, QualitySelector::Level(2));
        assert_eq!(state.quality_label(), "Auto");

        let state = state.apply(Transition::ManifestReady { levels: ladder() });
        assert_eq!(state.quality_label(), "1080p");
    }

    #[test]
    fn test_requested_then_overridden() {
        let state = PlayerState::default()
            .apply(Transition::ManifestReady { levels: ladder() })
            .apply(Transition::QualityRequested { selector: QualitySelector::Level(0) })
            .apply(Transition::QualityConfirmed { selector: QualitySelector::Level(2) });
        assert_eq!(state.current_quality, QualitySelector::Level(2));
    }

    #[test]
    fn test_manifest_replaces_catalog() {
        let state = PlayerState::default()
            .apply(Transition::ManifestReady { levels: ladder() })
            .apply(Transition::ManifestReady { levels: vec![LevelInfo::new(854, 480, 1_200_000)] });
        let labels: Vec<&str> = state.qualities.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Auto", "480p"]);
    }

    #[test]
    fn test_degraded_ignores_levels() {
        let state = PlayerState::new(false, 1.0).apply(Transition::ManifestReady { levels: ladder() });
        assert_eq!(state.qualities, QualityCatalog::automatic_only());
    }

    #[test]
    fn test_volume_clamped() {
        let state = PlayerState::default().apply(Transition::VolumeSet { volume: 1.4 });
        assert_eq!(state.volume, 1.0);
        let state = state.apply(Transition::VolumeSet { volume: -0.2 });
        assert_eq!(state.volume, 0.0);
        let state = state.apply(Transition::VolumeSet { volume: f64::NAN });
        assert_eq!(state.volume, 0.0);
    }

    #[test]
    fn test_seek_superseded_by_element() {
        let state = PlayerState::default()
            .apply(Transition::DurationKnown { duration: 100.0 })
            .apply(Transition::SeekRequested { position: 150.0 });
        assert_eq!(state.current_time(), 100.0);

        let state = state.apply(Transition::TimeAdvanced { position: 99.2 });
        assert_eq!(state.current_time(), 99.2);
    }

    #[test]
    fn test_play_pause_and_fullscreen() {
        let state = PlayerState::default().apply(Transition::PlaybackStarted);
        assert!(state.is_playing);
        let state = state
            .apply(Transition::PlaybackStopped)
            .apply(Transition::FullscreenChanged { fullscreen: true });
        assert!(!state.is_playing);
        assert!(state.is_fullscreen);
    }
}
