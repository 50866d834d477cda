//! Render Projection - display data derived from [`PlayerState`]

use crate::state::PlayerState;
use crate::types::QualitySelector;
use serde::{Deserialize, Serialize};

/// Format seconds as `MM:SS`. Anything that is not a finite, non-negative
/// number renders as `00:00`; minutes are not wrapped into hours.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Play/pause button glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackIcon {
    /// Shown while paused
    Play,
    /// Shown while playing
    Pause,
}

/// Fullscreen button glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FullscreenIcon {
    Enter,
    Exit,
}

/// Volume indicator glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeIcon {
    Muted,
    Audible,
}

/// Quality menu entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMenuItem {
    pub id: i32,
    pub label: String,
    pub active: bool,
}

/// Everything the controls need to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderView {
    pub current_time: String,
    pub duration: String,
    /// Seek bar upper bound; zero while the duration is unknown
    pub seek_max: f64,
    pub seek_value: f64,
    pub volume: f64,
    pub quality_label: String,
    pub quality_menu: Vec<QualityMenuItem>,
    /// False in degraded mode
    pub quality_selectable: bool,
    pub playback_icon: PlaybackIcon,
    pub fullscreen_icon: FullscreenIcon,
    pub volume_icon: VolumeIcon,
}

impl RenderView {
    /// Project `state` into display data
    pub fn project(state: &PlayerState) -> Self {
        // A level missing from the catalog renders as automatic, like the label
        let selected = state.current_quality.engine_id();
        let active_id = if state.qualities.contains(selected) {
            selected
        } else {
            QualitySelector::Automatic.engine_id()
        };
        let quality_menu = state
            .qualities
            .iter()
            .map(|opt| QualityMenuItem {
                id: opt.id,
                label: opt.label.clone(),
                active: opt.id == active_id,
            })
            .collect();

        Self {
            current_time: format_time(state.current_time()),
            duration: format_time(state.duration().unwrap_or(f64::NAN)),
            seek_max: state.duration().unwrap_or(0.0),
            seek_value: state.current_time(),
            volume: state.volume,
            quality_label: state.quality_label().to_string(),
            quality_menu,
            quality_selectable: state.switching_supported,
            playback_icon: if state.is_playing {
                PlaybackIcon::Pause
            } else {
                PlaybackIcon::Play
            },
            fullscreen_icon: if state.is_fullscreen {
                FullscreenIcon::Exit
            } else {
                FullscreenIcon::Enter
            },
            volume_icon: if state.volume > 0.0 {
                VolumeIcon::Audible
            } else {
                VolumeIcon::Muted
            },
        }
    }
}

impl From<&PlayerState> for RenderView {
    fn from(state: &PlayerState) -> Self {
        Self::project(state)
    }
}
