//! Core types for Cinder

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Unique identifier for one attach/detach lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a video on the upload service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    /// Create a media identifier, rejecting values that cannot form a URL path segment
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(Error::InvalidMediaId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for MediaId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Video resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Menu label, e.g. "720p"
    pub fn label(&self) -> String {
        format!("{}p", self.height)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// One rendition as reported by the streaming engine's manifest-parsed event.
///
/// Engines report zero for unknown dimensions, so zero is treated as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bitrate: Option<u64>,
}

impl LevelInfo {
    pub fn new(width: u32, height: u32, bitrate: u64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            bitrate: Some(bitrate),
        }
    }

    /// Resolution, if both dimensions are known
    pub fn resolution(&self) -> Option<Resolution> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some(Resolution::new(w, h)),
            _ => None,
        }
    }
}

/// Engine-side sentinel for automatic level selection
pub const AUTOMATIC_LEVEL: i32 = -1;

/// Which quality the user (or the engine) has selected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualitySelector {
    /// Bitrate choice delegated to the adaptive engine
    #[default]
    Automatic,
    /// Index into the engine's level list
    Level(u32),
}

impl QualitySelector {
    /// Map an engine level id; any negative id means automatic
    pub fn from_engine_id(id: i32) -> Self {
        u32::try_from(id).map_or(QualitySelector::Automatic, QualitySelector::Level)
    }

    /// Id as the engine expects it back in `set_level`
    pub fn engine_id(&self) -> i32 {
        match self {
            QualitySelector::Automatic => AUTOMATIC_LEVEL,
            QualitySelector::Level(idx) => i32::try_from(*idx).unwrap_or(i32::MAX),
        }
    }

    pub fn is_automatic(&self) -> bool {
        matches!(self, QualitySelector::Automatic)
    }
}

impl std::fmt::Display for QualitySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QualitySelector::Automatic => write!(f, "auto"),
            QualitySelector::Level(idx) => write!(f, "level {}", idx),
        }
    }
}

/// A selectable entry of the quality menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOption {
    /// Level index, or [`AUTOMATIC_LEVEL`]
    pub id: i32,
    /// Human-readable label
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u64>,
}

impl QualityOption {
    /// Label of the synthetic automatic entry
    pub const AUTOMATIC_LABEL: &'static str = "Auto";

    /// The synthetic automatic entry
    pub fn automatic() -> Self {
        Self {
            id: AUTOMATIC_LEVEL,
            label: Self::AUTOMATIC_LABEL.to_string(),
            width: None,
            height: None,
            bitrate: None,
        }
    }

    /// Entry for the engine level at `index`
    pub fn from_level(index: u32, level: &LevelInfo) -> Self {
        let label = match (level.height.filter(|h| *h > 0), level.bitrate.filter(|b| *b > 0)) {
            (Some(height), _) => format!("{}p", height),
            (None, Some(bitrate)) => format!("{} kbps", bitrate / 1000),
            (None, None) => format!("Level {}", index),
        };

        Self {
            id: i32::try_from(index).unwrap_or(i32::MAX),
            label,
            width: level.width.filter(|w| *w > 0),
            height: level.height.filter(|h| *h > 0),
            bitrate: level.bitrate.filter(|b| *b > 0),
        }
    }

    pub fn is_automatic(&self) -> bool {
        self.id == AUTOMATIC_LEVEL
    }

    /// Selector addressing this entry
    pub fn selector(&self) -> QualitySelector {
        QualitySelector::from_engine_id(self.id)
    }
}

/// Options handed to the streaming engine at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Never pick a level larger than the rendering surface
    pub cap_level_to_player_size: bool,
    /// Start fetching segments as soon as the source is loaded
    pub auto_start_load: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cap_level_to_player_size: true,
            auto_start_load: true,
        }
    }
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerConfig {
    /// Base URL of the upload service
    pub stream_base: Url,
    /// Streaming engine options
    pub engine: EngineConfig,
    /// Volume applied to the element on attach (0.0 - 1.0)
    pub initial_volume: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            stream_base: Url::parse(Self::DEFAULT_STREAM_BASE)
                .expect("default stream base is a valid URL"),
            engine: EngineConfig::default(),
            initial_volume: 1.0,
        }
    }
}

impl PlayerConfig {
    pub const DEFAULT_STREAM_BASE: &'static str = "http://127.0.0.1:8000";

    /// Set the upload service base URL
    pub fn with_stream_base(mut self, base: &str) -> Result<Self> {
        self.stream_base = Url::parse(base)?;
        Ok(self)
    }

    /// Set the streaming engine options
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Set the volume applied on attach
    pub fn with_initial_volume(mut self, volume: f64) -> Self {
        self.initial_volume = volume;
        self
    }

    /// Check values that cannot be clamped into shape
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.stream_base.scheme(), "http" | "https") {
            return Err(Error::InvalidConfig(format!(
                "stream base must be http(s), got {}",
                self.stream_base.scheme()
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(Error::InvalidConfig(format!(
                "initial volume {} outside 0.0-1.0",
                self.initial_volume
            )));
        }
        Ok(())
    }

    /// Master playlist URL: `{base}/upload/stream/{media_id}/master.m3u8`
    pub fn stream_url(&self, media_id: &MediaId) -> Result<Url> {
        let mut url = self.stream_base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidConfig("stream base cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["upload", "stream", media_id.as_str(), "master.m3u8"]);
        Ok(url)
    }
}
