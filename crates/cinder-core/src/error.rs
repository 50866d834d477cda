//! Error types for Cinder Core

use thiserror::Error;

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coordinator error types
///
/// None of these are fatal to playback. Capability gaps (no adaptive engine,
/// no fullscreen entry point) degrade silently and never surface here; only
/// rejected user intents and tooling failures do.
#[derive(Error, Debug)]
pub enum Error {
    // Session errors
    #[error("No media is attached")]
    NotAttached,

    #[error("Invalid media identifier: {0:?}")]
    InvalidMediaId(String),

    // Quality selection errors
    #[error("Quality switching is not supported by this runtime")]
    QualitySwitchUnsupported,

    #[error("Unknown quality level: {id}")]
    UnknownQuality { id: i32 },

    // Manifest errors
    #[error("Failed to fetch manifest: {0}")]
    ManifestFetch(String),

    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    // Network errors
    #[cfg(feature = "fetch")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns true if retrying the same operation later may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::NotAttached | Error::ManifestFetch(_) => true,
            #[cfg(feature = "fetch")]
            Error::Network(_) => true,
            _ => false,
        }
    }

    /// Returns the error code for log fields
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotAttached => "NOT_ATTACHED",
            Error::InvalidMediaId(_) => "INVALID_MEDIA_ID",
            Error::QualitySwitchUnsupported => "QUALITY_UNSUPPORTED",
            Error::UnknownQuality { .. } => "UNKNOWN_QUALITY",
            Error::ManifestFetch(_) => "MANIFEST_FETCH",
            Error::ManifestParse(_) => "MANIFEST_PARSE",
            #[cfg(feature = "fetch")]
            Error::Network(_) => "NETWORK",
            Error::Url(_) => "URL",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "JSON",
            Error::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::NotAttached.error_code(), "NOT_ATTACHED");
        assert_eq!(Error::UnknownQuality { id: 7 }.error_code(), "UNKNOWN_QUALITY");
        assert_eq!(Error::UnknownQuality { id: 7 }.to_string(), "Unknown quality level: 7");
    }

    #[test]
    fn test_recoverable() {
        assert!(Error::NotAttached.is_recoverable());
        assert!(!Error::QualitySwitchUnsupported.is_recoverable());
    }
}
