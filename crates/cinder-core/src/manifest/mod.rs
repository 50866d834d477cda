//! Master playlist parsing
//!
//! The browser side never looks at the playlist itself; hls.js does. This
//! module exists for tooling that wants the same level list without a
//! browser, e.g. `cinder-cli catalog`.

#[cfg(feature = "fetch")]
mod hls;

#[cfg(feature = "fetch")]
pub use hls::{HttpManifestSource, ManifestSource};

use crate::{catalog::QualityCatalog, error::Error, types::LevelInfo, Result};
use std::borrow::Cow;
use tracing::debug;
use url::Url;

const STREAM_INF: &str = "#EXT-X-STREAM-INF:";

/// One `#EXT-X-STREAM-INF` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Variant playlist URI as written in the master playlist
    pub uri: String,
    pub level: LevelInfo,
}

impl Variant {
    /// Resolve the variant URI against the master playlist URL
    pub fn resolve(&self, base: &Url) -> Result<Url> {
        Ok(base.join(&self.uri)?)
    }
}

/// Parsed master playlist
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterPlaylist {
    /// Variants in playlist order
    pub variants: Vec<Variant>,
}

impl MasterPlaylist {
    /// Parse playlist text.
    ///
    /// A media playlist given as entry point yields a single level with no
    /// known dimensions, which is what hls.js reports for it.
    pub fn parse(content: &str) -> Result<Self> {
        if !content.contains(STREAM_INF) {
            m3u8_rs::parse_media_playlist_res(content.as_bytes())
                .map_err(|e| Error::ManifestParse(format!("Failed to parse HLS media: {:?}", e)))?;
            debug!("Media playlist used as entry point");
            return Ok(Self {
                variants: vec![Variant {
                    uri: String::new(),
                    level: LevelInfo::default(),
                }],
            });
        }

        let content = normalize_bandwidth(content);
        let parsed = m3u8_rs::parse_master_playlist_res(content.as_bytes())
            .map_err(|e| Error::ManifestParse(format!("Failed to parse HLS master: {:?}", e)))?;

        let variants: Vec<Variant> = parsed
            .variants
            .iter()
            .filter(|v| !v.is_i_frame)
            .map(|v| Variant {
                uri: v.uri.clone(),
                level: LevelInfo {
                    width: v.resolution.map(|r| r.width as u32),
                    height: v.resolution.map(|r| r.height as u32),
                    bitrate: Some(v.bandwidth),
                },
            })
            .collect();

        debug!(variants = variants.len(), "Parsed master playlist");
        Ok(Self { variants })
    }

    /// Level descriptors as the engine would report them
    pub fn levels(&self) -> Vec<LevelInfo> {
        self.variants.iter().map(|v| v.level).collect()
    }

    /// Quality catalog for these levels
    pub fn catalog(&self) -> QualityCatalog {
        QualityCatalog::from_levels(&self.levels())
    }
}

/// Rewrite ffmpeg-style bitrates (`800k`, `5M`) into plain bits per second.
///
/// The upload service writes its encoder settings straight into
/// `BANDWIDTH`, which strict parsers reject.
pub fn normalize_bandwidth(content: &str) -> Cow<'_, str> {
    if !content.lines().any(|l| l.starts_with(STREAM_INF) && needs_rewrite(l)) {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len() + 16);
    for line in content.lines() {
        match line.strip_prefix(STREAM_INF) {
            Some(attrs) if needs_rewrite(line) => {
                out.push_str(STREAM_INF);
                let rewritten: Vec<String> = split_attributes(attrs)
                    .into_iter()
                    .map(|attr| match attr.split_once('=') {
                        Some((key, value)) if is_bandwidth_key(key) => match parse_bitrate(value) {
                            Some(bits) => format!("{}={}", key, bits),
                            None => attr.to_string(),
                        },
                        _ => attr.to_string(),
                    })
                    .collect();
                out.push_str(&rewritten.join(","));
            }
            _ => out.push_str(line),
        }
        out.push('\n');
    }
    Cow::Owned(out)
}

fn is_bandwidth_key(key: &str) -> bool {
    key == "BANDWIDTH" || key == "AVERAGE-BANDWIDTH"
}

fn needs_rewrite(line: &str) -> bool {
    let Some(attrs) = line.strip_prefix(STREAM_INF) else {
        return false;
    };
    split_attributes(attrs).into_iter().any(|attr| {
        matches!(attr.split_once('='), Some((key, value))
            if is_bandwidth_key(key) && value.parse::<u64>().is_err() && parse_bitrate(value).is_some())
    })
}

/// Split an attribute list on commas outside quoted strings
fn split_attributes(attrs: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, c) in attrs.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                parts.push(&attrs[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&attrs[start..]);
    parts
}

/// `800k` → 800000, `5M` → 5000000, `1200` → 1200
fn parse_bitrate(value: &str) -> Option<u64> {
    let value = value.trim();
    let (digits, scale) = match value.char_indices().last()? {
        (i, 'k' | 'K') => (&value[..i], 1_000),
        (i, 'm' | 'M') => (&value[..i], 1_000_000),
        _ => (value, 1),
    };
    if let Ok(n) = digits.parse::<u64>() {
        return n.checked_mul(scale);
    }
    let f = digits.parse::<f64>().ok()?;
    (f.is_finite() && f >= 0.0).then(|| (f * scale as f64).round() as u64)
}
