//! Output formatting for CLI

use cinder_core::{QualityCatalog, RenderView};
use console::style;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Table,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "table" => OutputFormat::Table,
            _ => OutputFormat::Text,
        }
    }
}

/// Pretty JSON, or `{}` if the value cannot be serialized
pub fn to_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Tabled)]
struct QualityRow {
    #[tabled(rename = "ID")]
    id: i32,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Bitrate")]
    bitrate: String,
}

fn bitrate_text(bitrate: Option<u64>) -> String {
    bitrate.map_or_else(|| "-".to_string(), |b| format!("{} kbps", b / 1000))
}

/// Render a quality catalog
pub fn catalog(catalog: &QualityCatalog, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(catalog),
        OutputFormat::Table => {
            let rows = catalog.iter().map(|opt| QualityRow {
                id: opt.id,
                label: opt.label.clone(),
                resolution: match (opt.width, opt.height) {
                    (Some(w), Some(h)) => format!("{}x{}", w, h),
                    _ => "-".to_string(),
                },
                bitrate: bitrate_text(opt.bitrate),
            });
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Text => catalog
            .iter()
            .map(|opt| {
                let id = style(format!("{:>3}", opt.id)).dim();
                if opt.is_automatic() {
                    format!("{}  {}", id, style(&opt.label).cyan())
                } else {
                    format!("{}  {:<8} {}", id, style(&opt.label).bold(), bitrate_text(opt.bitrate))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// One replayed step and the view it produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub step: usize,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub view: Option<RenderView>,
}

#[derive(Tabled)]
struct FrameRow {
    #[tabled(rename = "#")]
    step: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Fullscreen")]
    fullscreen: String,
}

fn playback_text(view: &RenderView) -> &'static str {
    match view.playback_icon {
        cinder_core::projection::PlaybackIcon::Pause => "playing",
        cinder_core::projection::PlaybackIcon::Play => "paused",
    }
}

fn fullscreen_text(view: &RenderView) -> &'static str {
    match view.fullscreen_icon {
        cinder_core::projection::FullscreenIcon::Exit => "yes",
        cinder_core::projection::FullscreenIcon::Enter => "no",
    }
}

/// Render a single frame as one line of text
pub fn frame_line(frame: &Frame) -> String {
    let head = format!("{:>3} {:<28}", frame.step, frame.action);
    if let Some(err) = &frame.error {
        return format!("{} {}", head, style(err).red());
    }
    match &frame.view {
        Some(view) => format!(
            "{} {:<7} {} / {}  quality={}  volume={:.2}  fullscreen={}",
            head,
            playback_text(view),
            view.current_time,
            view.duration,
            style(&view.quality_label).bold(),
            view.volume,
            fullscreen_text(view),
        ),
        None => format!("{} {}", head, style("detached").dim()),
    }
}

/// Render every frame at once
pub fn frames(frames: &[Frame], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => to_json(&frames),
        OutputFormat::Table => {
            let rows = frames.iter().map(|f| match (&f.view, &f.error) {
                (_, Some(err)) => FrameRow {
                    step: f.step,
                    action: f.action.clone(),
                    state: format!("error: {}", err),
                    time: "-".to_string(),
                    quality: "-".to_string(),
                    volume: "-".to_string(),
                    fullscreen: "-".to_string(),
                },
                (Some(view), None) => FrameRow {
                    step: f.step,
                    action: f.action.clone(),
                    state: playback_text(view).to_string(),
                    time: format!("{} / {}", view.current_time, view.duration),
                    quality: view.quality_label.clone(),
                    volume: format!("{:.2}", view.volume),
                    fullscreen: fullscreen_text(view).to_string(),
                },
                (None, None) => FrameRow {
                    step: f.step,
                    action: f.action.clone(),
                    state: "detached".to_string(),
                    time: "-".to_string(),
                    quality: "-".to_string(),
                    volume: "-".to_string(),
                    fullscreen: "-".to_string(),
                },
            });
            Table::new(rows).with(Style::rounded()).to_string()
        }
        OutputFormat::Text => frames.iter().map(frame_line).collect::<Vec<_>>().join("\n"),
    }
}
