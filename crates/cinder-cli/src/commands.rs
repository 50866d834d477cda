//! CLI command implementations

use crate::output::{self, Frame, OutputFormat};
use anyhow::Context;
use cinder_core::headless::{HeadlessEngineFactory, HeadlessMedia, HeadlessSurface};
use cinder_core::manifest::{HttpManifestSource, ManifestSource};
use cinder_core::{Coordinator, LevelInfo, MediaId, PlayerConfig};
use serde::Deserialize;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Print the master playlist URL of a video
pub fn url(config: &PlayerConfig, video_id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let media_id = MediaId::new(video_id)?;
    let url = config.stream_url(&media_id)?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            output::to_json(&serde_json::json!({ "videoId": video_id, "url": url }))
        ),
        _ => println!("{}", url),
    }
    Ok(())
}

/// Fetch a video's master playlist and print its quality catalog
pub async fn catalog(config: &PlayerConfig, video_id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let media_id = MediaId::new(video_id)?;
    let url = config.stream_url(&media_id)?;
    info!(url = %url, "Fetching master playlist");

    let source = HttpManifestSource::new()?;
    let playlist = source
        .fetch_master(&url)
        .await
        .with_context(|| format!("fetching {}", url))?;

    if playlist.variants.is_empty() {
        warn!("Master playlist lists no variants");
    }

    println!("{}", output::catalog(&playlist.catalog(), format));
    Ok(())
}

// =============================================================================
// Replay
// =============================================================================

/// A scripted session
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub video_id: String,
    /// Whether the runtime has an adaptive engine
    #[serde(default = "default_true")]
    pub adaptive: bool,
    /// Whether the element plays HLS natively
    #[serde(default = "default_true")]
    pub native_hls: bool,
    pub steps: Vec<ScriptStep>,
}

fn default_true() -> bool {
    true
}

/// One step, optionally delayed relative to the previous one
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptStep {
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Raw collaborator event
    Event(ScriptEvent),
    /// User intent
    Command(ScriptCommand),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    ManifestParsed { levels: Vec<LevelInfo> },
    LevelSwitched { level: i32 },
    TimeUpdate { position: f64 },
    DurationChange { duration: f64 },
    Play,
    Pause,
    FullscreenEnter,
    FullscreenExit,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptCommand {
    TogglePlay,
    SelectQuality { id: i32 },
    Seek { position: f64 },
    SetVolume { volume: f64 },
    ToggleFullscreen,
    Attach { video_id: String },
    Detach,
}

impl Action {
    fn describe(&self) -> String {
        match self {
            Action::Event(e) => match e {
                ScriptEvent::ManifestParsed { levels } => format!("manifest ({} levels)", levels.len()),
                ScriptEvent::LevelSwitched { level } => format!("level switched {}", level),
                ScriptEvent::TimeUpdate { position } => format!("timeupdate {}", position),
                ScriptEvent::DurationChange { duration } => format!("durationchange {}", duration),
                ScriptEvent::Play => "play".to_string(),
                ScriptEvent::Pause => "pause".to_string(),
                ScriptEvent::FullscreenEnter => "fullscreen on".to_string(),
                ScriptEvent::FullscreenExit => "fullscreen off".to_string(),
            },
            Action::Command(c) => match c {
                ScriptCommand::TogglePlay => "> toggle play".to_string(),
                ScriptCommand::SelectQuality { id } => format!("> select quality {}", id),
                ScriptCommand::Seek { position } => format!("> seek {}", position),
                ScriptCommand::SetVolume { volume } => format!("> volume {}", volume),
                ScriptCommand::ToggleFullscreen => "> toggle fullscreen".to_string(),
                ScriptCommand::Attach { video_id } => format!("> attach {}", video_id),
                ScriptCommand::Detach => "> detach".to_string(),
            },
        }
    }
}

/// Headless player driven by script steps
struct ReplaySession {
    coordinator: Coordinator<HeadlessEngineFactory>,
    media: Rc<HeadlessMedia>,
    surface: Rc<HeadlessSurface>,
}

impl ReplaySession {
    fn new(config: PlayerConfig, script: &Script) -> Self {
        let media = Rc::new(HeadlessMedia::new());
        media.set_native_hls(script.native_hls);
        // Play/pause and seeks confirm immediately, like a real element would shortly after
        media.set_auto_confirm(true);

        let surface = Rc::new(HeadlessSurface::standard());
        surface.set_auto_confirm(true);

        Self {
            coordinator: Coordinator::new(config, HeadlessEngineFactory::new(script.adaptive)),
            media,
            surface,
        }
    }

    fn attach(&mut self, video_id: &str) -> anyhow::Result<()> {
        let media_id = MediaId::new(video_id)?;
        self.coordinator
            .attach(media_id, self.media.clone(), self.surface.clone())?;
        if let Some(engine) = self.coordinator.factory().last_engine() {
            engine.set_auto_confirm(true);
        }
        Ok(())
    }

    fn apply(&mut self, action: &Action) -> anyhow::Result<()> {
        match action {
            Action::Event(event) => self.fire(event),
            Action::Command(command) => self.command(command)?,
        }
        Ok(())
    }

    fn fire(&self, event: &ScriptEvent) {
        let engine = self
            .coordinator
            .is_attached()
            .then(|| self.coordinator.factory().last_engine())
            .flatten();
        match event {
            ScriptEvent::ManifestParsed { levels } => match engine {
                Some(engine) => engine.emit_manifest(levels.clone()),
                None => debug!("No engine; manifest event dropped"),
            },
            ScriptEvent::LevelSwitched { level } => match engine {
                Some(engine) => engine.emit_level_switched(*level),
                None => debug!("No engine; level event dropped"),
            },
            ScriptEvent::TimeUpdate { position } => self.media.emit_time(*position),
            ScriptEvent::DurationChange { duration } => self.media.emit_duration(*duration),
            ScriptEvent::Play => self.media.emit_play(),
            ScriptEvent::Pause => self.media.emit_pause(),
            ScriptEvent::FullscreenEnter => self.surface.enter_fullscreen(),
            ScriptEvent::FullscreenExit => self.surface.leave_fullscreen(),
        }
    }

    fn command(&mut self, command: &ScriptCommand) -> anyhow::Result<()> {
        match command {
            ScriptCommand::TogglePlay => self.coordinator.toggle_play(),
            ScriptCommand::SelectQuality { id } => self.coordinator.select_quality(*id)?,
            ScriptCommand::Seek { position } => self.coordinator.seek(*position),
            ScriptCommand::SetVolume { volume } => self.coordinator.set_volume(*volume),
            ScriptCommand::ToggleFullscreen => self.coordinator.toggle_fullscreen(),
            ScriptCommand::Attach { video_id } => self.attach(video_id)?,
            ScriptCommand::Detach => self.coordinator.detach(),
        }
        Ok(())
    }
}

/// Run a script and collect one frame per step.
///
/// Steps are fed through a channel from a timer task so delays behave like
/// events arriving on an event loop; the coordinator itself stays on this task.
pub async fn run_script(config: PlayerConfig, script: Script) -> anyhow::Result<Vec<Frame>> {
    let mut session = ReplaySession::new(config, &script);
    session.attach(&script.video_id)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let steps = script.steps;
    let producer = tokio::spawn(async move {
        for (index, step) in steps.into_iter().enumerate() {
            if step.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(step.delay_ms)).await;
            }
            if tx.send((index + 1, step.action)).is_err() {
                break;
            }
        }
    });

    let mut frames = Vec::new();
    while let Some((step, action)) = rx.recv().await {
        debug!(step, action = ?action, "Replaying step");
        let error = session.apply(&action).err().map(|e| e.to_string());
        frames.push(Frame {
            step,
            action: action.describe(),
            error,
            view: session.coordinator.view(),
        });
    }
    producer.await?;

    Ok(frames)
}

/// Replay a script file and print the render view after each step
pub async fn replay(config: PlayerConfig, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let script: Script = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    info!(video_id = %script.video_id, steps = script.steps.len(), "Replaying script");

    let frames = run_script(config, script).await?;
    println!("{}", output::frames(&frames, format));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = r#"{
        "videoId": "809716870",
        "steps": [
            { "event": { "type": "manifest_parsed", "levels": [
                { "width": 640, "height": 360, "bitrate": 800000 },
                { "width": 1280, "height": 720, "bitrate": 2500000 },
                { "width": 1920, "height": 1080, "bitrate": 5000000 }
            ] } },
            { "event": { "type": "duration_change", "duration": 100 } },
            { "command": { "type": "toggle_play" } },
            { "command": { "type": "select_quality", "id": 1 } },
            { "command": { "type": "seek", "position": 150 } },
            { "command": { "type": "set_volume", "volume": 1.4 } },
            { "delayMs": 5, "command": { "type": "toggle_fullscreen" } },
            { "command": { "type": "select_quality", "id": 7 } },
            { "command": { "type": "detach" } }
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(script.video_id, "809716870");
        assert!(script.adaptive);
        assert_eq!(script.steps.len(), 9);
        assert_eq!(script.steps[6].delay_ms, 5);
        assert!(matches!(
            script.steps[3].action,
            Action::Command(ScriptCommand::SelectQuality { id: 1 })
        ));
    }

    #[tokio::test]
    async fn test_run_script() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        let frames = run_script(PlayerConfig::default(), script).await.unwrap();
        assert_eq!(frames.len(), 9);

        let view = |i: usize| frames[i].view.clone().unwrap();
        assert_eq!(view(0).quality_menu.len(), 4);
        assert_eq!(view(1).duration, "01:40");
        assert_eq!(view(2).playback_icon, cinder_core::projection::PlaybackIcon::Pause);
        assert_eq!(view(3).quality_label, "720p");
        assert_eq!(view(4).current_time, "01:40");
        assert_eq!(view(5).volume, 1.0);
        assert_eq!(view(6).fullscreen_icon, cinder_core::projection::FullscreenIcon::Exit);

        assert!(frames[7].error.is_some());
        assert!(frames[8].view.is_none());
    }

    #[tokio::test]
    async fn test_degraded_script() {
        let script: Script = serde_json::from_str(
            r#"{ "videoId": "a1", "adaptive": false, "steps": [
                { "event": { "type": "manifest_parsed", "levels": [] } },
                { "command": { "type": "select_quality", "id": -1 } }
            ] }"#,
        )
        .unwrap();
        let frames = run_script(PlayerConfig::default(), script).await.unwrap();

        assert!(!frames[0].view.as_ref().unwrap().quality_selectable);
        assert!(frames[1].error.as_deref().unwrap().contains("not supported"));
    }
}
