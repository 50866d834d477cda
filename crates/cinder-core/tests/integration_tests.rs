//! Integration tests for Cinder Core

use cinder_core::headless::{
    EngineCall, HeadlessEngineFactory, HeadlessMedia, HeadlessSurface,
};
use cinder_core::{
    format_time, Coordinator, EngineEventKind, Error, FullscreenVendor, LevelInfo,
    MasterPlaylist, MediaEventKind, MediaId, PlayerConfig, PlayerState, QualitySelector,
    RenderView, Transition,
};
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// Helpers
// =============================================================================

fn ladder() -> Vec<LevelInfo> {
    vec![
        LevelInfo::new(640, 360, 800_000),
        LevelInfo::new(1280, 720, 2_500_000),
        LevelInfo::new(1920, 1080, 5_000_000),
    ]
}

struct Harness {
    coordinator: Coordinator<HeadlessEngineFactory>,
    media: Rc<HeadlessMedia>,
    surface: Rc<HeadlessSurface>,
}

impl Harness {
    fn new(supported: bool) -> Self {
        Self {
            coordinator: Coordinator::new(
                PlayerConfig::default(),
                HeadlessEngineFactory::new(supported),
            ),
            media: Rc::new(HeadlessMedia::new()),
            surface: Rc::new(HeadlessSurface::standard()),
        }
    }

    fn attach(&mut self, id: &str) {
        self.coordinator
            .attach(MediaId::new(id).unwrap(), self.media.clone(), self.surface.clone())
            .unwrap();
    }

    fn state(&self) -> PlayerState {
        self.coordinator.state().unwrap()
    }
}

// =============================================================================
// Quality Catalog Tests
// =============================================================================

#[test]
fn test_three_level_manifest() {
    let mut h = Harness::new(true);
    h.attach("809716870");
    let engine = h.coordinator.factory().last_engine().unwrap();

    engine.emit_manifest(ladder());

    let state = h.state();
    let ids: Vec<i32> = state.qualities.iter().map(|o| o.id).collect();
    let labels: Vec<&str> = state.qualities.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(ids, vec![-1, 0, 1, 2]);
    assert_eq!(labels, vec!["Auto", "360p", "720p", "1080p"]);
    assert_eq!(state.quality_label(), "Auto");

    engine.emit_level_switched(1);
    assert_eq!(h.state().quality_label(), "720p");
}

#[test]
fn test_empty_manifest() {
    let mut h = Harness::new(true);
    h.attach("empty");
    let engine = h.coordinator.factory().last_engine().unwrap();

    engine.emit_manifest(vec![]);

    assert_eq!(h.state().qualities.len(), 1);
    assert!(matches!(
        h.coordinator.select_quality(0),
        Err(Error::UnknownQuality { id: 0 })
    ));
    assert!(h.coordinator.select_quality(-1).is_ok());
}

#[test]
fn test_manifest_replaces_catalog() {
    let mut h = Harness::new(true);
    h.attach("replace");
    let engine = h.coordinator.factory().last_engine().unwrap();

    engine.emit_manifest(ladder());
    engine.emit_manifest(vec![LevelInfo::new(854, 480, 1_200_000)]);

    let labels: Vec<String> = h.state().qualities.iter().map(|o| o.label.clone()).collect();
    assert_eq!(labels, vec!["Auto", "480p"]);
}

#[test]
fn test_level_switch_before_manifest() {
    let mut h = Harness::new(true);
    h.attach("early");
    let engine = h.coordinator.factory().last_engine().unwrap();

    engine.emit_level_switched(2);

    let view = h.coordinator.view().unwrap();
    assert_eq!(view.quality_label, "Auto");
    assert_eq!(h.state().current_quality, QualitySelector::Level(2));
}

#[test]
fn test_upload_master_feeds_catalog() {
    let master = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=800k,RESOLUTION=640x360
360p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=1200k,RESOLUTION=854x480
480p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=2500k,RESOLUTION=1280x720
720p.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=5000k,RESOLUTION=1920x1080
1080p.m3u8
";
    let playlist = MasterPlaylist::parse(master).unwrap();
    let heights: Vec<Option<u32>> = playlist.levels().iter().map(|l| l.height).collect();
    assert_eq!(heights, vec![Some(360), Some(480), Some(720), Some(1080)]);

    let mut h = Harness::new(true);
    h.attach("upload");
    let engine = h.coordinator.factory().last_engine().unwrap();
    engine.emit_manifest(playlist.levels());
    assert_eq!(h.state().qualities, playlist.catalog());
}

// =============================================================================
// Quality Selection Tests
// =============================================================================

#[test]
fn test_select_then_confirm() {
    let mut h = Harness::new(true);
    h.attach("select");
    let engine = h.coordinator.factory().last_engine().unwrap();
    engine.emit_manifest(ladder());

    h.coordinator.select_quality(2).unwrap();
    assert_eq!(h.state().current_quality, QualitySelector::Level(2));

    engine.emit_level_switched(2);
    assert_eq!(h.state().current_quality, QualitySelector::Level(2));

    // The engine has the last word
    engine.emit_level_switched(0);
    assert_eq!(h.state().current_quality, QualitySelector::Level(0));
    assert_eq!(h.state().quality_label(), "360p");
}

#[test]
fn test_engine_echo_confirms_selection() {
    let mut h = Harness::new(true);
    h.attach("echo");
    let engine = h.coordinator.factory().last_engine().unwrap();
    engine.set_auto_confirm(true);
    engine.emit_manifest(ladder());

    h.coordinator.select_quality(1).unwrap();
    assert_eq!(h.state().quality_label(), "720p");
    assert_eq!(
        engine.calls().iter().filter(|c| matches!(c, EngineCall::SetLevel(_))).count(),
        1
    );
}

// =============================================================================
// Playback Clock Tests
// =============================================================================

#[test]
fn test_seek_clamping() {
    let mut h = Harness::new(true);
    h.attach("seek");

    h.coordinator.seek(150.0);
    assert_eq!(h.state().current_time(), 150.0);

    h.media.emit_duration(100.0);
    h.coordinator.seek(150.0);
    assert_eq!(h.state().current_time(), 100.0);

    h.coordinator.seek(-5.0);
    assert_eq!(h.state().current_time(), 0.0);
}

#[test]
fn test_time_strings_never_panic() {
    let mut h = Harness::new(true);
    h.attach("clock");

    let samples = [0.0, 0.4, 59.99, 61.0, 3599.0, f64::NAN, f64::INFINITY, -1.0];
    for t in samples {
        h.media.emit_time(t);
        for d in samples {
            h.media.emit_duration(d);
            let view = h.coordinator.view().unwrap();
            assert_eq!(view.current_time.len(), 5);
            if d.is_nan() {
                assert_eq!(view.duration, "00:00");
            }
        }
    }
    assert_eq!(format_time(f64::NAN), "00:00");
}

#[test]
fn test_volume_clamping() {
    let mut h = Harness::new(true);
    h.attach("volume");

    h.coordinator.set_volume(1.4);
    assert_eq!(h.state().volume, 1.0);
    h.coordinator.set_volume(-0.2);
    assert_eq!(h.state().volume, 0.0);
    assert_eq!(h.media.volume(), 0.0);

    h.coordinator.set_volume(f64::NAN);
    assert_eq!(h.state().volume, 0.0);
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_subscriptions_precede_loading() {
    let mut h = Harness::new(true);
    h.attach("order");
    let calls = h.coordinator.factory().last_engine().unwrap().calls();

    let load = calls
        .iter()
        .position(|c| matches!(c, EngineCall::LoadSource(_)))
        .unwrap();
    for kind in [EngineEventKind::ManifestParsed, EngineEventKind::LevelSwitched] {
        let on = calls.iter().position(|c| *c == EngineCall::On(kind)).unwrap();
        assert!(on < load);
    }
}

#[test]
fn test_repeated_attach_detach_balances_listeners() {
    let mut h = Harness::new(true);

    for cycle in 0..10 {
        h.attach(&format!("cycle-{}", cycle));
        assert_eq!(h.media.listener_count(), 4);
        assert_eq!(h.surface.listener_count(), 1);
        assert_eq!(h.coordinator.listener_count(), 7);

        let engine = h.coordinator.factory().last_engine().unwrap();
        h.coordinator.detach();

        assert_eq!(engine.listener_count(), 0);
        assert_eq!(engine.destroy_count(), 1);
        // Every engine listener went through `off` before `destroy`
        assert_eq!(engine.registered_total(), 2);
        assert_eq!(engine.removed_total(), 2);
        assert_eq!(h.media.listener_count(), 0);
        assert_eq!(h.surface.listener_count(), 0);
        assert_eq!(h.media.registered_total(), 4 * (cycle + 1));
        assert_eq!(h.media.removed_total(), 4 * (cycle + 1));
    }
    assert_eq!(h.coordinator.factory().created_count(), 10);
}

#[test]
fn test_events_after_detach_are_ignored() {
    let mut h = Harness::new(true);
    let changes = Rc::new(RefCell::new(0usize));
    let counter = changes.clone();
    h.coordinator
        .set_observer(move |_: &PlayerState| *counter.borrow_mut() += 1);
    h.attach("stale");

    let engine = h.coordinator.factory().last_engine().unwrap();
    let manifest = engine.listeners(EngineEventKind::ManifestParsed);
    let time = h.media.listeners(MediaEventKind::TimeUpdate);
    assert_eq!(manifest.len(), 1);
    assert_eq!(time.len(), 1);

    h.coordinator.detach();
    let before = *changes.borrow();

    // Late deliveries through handles captured before teardown
    (manifest[0])(cinder_core::EngineEvent::ManifestParsed { levels: ladder() });
    (time[0])();
    h.media.emit_play();
    h.surface.enter_fullscreen();

    assert_eq!(*changes.borrow(), before);
    assert!(h.coordinator.state().is_none());
}

#[test]
fn test_reattach_starts_fresh() {
    let mut h = Harness::new(true);
    h.attach("first");
    let first = h.coordinator.factory().last_engine().unwrap();
    first.emit_manifest(ladder());
    h.media.emit_duration(90.0);

    h.attach("second");
    let state = h.state();
    assert_eq!(state.qualities.len(), 1);
    assert_eq!(state.duration(), None);
    assert!(first.is_destroyed());

    // Old engine events cannot reach the new session
    first.emit_manifest(ladder());
    assert_eq!(h.state().qualities.len(), 1);
}

#[test]
fn test_media_id_rejects_path_characters() {
    assert!(MediaId::new("../etc").is_err());
    assert!(MediaId::new("a/b").is_err());
    assert!(MediaId::new("").is_err());
    assert!(MediaId::new("clip_42-b").is_ok());
}

#[test]
fn test_failed_attach_touches_nothing() {
    let config = PlayerConfig::default()
        .with_stream_base("mailto:ops@example.com")
        .unwrap();
    let mut coordinator = Coordinator::new(config, HeadlessEngineFactory::new(true));
    let media = Rc::new(HeadlessMedia::new());
    let surface = Rc::new(HeadlessSurface::standard());

    let result = coordinator.attach(MediaId::new("broken").unwrap(), media.clone(), surface.clone());

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(!coordinator.is_attached());
    assert_eq!(coordinator.factory().created_count(), 0);
    assert_eq!(media.registered_total(), 0);
    assert_eq!(surface.listener_count(), 0);
    assert_eq!(media.src(), None);
}

// =============================================================================
// Degraded Mode Tests
// =============================================================================

#[test]
fn test_native_fallback() {
    let mut h = Harness::new(false);
    h.attach("native");

    assert!(h.coordinator.factory().last_engine().is_none());
    assert_eq!(
        h.media.src().as_deref(),
        Some("http://127.0.0.1:8000/upload/stream/native/master.m3u8")
    );

    let state = h.state();
    assert!(!state.switching_supported);
    assert_eq!(state.qualities.len(), 1);
    assert!(matches!(
        h.coordinator.select_quality(-1),
        Err(Error::QualitySwitchUnsupported)
    ));
    assert!(!h.coordinator.view().unwrap().quality_selectable);

    // Element events still drive the state
    h.media.emit_play();
    assert!(h.state().is_playing);
}

#[test]
fn test_no_playback_path() {
    let mut h = Harness::new(false);
    h.media.set_native_hls(false);
    h.attach("none");

    assert!(h.media.src().is_none());
    assert!(h.coordinator.is_attached());
    assert_eq!(h.coordinator.listener_count(), 5);
}

// =============================================================================
// Fullscreen Tests
// =============================================================================

#[test]
fn test_prefixed_fullscreen() {
    let mut h = Harness::new(true);
    h.surface = Rc::new(HeadlessSurface::with_vendors(&[FullscreenVendor::Webkit]));
    h.attach("webkit");

    h.coordinator.toggle_fullscreen();
    assert_eq!(h.surface.requests(), vec!["webkitRequestFullscreen".to_string()]);

    h.surface.enter_fullscreen();
    assert!(h.state().is_fullscreen);
    assert_eq!(
        h.coordinator.view().unwrap().fullscreen_icon,
        cinder_core::projection::FullscreenIcon::Exit
    );

    h.coordinator.toggle_fullscreen();
    assert_eq!(h.surface.exits(), vec!["webkitExitFullscreen".to_string()]);
}

#[test]
fn test_fullscreen_unavailable() {
    let mut h = Harness::new(true);
    h.surface = Rc::new(HeadlessSurface::with_vendors(&[]));
    h.attach("nofs");

    assert!(!h.coordinator.fullscreen_available());
    let before = h.state();
    h.coordinator.toggle_fullscreen();
    assert_eq!(h.state(), before);
    assert_eq!(h.coordinator.listener_count(), 6);
}

#[test]
fn test_attach_while_fullscreen_and_playing() {
    let mut h = Harness::new(true);
    h.media.emit_play();
    h.surface.enter_fullscreen();
    h.attach("warm");

    let state = h.state();
    assert!(state.is_playing);
    assert!(state.is_fullscreen);
}

// =============================================================================
// Observer & Projection Tests
// =============================================================================

#[test]
fn test_observer_sees_every_change() {
    let mut h = Harness::new(true);
    let views: Rc<RefCell<Vec<RenderView>>> = Rc::default();
    let sink = views.clone();
    h.coordinator
        .set_observer(move |state: &PlayerState| sink.borrow_mut().push(RenderView::project(state)));
    h.attach("observe");

    h.media.set_auto_confirm(true);
    h.coordinator.toggle_play();
    h.media.emit_time(65.0);

    let views = views.borrow();
    let last = views.last().unwrap();
    assert_eq!(last.current_time, "01:05");
    assert_eq!(last.playback_icon, cinder_core::projection::PlaybackIcon::Pause);
}

#[test]
fn test_reducer_matches_coordinator() {
    let mut h = Harness::new(true);
    h.attach("reduce");
    let engine = h.coordinator.factory().last_engine().unwrap();

    engine.emit_manifest(ladder());
    h.media.emit_duration(300.0);
    h.media.emit_time(12.5);
    engine.emit_level_switched(2);

    let expected = PlayerState::default()
        .apply(Transition::ManifestReady { levels: ladder() })
        .apply(Transition::DurationKnown { duration: 300.0 })
        .apply(Transition::TimeAdvanced { position: 12.5 })
        .apply(Transition::QualityConfirmed { selector: QualitySelector::Level(2) });
    assert_eq!(h.state(), expected);
}
