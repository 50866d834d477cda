//! Headless session example
//!
//! Drives a coordinator through in-memory collaborators and prints the
//! render view as events arrive.
//!
//! Run with: cargo run -p cinder-core --example headless_session

use cinder_core::headless::{HeadlessEngineFactory, HeadlessMedia, HeadlessSurface};
use cinder_core::{Coordinator, LevelInfo, MediaId, PlayerConfig, PlayerState, RenderView};
use std::rc::Rc;

fn main() -> cinder_core::Result<()> {
    println!("Cinder Core - Headless Session Example");
    println!("======================================\n");

    let mut coordinator = Coordinator::new(PlayerConfig::default(), HeadlessEngineFactory::new(true));
    coordinator.set_observer(|state: &PlayerState| {
        let view = RenderView::project(state);
        println!(
            "  {} / {}  {:<5} {:?}",
            view.current_time, view.duration, view.quality_label, view.playback_icon
        );
    });

    let media = Rc::new(HeadlessMedia::new());
    media.set_auto_confirm(true);
    let surface = Rc::new(HeadlessSurface::standard());

    let session = coordinator.attach(MediaId::new("809716870")?, media.clone(), surface)?;
    println!("Attached session {}", session);

    if let Some(engine) = coordinator.factory().last_engine() {
        engine.set_auto_confirm(true);
        engine.emit_manifest(vec![
            LevelInfo::new(640, 360, 800_000),
            LevelInfo::new(1280, 720, 2_500_000),
            LevelInfo::new(1920, 1080, 5_000_000),
        ]);
    }

    media.emit_duration(212.0);
    coordinator.toggle_play();
    for second in [1.0, 2.0, 3.0] {
        media.emit_time(second);
    }
    coordinator.select_quality(2)?;
    coordinator.seek(500.0);

    println!("\nQualities:");
    if let Some(view) = coordinator.view() {
        for item in &view.quality_menu {
            let marker = if item.active { "*" } else { " " };
            println!("  {} {:>2}  {}", marker, item.id, item.label);
        }
    }

    coordinator.detach();
    println!("\nDetached; media listeners left: {}", media.listener_count());
    Ok(())
}
