//! Coordinator - owns one playback session at a time
//!
//! Coordinates:
//! - Engine creation, or the native fallback when the runtime has no engine
//! - Subscription setup through the event bridge, before any loading starts
//! - Fullscreen capability negotiation
//! - Teardown when the media identifier changes or the view goes away

use crate::{
    bridge::{EventBridge, SessionCell, StateObserver},
    fullscreen::FullscreenCapabilities,
    platform::{EngineFactory, FullscreenSurface, MediaElement, StreamingEngine},
    projection::RenderView,
    state::{PlayerState, Transition},
    types::*,
    Result,
};
use std::rc::Rc;
use tracing::{debug, info, instrument, warn};

/// Element type rendered into by engines of factory `F`
pub type MediaOf<F> = <<F as EngineFactory>::Engine as StreamingEngine>::Media;

/// Everything that lives exactly as long as one attach
pub(crate) struct Session<E: StreamingEngine> {
    pub(crate) media_id: MediaId,
    pub(crate) cell: Rc<SessionCell>,
    pub(crate) bridge: EventBridge<E>,
    pub(crate) fullscreen: FullscreenCapabilities,
}

impl<E: StreamingEngine> Session<E> {
    pub(crate) fn id(&self) -> SessionId {
        self.cell.id()
    }
}

/// Playback coordinator
///
/// Reconciles engine, element and document events into one [`PlayerState`]
/// and turns user intents into calls on those collaborators. Single-threaded:
/// every method and every event handler runs on the same event loop.
pub struct Coordinator<F: EngineFactory> {
    config: PlayerConfig,
    factory: F,
    observer: Option<StateObserver>,
    pub(crate) session: Option<Session<F::Engine>>,
}

impl<F: EngineFactory> Coordinator<F> {
    /// Create a detached coordinator
    pub fn new(config: PlayerConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            observer: None,
            session: None,
        }
    }

    /// Register a callback run after every state change.
    ///
    /// Takes effect from the next attach.
    pub fn set_observer(&mut self, observer: impl Fn(&PlayerState) + 'static) {
        self.observer = Some(Rc::new(observer));
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Attach to `media_id`, replacing any current session
    #[instrument(skip(self, media_id, media, surface), fields(media_id = %media_id))]
    pub fn attach(
        &mut self,
        media_id: MediaId,
        media: Rc<MediaOf<F>>,
        surface: Rc<dyn FullscreenSurface>,
    ) -> Result<SessionId> {
        let url = self.config.stream_url(&media_id)?;

        if self.session.is_some() {
            self.detach();
        }

        let session_id = SessionId::new();
        let supported = self.factory.is_supported();
        let fullscreen = FullscreenCapabilities::negotiate(surface.as_ref());

        let cell = Rc::new(SessionCell::new(
            session_id,
            PlayerState::new(supported, self.config.initial_volume),
            self.observer.clone(),
        ));

        let engine = supported.then(|| self.factory.create(&self.config.engine));

        // Subscribe first so no manifest or level event can be missed
        let bridge = EventBridge::connect(engine.clone(), media.clone(), surface.clone(), &fullscreen, &cell);

        match &engine {
            Some(engine) => {
                engine.load_source(&url);
                engine.attach_media(media.as_ref());
            }
            None if media.can_play_native_hls() => {
                debug!("Adaptive engine unsupported, using native playback");
                media.set_src(&url);
            }
            None => {
                warn!("Neither adaptive nor native HLS playback is available");
            }
        }

        if let Some(volume) = crate::state::clamp_volume(self.config.initial_volume) {
            media.set_volume(volume);
        }

        // Start from what the collaborators report right now
        if !media.paused() {
            cell.dispatch(Transition::PlaybackStarted);
        }
        if fullscreen.is_fullscreen(surface.as_ref()) {
            cell.dispatch(Transition::FullscreenChanged { fullscreen: true });
        }

        info!(
            session_id = %session_id,
            url = %url,
            adaptive = supported,
            listeners = bridge.listener_count(),
            "Attached"
        );

        self.session = Some(Session {
            media_id,
            cell,
            bridge,
            fullscreen,
        });

        Ok(session_id)
    }

    /// Release the engine, every listener and the state
    #[instrument(skip(self))]
    pub fn detach(&mut self) {
        let Some(mut session) = self.session.take() else {
            debug!("Detach without a session");
            return;
        };

        let session_id = session.id();
        session.bridge.disconnect();
        drop(session);

        info!(session_id = %session_id, "Detached");
    }

    /// Whether a session is attached
    pub fn is_attached(&self) -> bool {
        self.session.is_some()
    }

    /// Id of the attached media
    pub fn media_id(&self) -> Option<&MediaId> {
        self.session.as_ref().map(|s| &s.media_id)
    }

    /// Id of the current session
    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id())
    }

    /// Snapshot of the current state
    pub fn state(&self) -> Option<PlayerState> {
        self.session.as_ref().map(|s| s.cell.snapshot())
    }

    /// Display data for the current state
    pub fn view(&self) -> Option<RenderView> {
        self.session
            .as_ref()
            .map(|s| s.cell.with_state(RenderView::project))
    }

    /// Listeners registered by the current session
    pub fn listener_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |s| s.bridge.listener_count())
    }

    /// Whether the toggle can enter fullscreen on this surface
    pub fn fullscreen_available(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.fullscreen.can_request())
    }
}

impl<F: EngineFactory> Drop for Coordinator<F> {
    fn drop(&mut self) {
        self.detach();
    }
}
