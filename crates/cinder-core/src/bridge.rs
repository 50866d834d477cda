//! Event Bridge - the only place subscriptions are created and destroyed
//!
//! Each raw event from the streaming engine, the media element or the
//! fullscreen document becomes exactly one [`Transition`] applied to the
//! session's state. Handlers only hold weak references, so an event that
//! arrives after the session is gone is dropped instead of applied.
//!
//! Every listener `Rc` is kept from registration until teardown and handed
//! back unchanged to the `off`/`remove_*` call.

use crate::fullscreen::FullscreenCapabilities;
use crate::platform::{
    EngineEvent, EngineEventKind, EngineListener, FullscreenSurface, Listener, MediaElement,
    MediaEventKind, StreamingEngine,
};
use crate::state::{PlayerState, Transition};
use crate::types::{QualitySelector, SessionId};
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use tracing::{debug, info, trace};

/// Callback invoked with a snapshot after every applied transition
pub type StateObserver = Rc<dyn Fn(&PlayerState)>;

/// State of one attached session, shared weakly with every handler
pub struct SessionCell {
    id: SessionId,
    state: RefCell<PlayerState>,
    observer: Option<StateObserver>,
}

impl SessionCell {
    pub fn new(id: SessionId, state: PlayerState, observer: Option<StateObserver>) -> Self {
        Self {
            id,
            state: RefCell::new(state),
            observer,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> PlayerState {
        self.state.borrow().clone()
    }

    /// Read the state without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&PlayerState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Apply one transition, then notify the observer.
    ///
    /// The borrow is released before the observer runs so it may issue
    /// commands of its own.
    pub fn dispatch(&self, transition: Transition) {
        trace!(session_id = %self.id, transition = transition.name(), "Applying transition");

        let snapshot = {
            let mut state = self.state.borrow_mut();
            let current = std::mem::take(&mut *state);
            *state = current.apply(transition);
            self.observer.as_ref().map(|_| state.clone())
        };

        if let (Some(observer), Some(snapshot)) = (&self.observer, snapshot) {
            observer(&snapshot);
        }
    }
}

impl std::fmt::Debug for SessionCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCell")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

fn forward(cell: &Weak<SessionCell>, transition: Transition) {
    match cell.upgrade() {
        Some(cell) => cell.dispatch(transition),
        None => debug!(transition = transition.name(), "Dropping event for detached session"),
    }
}

/// Translate a raw engine event
pub fn engine_transition(event: EngineEvent) -> Transition {
    match event {
        EngineEvent::ManifestParsed { levels } => Transition::ManifestReady { levels },
        EngineEvent::LevelSwitched { level } => Transition::QualityConfirmed {
            selector: QualitySelector::from_engine_id(level),
        },
    }
}

/// Live subscriptions of one session
pub struct EventBridge<E: StreamingEngine> {
    engine: Option<Rc<E>>,
    media: Rc<E::Media>,
    surface: Rc<dyn FullscreenSurface>,
    engine_listeners: Vec<(EngineEventKind, EngineListener)>,
    media_listeners: Vec<(MediaEventKind, Listener)>,
    fullscreen_listeners: Vec<(&'static str, Listener)>,
}

impl<E: StreamingEngine> EventBridge<E> {
    /// Subscribe to every source. Call before the engine loads its source.
    pub fn connect(
        engine: Option<Rc<E>>,
        media: Rc<E::Media>,
        surface: Rc<dyn FullscreenSurface>,
        caps: &FullscreenCapabilities,
        cell: &Rc<SessionCell>,
    ) -> Self {
        let mut bridge = Self {
            engine,
            media,
            surface,
            engine_listeners: Vec::new(),
            media_listeners: Vec::new(),
            fullscreen_listeners: Vec::new(),
        };

        bridge.subscribe_engine(cell);
        bridge.subscribe_media(cell);
        bridge.subscribe_fullscreen(caps, cell);

        debug!(
            session_id = %cell.id(),
            listeners = bridge.listener_count(),
            "Event bridge connected"
        );
        bridge
    }

    fn subscribe_engine(&mut self, cell: &Rc<SessionCell>) {
        let Some(engine) = self.engine.clone() else {
            return;
        };

        for kind in EngineEventKind::ALL {
            let weak = Rc::downgrade(cell);
            let listener: EngineListener = Rc::new(move |event: EngineEvent| {
                if let EngineEvent::ManifestParsed { levels } = &event {
                    info!(levels = levels.len(), "Manifest parsed");
                }
                forward(&weak, engine_transition(event));
            });
            engine.on(kind, &listener);
            self.engine_listeners.push((kind, listener));
        }
    }

    fn subscribe_media(&mut self, cell: &Rc<SessionCell>) {
        for kind in MediaEventKind::ALL {
            let weak = Rc::downgrade(cell);
            let media = Rc::downgrade(&self.media);
            let listener: Listener = Rc::new(move || {
                let Some(media) = media.upgrade() else {
                    return;
                };
                let transition = match kind {
                    MediaEventKind::TimeUpdate => Transition::TimeAdvanced {
                        position: media.current_time(),
                    },
                    MediaEventKind::DurationChange => Transition::DurationKnown {
                        duration: media.duration(),
                    },
                    MediaEventKind::Play => Transition::PlaybackStarted,
                    MediaEventKind::Pause => Transition::PlaybackStopped,
                };
                forward(&weak, transition);
            });
            self.media.add_listener(kind, &listener);
            self.media_listeners.push((kind, listener));
        }
    }

    fn subscribe_fullscreen(&mut self, caps: &FullscreenCapabilities, cell: &Rc<SessionCell>) {
        let Some(event) = caps.change_event() else {
            return;
        };

        let weak = Rc::downgrade(cell);
        let surface = Rc::downgrade(&self.surface);
        let caps = *caps;
        let listener: Listener = Rc::new(move || {
            let Some(surface) = surface.upgrade() else {
                return;
            };
            let fullscreen = caps.is_fullscreen(surface.as_ref());
            forward(&weak, Transition::FullscreenChanged { fullscreen });
        });
        self.surface.add_change_listener(event, &listener);
        self.fullscreen_listeners.push((event, listener));
    }

    /// Number of listeners currently registered by this bridge
    pub fn listener_count(&self) -> usize {
        self.engine_listeners.len() + self.media_listeners.len() + self.fullscreen_listeners.len()
    }

    pub fn engine(&self) -> Option<&Rc<E>> {
        self.engine.as_ref()
    }

    pub fn media(&self) -> &Rc<E::Media> {
        &self.media
    }

    pub fn surface(&self) -> &Rc<dyn FullscreenSurface> {
        &self.surface
    }

    /// Tear down: engine listeners, engine, then element and document listeners.
    ///
    /// Idempotent; a second call finds nothing left to release.
    pub fn disconnect(&mut self) {
        let released = self.listener_count();
        if released == 0 && self.engine.is_none() {
            return;
        }

        if let Some(engine) = self.engine.take() {
            for (kind, listener) in self.engine_listeners.drain(..) {
                engine.off(kind, &listener);
            }
            engine.destroy();
        }

        for (kind, listener) in self.media_listeners.drain(..) {
            self.media.remove_listener(kind, &listener);
        }

        for (event, listener) in self.fullscreen_listeners.drain(..) {
            self.surface.remove_change_listener(event, &listener);
        }

        debug!(released, "Event bridge disconnected");
    }
}

impl<E: StreamingEngine> Drop for EventBridge<E> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessEngine, HeadlessMedia, HeadlessSurface};
    use crate::types::LevelInfo;

    fn connect_all() -> (
        EventBridge<HeadlessEngine>,
        Rc<SessionCell>,
        Rc<HeadlessEngine>,
        Rc<HeadlessMedia>,
        Rc<HeadlessSurface>,
    ) {
        let engine = Rc::new(HeadlessEngine::new());
        let media = Rc::new(HeadlessMedia::new());
        let surface = Rc::new(HeadlessSurface::standard());
        let caps = FullscreenCapabilities::negotiate(surface.as_ref());
        let cell = Rc::new(SessionCell::new(SessionId::new(), PlayerState::default(), None));
        let bridge = EventBridge::connect(
            Some(engine.clone()),
            media.clone(),
            surface.clone(),
            &caps,
            &cell,
        );
        (bridge, cell, engine, media, surface)
    }

    #[test]
    fn test_engine_events_mapped() {
        assert_eq!(
            engine_transition(EngineEvent::LevelSwitched { level: -1 }),
            Transition::QualityConfirmed { selector: QualitySelector::Automatic }
        );
        assert_eq!(
            engine_transition(EngineEvent::ManifestParsed { levels: vec![] }),
            Transition::ManifestReady { levels: vec![] }
        );
    }

    #[test]
    fn test_connect_registers_every_source() {
        let (mut bridge, _cell, engine, media, surface) = connect_all();

        assert_eq!(bridge.listener_count(), 7);
        assert_eq!(engine.listener_count(), 2);
        assert_eq!(media.listener_count(), 4);
        assert_eq!(surface.listener_count(), 1);

        bridge.disconnect();
        assert_eq!(bridge.listener_count(), 0);
        assert_eq!(engine.listener_count(), 0);
        assert_eq!(engine.removed_total(), engine.registered_total());
        assert_eq!(media.removed_total(), media.registered_total());
        assert_eq!(media.listener_count(), 0);
        assert_eq!(surface.listener_count(), 0);
        assert!(engine.is_destroyed());
    }

    #[test]
    fn test_events_reach_state() {
        let (mut bridge, cell, engine, media, _surface) = connect_all();

        engine.emit_manifest(vec![LevelInfo::new(640, 360, 800_000)]);
        media.emit_duration(120.0);
        media.emit_time(12.0);
        media.emit_play();

        let state = cell.snapshot();
        assert_eq!(state.qualities.len(), 2);
        assert_eq!(state.duration(), Some(120.0));
        assert_eq!(state.current_time(), 12.0);
        assert!(state.is_playing);

        bridge.disconnect();
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let (mut bridge, _cell, engine, _media, _surface) = connect_all();
        bridge.disconnect();
        bridge.disconnect();
        assert_eq!(engine.destroy_count(), 1);
    }
}
