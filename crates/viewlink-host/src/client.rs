//! Host-side client proxy: one per embedding.

use crate::dispatch::UiDispatcher;
use crossbeam_channel::Sender;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::debug;
use viewlink_proto::{
    ClientHandle, Configuration, DeathLink, LayoutId, LifeToken, OpenSessionRequest, RemoteClient,
    RemoteSession, RenderingService, TouchEvent, WindowToken,
};
use viewlink_surface::SharedSurface;

/// Global client ID counter
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one client proxy for reclamation tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

impl ClientId {
    fn next() -> Self {
        Self(NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Client({})", self.0)
    }
}

/// Fallback delivery of input neither the host view hierarchy nor the
/// remote content consumed.
///
/// Optional: hosts without such a path simply drop the event.
pub trait UnhandledInputSink: Send + Sync {
    fn dispatch_unhandled_input(&self, event: TouchEvent);
}

/// The IPC-reachable object the remote session talks back to.
///
/// Tracks the host's current surface, size and window token, and caches
/// the open session handle. All cross-process forwarding is best-effort:
/// a dead session turns every call into a no-op.
pub struct ClientProxy {
    id: ClientId,
    layout_id: LayoutId,
    state: Mutex<ProxyState>,
    death: Arc<DeathLink>,
    _life: LifeToken,
    ui: Arc<dyn UiDispatcher>,
    sink: Option<Arc<dyn UnhandledInputSink>>,
    reclaim_tx: Sender<ClientId>,
}

#[derive(Default)]
struct ProxyState {
    session: Option<Arc<dyn RemoteSession>>,
    surface: Option<SharedSurface>,
    window_token: Option<WindowToken>,
    width: u32,
    height: u32,
}

impl ClientProxy {
    pub(crate) fn new(
        layout_id: LayoutId,
        ui: Arc<dyn UiDispatcher>,
        sink: Option<Arc<dyn UnhandledInputSink>>,
        reclaim_tx: Sender<ClientId>,
    ) -> Arc<Self> {
        let (life, death) = LifeToken::new();
        Arc::new(Self {
            id: ClientId::next(),
            layout_id,
            state: Mutex::new(ProxyState::default()),
            death,
            _life: life,
            ui,
            sink,
            reclaim_tx,
        })
    }

    pub(crate) fn id(&self) -> ClientId {
        self.id
    }

    pub fn layout_id(&self) -> LayoutId {
        self.layout_id
    }

    /// The cached session handle, if a session is open.
    pub fn session(&self) -> Option<Arc<dyn RemoteSession>> {
        self.state.lock().unwrap().session.clone()
    }

    /// Attempt to open a session from the current tracked state.
    ///
    /// On success the handle is cached and its death watched; `false` is
    /// the caller's requeue signal.
    pub(crate) fn open_session(self: &Arc<Self>, service: &Arc<dyn RenderingService>) -> bool {
        let request = {
            let state = self.state.lock().unwrap();
            OpenSessionRequest {
                layout_id: self.layout_id,
                client: self.client_handle(),
                window_token: state.window_token,
                surface: state.surface.clone(),
                width: state.width,
                height: state.height,
            }
        };
        match service.open_session(request) {
            Ok(session) => {
                self.install_session(session);
                true
            }
            Err(err) => {
                debug!("{} session open failed: {}", self.id, err);
                false
            }
        }
    }

    fn client_handle(self: &Arc<Self>) -> ClientHandle {
        let target: Arc<dyn RemoteClient> = self.clone();
        ClientHandle::new(&target, self.death.clone())
    }

    fn install_session(self: &Arc<Self>, session: Arc<dyn RemoteSession>) {
        self.state.lock().unwrap().session = Some(session.clone());

        let weak_session = Arc::downgrade(&session);
        let weak_proxy = Arc::downgrade(self);
        let ui = self.ui.clone();
        session.death_link().link_to_death(move || {
            ui.post(Box::new(move || {
                if let Some(proxy) = weak_proxy.upgrade() {
                    proxy.clear_session_if(&weak_session);
                }
            }));
        });
    }

    /// Drop the cached session, but only if it is still the one whose
    /// death fired; a proxy reopened in the meantime keeps its new
    /// session.
    fn clear_session_if(&self, dead: &Weak<dyn RemoteSession>) {
        let mut state = self.state.lock().unwrap();
        let stale = match (&state.session, dead.upgrade()) {
            (Some(current), Some(dead)) => Arc::ptr_eq(current, &dead),
            _ => false,
        };
        if stale {
            debug!("{} session died", self.id);
            state.session = None;
        }
    }

    // Texture lifecycle: the stub's sole surface listener.

    pub(crate) fn surface_available(&self, surface: SharedSurface) {
        let session = {
            let mut state = self.state.lock().unwrap();
            state.surface = Some(surface.clone());
            state.session.clone()
        };
        if let Some(session) = session {
            if session.set_surface(Some(surface)).is_err() {
                debug!("{} surface notify dropped", self.id);
            }
        }
    }

    pub(crate) fn surface_destroyed(&self) {
        let session = {
            let mut state = self.state.lock().unwrap();
            state.surface = None;
            state.session.clone()
        };
        if let Some(session) = session {
            if session.set_surface(None).is_err() {
                debug!("{} surface release dropped", self.id);
            }
        }
    }

    // View events: forwarded to the open session, silently ignored
    // otherwise (no session yet is not an error).

    pub(crate) fn size_changed(&self, width: u32, height: u32) {
        let session = {
            let mut state = self.state.lock().unwrap();
            state.width = width;
            state.height = height;
            state.session.clone()
        };
        if let Some(session) = session {
            let _ = session.on_size_changed(width, height);
        }
    }

    pub(crate) fn window_attached(&self, token: WindowToken) {
        let session = {
            let mut state = self.state.lock().unwrap();
            state.window_token = Some(token);
            state.session.clone()
        };
        if let Some(session) = session {
            let _ = session.set_window_token(Some(token));
        }
    }

    pub(crate) fn window_detached(&self) {
        let session = {
            let mut state = self.state.lock().unwrap();
            state.window_token = None;
            state.session.clone()
        };
        if let Some(session) = session {
            let _ = session.set_window_token(None);
        }
    }

    pub(crate) fn configuration_changed(&self, configuration: &Configuration) {
        if let Some(session) = self.session() {
            let _ = session.on_configuration_changed(configuration.clone());
        }
    }

    /// Offer a touch event to the open session. Delivery counts as
    /// consumed; a failed call or no session counts as not consumed.
    pub(crate) fn dispatch_touch(&self, event: TouchEvent) -> bool {
        match self.session() {
            Some(session) => session.dispatch_touch_event(event).is_ok(),
            None => false,
        }
    }
}

impl RemoteClient for ClientProxy {
    fn dispatch_unhandled_touch_event(&self, event: TouchEvent) {
        let sink = self.sink.clone();
        self.ui.post(Box::new(move || match sink {
            Some(sink) => sink.dispatch_unhandled_input(event),
            // No fallback input path in this host; the event is dropped.
            None => debug!("unhandled touch dropped"),
        }));
    }
}

impl Drop for ClientProxy {
    fn drop(&mut self) {
        let _ = self.reclaim_tx.send(self.id);
        debug!("{} reclaimed", self.id);
    }
}
