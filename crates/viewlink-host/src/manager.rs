//! Process-wide connection manager.

use crate::client::{ClientId, ClientProxy, UnhandledInputSink};
use crate::connector::{ConnectionEvents, ServiceConnector};
use crate::dispatch::UiDispatcher;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, Weak};
use std::thread;
use tracing::{debug, info};
use viewlink_proto::{LayoutId, RemoteSession, RenderingService};

/// One embedding's connection-side identity: an inert placeholder
/// (layout 0) or a live proxy.
pub enum Client {
    /// No remote content; never opens a session.
    Inert,
    Live(Arc<ClientProxy>),
}

impl Client {
    /// The open session, if any.
    pub fn session(&self) -> Option<Arc<dyn RemoteSession>> {
        match self {
            Client::Inert => None,
            Client::Live(proxy) => proxy.session(),
        }
    }

    pub fn is_inert(&self) -> bool {
        matches!(self, Client::Inert)
    }

    pub(crate) fn proxy(&self) -> Option<&Arc<ClientProxy>> {
        match self {
            Client::Inert => None,
            Client::Live(proxy) => Some(proxy),
        }
    }
}

/// Maintains exactly one connection to the rendering service and
/// guarantees every embedding eventually gets a session once a
/// connection exists.
///
/// Explicitly constructed and dependency-injected: a host builds one per
/// process, owns it for the process lifetime, and hands it to every
/// stub.
pub struct ConnectionManager {
    registry: Mutex<Registry>,
    reclaim_tx: Sender<ClientId>,
    connector: Arc<dyn ServiceConnector>,
    ui: Arc<dyn UiDispatcher>,
    events: OnceLock<Arc<ManagerEvents>>,
}

/// A live proxy is in exactly one of `pending` and `active`. Both sets
/// hold weak references: a stub discarded without notice never pins its
/// proxy here.
#[derive(Default)]
struct Registry {
    service: Option<Arc<dyn RenderingService>>,
    pending: Vec<Weak<ClientProxy>>,
    active: HashMap<ClientId, Weak<ClientProxy>>,
}

impl ConnectionManager {
    /// Build the manager, start the reclamation watcher and bind the
    /// connector.
    pub fn new(connector: Arc<dyn ServiceConnector>, ui: Arc<dyn UiDispatcher>) -> Arc<Self> {
        let (reclaim_tx, reclaim_rx) = unbounded();
        let manager = Arc::new(Self {
            registry: Mutex::new(Registry::default()),
            reclaim_tx,
            connector: connector.clone(),
            ui,
            events: OnceLock::new(),
        });
        spawn_reclaim_watcher(Arc::downgrade(&manager), reclaim_rx);

        let events = Arc::new(ManagerEvents {
            manager: Arc::downgrade(&manager),
        });
        let _ = manager.events.set(events.clone());
        connector.bind(events);
        manager
    }

    /// Obtain the client for one embedding.
    ///
    /// Layout 0 yields an inert placeholder: no session is ever opened
    /// and no remote work is performed.
    pub fn new_client(
        self: &Arc<Self>,
        layout_id: LayoutId,
        sink: Option<Arc<dyn UnhandledInputSink>>,
    ) -> Client {
        if layout_id.is_none() {
            return Client::Inert;
        }
        let proxy = ClientProxy::new(layout_id, self.ui.clone(), sink, self.reclaim_tx.clone());
        let mut registry = self.registry.lock().unwrap();
        match registry.service.clone() {
            Some(service) => Self::open_session_locked(&mut registry, &service, &proxy),
            None => {
                debug!("{} queued, no connection", proxy.id());
                registry.pending.push(Arc::downgrade(&proxy));
            }
        }
        Client::Live(proxy)
    }

    /// Open a session for `proxy`: active on success, pending on failure
    /// (the retry path for the next connect).
    fn open_session_locked(
        registry: &mut Registry,
        service: &Arc<dyn RenderingService>,
        proxy: &Arc<ClientProxy>,
    ) {
        if proxy.open_session(service) {
            registry.active.insert(proxy.id(), Arc::downgrade(proxy));
        } else {
            registry.pending.push(Arc::downgrade(proxy));
        }
    }

    fn on_connected(&self, service: Arc<dyn RenderingService>) {
        info!("Rendering service connected");
        let mut registry = self.registry.lock().unwrap();

        let pending = std::mem::take(&mut registry.pending);
        for weak in pending {
            if let Some(proxy) = weak.upgrade() {
                Self::open_session_locked(&mut registry, &service, &proxy);
            }
        }

        // A reconnect re-establishes the sessions lost with the previous
        // connection, for every embedding still reachable.
        let active: Vec<(ClientId, Weak<ClientProxy>)> = registry
            .active
            .iter()
            .map(|(id, weak)| (*id, weak.clone()))
            .collect();
        for (id, weak) in active {
            registry.active.remove(&id);
            if let Some(proxy) = weak.upgrade() {
                Self::open_session_locked(&mut registry, &service, &proxy);
            }
        }

        registry.service = Some(service);
    }

    fn on_disconnected(&self) {
        info!("Rendering service disconnected, rebinding");
        {
            let mut registry = self.registry.lock().unwrap();
            registry.service = None;
            // Active entries persist so the next connect reopens them.
        }
        self.rebind();
    }

    fn rebind(&self) {
        if let Some(events) = self.events.get() {
            self.connector.bind(events.clone());
        }
    }

    /// Watcher path: a proxy was dropped; release its tracking entry.
    fn reclaim(&self, id: ClientId) {
        let mut registry = self.registry.lock().unwrap();
        registry.active.remove(&id);
        registry.pending.retain(|weak| weak.upgrade().is_some());
        debug!("{} removed from tracking", id);
    }

    // Diagnostics.

    pub fn is_connected(&self) -> bool {
        self.registry.lock().unwrap().service.is_some()
    }

    /// Embeddings waiting for a connection (or an open retry).
    pub fn pending_clients(&self) -> usize {
        self.registry
            .lock()
            .unwrap()
            .pending
            .iter()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    /// Embeddings with an open session and a reachable proxy.
    pub fn active_sessions(&self) -> usize {
        self.registry
            .lock()
            .unwrap()
            .active
            .values()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }
}

struct ManagerEvents {
    manager: Weak<ConnectionManager>,
}

impl ConnectionEvents for ManagerEvents {
    fn on_connected(&self, service: Arc<dyn RenderingService>) {
        if let Some(manager) = self.manager.upgrade() {
            manager.on_connected(service);
        }
    }

    fn on_disconnected(&self) {
        if let Some(manager) = self.manager.upgrade() {
            manager.on_disconnected();
        }
    }
}

/// The reclamation watcher drains the queue fed by dropped proxies and
/// releases their tracking entries under the registry lock.
fn spawn_reclaim_watcher(manager: Weak<ConnectionManager>, rx: Receiver<ClientId>) {
    thread::Builder::new()
        .name("viewlink-reclaim".to_string())
        .spawn(move || {
            debug!("reclamation watcher started");
            while let Ok(id) = rx.recv() {
                match manager.upgrade() {
                    Some(manager) => manager.reclaim(id),
                    None => break,
                }
            }
            debug!("reclamation watcher stopped");
        })
        .expect("Failed to spawn reclamation watcher thread");
}
