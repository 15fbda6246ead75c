//! Service connection seam.

use std::sync::{Arc, Mutex};
use tracing::debug;
use viewlink_proto::RenderingService;

/// Callbacks the connection manager registers with its connector.
pub trait ConnectionEvents: Send + Sync {
    fn on_connected(&self, service: Arc<dyn RenderingService>);
    fn on_disconnected(&self);
}

/// Binds the process to a rendering service.
///
/// `bind` may be called again after a disconnect; implementations
/// deliver `on_connected` whenever a service is (or becomes) reachable.
pub trait ServiceConnector: Send + Sync {
    fn bind(&self, events: Arc<dyn ConnectionEvents>);
}

/// In-process connector: the "remote" service lives in this process.
///
/// `attach` and `drop_connection` drive connect/disconnect, which makes
/// this the connector for single-process hosts and for tests.
pub struct LocalConnector {
    state: Mutex<LocalState>,
}

#[derive(Default)]
struct LocalState {
    service: Option<Arc<dyn RenderingService>>,
    events: Option<Arc<dyn ConnectionEvents>>,
}

impl LocalConnector {
    pub fn new(service: Arc<dyn RenderingService>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LocalState {
                service: Some(service),
                events: None,
            }),
        })
    }

    /// A connector with no service yet; embeddings queue until `attach`.
    pub fn unbound() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LocalState::default()),
        })
    }

    /// Make `service` reachable and connect any bound manager.
    pub fn attach(&self, service: Arc<dyn RenderingService>) {
        let events = {
            let mut state = self.state.lock().unwrap();
            state.service = Some(service.clone());
            state.events.clone()
        };
        if let Some(events) = events {
            events.on_connected(service);
        }
    }

    /// Drop the service connection.
    pub fn drop_connection(&self) {
        let events = {
            let mut state = self.state.lock().unwrap();
            state.service = None;
            state.events.clone()
        };
        if let Some(events) = events {
            events.on_disconnected();
        }
    }
}

impl ServiceConnector for LocalConnector {
    fn bind(&self, events: Arc<dyn ConnectionEvents>) {
        let service = {
            let mut state = self.state.lock().unwrap();
            state.events = Some(events.clone());
            state.service.clone()
        };
        match service {
            Some(service) => {
                debug!("local connector bound, service reachable");
                events.on_connected(service);
            }
            None => debug!("local connector bound, waiting for service"),
        }
    }
}
