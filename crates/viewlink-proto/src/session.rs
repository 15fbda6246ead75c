//! Object traits both processes program against.
//!
//! These are the cross-process call surfaces: the host implements
//! [`RemoteClient`], the service implements [`RemoteSession`] and
//! [`RenderingService`]. Handles reference remote objects without
//! keeping them alive, mirroring how a transport would.

use crate::event::{Configuration, TouchEvent};
use crate::id::{LayoutId, WindowToken};
use crate::link::{DeathLink, LinkError};
use std::sync::{Arc, Weak};
use thiserror::Error;
use viewlink_surface::SharedSurface;

/// Host-side callback object a session delivers events back to.
pub trait RemoteClient: Send + Sync {
    /// Touch the remote content did not consume, returned to the host.
    fn dispatch_unhandled_touch_event(&self, event: TouchEvent);
}

/// Reference to a [`RemoteClient`] that does not keep it alive.
#[derive(Clone)]
pub struct ClientHandle {
    target: Weak<dyn RemoteClient>,
    death: Arc<DeathLink>,
}

impl ClientHandle {
    pub fn new(client: &Arc<dyn RemoteClient>, death: Arc<DeathLink>) -> Self {
        Self {
            target: Arc::downgrade(client),
            death,
        }
    }

    /// Deliver an unhandled touch event, if the client is still alive.
    pub fn dispatch_unhandled_touch_event(&self, event: TouchEvent) -> Result<(), LinkError> {
        if self.death.is_dead() {
            return Err(LinkError::DeadEndpoint);
        }
        match self.target.upgrade() {
            Some(client) => {
                client.dispatch_unhandled_touch_event(event);
                Ok(())
            }
            None => Err(LinkError::DeadEndpoint),
        }
    }

    /// Register a recipient for the client's death.
    pub fn link_to_death(&self, recipient: impl FnOnce() + Send + 'static) {
        self.death.link_to_death(recipient);
    }

    pub fn is_alive(&self) -> bool {
        !self.death.is_dead() && self.target.strong_count() > 0
    }
}

/// One embedding's session object inside the rendering service.
///
/// Every operation is a fire-and-forget enqueue onto the session's
/// control context; `Err` means the session is gone, never that the
/// operation itself failed.
pub trait RemoteSession: Send + Sync {
    /// Replace the session's drawing surface wholesale. `None` suspends
    /// drawing until a surface arrives.
    fn set_surface(&self, surface: Option<SharedSurface>) -> Result<(), LinkError>;

    /// The embedding view was resized.
    fn on_size_changed(&self, width: u32, height: u32) -> Result<(), LinkError>;

    /// Re-anchor the overlay: dismiss, and re-show at `token` if one is
    /// supplied.
    fn set_window_token(&self, token: Option<WindowToken>) -> Result<(), LinkError>;

    /// Forward a configuration change down the content tree.
    fn on_configuration_changed(&self, configuration: Configuration) -> Result<(), LinkError>;

    /// Offer a touch event to the remote content.
    ///
    /// A delivered event counts as consumed from the host's point of
    /// view; consumption inside the content tree resolves asynchronously
    /// and unconsumed events come back through
    /// [`RemoteClient::dispatch_unhandled_touch_event`].
    fn dispatch_touch_event(&self, event: TouchEvent) -> Result<(), LinkError>;

    /// Death link the host watches to learn the session is gone.
    fn death_link(&self) -> Arc<DeathLink>;
}

/// Parameters for [`RenderingService::open_session`].
pub struct OpenSessionRequest {
    pub layout_id: LayoutId,
    pub client: ClientHandle,
    pub window_token: Option<WindowToken>,
    pub surface: Option<SharedSurface>,
    pub width: u32,
    pub height: u32,
}

/// Failure outcomes of an open-session call.
///
/// The connection manager alone interprets these; nothing propagates to
/// the embedding view.
#[derive(Debug, Error)]
pub enum OpenSessionError {
    #[error("rendering service is unavailable")]
    ServiceUnavailable,
    #[error("{0} is the reserved inert layout and opens no session")]
    InertLayout(LayoutId),
}

/// The remote entry point: accepts open-session requests.
pub trait RenderingService: Send + Sync {
    fn open_session(
        &self,
        request: OpenSessionRequest,
    ) -> Result<Arc<dyn RemoteSession>, OpenSessionError>;
}
