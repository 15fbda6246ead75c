//! Death-notification links between IPC endpoints.
//!
//! A [`LifeToken`] is held by the object's owner; dropping it fires every
//! recipient registered on the paired [`DeathLink`] exactly once. The
//! owner's destructor is the liveness signal, replacing runtime-managed
//! death callbacks with an explicit resource-lifetime contract.

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

type Recipient = Box<dyn FnOnce() + Send>;

/// Errors from calls on a handle whose remote endpoint is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("remote endpoint is dead")]
    DeadEndpoint,
}

/// Shared death flag for one remote object.
pub struct DeathLink {
    state: Mutex<LinkState>,
}

#[derive(Default)]
struct LinkState {
    dead: bool,
    recipients: Vec<Recipient>,
}

impl DeathLink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LinkState::default()),
        })
    }

    /// Whether the owning endpoint is gone.
    pub fn is_dead(&self) -> bool {
        self.state.lock().unwrap().dead
    }

    /// Register a recipient to run when the endpoint dies.
    ///
    /// Fires immediately on the calling thread if the endpoint is
    /// already dead.
    pub fn link_to_death(&self, recipient: impl FnOnce() + Send + 'static) {
        let fire_now = {
            let mut state = self.state.lock().unwrap();
            if state.dead {
                Some(Box::new(recipient) as Recipient)
            } else {
                state.recipients.push(Box::new(recipient));
                None
            }
        };
        if let Some(recipient) = fire_now {
            recipient();
        }
    }

    /// Mark the endpoint dead and fire every recipient. Idempotent.
    pub fn notify(&self) {
        let recipients = {
            let mut state = self.state.lock().unwrap();
            if state.dead {
                return;
            }
            state.dead = true;
            std::mem::take(&mut state.recipients)
        };
        if !recipients.is_empty() {
            debug!("death link fired, {} recipient(s)", recipients.len());
        }
        for recipient in recipients {
            recipient();
        }
    }
}

/// Owner-side half of a death link; dropping it notifies the link.
pub struct LifeToken {
    link: Arc<DeathLink>,
}

impl LifeToken {
    /// Create a fresh token/link pair.
    pub fn new() -> (LifeToken, Arc<DeathLink>) {
        let link = DeathLink::new();
        (LifeToken { link: link.clone() }, link)
    }
}

impl Drop for LifeToken {
    fn drop(&mut self) {
        self.link.notify();
    }
}
