//! viewlink Protocol
//!
//! The contract between an embedding host and the remote rendering
//! service: identifiers, input events, configuration snapshots,
//! death-notification links, and the object traits both sides talk
//! through.

mod event;
mod id;
mod link;
mod session;

pub use event::{Configuration, Orientation, TouchAction, TouchEvent};
pub use id::{LayoutId, SessionId, WindowToken};
pub use link::{DeathLink, LifeToken, LinkError};
pub use session::{
    ClientHandle, OpenSessionError, OpenSessionRequest, RemoteClient, RemoteSession,
    RenderingService,
};
