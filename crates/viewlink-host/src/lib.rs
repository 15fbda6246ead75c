//! viewlink Host
//!
//! The host half of the embedding protocol: the placeholder view
//! ([`ViewStub`]), its client proxy, and the process-wide
//! [`ConnectionManager`] that opens and reopens sessions against the
//! rendering service.

mod client;
mod connector;
mod dispatch;
mod manager;
mod stub;
#[cfg(test)]
mod testsupport;

pub use client::{ClientId, ClientProxy, UnhandledInputSink};
pub use connector::{ConnectionEvents, LocalConnector, ServiceConnector};
pub use dispatch::{DirectDispatcher, QueueDispatcher, UiDispatcher, UiTask};
pub use manager::{Client, ConnectionManager};
pub use stub::{TouchHandler, ViewStub};
