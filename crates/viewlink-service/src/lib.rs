//! viewlink Service
//!
//! The remote half of the embedding protocol: accepts open-session
//! requests, inflates content behind an overlay window, and drives the
//! shared-surface draw loop for each embedding.
//!
//! Three execution contexts, mirroring the protocol's concurrency model:
//! - a single control thread (UI-affine: all control operations and
//!   view-tree mutation),
//! - one render thread per session (surface lock/unlock only),
//! - a small background pool (best-effort callback delivery to clients).

mod background;
mod control;
mod inflate;
mod render;
mod service;
mod session;
#[cfg(test)]
mod testutil;
mod view;
mod window;

pub use inflate::{InflateError, LayoutInflater};
pub use service::{RenderService, ServiceConfig};
pub use view::{HostContentView, Invalidator, View};
pub use window::{OverlayWindow, WindowBackend};
