//! Identifiers shared across the embedding protocol.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies the layout a session inflates into its content tree.
///
/// The value 0 is reserved to mean "no remote content": hosts treat such
/// an embedding as an inert placeholder and never open a session for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutId(pub u32);

impl LayoutId {
    /// The reserved "no remote content" identifier.
    pub const NONE: LayoutId = LayoutId(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Whether this is the reserved inert identifier.
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Layout({})", self.0)
    }
}

/// Global session ID counter
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a rendering session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Mint a process-unique session ID.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({})", self.0)
    }
}

/// Global window token counter
static NEXT_WINDOW_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying the host window an overlay anchors to.
///
/// The token carries no meaning beyond identity: it changes when the
/// embedding view moves to a new window, and the overlay re-anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowToken(pub u64);

impl WindowToken {
    /// Mint a process-unique window token.
    pub fn next() -> Self {
        Self(NEXT_WINDOW_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WindowToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowToken({})", self.0)
    }
}
