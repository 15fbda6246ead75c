//! The texture-surface capability.

use crate::Canvas;
use std::sync::Arc;
use thiserror::Error;

/// Surface errors
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The underlying texture was destroyed.
    #[error("surface is no longer valid")]
    Invalid,

    /// A lock/draw/unlock cycle is already in flight.
    #[error("surface is already locked")]
    AlreadyLocked,

    /// The canvas handed back does not belong to this surface.
    #[error("canvas does not belong to this surface")]
    ForeignCanvas,
}

/// A buffer owned by the host that a remote session paints into.
///
/// Implementations may raise on invalid state (a destroyed texture);
/// the draw loop treats such raises as an abandoned frame, never an
/// error.
pub trait Surface: Send + Sync {
    fn is_valid(&self) -> bool;

    fn size(&self) -> (u32, u32);

    /// Lock the surface and hand out a drawing context.
    fn lock_canvas(&self) -> Result<Box<dyn Canvas>, SurfaceError>;

    /// Present a locked canvas and release the lock.
    fn unlock_canvas_and_post(&self, canvas: Box<dyn Canvas>) -> Result<(), SurfaceError>;
}

/// A surface shared by reference across the process boundary.
pub type SharedSurface = Arc<dyn Surface>;
