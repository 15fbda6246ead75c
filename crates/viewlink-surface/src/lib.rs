//! viewlink Surface
//!
//! The shared drawing surface handed across the process boundary: the
//! surface/canvas capability traits, the single-writer [`SurfaceOwner`]
//! around a lock/draw/unlock cycle, the wholesale-replacement
//! [`SurfaceSlot`], and an in-memory surface implementation.

mod canvas;
mod color;
mod mem;
mod owner;
mod surface;

pub use canvas::Canvas;
pub use color::Color;
pub use mem::{MemoryCanvas, MemorySurface};
pub use owner::{SurfaceOwner, SurfaceSlot};
pub use surface::{SharedSurface, Surface, SurfaceError};
