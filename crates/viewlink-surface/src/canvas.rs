//! Drawing context handed out while a surface is locked.

use crate::Color;
use std::any::Any;

/// A drawing context for one frame.
///
/// Only the primitives the embedding protocol needs: content trees paint
/// with these, and surface implementations reclaim their concrete canvas
/// through `as_any` at present time.
pub trait Canvas: Send {
    /// Canvas dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Fill the whole canvas.
    fn clear(&mut self, color: Color);

    /// Fill a pixel rectangle, clipped to the canvas bounds.
    fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Color);

    fn as_any(&self) -> &dyn Any;
}
