//! Overlay window capability.

use viewlink_proto::WindowToken;

/// A borderless platform window used purely to obtain a compositing path
/// for the shared surface, never for independent visibility.
pub trait OverlayWindow: Send {
    /// Size applied when the window is next shown.
    fn set_size(&mut self, width: u32, height: u32);

    /// Resize while shown.
    fn update_size(&mut self, width: u32, height: u32);

    fn set_clipping_enabled(&mut self, enabled: bool);

    /// Show anchored to a host window token. Where the backend positions
    /// the window is its own affair; only the drawing surface matters.
    fn show_at(&mut self, token: WindowToken);

    fn dismiss(&mut self);

    fn is_showing(&self) -> bool;
}

/// Creates overlay windows for sessions.
pub trait WindowBackend: Send + Sync {
    fn create_window(&self) -> Box<dyn OverlayWindow>;
}
