//! Content views and the single-child host container.

use std::sync::Arc;
use viewlink_proto::{Configuration, TouchEvent};
use viewlink_surface::Canvas;

/// Redraw-request handle handed to attached content.
///
/// Cloneable and callable from any thread. Requests coalesce: a burst of
/// invalidates before a frame completes produces a single redraw.
#[derive(Clone)]
pub struct Invalidator {
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl Invalidator {
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            notify: Arc::new(notify),
        }
    }

    pub fn invalidate(&self) {
        (self.notify)();
    }
}

/// A node of remotely inflated content.
///
/// Deliberately minimal: producing real view trees is the layout
/// inflater's business; the protocol only needs to measure, lay out,
/// paint, and route events.
pub trait View: Send {
    fn measure(&mut self, width: u32, height: u32) -> (u32, u32) {
        (width, height)
    }

    fn layout(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    fn draw(&mut self, canvas: &mut dyn Canvas);

    /// Returns true when the view consumed the event.
    fn dispatch_touch_event(&mut self, event: &TouchEvent) -> bool {
        let _ = event;
        false
    }

    fn on_configuration_changed(&mut self, configuration: &Configuration) {
        let _ = configuration;
    }

    /// Called once when the view joins a session's content container.
    fn on_attached(&mut self, invalidator: Invalidator) {
        let _ = invalidator;
    }
}

/// Layout container hosting the inflated remote content.
///
/// Forwards measurement, layout, drawing and touch to its single child;
/// the container itself paints nothing.
pub struct HostContentView {
    child: Option<Box<dyn View>>,
    observer: Option<Invalidator>,
    width: u32,
    height: u32,
}

impl HostContentView {
    pub fn new() -> Self {
        Self {
            child: None,
            observer: None,
            width: 0,
            height: 0,
        }
    }

    /// Install the draw/scroll observer driving the session's draw loop.
    pub fn set_draw_observer(&mut self, observer: Invalidator) {
        self.observer = Some(observer);
    }

    /// Install the inflated content: attached to the redraw path, then
    /// measured and laid out to the current bounds.
    pub fn set_content(&mut self, mut child: Box<dyn View>) {
        if let Some(observer) = &self.observer {
            child.on_attached(observer.clone());
        }
        self.child = Some(child);
        self.relayout();
        self.invalidate();
    }

    pub fn has_content(&self) -> bool {
        self.child.is_some()
    }

    pub fn set_bounds(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.relayout();
    }

    fn relayout(&mut self) {
        if let Some(child) = &mut self.child {
            let (width, height) = child.measure(self.width, self.height);
            child.layout(width, height);
        }
    }

    /// Paint the child only; the container draws nothing of its own.
    pub fn draw_content(&mut self, canvas: &mut dyn Canvas) {
        if let Some(child) = &mut self.child {
            child.draw(canvas);
        }
    }

    pub fn dispatch_touch_event(&mut self, event: &TouchEvent) -> bool {
        match &mut self.child {
            Some(child) => child.dispatch_touch_event(event),
            None => false,
        }
    }

    pub fn dispatch_configuration_changed(&mut self, configuration: &Configuration) {
        if let Some(child) = &mut self.child {
            child.on_configuration_changed(configuration);
        }
    }

    /// Request a redraw.
    pub fn invalidate(&self) {
        if let Some(observer) = &self.observer {
            observer.invalidate();
        }
    }

    /// A scroll position changed somewhere in the tree; redraw.
    pub fn on_scroll_changed(&self) {
        self.invalidate();
    }
}

impl Default for HostContentView {
    fn default() -> Self {
        Self::new()
    }
}
