//! The visible placeholder that presents remotely rendered content.

use crate::client::UnhandledInputSink;
use crate::manager::{Client, ConnectionManager};
use std::sync::Arc;
use viewlink_proto::{Configuration, LayoutId, TouchEvent, WindowToken};
use viewlink_surface::SharedSurface;

/// Touch handler for the stub's own (host-side) view hierarchy.
pub type TouchHandler = Box<dyn FnMut(&TouchEvent) -> bool + Send>;

/// A texture-backed placeholder in the host UI tree.
///
/// Its content is inflated, laid out and painted by a remote session;
/// the stub forwards view events in and touch events out. Texture
/// availability always routes through the proxy — there is no listener
/// to replace.
pub struct ViewStub {
    client: Client,
    on_touch: Option<TouchHandler>,
}

impl ViewStub {
    /// Build a stub for `layout_id`. Layout 0 yields an inert
    /// placeholder that performs no remote work.
    pub fn new(manager: &Arc<ConnectionManager>, layout_id: LayoutId) -> Self {
        Self {
            client: manager.new_client(layout_id, None),
            on_touch: None,
        }
    }

    /// Like [`ViewStub::new`], with a fallback sink for input neither
    /// this view nor the remote content consumes.
    pub fn with_unhandled_input_sink(
        manager: &Arc<ConnectionManager>,
        layout_id: LayoutId,
        sink: Arc<dyn UnhandledInputSink>,
    ) -> Self {
        Self {
            client: manager.new_client(layout_id, Some(sink)),
            on_touch: None,
        }
    }

    pub fn is_inert(&self) -> bool {
        self.client.is_inert()
    }

    /// Whether a session is currently open for this embedding.
    pub fn has_session(&self) -> bool {
        self.client.session().is_some()
    }

    /// Install a handler that sees touch before the remote content does.
    pub fn set_on_touch(&mut self, handler: impl FnMut(&TouchEvent) -> bool + Send + 'static) {
        self.on_touch = Some(Box::new(handler));
    }

    /// The host texture became available.
    pub fn surface_available(&self, surface: SharedSurface) {
        if let Some(proxy) = self.client.proxy() {
            proxy.surface_available(surface);
        }
    }

    /// The host texture was destroyed; drawing suspends until a new one
    /// arrives.
    pub fn surface_destroyed(&self) {
        if let Some(proxy) = self.client.proxy() {
            proxy.surface_destroyed();
        }
    }

    pub fn on_size_changed(&self, width: u32, height: u32) {
        if let Some(proxy) = self.client.proxy() {
            proxy.size_changed(width, height);
        }
    }

    /// The stub joined a window; the overlay re-anchors to its token.
    pub fn attached_to_window(&self, token: WindowToken) {
        if let Some(proxy) = self.client.proxy() {
            proxy.window_attached(token);
        }
    }

    pub fn detached_from_window(&self) {
        if let Some(proxy) = self.client.proxy() {
            proxy.window_detached();
        }
    }

    pub fn on_configuration_changed(&self, configuration: &Configuration) {
        if let Some(proxy) = self.client.proxy() {
            proxy.configuration_changed(configuration);
        }
    }

    /// Offer a touch event: the stub's own hierarchy first, then the
    /// open session. No session, or a failed remote call, is simply "not
    /// consumed" — never an error.
    pub fn dispatch_touch_event(&mut self, event: TouchEvent) -> bool {
        if let Some(handler) = &mut self.on_touch {
            if handler(&event) {
                return true;
            }
        }
        match self.client.proxy() {
            Some(proxy) => proxy.dispatch_touch(event),
            None => false,
        }
    }
}
