//! Per-embedding session: overlay window, content container, draw loop.

use crate::background::Background;
use crate::control::{ControlMsg, SessionOp};
use crate::inflate::LayoutInflater;
use crate::render::{RenderHandle, RenderMsg, spawn_render_thread};
use crate::view::{HostContentView, Invalidator};
use crate::window::OverlayWindow;
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};
use viewlink_proto::{
    ClientHandle, DeathLink, LayoutId, LifeToken, LinkError, RemoteSession, SessionId, TouchEvent,
    WindowToken,
};
use viewlink_surface::{Canvas, SharedSurface, SurfaceOwner, SurfaceSlot};

/// Session lifecycle. `Destroyed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionPhase {
    Constructing,
    Inflating,
    Ready,
    Destroyed,
}

/// One embedding's session, owned by the control thread.
pub(crate) struct SessionState {
    id: SessionId,
    phase: SessionPhase,
    client: ClientHandle,
    window: Box<dyn OverlayWindow>,
    content: HostContentView,
    slot: Arc<SurfaceSlot>,
    render: RenderHandle,
    redraw_pending: Arc<AtomicBool>,
    background: Background,
    width: u32,
    height: u32,
    /// Dropping the state notifies the host that the session is gone.
    _life: LifeToken,
}

impl SessionState {
    /// Construct a session and run its initialization, on the control
    /// thread. Returns the state and the handle handed back to the host.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn open(
        id: SessionId,
        layout_id: LayoutId,
        client: ClientHandle,
        token: Option<WindowToken>,
        surface: Option<SharedSurface>,
        width: u32,
        height: u32,
        inflater: &Arc<dyn LayoutInflater>,
        window: Box<dyn OverlayWindow>,
        background: Background,
        control_tx: &Sender<ControlMsg>,
    ) -> (SessionState, Arc<dyn RemoteSession>) {
        debug!("{id} constructing for {layout_id}");

        // The client callback is the single held reference; its death
        // tears the session down.
        {
            let control_tx = control_tx.clone();
            client.link_to_death(move || {
                let _ = control_tx.send(ControlMsg::Session(id, SessionOp::ClientDied));
            });
        }

        let (life, death) = LifeToken::new();
        let slot = Arc::new(SurfaceSlot::new());
        let redraw_pending = Arc::new(AtomicBool::new(false));
        let render = spawn_render_thread(id, slot.clone(), redraw_pending.clone(), control_tx.clone());

        let mut state = SessionState {
            id,
            phase: SessionPhase::Constructing,
            client,
            window,
            content: HostContentView::new(),
            slot,
            render,
            redraw_pending,
            background,
            width,
            height,
            _life: life,
        };
        state.inflate(layout_id, inflater, token, surface);

        let handle: Arc<dyn RemoteSession> = Arc::new(SessionProxy {
            id,
            tx: control_tx.clone(),
            death,
        });
        (state, handle)
    }

    /// The Inflating phase: window setup, observers, layout inflation,
    /// initial show.
    fn inflate(
        &mut self,
        layout_id: LayoutId,
        inflater: &Arc<dyn LayoutInflater>,
        token: Option<WindowToken>,
        surface: Option<SharedSurface>,
    ) {
        self.phase = SessionPhase::Inflating;
        self.window.set_size(self.width, self.height);
        self.apply_surface(surface);
        self.window.set_clipping_enabled(false);

        let invalidator = self.redraw_invalidator();
        self.content.set_draw_observer(invalidator);
        self.content.set_bounds(self.width, self.height);

        let start = Instant::now();
        match inflater.inflate(layout_id) {
            Ok(view) => {
                self.content.set_content(view);
                debug!("{} inflated {} in {:?}", self.id, layout_id, start.elapsed());
            }
            Err(err) => warn!("{} failed to inflate {}: {}", self.id, layout_id, err),
        }

        if let Some(token) = token {
            self.show_window(token);
        }
        self.phase = SessionPhase::Ready;
        info!("{} ready ({}x{})", self.id, self.width, self.height);
    }

    /// Redraw requests coalesce: only the first invalidate after a frame
    /// starts wakes the render thread.
    fn redraw_invalidator(&self) -> Invalidator {
        let pending = self.redraw_pending.clone();
        let tx = self.render.redraw_tx();
        Invalidator::new(move || {
            if !pending.swap(true, Ordering::SeqCst) {
                let _ = tx.send(RenderMsg::Redraw);
            }
        })
    }

    fn show_window(&mut self, token: WindowToken) {
        self.window.show_at(token);
        self.content.invalidate();
        debug!("{} overlay shown at {}", self.id, token);
    }

    fn apply_surface(&mut self, surface: Option<SharedSurface>) {
        let owner = surface.map(|surface| Arc::new(SurfaceOwner::new(surface)));
        self.slot.store(owner);
        self.content.invalidate();
    }

    /// Process one control operation, in submission order.
    pub(crate) fn handle(&mut self, op: SessionOp) {
        if self.phase == SessionPhase::Destroyed {
            // Late operations against a dead session are dropped, but a
            // paint handoff must still return its canvas.
            if let SessionOp::PaintFrame { canvas, done } = op {
                let _ = done.send(canvas);
            }
            return;
        }
        match op {
            SessionOp::SetSurface(surface) => {
                debug!(
                    "{} surface {}",
                    self.id,
                    if surface.is_some() { "attached" } else { "detached" }
                );
                self.apply_surface(surface);
            }
            SessionOp::SizeChanged(width, height) => {
                self.width = width;
                self.height = height;
                self.content.set_bounds(width, height);
                if self.window.is_showing() {
                    self.window.update_size(width, height);
                } else {
                    self.window.set_size(width, height);
                }
            }
            SessionOp::SetWindowToken(token) => {
                if self.window.is_showing() {
                    self.window.dismiss();
                    debug!("{} overlay dismissed", self.id);
                }
                if let Some(token) = token {
                    self.show_window(token);
                }
            }
            SessionOp::ConfigurationChanged(configuration) => {
                self.content.dispatch_configuration_changed(&configuration);
            }
            SessionOp::DispatchTouch(event) => self.dispatch_touch(event),
            SessionOp::PaintFrame { canvas, done } => self.paint_frame(canvas, done),
            SessionOp::ClientDied => {}
        }
    }

    /// Offer the event to the content tree; unconsumed events go back to
    /// the client off the control thread.
    fn dispatch_touch(&mut self, event: TouchEvent) {
        if self.content.dispatch_touch_event(&event) {
            return;
        }
        let client = self.client.clone();
        let id = self.id;
        self.background.run(move || {
            if let Err(err) = client.dispatch_unhandled_touch_event(event) {
                debug!("{id} dropped unhandled touch: {err}");
            }
        });
    }

    /// The UI-thread half of the draw loop: paint the content tree into
    /// the render thread's locked canvas and hand it back.
    fn paint_frame(&mut self, mut canvas: Box<dyn Canvas>, done: Sender<Box<dyn Canvas>>) {
        if self.window.is_showing() && self.content.has_content() {
            let start = Instant::now();
            self.content.draw_content(canvas.as_mut());
            debug!("{} painted frame in {:?}", self.id, start.elapsed());
        }
        // The canvas always goes back; the render thread holds the lock.
        let _ = done.send(canvas);
    }

    /// Enter the terminal phase: dismiss the overlay, suspend drawing,
    /// stop the render thread.
    pub(crate) fn destroy(&mut self) {
        if self.phase == SessionPhase::Destroyed {
            return;
        }
        self.phase = SessionPhase::Destroyed;
        if self.window.is_showing() {
            self.window.dismiss();
        }
        self.slot.take();
        self.render.shutdown();
        info!("{} destroyed", self.id);
    }
}

/// Host-held session handle; every operation is a fire-and-forget
/// enqueue onto the control thread.
struct SessionProxy {
    id: SessionId,
    tx: Sender<ControlMsg>,
    death: Arc<DeathLink>,
}

impl SessionProxy {
    fn post(&self, op: SessionOp) -> Result<(), LinkError> {
        if self.death.is_dead() {
            return Err(LinkError::DeadEndpoint);
        }
        self.tx
            .send(ControlMsg::Session(self.id, op))
            .map_err(|_| LinkError::DeadEndpoint)
    }
}

impl RemoteSession for SessionProxy {
    fn set_surface(&self, surface: Option<SharedSurface>) -> Result<(), LinkError> {
        self.post(SessionOp::SetSurface(surface))
    }

    fn on_size_changed(&self, width: u32, height: u32) -> Result<(), LinkError> {
        self.post(SessionOp::SizeChanged(width, height))
    }

    fn set_window_token(&self, token: Option<WindowToken>) -> Result<(), LinkError> {
        self.post(SessionOp::SetWindowToken(token))
    }

    fn on_configuration_changed(
        &self,
        configuration: viewlink_proto::Configuration,
    ) -> Result<(), LinkError> {
        self.post(SessionOp::ConfigurationChanged(configuration))
    }

    fn dispatch_touch_event(&self, event: TouchEvent) -> Result<(), LinkError> {
        self.post(SessionOp::DispatchTouch(event))
    }

    fn death_link(&self) -> Arc<DeathLink> {
        self.death.clone()
    }
}
