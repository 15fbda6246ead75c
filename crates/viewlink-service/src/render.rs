//! Per-session render thread.
//!
//! Owns surface lock and unlock so the control thread never blocks on
//! the surface; the paint itself hops back to the control thread because
//! the content tree is not thread-safe.

use crate::control::{ControlMsg, SessionOp};
use crossbeam_channel::{Sender, bounded, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::debug;
use viewlink_proto::SessionId;
use viewlink_surface::SurfaceSlot;

pub(crate) enum RenderMsg {
    Redraw,
    Shutdown,
}

/// Handle held by the session state. The thread is detached; it exits on
/// `Shutdown` or when every sender is gone.
pub(crate) struct RenderHandle {
    tx: Sender<RenderMsg>,
}

impl RenderHandle {
    pub(crate) fn redraw_tx(&self) -> Sender<RenderMsg> {
        self.tx.clone()
    }

    pub(crate) fn shutdown(&self) {
        let _ = self.tx.send(RenderMsg::Shutdown);
    }
}

/// Spawn the render thread for one session.
pub(crate) fn spawn_render_thread(
    id: SessionId,
    slot: Arc<SurfaceSlot>,
    pending: Arc<AtomicBool>,
    control_tx: Sender<ControlMsg>,
) -> RenderHandle {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name(format!("viewlink-render-{}", id.0))
        .spawn(move || {
            debug!("{id} render thread started");
            loop {
                match rx.recv() {
                    Ok(RenderMsg::Redraw) => {
                        // Clear before rendering: an invalidate landing
                        // mid-frame queues exactly one more redraw.
                        pending.store(false, Ordering::SeqCst);
                        render_frame(id, &slot, &control_tx);
                    }
                    Ok(RenderMsg::Shutdown) | Err(_) => break,
                }
            }
            debug!("{id} render thread stopped");
        })
        .expect("Failed to spawn render thread");
    RenderHandle { tx }
}

/// One lock → paint → unlock cycle.
fn render_frame(id: SessionId, slot: &SurfaceSlot, control_tx: &Sender<ControlMsg>) {
    // No surface attached: drawing is legitimately suspended.
    let Some(owner) = slot.current() else { return };
    let Some(canvas) = owner.wait_lock_canvas() else {
        return;
    };

    let (done_tx, done_rx) = bounded(1);
    let handoff = ControlMsg::Session(
        id,
        SessionOp::PaintFrame {
            canvas,
            done: done_tx,
        },
    );
    if control_tx.send(handoff).is_err() {
        // Control thread is gone; the canvas went with the message.
        owner.abandon_lock();
        return;
    }
    match done_rx.recv() {
        Ok(canvas) => owner.unlock_and_post(canvas),
        Err(_) => owner.abandon_lock(),
    }
}
