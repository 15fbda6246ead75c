//! Message types for the control thread.
//!
//! Everything that mutates session state arrives here and is processed
//! in submission order on the single control thread.

use crossbeam_channel::Sender;
use std::sync::Arc;
use viewlink_proto::{
    Configuration, OpenSessionRequest, RemoteSession, SessionId, TouchEvent, WindowToken,
};
use viewlink_surface::{Canvas, SharedSurface};

/// Messages processed by the control thread.
pub(crate) enum ControlMsg {
    /// Open-session handshake; the handle goes back on `reply`.
    OpenSession {
        request: OpenSessionRequest,
        reply: Sender<Arc<dyn RemoteSession>>,
    },
    /// A control operation against one session.
    Session(SessionId, SessionOp),
    /// Tear down every session and stop the control thread.
    Shutdown,
}

/// Control operations against a single session.
pub(crate) enum SessionOp {
    /// Replace the drawing surface wholesale; `None` suspends drawing.
    SetSurface(Option<SharedSurface>),
    SizeChanged(u32, u32),
    SetWindowToken(Option<WindowToken>),
    ConfigurationChanged(Configuration),
    DispatchTouch(TouchEvent),
    /// Render-thread handoff: paint the content tree into the locked
    /// canvas and send it back.
    PaintFrame {
        canvas: Box<dyn Canvas>,
        done: Sender<Box<dyn Canvas>>,
    },
    /// The client's death link fired.
    ClientDied,
}
