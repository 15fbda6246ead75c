//! Service entry point and the control thread.

use crate::background::Background;
use crate::control::{ControlMsg, SessionOp};
use crate::inflate::LayoutInflater;
use crate::session::SessionState;
use crate::window::WindowBackend;
use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info};
use viewlink_proto::{
    OpenSessionError, OpenSessionRequest, RemoteSession, RenderingService, SessionId,
};

/// Tunables for a rendering service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Workers delivering best-effort callbacks to clients.
    pub background_workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            background_workers: 2,
        }
    }
}

/// The remote entry point: opens one session per embedding and hosts
/// their overlay windows and draw loops.
pub struct RenderService {
    control_tx: Sender<ControlMsg>,
    control: Option<JoinHandle<()>>,
}

impl RenderService {
    pub fn new(inflater: Arc<dyn LayoutInflater>, windows: Arc<dyn WindowBackend>) -> Result<Self> {
        Self::with_config(inflater, windows, ServiceConfig::default())
    }

    pub fn with_config(
        inflater: Arc<dyn LayoutInflater>,
        windows: Arc<dyn WindowBackend>,
        config: ServiceConfig,
    ) -> Result<Self> {
        info!("Starting rendering service");
        let (control_tx, control_rx) = unbounded();
        let background = Background::spawn_pool(config.background_workers.max(1));
        let loop_tx = control_tx.clone();
        let control = thread::Builder::new()
            .name("viewlink-control".to_string())
            .spawn(move || {
                let mut sessions = Sessions {
                    inflater,
                    windows,
                    background,
                    control_tx: loop_tx,
                    map: HashMap::new(),
                };
                sessions.run(control_rx);
            })
            .context("failed to spawn control thread")?;
        Ok(Self {
            control_tx,
            control: Some(control),
        })
    }
}

impl RenderingService for RenderService {
    fn open_session(
        &self,
        request: OpenSessionRequest,
    ) -> Result<Arc<dyn RemoteSession>, OpenSessionError> {
        if request.layout_id.is_none() {
            return Err(OpenSessionError::InertLayout(request.layout_id));
        }
        let (reply_tx, reply_rx) = bounded(1);
        self.control_tx
            .send(ControlMsg::OpenSession {
                request,
                reply: reply_tx,
            })
            .map_err(|_| OpenSessionError::ServiceUnavailable)?;
        reply_rx
            .recv()
            .map_err(|_| OpenSessionError::ServiceUnavailable)
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        info!("Shutting down rendering service");
        let _ = self.control_tx.send(ControlMsg::Shutdown);
        if let Some(control) = self.control.take() {
            let _ = control.join();
        }
    }
}

/// Control-thread state: every live session plus the capabilities used
/// to build new ones.
struct Sessions {
    inflater: Arc<dyn LayoutInflater>,
    windows: Arc<dyn WindowBackend>,
    background: Background,
    control_tx: Sender<ControlMsg>,
    map: HashMap<SessionId, SessionState>,
}

impl Sessions {
    fn run(&mut self, rx: Receiver<ControlMsg>) {
        debug!("control thread started");
        while let Ok(msg) = rx.recv() {
            match msg {
                ControlMsg::OpenSession { request, reply } => {
                    let _ = reply.send(self.open(request));
                }
                ControlMsg::Session(id, SessionOp::ClientDied) => {
                    if let Some(mut state) = self.map.remove(&id) {
                        debug!("{id} client died");
                        state.destroy();
                    }
                }
                ControlMsg::Session(id, op) => match self.map.get_mut(&id) {
                    Some(state) => state.handle(op),
                    None => {
                        // The render thread still holds the surface lock
                        // for a frame whose session is gone.
                        if let SessionOp::PaintFrame { canvas, done } = op {
                            let _ = done.send(canvas);
                        }
                    }
                },
                ControlMsg::Shutdown => break,
            }
        }
        for (_, mut state) in self.map.drain() {
            state.destroy();
        }
        debug!("control thread stopped");
    }

    fn open(&mut self, request: OpenSessionRequest) -> Arc<dyn RemoteSession> {
        let id = SessionId::next();
        let window = self.windows.create_window();
        let (state, handle) = SessionState::open(
            id,
            request.layout_id,
            request.client,
            request.window_token,
            request.surface,
            request.width,
            request.height,
            &self.inflater,
            window,
            self.background.clone(),
            &self.control_tx,
        );
        info!("Opened {} for {}", id, request.layout_id);
        self.map.insert(id, state);
        handle
    }
}
