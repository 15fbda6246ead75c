//! Test support: a real in-process rendering service with observable
//! content and a countable open-session path.

use crate::client::UnhandledInputSink;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use viewlink_proto::{
    LayoutId, OpenSessionError, OpenSessionRequest, RemoteSession, RenderingService, TouchEvent,
    WindowToken,
};
use viewlink_service::{
    InflateError, LayoutInflater, OverlayWindow, RenderService, View, WindowBackend,
};
use viewlink_surface::{Canvas, Color};

/// Route test logs through tracing; `RUST_LOG` controls verbosity.
pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Poll `condition` until it holds or the deadline passes.
pub(crate) fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}

/// Shared handles into the content the test service inflates.
#[derive(Clone, Default)]
pub(crate) struct ContentProbe {
    pub(crate) draws: Arc<AtomicU32>,
    pub(crate) touches: Arc<Mutex<Vec<TouchEvent>>>,
    pub(crate) consume_touch: Arc<AtomicBool>,
}

struct ProbeView {
    probe: ContentProbe,
}

impl View for ProbeView {
    fn draw(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::from_hex(0x336699));
        self.probe.draws.fetch_add(1, Ordering::SeqCst);
    }

    fn dispatch_touch_event(&mut self, event: &TouchEvent) -> bool {
        self.probe.touches.lock().unwrap().push(event.clone());
        self.probe.consume_touch.load(Ordering::SeqCst)
    }
}

struct SimpleWindow {
    showing: bool,
}

impl OverlayWindow for SimpleWindow {
    fn set_size(&mut self, _width: u32, _height: u32) {}

    fn update_size(&mut self, _width: u32, _height: u32) {}

    fn set_clipping_enabled(&mut self, _enabled: bool) {}

    fn show_at(&mut self, _token: WindowToken) {
        self.showing = true;
    }

    fn dismiss(&mut self) {
        self.showing = false;
    }

    fn is_showing(&self) -> bool {
        self.showing
    }
}

struct SimpleBackend;

impl WindowBackend for SimpleBackend {
    fn create_window(&self) -> Box<dyn OverlayWindow> {
        Box::new(SimpleWindow { showing: false })
    }
}

/// Wraps a real service, counting open-session calls and optionally
/// failing the next few. `shutdown` drops the inner service outright,
/// simulating the remote process dying.
pub(crate) struct CountingService {
    inner: Mutex<Option<RenderService>>,
    pub(crate) opens: AtomicU32,
    pub(crate) fail_next: AtomicU32,
}

impl CountingService {
    pub(crate) fn new(service: RenderService) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Some(service)),
            opens: AtomicU32::new(0),
            fail_next: AtomicU32::new(0),
        })
    }

    /// Drop the inner service; every open session dies with it.
    pub(crate) fn shutdown(&self) {
        self.inner.lock().unwrap().take();
    }
}

impl RenderingService for CountingService {
    fn open_session(
        &self,
        request: OpenSessionRequest,
    ) -> Result<Arc<dyn RemoteSession>, OpenSessionError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(OpenSessionError::ServiceUnavailable);
        }
        match self.inner.lock().unwrap().as_ref() {
            Some(service) => service.open_session(request),
            None => Err(OpenSessionError::ServiceUnavailable),
        }
    }
}

/// A real service whose every layout inflates a probed view.
pub(crate) fn service_with_probe(probe: ContentProbe) -> Arc<CountingService> {
    init_logging();
    let inflater: Arc<dyn LayoutInflater> = Arc::new(
        move |_layout_id: LayoutId| -> Result<Box<dyn View>, InflateError> {
            Ok(Box::new(ProbeView {
                probe: probe.clone(),
            }))
        },
    );
    let service = RenderService::new(inflater, Arc::new(SimpleBackend)).unwrap();
    CountingService::new(service)
}

/// Unhandled-input sink feeding a channel.
pub(crate) struct ChannelSink {
    tx: Sender<TouchEvent>,
}

impl UnhandledInputSink for ChannelSink {
    fn dispatch_unhandled_input(&self, event: TouchEvent) {
        let _ = self.tx.send(event);
    }
}

pub(crate) fn channel_sink() -> (Arc<ChannelSink>, Receiver<TouchEvent>) {
    let (tx, rx) = unbounded();
    (Arc::new(ChannelSink { tx }), rx)
}
