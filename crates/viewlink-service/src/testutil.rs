//! Mock capabilities shared by the service tests.

use crate::inflate::{InflateError, LayoutInflater};
use crate::view::{Invalidator, View};
use crate::window::{OverlayWindow, WindowBackend};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use viewlink_proto::{
    ClientHandle, Configuration, LayoutId, LifeToken, RemoteClient, TouchEvent, WindowToken,
};
use viewlink_surface::{Canvas, Color, Surface, SurfaceError};

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

/// Observable state of one recording window.
#[derive(Default)]
pub(crate) struct WindowState {
    pub(crate) size: (u32, u32),
    pub(crate) live_size: Option<(u32, u32)>,
    pub(crate) showing: bool,
    pub(crate) show_count: u32,
    pub(crate) dismiss_count: u32,
    pub(crate) clipping: Option<bool>,
    pub(crate) tokens: Vec<WindowToken>,
}

pub(crate) struct RecordingWindow {
    state: Arc<Mutex<WindowState>>,
}

impl OverlayWindow for RecordingWindow {
    fn set_size(&mut self, width: u32, height: u32) {
        self.state.lock().unwrap().size = (width, height);
    }

    fn update_size(&mut self, width: u32, height: u32) {
        let mut state = self.state.lock().unwrap();
        state.size = (width, height);
        state.live_size = Some((width, height));
    }

    fn set_clipping_enabled(&mut self, enabled: bool) {
        self.state.lock().unwrap().clipping = Some(enabled);
    }

    fn show_at(&mut self, token: WindowToken) {
        let mut state = self.state.lock().unwrap();
        state.showing = true;
        state.show_count += 1;
        state.tokens.push(token);
    }

    fn dismiss(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.showing = false;
        state.dismiss_count += 1;
    }

    fn is_showing(&self) -> bool {
        self.state.lock().unwrap().showing
    }
}

/// Backend exposing every window it created for inspection.
#[derive(Default)]
pub(crate) struct RecordingBackend {
    windows: Mutex<Vec<Arc<Mutex<WindowState>>>>,
}

impl RecordingBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn window(&self, index: usize) -> Arc<Mutex<WindowState>> {
        self.windows.lock().unwrap()[index].clone()
    }

    pub(crate) fn window_count(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

impl WindowBackend for RecordingBackend {
    fn create_window(&self) -> Box<dyn OverlayWindow> {
        let state = Arc::new(Mutex::new(WindowState::default()));
        self.windows.lock().unwrap().push(state.clone());
        Box::new(RecordingWindow { state })
    }
}

/// Shared handles into a [`TestView`] installed by the inflater.
#[derive(Clone, Default)]
pub(crate) struct ViewProbe {
    pub(crate) draws: Arc<AtomicU32>,
    pub(crate) touches: Arc<Mutex<Vec<TouchEvent>>>,
    pub(crate) configurations: Arc<Mutex<Vec<Configuration>>>,
    pub(crate) invalidator: Arc<Mutex<Option<Invalidator>>>,
    pub(crate) consume_touch: Arc<AtomicBool>,
}

pub(crate) struct TestView {
    probe: ViewProbe,
    color: Color,
}

impl View for TestView {
    fn draw(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(self.color);
        self.probe.draws.fetch_add(1, Ordering::SeqCst);
    }

    fn dispatch_touch_event(&mut self, event: &TouchEvent) -> bool {
        self.probe.touches.lock().unwrap().push(event.clone());
        self.probe.consume_touch.load(Ordering::SeqCst)
    }

    fn on_configuration_changed(&mut self, configuration: &Configuration) {
        self.probe
            .configurations
            .lock()
            .unwrap()
            .push(configuration.clone());
    }

    fn on_attached(&mut self, invalidator: Invalidator) {
        *self.probe.invalidator.lock().unwrap() = Some(invalidator);
    }
}

/// Inflater producing a probed test view for every layout.
pub(crate) fn probe_inflater(probe: ViewProbe, color: Color) -> Arc<dyn LayoutInflater> {
    Arc::new(
        move |_layout_id: LayoutId| -> Result<Box<dyn View>, InflateError> {
            Ok(Box::new(TestView {
                probe: probe.clone(),
                color,
            }))
        },
    )
}

/// Inflater that fails for every layout.
pub(crate) fn failing_inflater() -> Arc<dyn LayoutInflater> {
    Arc::new(|layout_id: LayoutId| -> Result<Box<dyn View>, InflateError> {
        Err(InflateError::UnknownLayout(layout_id))
    })
}

/// Client callback recording unhandled touch deliveries, paired with the
/// life token whose drop simulates client death.
pub(crate) struct TestClient {
    tx: Sender<TouchEvent>,
}

impl RemoteClient for TestClient {
    fn dispatch_unhandled_touch_event(&self, event: TouchEvent) {
        let _ = self.tx.send(event);
    }
}

pub(crate) struct ClientRig {
    pub(crate) handle: ClientHandle,
    pub(crate) life: Option<LifeToken>,
    pub(crate) unhandled_rx: Receiver<TouchEvent>,
    // Keeps the callback object reachable through the weak handle.
    _client: Arc<dyn RemoteClient>,
}

impl ClientRig {
    pub(crate) fn new() -> Self {
        let (tx, unhandled_rx) = unbounded();
        let client: Arc<dyn RemoteClient> = Arc::new(TestClient { tx });
        let (life, death) = LifeToken::new();
        let handle = ClientHandle::new(&client, death);
        Self {
            handle,
            life: Some(life),
            unhandled_rx,
            _client: client,
        }
    }

    /// Simulate the client process dying.
    pub(crate) fn kill(&mut self) {
        self.life.take();
    }
}

/// Surface whose `lock_canvas` blocks until the gate opens, for holding
/// a frame in flight deterministically.
pub(crate) struct GatedSurface {
    width: u32,
    height: u32,
    open: Mutex<bool>,
    opened: Condvar,
    valid: AtomicBool,
    pub(crate) lock_attempts: AtomicU64,
    pub(crate) locks: AtomicU64,
    pub(crate) presents: AtomicU64,
}

impl GatedSurface {
    pub(crate) fn new(width: u32, height: u32, open: bool) -> Arc<Self> {
        Arc::new(Self {
            width,
            height,
            open: Mutex::new(open),
            opened: Condvar::new(),
            valid: AtomicBool::new(true),
            lock_attempts: AtomicU64::new(0),
            locks: AtomicU64::new(0),
            presents: AtomicU64::new(0),
        })
    }

    pub(crate) fn release(&self) {
        *self.open.lock().unwrap() = true;
        self.opened.notify_all();
    }
}

struct NullCanvas {
    width: u32,
    height: u32,
}

impl Canvas for NullCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, _color: Color) {}

    fn fill_rect(&mut self, _x: u32, _y: u32, _width: u32, _height: u32, _color: Color) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Surface for GatedSurface {
    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn lock_canvas(&self) -> Result<Box<dyn Canvas>, SurfaceError> {
        self.lock_attempts.fetch_add(1, Ordering::SeqCst);
        if !self.is_valid() {
            return Err(SurfaceError::Invalid);
        }
        let mut open = self.open.lock().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !*open {
            if Instant::now() > deadline {
                return Err(SurfaceError::Invalid);
            }
            let (guard, _timed_out) = self
                .opened
                .wait_timeout(open, Duration::from_millis(10))
                .unwrap();
            open = guard;
        }
        self.locks.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(NullCanvas {
            width: self.width,
            height: self.height,
        }))
    }

    fn unlock_canvas_and_post(&self, _canvas: Box<dyn Canvas>) -> Result<(), SurfaceError> {
        self.presents.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
