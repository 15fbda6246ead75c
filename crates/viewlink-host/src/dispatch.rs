//! Host UI-thread dispatch.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Mutex;

/// A unit of work posted to the UI thread.
pub type UiTask = Box<dyn FnOnce() + Send>;

/// The host-UI-thread hop for inbound protocol callbacks.
pub trait UiDispatcher: Send + Sync {
    /// Run `task` on the host UI thread.
    fn post(&self, task: UiTask);
}

/// Runs tasks inline on the calling thread.
///
/// For hosts whose protocol callbacks may run anywhere, and for tests.
pub struct DirectDispatcher;

impl UiDispatcher for DirectDispatcher {
    fn post(&self, task: UiTask) {
        task();
    }
}

/// Queues tasks for the host to pump from its UI loop.
pub struct QueueDispatcher {
    tx: Sender<UiTask>,
    rx: Mutex<Receiver<UiTask>>,
}

impl QueueDispatcher {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Run every queued task; returns how many ran. Call from the UI
    /// thread.
    pub fn drain(&self) -> usize {
        let rx = self.rx.lock().unwrap();
        let mut ran = 0;
        while let Ok(task) = rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

impl UiDispatcher for QueueDispatcher {
    fn post(&self, task: UiTask) {
        let _ = self.tx.send(task);
    }
}

impl Default for QueueDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
