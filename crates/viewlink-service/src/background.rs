//! Background delivery pool.
//!
//! Best-effort work that must not run on the control thread: delivering
//! unhandled touch events back to a possibly slow client.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::thread;
use tracing::debug;

type Job = Box<dyn FnOnce() + Send>;

/// Handle to the pool; clones share the same workers.
#[derive(Clone)]
pub(crate) struct Background {
    tx: Sender<Job>,
}

impl Background {
    /// Spawn `workers` delivery threads. They exit when every handle is
    /// dropped.
    pub(crate) fn spawn_pool(workers: usize) -> Self {
        let (tx, rx) = unbounded::<Job>();
        for n in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            thread::Builder::new()
                .name(format!("viewlink-bg-{n}"))
                .spawn(move || {
                    debug!("background worker {n} started");
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    debug!("background worker {n} stopped");
                })
                .expect("Failed to spawn background worker thread");
        }
        Self { tx }
    }

    /// Run a job on the pool; dropped silently during shutdown.
    pub(crate) fn run(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(job));
    }
}
