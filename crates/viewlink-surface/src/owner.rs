//! Single-writer ownership of a shared surface.

use crate::{Canvas, SharedSurface};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tracing::debug;

/// How long a waiter sleeps between surface-validity re-checks while the
/// previous frame holds the lock.
const UNLOCK_WAIT_SLICE: Duration = Duration::from_millis(5);

/// Wraps one shared surface and enforces at most one in-flight
/// lock/draw/unlock cycle.
///
/// The lock flag lives behind a mutex with a condvar; waiters re-check
/// surface validity on every wakeup, so a frame waiting on a destroyed
/// surface abandons instead of spinning.
pub struct SurfaceOwner {
    surface: SharedSurface,
    locked: Mutex<bool>,
    unlocked: Condvar,
}

impl SurfaceOwner {
    pub fn new(surface: SharedSurface) -> Self {
        Self {
            surface,
            locked: Mutex::new(false),
            unlocked: Condvar::new(),
        }
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// Wait until no frame is in flight, then lock the surface.
    ///
    /// Returns `None` when the frame should be abandoned: the surface
    /// went invalid while waiting, or went invalid between the wait and
    /// the lock, or locking raised.
    pub fn wait_lock_canvas(&self) -> Option<Box<dyn Canvas>> {
        let mut locked = self.locked.lock().unwrap();
        while *locked {
            if !self.surface.is_valid() {
                return None;
            }
            let (guard, _timed_out) = self
                .unlocked
                .wait_timeout(locked, UNLOCK_WAIT_SLICE)
                .unwrap();
            locked = guard;
        }
        // Re-validate before locking: the surface may have died between
        // the previous unlock and now.
        if !self.surface.is_valid() {
            return None;
        }
        match self.surface.lock_canvas() {
            Ok(canvas) => {
                *locked = true;
                Some(canvas)
            }
            Err(err) => {
                debug!("abandoning frame, lock failed: {err}");
                None
            }
        }
    }

    /// Present the canvas and release the lock.
    ///
    /// A present failure on a surface that died mid-frame is swallowed;
    /// the frame is simply discarded.
    pub fn unlock_and_post(&self, canvas: Box<dyn Canvas>) {
        if let Err(err) = self.surface.unlock_canvas_and_post(canvas) {
            debug!("discarding frame, present failed: {err}");
        }
        let mut locked = self.locked.lock().unwrap();
        *locked = false;
        self.unlocked.notify_all();
    }

    /// Release the lock without presenting, for a canvas lost in a
    /// cross-thread handoff.
    pub fn abandon_lock(&self) {
        let mut locked = self.locked.lock().unwrap();
        *locked = false;
        self.unlocked.notify_all();
    }
}

/// A session's current surface owner, replaced wholesale on every
/// surface change.
///
/// A frame in flight keeps the owner it captured; frames that start
/// after a replacement observe the new owner, never a mix of both.
pub struct SurfaceSlot {
    current: Mutex<Option<Arc<SurfaceOwner>>>,
}

impl SurfaceSlot {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Replace the current owner (or clear it with `None`).
    pub fn store(&self, owner: Option<Arc<SurfaceOwner>>) {
        *self.current.lock().unwrap() = owner;
    }

    /// The owner frames started now should paint against.
    pub fn current(&self) -> Option<Arc<SurfaceOwner>> {
        self.current.lock().unwrap().clone()
    }

    /// Clear and return the current owner.
    pub fn take(&self) -> Option<Arc<SurfaceOwner>> {
        self.current.lock().unwrap().take()
    }
}

impl Default for SurfaceSlot {
    fn default() -> Self {
        Self::new()
    }
}
