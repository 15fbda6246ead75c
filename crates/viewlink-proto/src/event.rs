//! Input events and configuration snapshots crossing the process boundary.

use serde::{Deserialize, Serialize};

/// What a pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchAction {
    Down,
    Move,
    Up,
    Cancel,
}

/// One touch event, handed across the process boundary by value.
///
/// Events are owned: whichever side consumes (or drops) an event simply
/// lets it go out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub pointer_id: u32,
    pub action: TouchAction,
    pub x: f32,
    pub y: f32,
}

impl TouchEvent {
    pub fn new(action: TouchAction, x: f32, y: f32) -> Self {
        Self {
            pointer_id: 0,
            action,
            x,
            y,
        }
    }

    pub fn with_pointer(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }
}

/// Screen orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Snapshot of the host environment forwarded on configuration changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub orientation: Orientation,
    pub scale_factor: f32,
    pub dark_mode: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            scale_factor: 1.0,
            dark_mode: false,
        }
    }
}
