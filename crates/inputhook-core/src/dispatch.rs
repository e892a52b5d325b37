//! The dispatch contract: where every translated event goes.
//!
//! The engine calls exactly one method per native event, synchronously, on
//! the hook thread.  Input methods return `true` when a listener consumed the
//! event; a consumed event is swallowed system-wide, not just for this
//! process.  Implementations must return quickly: the OS removes a low-level
//! hook whose callback stalls.

use crate::event::{KeyboardRecord, MouseRecord, WheelDirection};

/// Receives normalized events from the hook engine.
pub trait Dispatcher: Send + Sync {
    /// Hooks are installed and the pump is about to start.
    fn hook_enabled(&self, timestamp: u64);

    /// Hooks have been removed.
    fn hook_disabled(&self, timestamp: u64);

    fn key_pressed(&self, timestamp: u64, key: &KeyboardRecord) -> bool;

    fn key_released(&self, timestamp: u64, key: &KeyboardRecord) -> bool;

    /// `button` is a portable index; 1..=5 for the standard buttons, or a raw
    /// extra-button index reported by the device.
    fn button_pressed(&self, timestamp: u64, mouse: &MouseRecord, button: u16) -> bool;

    fn button_released(&self, timestamp: u64, mouse: &MouseRecord, button: u16) -> bool;

    fn mouse_moved(&self, timestamp: u64, mouse: &MouseRecord) -> bool;

    fn mouse_wheel(&self, timestamp: u64, mouse: &MouseRecord, direction: WheelDirection) -> bool;
}
