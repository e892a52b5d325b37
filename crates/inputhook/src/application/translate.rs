//! EventTranslator: the keyboard and mouse callback procedures.
//!
//! The OS invokes these synchronously on the hook thread for every input
//! event on the desktop.  Each call classifies the native message, stamps a
//! timestamp, keeps the [`ModifierMask`] current for mouse buttons, hands the
//! record to the [`Dispatcher`] and turns its answer into a [`Propagation`]
//! decision for the hook chain.
//!
//! # Propagation contract
//!
//! | chain code | consumed | result  |
//! |------------|----------|---------|
//! | `< 0`      | any      | Forward |
//! | `>= 0`     | `false`  | Forward |
//! | `>= 0`     | `true`   | Consume |
//!
//! A consumed event is swallowed for the whole system.

use std::sync::Arc;

use inputhook_core::event::native::{
    WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP,
    WM_MOUSEHWHEEL, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_NCXBUTTONDOWN, WM_NCXBUTTONUP,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
    XBUTTON1, XBUTTON2,
};
use inputhook_core::event::{
    MOUSE_BUTTON1, MOUSE_BUTTON2, MOUSE_BUTTON3, MOUSE_BUTTON4, MOUSE_BUTTON5,
};
use inputhook_core::modifiers::button_mask;
use inputhook_core::time::epoch_millis;
use inputhook_core::{
    Dispatcher, KeyboardRecord, ModifierMask, MouseRecord, TimestampSource, WheelDirection,
};
use tracing::debug;

/// What the hook procedure tells the OS to do with the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Pass the event to the next hook in the chain.
    Forward,
    /// Swallow the event.
    Consume,
}

/// Decides propagation from the chain code and the dispatcher's answer.
pub fn propagation(code: i32, consumed: bool) -> Propagation {
    if code < 0 || !consumed {
        Propagation::Forward
    } else {
        Propagation::Consume
    }
}

/// Translates native hook notifications into dispatcher calls.
pub struct EventTranslator {
    dispatcher: Arc<dyn Dispatcher>,
    modifiers: Arc<ModifierMask>,
    timestamps: TimestampSource,
}

impl EventTranslator {
    pub fn new(
        dispatcher: Arc<dyn Dispatcher>,
        modifiers: Arc<ModifierMask>,
        timestamps: TimestampSource,
    ) -> Self {
        Self {
            dispatcher,
            modifiers,
            timestamps,
        }
    }

    pub fn modifiers(&self) -> &Arc<ModifierMask> {
        &self.modifiers
    }

    /// Keyboard hook procedure.
    pub fn keyboard_event(&self, code: i32, message: u32, key: &KeyboardRecord) -> Propagation {
        let timestamp = self.timestamp(key.time);

        let consumed = match message {
            WM_KEYDOWN | WM_SYSKEYDOWN => self.dispatcher.key_pressed(timestamp, key),
            WM_KEYUP | WM_SYSKEYUP => self.dispatcher.key_released(timestamp, key),
            _ => {
                debug!(code = format_args!("{message:#X}"), "unhandled keyboard event");
                false
            }
        };

        self.decide(code, consumed)
    }

    /// Mouse hook procedure.
    pub fn mouse_event(&self, code: i32, message: u32, mouse: &MouseRecord) -> Propagation {
        let timestamp = self.timestamp(mouse.time);

        let consumed = match message {
            WM_LBUTTONDOWN => self.press(timestamp, mouse, MOUSE_BUTTON1),
            WM_RBUTTONDOWN => self.press(timestamp, mouse, MOUSE_BUTTON2),
            WM_MBUTTONDOWN => self.press(timestamp, mouse, MOUSE_BUTTON3),
            WM_XBUTTONDOWN | WM_NCXBUTTONDOWN => {
                self.press(timestamp, mouse, extra_button(mouse))
            }

            WM_LBUTTONUP => self.release(timestamp, mouse, MOUSE_BUTTON1),
            WM_RBUTTONUP => self.release(timestamp, mouse, MOUSE_BUTTON2),
            WM_MBUTTONUP => self.release(timestamp, mouse, MOUSE_BUTTON3),
            WM_XBUTTONUP | WM_NCXBUTTONUP => {
                self.release(timestamp, mouse, extra_button(mouse))
            }

            WM_MOUSEMOVE => self.dispatcher.mouse_moved(timestamp, mouse),
            WM_MOUSEWHEEL => {
                self.dispatcher
                    .mouse_wheel(timestamp, mouse, WheelDirection::Vertical)
            }
            WM_MOUSEHWHEEL => {
                self.dispatcher
                    .mouse_wheel(timestamp, mouse, WheelDirection::Horizontal)
            }

            _ => {
                debug!(code = format_args!("{message:#X}"), "unhandled mouse event");
                false
            }
        };

        self.decide(code, consumed)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    // The mask is updated before dispatch so listeners see the chord as of this event.
    fn press(&self, timestamp: u64, mouse: &MouseRecord, button: u16) -> bool {
        if let Some(mask) = button_mask(button) {
            self.modifiers.set(mask);
        }
        self.dispatcher.button_pressed(timestamp, mouse, button)
    }

    fn release(&self, timestamp: u64, mouse: &MouseRecord, button: u16) -> bool {
        if let Some(mask) = button_mask(button) {
            self.modifiers.unset(mask);
        }
        self.dispatcher.button_released(timestamp, mouse, button)
    }

    fn timestamp(&self, native_time: u32) -> u64 {
        match self.timestamps {
            TimestampSource::Native => u64::from(native_time),
            TimestampSource::Epoch => epoch_millis(),
        }
    }

    fn decide(&self, code: i32, consumed: bool) -> Propagation {
        let result = propagation(code, consumed);
        if result == Propagation::Consume {
            debug!("consuming the current event");
        }
        result
    }
}

/// Decodes the button index of an X-button message.
///
/// `XBUTTON1`/`XBUTTON2` map to buttons 4 and 5; any other value is passed
/// through as the raw index reported by the device.
fn extra_button(mouse: &MouseRecord) -> u16 {
    match mouse.x_button() {
        XBUTTON1 => MOUSE_BUTTON4,
        XBUTTON2 => MOUSE_BUTTON5,
        raw => raw,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
