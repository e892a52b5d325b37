//! Native input records and portable button/wheel codes.
//!
//! The records mirror the structures the OS passes to a low-level hook
//! (`KBDLLHOOKSTRUCT` / `MSLLHOOKSTRUCT` on Windows).  They are plain `Copy`
//! values: the translator builds one on the callback's stack, hands a reference
//! to the [`Dispatcher`](crate::Dispatcher), and drops it when the call returns.

use serde::{Deserialize, Serialize};

pub mod native;

pub const MOUSE_NOBUTTON: u16 = 0;
pub const MOUSE_BUTTON1: u16 = 1;
pub const MOUSE_BUTTON2: u16 = 2;
pub const MOUSE_BUTTON3: u16 = 3;
pub const MOUSE_BUTTON4: u16 = 4;
pub const MOUSE_BUTTON5: u16 = 5;

/// A low-level keyboard record as delivered to the keyboard hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardRecord {
    /// Virtual key code.
    pub vk_code: u32,
    /// Hardware scan code.
    pub scan_code: u32,
    /// Raw `LLKHF_*` flags.
    pub flags: u32,
    /// Milliseconds since system start.
    pub time: u32,
    pub extra_info: usize,
}

impl KeyboardRecord {
    /// `LLKHF_EXTENDED`: right-hand modifiers, numpad Enter, arrow cluster.
    pub const FLAG_EXTENDED: u32 = 0x01;
    /// `LLKHF_INJECTED`: the event was synthesized by `SendInput` or similar.
    pub const FLAG_INJECTED: u32 = 0x10;

    pub fn is_extended(&self) -> bool {
        self.flags & Self::FLAG_EXTENDED != 0
    }

    pub fn is_injected(&self) -> bool {
        self.flags & Self::FLAG_INJECTED != 0
    }
}

/// A low-level mouse record as delivered to the mouse hook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseRecord {
    /// Absolute X in virtual screen coordinates.
    pub x: i32,
    /// Absolute Y in virtual screen coordinates.
    pub y: i32,
    /// Wheel delta or extra-button index, packed in the high word.
    pub mouse_data: u32,
    /// Raw `LLMHF_*` flags.
    pub flags: u32,
    /// Milliseconds since system start.
    pub time: u32,
    pub extra_info: usize,
}

impl MouseRecord {
    /// The high word of `mouse_data`: the extra-button index for X-button messages.
    pub fn x_button(&self) -> u16 {
        (self.mouse_data >> 16) as u16
    }

    /// The signed wheel delta for wheel messages (multiples of 120 on most hardware).
    pub fn wheel_delta(&self) -> i16 {
        (self.mouse_data >> 16) as u16 as i16
    }
}

/// Which scroll wheel produced a wheel event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WheelDirection {
    Vertical = 3,
    Horizontal = 4,
}

impl WheelDirection {
    /// The portable direction code passed across the dispatch boundary.
    pub fn code(self) -> u8 {
        self as u8
    }
}
