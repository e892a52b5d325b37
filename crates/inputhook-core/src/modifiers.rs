//! Process-wide bit-set of held mouse buttons and modifier keys.
//!
//! The layout is the libuiohook mask layout, so consumers written against the
//! C library read the same bits.  Button bits are maintained by the event
//! translator; keyboard bits are maintained by the input helper and dispatch
//! layer.
//!
//! # Memory ordering
//!
//! Writers use `Release` and readers use `Acquire`.  The hook callbacks are the
//! only writers of button bits and they run on a single thread, so a reader on
//! another thread that observes a bit also observes everything the callback
//! wrote before setting it.

use std::sync::atomic::{AtomicU16, Ordering};

use crate::event::{MOUSE_BUTTON1, MOUSE_BUTTON2, MOUSE_BUTTON3, MOUSE_BUTTON4, MOUSE_BUTTON5};

/// A snapshot of the modifier mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModifierFlags(pub u16);

impl ModifierFlags {
    pub const SHIFT_L: u16 = 1 << 0;
    pub const CTRL_L: u16 = 1 << 1;
    pub const META_L: u16 = 1 << 2;
    pub const ALT_L: u16 = 1 << 3;

    pub const SHIFT_R: u16 = 1 << 4;
    pub const CTRL_R: u16 = 1 << 5;
    pub const META_R: u16 = 1 << 6;
    pub const ALT_R: u16 = 1 << 7;

    pub const BUTTON1: u16 = 1 << 8;
    pub const BUTTON2: u16 = 1 << 9;
    pub const BUTTON3: u16 = 1 << 10;
    pub const BUTTON4: u16 = 1 << 11;
    pub const BUTTON5: u16 = 1 << 12;

    pub const NUM_LOCK: u16 = 1 << 13;
    pub const CAPS_LOCK: u16 = 1 << 14;
    pub const SCROLL_LOCK: u16 = 1 << 15;

    /// Returns `true` if every bit in `mask` is set.
    pub fn contains(&self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    pub fn shift(&self) -> bool {
        self.0 & (Self::SHIFT_L | Self::SHIFT_R) != 0
    }

    pub fn ctrl(&self) -> bool {
        self.0 & (Self::CTRL_L | Self::CTRL_R) != 0
    }

    pub fn alt(&self) -> bool {
        self.0 & (Self::ALT_L | Self::ALT_R) != 0
    }

    /// Returns `true` if either Meta (Win/Cmd/Super) modifier is held.
    pub fn meta(&self) -> bool {
        self.0 & (Self::META_L | Self::META_R) != 0
    }

    /// Returns `true` if any of the five mouse buttons is held.
    pub fn any_button(&self) -> bool {
        self.0
            & (Self::BUTTON1 | Self::BUTTON2 | Self::BUTTON3 | Self::BUTTON4 | Self::BUTTON5)
            != 0
    }
}

/// Maps a portable button index (1..=5) to its mask bit.
pub fn button_mask(button: u16) -> Option<u16> {
    match button {
        MOUSE_BUTTON1 => Some(ModifierFlags::BUTTON1),
        MOUSE_BUTTON2 => Some(ModifierFlags::BUTTON2),
        MOUSE_BUTTON3 => Some(ModifierFlags::BUTTON3),
        MOUSE_BUTTON4 => Some(ModifierFlags::BUTTON4),
        MOUSE_BUTTON5 => Some(ModifierFlags::BUTTON5),
        _ => None,
    }
}

/// The shared, atomically updated modifier mask.
#[derive(Debug, Default)]
pub struct ModifierMask {
    bits: AtomicU16,
}

impl ModifierMask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets every bit in `mask`.
    pub fn set(&self, mask: u16) {
        self.bits.fetch_or(mask, Ordering::Release);
    }

    /// Clears every bit in `mask`.
    pub fn unset(&self, mask: u16) {
        self.bits.fetch_and(!mask, Ordering::Release);
    }

    pub fn get(&self) -> ModifierFlags {
        ModifierFlags(self.bits.load(Ordering::Acquire))
    }

    pub fn reset(&self) {
        self.bits.store(0, Ordering::Release);
    }
}
