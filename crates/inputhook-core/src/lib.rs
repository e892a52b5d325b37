//! # inputhook-core
//!
//! Shared foundation for the InputHook engine: the native event records the
//! OS hands to a low-level hook, the portable button and wheel codes, the
//! process-wide modifier mask, the dispatch contract that receives every
//! translated event, and the error taxonomy reported by `run()`/`stop()`.
//!
//! This crate has zero dependencies on OS APIs.  The message codes the
//! translator classifies live in [`event::native`] so the translation logic can
//! be exercised on any host.
//!
//! # Architecture overview
//!
//! ```text
//! OS hook callback ──► EventTranslator ──► ModifierMask (set/unset)
//!                                     └──► Dispatcher (consumed?) ──► forward / swallow
//! ```
//!
//! - **`event`** – Native keyboard/mouse records and portable button codes.
//! - **`modifiers`** – The atomic bit-set of held buttons and modifier keys.
//! - **`dispatch`** – The trait the engine calls for every normalized event.
//! - **`error`** – [`HookError`] and its libuiohook-compatible status codes.
//! - **`time`** – Timestamp source selection.

pub mod dispatch;
pub mod error;
pub mod event;
pub mod modifiers;
pub mod time;

pub use dispatch::Dispatcher;
pub use error::{HookError, STATUS_SUCCESS};
pub use event::{KeyboardRecord, MouseRecord, WheelDirection};
pub use modifiers::{ModifierFlags, ModifierMask};
pub use time::TimestampSource;
