//! inputhook library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::runner::{HookRunner, HookState, RunOptions, StopHandle};
pub use inputhook_core::{
    Dispatcher, HookError, KeyboardRecord, ModifierFlags, ModifierMask, MouseRecord,
    TimestampSource, WheelDirection,
};
