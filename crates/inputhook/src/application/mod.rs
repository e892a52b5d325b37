//! Application layer of the hook engine.
//!
//! Everything in here is OS-independent: it talks to the operating system
//! only through the [`platform::Platform`] trait, so every state transition
//! and every propagation decision can be exercised with the mock platform.
//!
//! # Sub-modules
//!
//! - **`platform`** – The OS seam (hook install, message pump, thread
//!   signalling, debugger check) and the input-helper contract.
//!
//! - **`translate`** – The keyboard and mouse callback procedures.  Runs on
//!   every keystroke and mouse movement, on the hook thread, under the OS
//!   callback deadline.
//!
//! - **`registry`** – Installs and removes the two global hooks.
//!
//! - **`guard`** – Background poller that disarms the hooks while a debugger
//!   is attached.
//!
//! - **`runner`** – The run/stop state machine that owns the pump thread.

pub mod guard;
pub mod platform;
pub mod registry;
pub mod runner;
pub mod translate;
