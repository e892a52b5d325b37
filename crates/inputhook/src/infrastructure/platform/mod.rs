//! Platform implementations.
//!
//! - [`windows`]: `SetWindowsHookExW` low-level hooks and a `GetMessageW` pump.
//! - [`mock`]: a scriptable in-process platform for tests and non-Windows hosts.

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;
