//! Error type for hook lifecycle operations.
//!
//! Every variant maps onto a libuiohook status code through
//! [`HookError::status`], so an FFI wrapper can hand C callers the same
//! numbers libuiohook returns.

use thiserror::Error;

/// Status reported for a successful `run()` or `stop()`.
pub const STATUS_SUCCESS: i32 = 0x00;
/// Generic failure.
pub const STATUS_FAILURE: i32 = 0x01;
/// The OS refused to install a low-level hook.
pub const STATUS_ERROR_SET_WINDOWS_HOOK_EX: i32 = 0x30;
/// The module handle for hook installation could not be determined.
pub const STATUS_ERROR_GET_MODULE_HANDLE: i32 = 0x31;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("hook failure: {0}")]
    Failure(String),

    #[error("could not determine the module handle for hook installation: {0}")]
    ModuleHandle(String),

    #[error("failed to install keyboard hook: {0}")]
    KeyboardHookInstallFailed(String),

    #[error("failed to install mouse hook: {0}")]
    MouseHookInstallFailed(String),

    #[error("failed to create debugger guard thread: {0}")]
    ThreadCreate(String),

    /// The input helper reported its own status during setup.
    #[error("input helper failed with status {code:#04X}: {reason}")]
    InputHelper { code: i32, reason: String },

    /// `stop()` could not deliver the wakeup to the hook thread.
    #[error("could not signal the hook thread")]
    StopSignal,

    #[error("hook is already running")]
    AlreadyRunning,
}

impl HookError {
    /// The libuiohook status code for this error.
    pub fn status(&self) -> i32 {
        match self {
            HookError::ModuleHandle(_) => STATUS_ERROR_GET_MODULE_HANDLE,
            HookError::KeyboardHookInstallFailed(_) | HookError::MouseHookInstallFailed(_) => {
                STATUS_ERROR_SET_WINDOWS_HOOK_EX
            }
            HookError::InputHelper { code, .. } => *code,
            HookError::Failure(_)
            | HookError::ThreadCreate(_)
            | HookError::StopSignal
            | HookError::AlreadyRunning => STATUS_FAILURE,
        }
    }

    /// Returns `true` for either hook-installation failure.
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            HookError::KeyboardHookInstallFailed(_) | HookError::MouseHookInstallFailed(_)
        )
    }
}
