//! The OS seam used by the hook engine.
//!
//! The production implementation wraps the Win32 hook and message APIs; tests
//! use [`crate::infrastructure::platform::mock::MockPlatform`].

use std::sync::Arc;

use inputhook_core::HookError;

use super::translate::EventTranslator;

/// The two classes of global hook the engine installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Keyboard,
    Mouse,
}

/// Opaque handle to an installed global hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHook(pub isize);

/// Outcome of one blocking message retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpStatus {
    /// A message was retrieved and dispatched; keep pumping.
    Dispatched,
    /// The quit message was retrieved.
    Quit,
    /// Message retrieval failed.
    Failed,
}

/// Operating-system services needed to run a global input hook.
///
/// Hook installation, [`bind_translator`](Platform::bind_translator) and
/// [`pump_message`](Platform::pump_message) are only ever called from the
/// thread executing `HookRunner::run`.  [`post_quit`](Platform::post_quit) and
/// [`debugger_present`](Platform::debugger_present) may be called from any
/// thread.
pub trait Platform: Send + Sync + 'static {
    /// Resolves the module handle hooks are installed against.
    fn resolve_module(&self) -> Result<(), HookError>;

    /// OS identifier of the calling thread.
    fn current_thread_id(&self) -> u32;

    /// Routes hook callbacks raised on the calling thread to `translator`.
    fn bind_translator(&self, translator: Arc<EventTranslator>);

    fn unbind_translator(&self);

    fn install_hook(&self, kind: HookKind) -> Result<NativeHook, HookError>;

    fn uninstall_hook(&self, hook: NativeHook);

    /// Blocks until a message arrives, then dispatches it.
    ///
    /// Hook callbacks run inside this call.
    fn pump_message(&self) -> PumpStatus;

    /// Posts a quit message to `thread_id`'s queue.  Returns `true` if it was queued.
    fn post_quit(&self, thread_id: u32) -> bool;

    /// Timestamp of the last message retrieved by the pump, in OS milliseconds.
    fn message_time(&self) -> u64;

    fn debugger_present(&self) -> bool;
}

/// Platform input helper (keycode tables, initial lock-key state).
///
/// `load` runs before any hook is installed and `unload` after the last one
/// is removed.  An error from `load` is returned from `run()` unchanged.
#[cfg_attr(test, mockall::automock)]
pub trait InputHelper: Send + Sync {
    fn load(&self) -> Result<(), HookError>;

    fn unload(&self);
}
