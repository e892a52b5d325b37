//! Windows low-level keyboard and mouse hook platform.
//!
//! Installs `WH_KEYBOARD_LL` and `WH_MOUSE_LL` hooks with `SetWindowsHookExW`
//! and pumps the calling thread's message queue with `GetMessageW`.  Windows
//! invokes both hook procedures on that thread from inside `GetMessageW`, so
//! the bound [`EventTranslator`] lives in a thread-local and the callbacks
//! take no lock.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::cell::RefCell;
use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicIsize, Ordering};
use std::sync::Arc;

use inputhook_core::event::native;
use inputhook_core::{HookError, KeyboardRecord, MouseRecord};
use tracing::{error, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{GetLastError, HINSTANCE, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Diagnostics::Debug::IsDebuggerPresent;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageTime, GetMessageW, PostThreadMessageW,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, HOOKPROC,
    KBDLLHOOKSTRUCT, MSG, MSLLHOOKSTRUCT, WH_KEYBOARD_LL, WH_MOUSE_LL, WINDOWS_HOOK_ID,
    WM_KEYDOWN, WM_KEYUP, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MBUTTONDOWN, WM_MBUTTONUP,
    WM_MOUSEHWHEEL, WM_MOUSEMOVE, WM_MOUSEWHEEL, WM_NCXBUTTONDOWN, WM_NCXBUTTONUP, WM_QUIT,
    WM_RBUTTONDOWN, WM_RBUTTONUP, WM_SYSKEYDOWN, WM_SYSKEYUP, WM_XBUTTONDOWN, WM_XBUTTONUP,
    XBUTTON1, XBUTTON2,
};

use crate::application::platform::{HookKind, NativeHook, Platform, PumpStatus};
use crate::application::translate::{EventTranslator, Propagation};

// The translator classifies messages with the platform-neutral codes.
const _: () = {
    assert!(native::HC_ACTION == HC_ACTION as i32);
    assert!(native::WM_KEYDOWN == WM_KEYDOWN);
    assert!(native::WM_KEYUP == WM_KEYUP);
    assert!(native::WM_SYSKEYDOWN == WM_SYSKEYDOWN);
    assert!(native::WM_SYSKEYUP == WM_SYSKEYUP);
    assert!(native::WM_MOUSEMOVE == WM_MOUSEMOVE);
    assert!(native::WM_LBUTTONDOWN == WM_LBUTTONDOWN);
    assert!(native::WM_LBUTTONUP == WM_LBUTTONUP);
    assert!(native::WM_RBUTTONDOWN == WM_RBUTTONDOWN);
    assert!(native::WM_RBUTTONUP == WM_RBUTTONUP);
    assert!(native::WM_MBUTTONDOWN == WM_MBUTTONDOWN);
    assert!(native::WM_MBUTTONUP == WM_MBUTTONUP);
    assert!(native::WM_MOUSEWHEEL == WM_MOUSEWHEEL);
    assert!(native::WM_MOUSEHWHEEL == WM_MOUSEHWHEEL);
    assert!(native::WM_XBUTTONDOWN == WM_XBUTTONDOWN);
    assert!(native::WM_XBUTTONUP == WM_XBUTTONUP);
    assert!(native::WM_NCXBUTTONDOWN == WM_NCXBUTTONDOWN);
    assert!(native::WM_NCXBUTTONUP == WM_NCXBUTTONUP);
    assert!(native::XBUTTON1 as u32 == XBUTTON1 as u32);
    assert!(native::XBUTTON2 as u32 == XBUTTON2 as u32);
};

/// Module handle passed to `SetWindowsHookExW`; 0 until resolved.
static MODULE_HANDLE: AtomicIsize = AtomicIsize::new(0);

thread_local! {
    /// Translator for hook callbacks raised on this thread.
    static TRANSLATOR: RefCell<Option<Arc<EventTranslator>>> = const { RefCell::new(None) };
}

/// Records the module handle received by a DLL entry point.
///
/// When the library is linked into a DLL, call this from `DllMain` on
/// `DLL_PROCESS_ATTACH`.  Otherwise the executable's handle is looked up on
/// the first `run()`.
pub fn set_module_handle(instance: HINSTANCE) {
    MODULE_HANDLE.store(instance.0 as isize, Ordering::Release);
}

/// The production [`Platform`] backed by the Win32 hook and message APIs.
#[derive(Debug, Default)]
pub struct WindowsPlatform;

impl WindowsPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for WindowsPlatform {
    fn resolve_module(&self) -> Result<(), HookError> {
        if MODULE_HANDLE.load(Ordering::Acquire) != 0 {
            return Ok(());
        }

        warn!("module handle was not set by the DLL entry point, using the process module");
        // SAFETY: a null module name returns the handle of the process executable.
        let module = unsafe { GetModuleHandleW(PCWSTR::null()) }.map_err(|e| {
            error!("could not determine the module handle for SetWindowsHookExW: {e}");
            HookError::ModuleHandle(e.to_string())
        })?;
        MODULE_HANDLE.store(module.0 as isize, Ordering::Release);
        Ok(())
    }

    fn current_thread_id(&self) -> u32 {
        // SAFETY: GetCurrentThreadId has no preconditions.
        unsafe { GetCurrentThreadId() }
    }

    fn bind_translator(&self, translator: Arc<EventTranslator>) {
        TRANSLATOR.with(|slot| *slot.borrow_mut() = Some(translator));
    }

    fn unbind_translator(&self) {
        TRANSLATOR.with(|slot| *slot.borrow_mut() = None);
    }

    fn install_hook(&self, kind: HookKind) -> Result<NativeHook, HookError> {
        let (id, proc_): (WINDOWS_HOOK_ID, HOOKPROC) = match kind {
            HookKind::Keyboard => (WH_KEYBOARD_LL, Some(keyboard_hook_proc)),
            HookKind::Mouse => (WH_MOUSE_LL, Some(mouse_hook_proc)),
        };
        let instance = HINSTANCE(MODULE_HANDLE.load(Ordering::Acquire) as *mut c_void);

        // SAFETY: the hook procedures match HOOKPROC and live for the whole
        // program.  dwThreadId 0 installs a global low-level hook bound to the
        // calling thread, which runs the message pump.
        let hook = unsafe { SetWindowsHookExW(id, proc_, Some(instance), 0) };

        hook.map(|h| NativeHook(h.0 as isize)).map_err(|e| {
            let reason = e.to_string();
            match kind {
                HookKind::Keyboard => HookError::KeyboardHookInstallFailed(reason),
                HookKind::Mouse => HookError::MouseHookInstallFailed(reason),
            }
        })
    }

    fn uninstall_hook(&self, hook: NativeHook) {
        // SAFETY: `hook` was returned by SetWindowsHookExW and the registry
        // hands each handle back exactly once.
        if let Err(e) = unsafe { UnhookWindowsHookEx(HHOOK(hook.0 as *mut c_void)) } {
            warn!(handle = hook.0, "UnhookWindowsHookEx failed: {e}");
        }
    }

    fn pump_message(&self) -> PumpStatus {
        let mut msg = MSG::default();
        // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
        unsafe {
            match GetMessageW(&mut msg, None, 0, 0).0 {
                -1 => {
                    error!("GetMessageW failed: {:?}", GetLastError());
                    PumpStatus::Failed
                }
                0 => PumpStatus::Quit,
                _ => {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                    PumpStatus::Dispatched
                }
            }
        }
    }

    fn post_quit(&self, thread_id: u32) -> bool {
        // SAFETY: posting to a stale or queue-less thread id fails cleanly.
        unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) }.is_ok()
    }

    fn message_time(&self) -> u64 {
        // SAFETY: GetMessageTime has no preconditions.
        // The value is a wrapping u32 tick count stored in a LONG.
        u64::from(unsafe { GetMessageTime() } as u32)
    }

    fn debugger_present(&self) -> bool {
        // SAFETY: IsDebuggerPresent has no preconditions.
        unsafe { IsDebuggerPresent() }.as_bool()
    }
}

/// Runs `call` against this thread's translator, forwarding on panic.
fn with_translator(call: impl FnOnce(&EventTranslator) -> Propagation) -> Propagation {
    let Some(translator) = TRANSLATOR.with(|slot| slot.borrow().clone()) else {
        return Propagation::Forward;
    };

    match panic::catch_unwind(AssertUnwindSafe(|| call(&translator))) {
        Ok(decision) => decision,
        Err(_) => {
            error!("hook callback panicked, forwarding the event");
            Propagation::Forward
        }
    }
}

unsafe fn complete(decision: Propagation, n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    match decision {
        // SAFETY: Forward the event to the next hook in the chain.
        Propagation::Forward => CallNextHookEx(None, n_code, w_param, l_param),
        Propagation::Consume => LRESULT(1),
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows from the hook thread.  Low-level hooks always receive
/// a `KBDLLHOOKSTRUCT` in `l_param`, whatever `n_code` is, so the record is read
/// before the code is looked at.  Negative codes are still dispatched and
/// then always passed to `CallNextHookEx`.  Must return quickly or Windows
/// removes the hook.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if l_param.0 == 0 {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }
    // SAFETY: for every n_code a low-level keyboard hook gets a pointer to a
    // KBDLLHOOKSTRUCT owned by the system for the duration of this call.
    let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
    let record = KeyboardRecord {
        vk_code: kbs.vkCode,
        scan_code: kbs.scanCode,
        flags: kbs.flags.0,
        time: kbs.time,
        extra_info: kbs.dwExtraInfo,
    };

    let decision = with_translator(|t| t.keyboard_event(n_code, w_param.0 as u32, &record));
    complete(decision, n_code, w_param, l_param)
}

/// Low-level mouse hook callback.
///
/// # Safety
///
/// Called by Windows from the hook thread.  Low-level hooks always receive
/// an `MSLLHOOKSTRUCT` in `l_param`, whatever `n_code` is, so the record is read
/// before the code is looked at.  Negative codes are still dispatched and
/// then always passed to `CallNextHookEx`.  Must return quickly or Windows
/// removes the hook.
unsafe extern "system" fn mouse_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if l_param.0 == 0 {
        return CallNextHookEx(None, n_code, w_param, l_param);
    }
    // SAFETY: for every n_code a low-level mouse hook gets a pointer to a
    // MSLLHOOKSTRUCT owned by the system for the duration of this call.
    let mhs = &*(l_param.0 as *const MSLLHOOKSTRUCT);
    let record = MouseRecord {
        x: mhs.pt.x,
        y: mhs.pt.y,
        mouse_data: mhs.mouseData,
        flags: mhs.flags,
        time: mhs.time,
        extra_info: mhs.dwExtraInfo,
    };

    let decision = with_translator(|t| t.mouse_event(n_code, w_param.0 as u32, &record));
    complete(decision, n_code, w_param, l_param)
}
