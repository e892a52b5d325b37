//! Mock platform for unit and integration testing.
//!
//! Simulates the OS side of a low-level hook without a Windows message loop:
//! tests queue input records with [`MockPlatform::feed_keyboard`] /
//! [`MockPlatform::feed_mouse`], and the runner's pump delivers them to the
//! bound translator exactly as the OS would invoke a hook procedure.  Input
//! fed while the matching hook is not installed is dropped, as it would be
//! by the OS.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicIsize, AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use inputhook_core::event::native::HC_ACTION;
use inputhook_core::{HookError, KeyboardRecord, MouseRecord};

use crate::application::platform::{HookKind, NativeHook, Platform, PumpStatus};
use crate::application::translate::{EventTranslator, Propagation};

/// Thread id reported by [`MockPlatform::current_thread_id`].
pub const MOCK_THREAD_ID: u32 = 4242;

/// A message waiting in the mock pump's queue.
#[derive(Debug, Clone)]
pub enum MockMessage {
    Keyboard {
        code: i32,
        message: u32,
        record: KeyboardRecord,
    },
    Mouse {
        code: i32,
        message: u32,
        record: MouseRecord,
    },
    Quit,
    /// Makes the next retrieval fail.
    Fail,
}

/// A [`Platform`] that never touches the OS.
///
/// Stricter than the OS on one point: removing a hook that was never
/// installed, or removing it twice, panics so a leaked or doubled uninstall
/// fails the test that caused it.
pub struct MockPlatform {
    sender: Mutex<Sender<MockMessage>>,
    receiver: Mutex<Receiver<MockMessage>>,
    translator: Mutex<Option<Arc<EventTranslator>>>,
    installed: Mutex<HashMap<NativeHook, HookKind>>,
    failing: Mutex<HashSet<HookKind>>,
    outcomes: Mutex<Vec<Propagation>>,
    next_handle: AtomicIsize,
    install_calls: AtomicUsize,
    uninstall_calls: AtomicUsize,
    quit_posts: AtomicUsize,
    dropped_events: AtomicUsize,
    module_fails: AtomicBool,
    debugger: AtomicBool,
    message_time: AtomicU64,
}

impl MockPlatform {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender: Mutex::new(sender),
            receiver: Mutex::new(receiver),
            translator: Mutex::new(None),
            installed: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            outcomes: Mutex::new(Vec::new()),
            next_handle: AtomicIsize::new(0x1000),
            install_calls: AtomicUsize::new(0),
            uninstall_calls: AtomicUsize::new(0),
            quit_posts: AtomicUsize::new(0),
            dropped_events: AtomicUsize::new(0),
            module_fails: AtomicBool::new(false),
            debugger: AtomicBool::new(false),
            message_time: AtomicU64::new(0),
        }
    }

    // ── Scripting ─────────────────────────────────────────────────────────────

    pub fn feed(&self, message: MockMessage) {
        self.sender
            .lock()
            .expect("lock poisoned")
            .send(message)
            .expect("receiver is owned by the platform");
    }

    /// Queues a keyboard record with an `HC_ACTION` chain code.
    pub fn feed_keyboard(&self, message: u32, record: KeyboardRecord) {
        self.feed(MockMessage::Keyboard {
            code: HC_ACTION,
            message,
            record,
        });
    }

    /// Queues a mouse record with an `HC_ACTION` chain code.
    pub fn feed_mouse(&self, message: u32, record: MouseRecord) {
        self.feed(MockMessage::Mouse {
            code: HC_ACTION,
            message,
            record,
        });
    }

    pub fn fail_install(&self, kind: HookKind) {
        self.failing.lock().expect("lock poisoned").insert(kind);
    }

    pub fn allow_install(&self, kind: HookKind) {
        self.failing.lock().expect("lock poisoned").remove(&kind);
    }

    pub fn fail_module_resolution(&self) {
        self.module_fails.store(true, Ordering::SeqCst);
    }

    pub fn set_debugger_present(&self, present: bool) {
        self.debugger.store(present, Ordering::SeqCst);
    }

    // ── Observation ───────────────────────────────────────────────────────────

    /// Number of hooks currently installed.
    pub fn installed_count(&self) -> usize {
        self.installed.lock().expect("lock poisoned").len()
    }

    pub fn is_installed(&self, kind: HookKind) -> bool {
        self.installed
            .lock()
            .expect("lock poisoned")
            .values()
            .any(|k| *k == kind)
    }

    pub fn install_calls(&self) -> usize {
        self.install_calls.load(Ordering::SeqCst)
    }

    pub fn uninstall_calls(&self) -> usize {
        self.uninstall_calls.load(Ordering::SeqCst)
    }

    /// Quit messages successfully posted to the mock thread.
    pub fn quit_posts(&self) -> usize {
        self.quit_posts.load(Ordering::SeqCst)
    }

    /// Input messages retrieved while the matching hook was not installed.
    pub fn dropped_events(&self) -> usize {
        self.dropped_events.load(Ordering::SeqCst)
    }

    pub fn translator_bound(&self) -> bool {
        self.translator.lock().expect("lock poisoned").is_some()
    }

    /// Propagation decisions returned by the hook procedures, in order.
    pub fn outcomes(&self) -> Vec<Propagation> {
        self.outcomes.lock().expect("lock poisoned").clone()
    }

    fn deliver(&self, kind: HookKind, time: u32, call: impl FnOnce(&EventTranslator) -> Propagation) {
        self.message_time.store(u64::from(time), Ordering::SeqCst);

        let translator = self.translator.lock().expect("lock poisoned").clone();
        match translator {
            Some(translator) if self.is_installed(kind) => {
                let outcome = call(&translator);
                self.outcomes.lock().expect("lock poisoned").push(outcome);
            }
            _ => {
                self.dropped_events.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MockPlatform {
    fn resolve_module(&self) -> Result<(), HookError> {
        if self.module_fails.load(Ordering::SeqCst) {
            return Err(HookError::ModuleHandle("mock module lookup failed".to_string()));
        }
        Ok(())
    }

    fn current_thread_id(&self) -> u32 {
        MOCK_THREAD_ID
    }

    fn bind_translator(&self, translator: Arc<EventTranslator>) {
        *self.translator.lock().expect("lock poisoned") = Some(translator);
    }

    fn unbind_translator(&self) {
        *self.translator.lock().expect("lock poisoned") = None;
    }

    fn install_hook(&self, kind: HookKind) -> Result<NativeHook, HookError> {
        self.install_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().expect("lock poisoned").contains(&kind) {
            let reason = "mock install refused".to_string();
            return Err(match kind {
                HookKind::Keyboard => HookError::KeyboardHookInstallFailed(reason),
                HookKind::Mouse => HookError::MouseHookInstallFailed(reason),
            });
        }
        let hook = NativeHook(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.installed.lock().expect("lock poisoned").insert(hook, kind);
        Ok(hook)
    }

    /// # Panics
    ///
    /// Panics if `hook` is not currently installed.
    fn uninstall_hook(&self, hook: NativeHook) {
        self.uninstall_calls.fetch_add(1, Ordering::SeqCst);
        let removed = self.installed.lock().expect("lock poisoned").remove(&hook);
        assert!(removed.is_some(), "uninstalled unknown or already removed hook {hook:?}");
    }

    fn pump_message(&self) -> PumpStatus {
        let message = self
            .receiver
            .lock()
            .expect("lock poisoned")
            .recv()
            .expect("sender is owned by the platform");

        match message {
            MockMessage::Keyboard {
                code,
                message,
                record,
            } => {
                self.deliver(HookKind::Keyboard, record.time, |t| {
                    t.keyboard_event(code, message, &record)
                });
                PumpStatus::Dispatched
            }
            MockMessage::Mouse {
                code,
                message,
                record,
            } => {
                self.deliver(HookKind::Mouse, record.time, |t| {
                    t.mouse_event(code, message, &record)
                });
                PumpStatus::Dispatched
            }
            MockMessage::Quit => PumpStatus::Quit,
            MockMessage::Fail => PumpStatus::Failed,
        }
    }

    fn post_quit(&self, thread_id: u32) -> bool {
        if thread_id != MOCK_THREAD_ID {
            return false;
        }
        self.feed(MockMessage::Quit);
        self.quit_posts.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn message_time(&self) -> u64 {
        self.message_time.load(Ordering::SeqCst)
    }

    fn debugger_present(&self) -> bool {
        self.debugger.load(Ordering::SeqCst)
    }
}
