//! HookRunner: the run/stop state machine that owns the pump thread.
//!
//! # State machine
//!
//! ```text
//! Idle ─► Starting ─► Armed ◄──────────┐
//!            │          │              │ debugger detached
//!            │          ▼              │
//!            │       Disarmed ─────────┘
//!            ▼          │
//!         Stopping ◄────┘ (stop / pump ended / error)
//!            │
//!            ▼
//!          Idle
//! ```
//!
//! `run()` blocks the calling thread for the whole session: hooks are bound to
//! the installing thread and their callbacks execute inside its message pump.
//! `stop()` may be called from any thread.
//!
//! # Shared state
//!
//! [`RunState`] is shared between the pump thread, the debugger guard and any
//! thread holding a [`StopHandle`].  Every field is an atomic written with
//! `Release` and read with `Acquire`; no lock is taken so the guard can never
//! stall behind a busy hook callback.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use inputhook_core::time::epoch_millis;
use inputhook_core::{Dispatcher, HookError, ModifierMask, TimestampSource};
use tracing::{debug, error, info, warn};

use super::guard::DebuggerGuard;
use super::platform::{InputHelper, Platform, PumpStatus};
use super::registry::HookRegistry;
use super::translate::EventTranslator;

/// Debugger poll interval used when none is configured.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Observable lifecycle phase of a [`HookRunner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HookState {
    Idle = 0,
    Starting = 1,
    /// Hooks installed, pumping messages.
    Armed = 2,
    /// Debugger attached, hooks removed, waiting for it to detach.
    Disarmed = 3,
    Stopping = 4,
}

impl HookState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => HookState::Starting,
            2 => HookState::Armed,
            3 => HookState::Disarmed,
            4 => HookState::Stopping,
            _ => HookState::Idle,
        }
    }
}

/// Flags shared between the pump thread, the debugger guard and stop callers.
#[derive(Debug)]
pub struct RunState {
    keep_running: AtomicBool,
    debugger_present: AtomicBool,
    /// OS id of the pump thread; 0 while unpublished.
    thread_id: AtomicU32,
    phase: AtomicU8,
    active: AtomicBool,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            keep_running: AtomicBool::new(false),
            debugger_present: AtomicBool::new(false),
            thread_id: AtomicU32::new(0),
            phase: AtomicU8::new(HookState::Idle as u8),
            active: AtomicBool::new(false),
        }
    }

    /// Enters `Starting` and publishes the pump thread id.
    ///
    /// The id is published last: a `stop()` that can see it is guaranteed to
    /// land after `keep_running` was raised.
    pub fn begin(&self, thread_id: u32) {
        self.keep_running.store(true, Ordering::Release);
        self.debugger_present.store(false, Ordering::Release);
        self.set_phase(HookState::Starting);
        self.thread_id.store(thread_id, Ordering::Release);
    }

    fn finish(&self) {
        self.thread_id.store(0, Ordering::Release);
        self.set_phase(HookState::Idle);
        self.active.store(false, Ordering::Release);
    }

    fn try_activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn keep_running(&self) -> bool {
        self.keep_running.load(Ordering::Acquire)
    }

    pub fn request_stop(&self) {
        self.keep_running.store(false, Ordering::Release);
    }

    pub fn debugger_present(&self) -> bool {
        self.debugger_present.load(Ordering::Acquire)
    }

    pub fn set_debugger_present(&self, present: bool) {
        self.debugger_present.store(present, Ordering::Release);
    }

    pub fn thread_id(&self) -> u32 {
        self.thread_id.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> HookState {
        HookState::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: HookState) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Tunables for a hook session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub timestamps: TimestampSource,
    /// Run the debugger guard.
    pub debugger_guard: bool,
    /// Debugger poll interval, also the re-arm check interval while disarmed.
    pub poll_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timestamps: TimestampSource::Native,
            debugger_guard: true,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Requests shutdown of a running [`HookRunner`] from any thread.
pub struct StopHandle<P: Platform> {
    platform: Arc<P>,
    state: Arc<RunState>,
}

impl<P: Platform> Clone for StopHandle<P> {
    fn clone(&self) -> Self {
        Self {
            platform: Arc::clone(&self.platform),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P: Platform> StopHandle<P> {
    /// Clears `keep_running` and posts a quit message to the pump thread.
    ///
    /// Does not wait for the session to end.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::StopSignal`] if the quit message could not be
    /// delivered, including when the pump thread has not published its id
    /// yet.  In that case a `run()` that is still starting up is not aborted.
    pub fn stop(&self) -> Result<(), HookError> {
        self.state.request_stop();

        let thread_id = self.state.thread_id();
        let delivered = thread_id != 0 && self.platform.post_quit(thread_id);
        debug!(thread_id, delivered, "stop requested");

        if delivered {
            Ok(())
        } else {
            Err(HookError::StopSignal)
        }
    }
}

/// Drives a global keyboard/mouse hook session on the calling thread.
pub struct HookRunner<P: Platform> {
    platform: Arc<P>,
    helper: Arc<dyn InputHelper>,
    dispatcher: Arc<dyn Dispatcher>,
    modifiers: Arc<ModifierMask>,
    state: Arc<RunState>,
    options: RunOptions,
}

impl<P: Platform> HookRunner<P> {
    pub fn new(
        platform: Arc<P>,
        helper: Arc<dyn InputHelper>,
        dispatcher: Arc<dyn Dispatcher>,
        options: RunOptions,
    ) -> Self {
        Self {
            platform,
            helper,
            dispatcher,
            modifiers: Arc::new(ModifierMask::new()),
            state: Arc::new(RunState::new()),
            options,
        }
    }

    pub fn state(&self) -> HookState {
        self.state.phase()
    }

    /// The modifier mask maintained by the hook callbacks.
    pub fn modifiers(&self) -> Arc<ModifierMask> {
        Arc::clone(&self.modifiers)
    }

    pub fn stop_handle(&self) -> StopHandle<P> {
        StopHandle {
            platform: Arc::clone(&self.platform),
            state: Arc::clone(&self.state),
        }
    }

    /// See [`StopHandle::stop`].
    pub fn stop(&self) -> Result<(), HookError> {
        self.stop_handle().stop()
    }

    /// Runs a hook session until [`stop`](Self::stop) is called or the pump ends.
    ///
    /// Returns `Ok(())` if the hooks were armed at least once.
    ///
    /// # Errors
    ///
    /// - [`HookError::ModuleHandle`] if the module handle cannot be resolved.
    /// - Whatever [`InputHelper::load`] returned.
    /// - [`HookError::ThreadCreate`] if the debugger guard cannot be spawned.
    /// - [`HookError::KeyboardHookInstallFailed`] / [`HookError::MouseHookInstallFailed`].
    /// - [`HookError::AlreadyRunning`] if this runner is already in `run()`.
    pub fn run(&self) -> Result<(), HookError> {
        if !self.state.try_activate() {
            return Err(HookError::AlreadyRunning);
        }

        let result = self.run_session();
        self.state.finish();

        match &result {
            Ok(()) => info!("hook session ended"),
            Err(e) => error!("hook session failed: {e}"),
        }
        result
    }

    fn run_session(&self) -> Result<(), HookError> {
        self.state.begin(self.platform.current_thread_id());

        self.platform.resolve_module()?;

        if let Err(e) = self.helper.load() {
            self.helper.unload();
            return Err(e);
        }

        let guard = if self.options.debugger_guard {
            match DebuggerGuard::spawn(
                Arc::clone(&self.platform),
                Arc::clone(&self.state),
                self.options.poll_interval,
            ) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    self.helper.unload();
                    return Err(e);
                }
            }
        } else {
            None
        };

        let translator = Arc::new(EventTranslator::new(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.modifiers),
            self.options.timestamps,
        ));
        self.platform.bind_translator(translator);

        let mut registry = HookRegistry::new(Arc::clone(&self.platform));
        let status = self.supervise(&mut registry);

        // Teardown order: guard, hooks, helper.
        self.state.set_phase(HookState::Stopping);
        self.state.request_stop();
        if let Some(guard) = guard {
            guard.join();
        }

        let was_armed = registry.is_registered();
        registry.unregister();
        if was_armed {
            self.dispatcher.hook_disabled(self.lifecycle_timestamp());
        }

        self.platform.unbind_translator();
        self.helper.unload();

        status
    }

    /// The outer arm/disarm loop.
    fn supervise(&self, registry: &mut HookRegistry<P>) -> Result<(), HookError> {
        let mut status = Err(HookError::Failure("hooks were never armed".to_string()));

        while self.state.keep_running() {
            if self.state.debugger_present() {
                thread::sleep(self.options.poll_interval);
                continue;
            }

            registry.register()?;
            status = Ok(());
            self.state.set_phase(HookState::Armed);
            debug!("hooks registered successfully");

            // The OS has no hook-start notification, so the event is synthesized here.
            self.dispatcher.hook_enabled(self.lifecycle_timestamp());

            let pumped = self.pump();

            if self.state.debugger_present() {
                registry.unregister();
                self.dispatcher.hook_disabled(self.lifecycle_timestamp());
                self.state.set_phase(HookState::Disarmed);
                warn!("debugger detected, hooks unregistered");
            } else {
                if pumped == PumpStatus::Failed {
                    error!("message retrieval failed, ending hook session");
                }
                break;
            }
        }

        status
    }

    /// Pumps until a quit or failure, or until the guard reports a debugger.
    ///
    /// `stop()` clears `keep_running` before posting, so a quit retrieved while
    /// `keep_running` is still set was left over from an earlier disarm or
    /// session and is skipped.
    fn pump(&self) -> PumpStatus {
        loop {
            let status = self.platform.pump_message();
            if self.state.debugger_present() {
                return status;
            }
            match status {
                PumpStatus::Dispatched => {}
                PumpStatus::Quit if self.state.keep_running() => {
                    debug!("skipping stale quit message");
                }
                ended => return ended,
            }
        }
    }

    fn lifecycle_timestamp(&self) -> u64 {
        match self.options.timestamps {
            TimestampSource::Native => self.platform.message_time(),
            TimestampSource::Epoch => epoch_millis(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::platform::{HookKind, MockInputHelper};
    use crate::infrastructure::input_helper::NoopInputHelper;
    use crate::infrastructure::platform::mock::{MockMessage, MockPlatform, MOCK_THREAD_ID};
    use inputhook_core::{KeyboardRecord, MouseRecord, WheelDirection};
    use std::sync::Mutex;
    use std::time::Instant;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct LifecycleRecorder {
        events: Mutex<Vec<&'static str>>,
    }

    impl LifecycleRecorder {
        fn events(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Dispatcher for LifecycleRecorder {
        fn hook_enabled(&self, _timestamp: u64) {
            self.events.lock().unwrap().push("enabled");
        }
        fn hook_disabled(&self, _timestamp: u64) {
            self.events.lock().unwrap().push("disabled");
        }
        fn key_pressed(&self, _: u64, _: &KeyboardRecord) -> bool {
            false
        }
        fn key_released(&self, _: u64, _: &KeyboardRecord) -> bool {
            false
        }
        fn button_pressed(&self, _: u64, _: &MouseRecord, _: u16) -> bool {
            false
        }
        fn button_released(&self, _: u64, _: &MouseRecord, _: u16) -> bool {
            false
        }
        fn mouse_moved(&self, _: u64, _: &MouseRecord) -> bool {
            false
        }
        fn mouse_wheel(&self, _: u64, _: &MouseRecord, _: WheelDirection) -> bool {
            false
        }
    }

    fn options() -> RunOptions {
        RunOptions {
            poll_interval: Duration::from_millis(5),
            ..RunOptions::default()
        }
    }

    fn make_runner(
        platform: &Arc<MockPlatform>,
        helper: Arc<dyn InputHelper>,
    ) -> (HookRunner<MockPlatform>, Arc<LifecycleRecorder>) {
        let recorder = Arc::new(LifecycleRecorder::default());
        let runner = HookRunner::new(
            Arc::clone(platform),
            helper,
            Arc::clone(&recorder) as Arc<dyn Dispatcher>,
            options(),
        );
        (runner, recorder)
    }

    fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        cond()
    }

    // ── Startup failures ──────────────────────────────────────────────────────

    #[test]
    fn test_module_resolution_failure_aborts_before_helper_load() {
        // Arrange
        let platform = Arc::new(MockPlatform::new());
        platform.fail_module_resolution();
        let mut helper = MockInputHelper::new();
        helper.expect_load().times(0);
        helper.expect_unload().times(0);
        let (runner, recorder) = make_runner(&platform, Arc::new(helper));

        // Act
        let result = runner.run();

        // Assert
        assert!(matches!(result, Err(HookError::ModuleHandle(_))));
        assert_eq!(platform.install_calls(), 0);
        assert!(recorder.events().is_empty());
        assert_eq!(runner.state(), HookState::Idle);
    }

    #[test]
    fn test_helper_status_is_propagated_and_helper_unloaded() {
        let platform = Arc::new(MockPlatform::new());
        let mut helper = MockInputHelper::new();
        helper.expect_load().times(1).returning(|| {
            Err(HookError::InputHelper {
                code: 0x22,
                reason: "no keyboard layout".to_string(),
            })
        });
        helper.expect_unload().times(1).return_const(());
        let (runner, _) = make_runner(&platform, Arc::new(helper));

        let result = runner.run();

        match result {
            Err(e) => assert_eq!(e.status(), 0x22),
            Ok(()) => panic!("run should fail"),
        }
        assert_eq!(platform.install_calls(), 0);
    }

    #[test]
    fn test_registration_failure_tears_down_partial_install() {
        // Arrange
        let platform = Arc::new(MockPlatform::new());
        platform.fail_install(HookKind::Mouse);
        let mut helper = MockInputHelper::new();
        helper.expect_load().times(1).returning(|| Ok(()));
        helper.expect_unload().times(1).return_const(());
        let (runner, recorder) = make_runner(&platform, Arc::new(helper));

        // Act
        let result = runner.run();

        // Assert
        assert!(matches!(result, Err(HookError::MouseHookInstallFailed(_))));
        assert_eq!(platform.installed_count(), 0);
        assert!(recorder.events().is_empty(), "never armed, no lifecycle events");
        assert!(!platform.translator_bound());
    }

    // ── Stop ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_stop_before_run_fails_without_panicking() {
        let platform = Arc::new(MockPlatform::new());
        let (runner, _) = make_runner(&platform, Arc::new(NoopInputHelper));

        let result = runner.stop();

        assert!(matches!(result, Err(HookError::StopSignal)));
        assert_eq!(platform.quit_posts(), 0);
    }

    #[test]
    fn test_run_then_stop_arms_and_disarms_once() {
        // Arrange
        let platform = Arc::new(MockPlatform::new());
        let (runner, recorder) = make_runner(&platform, Arc::new(NoopInputHelper));
        let runner = Arc::new(runner);
        let worker = {
            let runner = Arc::clone(&runner);
            thread::spawn(move || runner.run())
        };
        assert!(wait_until(Duration::from_secs(2), || runner.state() == HookState::Armed));

        // Act
        runner.stop().expect("stop should deliver the quit message");
        let result = worker.join().expect("runner thread panicked");

        // Assert
        assert!(result.is_ok());
        assert_eq!(recorder.events(), vec!["enabled", "disabled"]);
        assert_eq!(platform.installed_count(), 0);
        assert_eq!(runner.state(), HookState::Idle);
        assert!(matches!(runner.stop(), Err(HookError::StopSignal)));
    }

    #[test]
    fn test_quit_queued_before_run_is_skipped() {
        // Arrange: a quit left over from an earlier session on this thread
        let platform = Arc::new(MockPlatform::new());
        platform.feed(MockMessage::Quit);
        let (runner, recorder) = make_runner(&platform, Arc::new(NoopInputHelper));
        let runner = Arc::new(runner);
        let worker = {
            let runner = Arc::clone(&runner);
            thread::spawn(move || runner.run())
        };
        assert!(wait_until(Duration::from_secs(2), || runner.state() == HookState::Armed));

        // Act
        thread::sleep(Duration::from_millis(30));
        let still_armed = runner.state() == HookState::Armed && !worker.is_finished();
        runner.stop().expect("stop should deliver the quit message");
        let result = worker.join().expect("runner thread panicked");

        // Assert
        assert!(still_armed, "leftover quit ended the session");
        assert!(result.is_ok());
        assert_eq!(recorder.events(), vec!["enabled", "disabled"]);
    }

    #[test]
    fn test_second_concurrent_run_is_rejected() {
        let platform = Arc::new(MockPlatform::new());
        let (runner, _) = make_runner(&platform, Arc::new(NoopInputHelper));
        let runner = Arc::new(runner);
        let worker = {
            let runner = Arc::clone(&runner);
            thread::spawn(move || runner.run())
        };
        assert!(wait_until(Duration::from_secs(2), || runner.state() == HookState::Armed));

        assert!(matches!(runner.run(), Err(HookError::AlreadyRunning)));

        runner.stop().unwrap();
        worker.join().unwrap().unwrap();
    }

    #[test]
    fn test_stop_targets_published_thread_id() {
        let platform = Arc::new(MockPlatform::new());
        let state = Arc::new(RunState::new());
        let handle = StopHandle {
            platform: Arc::clone(&platform),
            state: Arc::clone(&state),
        };

        state.begin(MOCK_THREAD_ID);
        handle.clone().stop().unwrap();

        assert!(!state.keep_running());
        assert_eq!(platform.quit_posts(), 1);
    }

    // ── RunState ──────────────────────────────────────────────────────────────

    #[test]
    fn test_begin_resets_flags_and_publishes_identity() {
        let state = RunState::new();
        state.set_debugger_present(true);

        state.begin(7);

        assert!(state.keep_running());
        assert!(!state.debugger_present());
        assert_eq!(state.thread_id(), 7);
        assert_eq!(state.phase(), HookState::Starting);
    }
}
