//! DebuggerGuard: disarms the hooks while a debugger is attached.
//!
//! A debugger that breaks on the hook thread stalls every input event on the
//! desktop until the OS times the callback out.  The guard polls for a
//! debugger on its own thread and, on attach, records the fact in
//! [`RunState`] and posts a quit message to the pump thread so the runner can
//! remove the hooks.  On detach it only clears the flag; the runner notices
//! and re-arms on its own.
//!
//! The guard never touches hook handles and never blocks on the pump thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use inputhook_core::HookError;
use tracing::{error, info, warn};

use super::platform::Platform;
use super::runner::RunState;

/// Handle to the running guard thread.
pub struct DebuggerGuard {
    handle: JoinHandle<()>,
}

impl DebuggerGuard {
    /// Spawns the poll loop.  It runs until `state.keep_running()` is `false`.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ThreadCreate`] if the thread cannot be spawned.
    pub fn spawn<P: Platform>(
        platform: Arc<P>,
        state: Arc<RunState>,
        interval: Duration,
    ) -> Result<Self, HookError> {
        let handle = thread::Builder::new()
            .name("inputhook-debugger-guard".to_string())
            .spawn(move || poll_debugger(&*platform, &state, interval))
            .map_err(|e| HookError::ThreadCreate(e.to_string()))?;
        Ok(Self { handle })
    }

    /// Wakes the guard from its sleep and waits for it to exit.
    ///
    /// `keep_running` must already be `false`, otherwise this blocks until it is.
    pub fn join(self) {
        self.handle.thread().unpark();
        if self.handle.join().is_err() {
            error!("debugger guard thread panicked");
        }
    }
}

fn poll_debugger<P: Platform>(platform: &P, state: &RunState, interval: Duration) {
    while state.keep_running() {
        let present = platform.debugger_present();
        if present != state.debugger_present() {
            state.set_debugger_present(present);
            if present {
                warn!("debugger detected");
                if !platform.post_quit(state.thread_id()) {
                    warn!(thread_id = state.thread_id(), "could not wake the hook thread");
                }
            } else {
                info!("debugger detached");
            }
        }
        thread::park_timeout(interval);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::platform::mock::{MockPlatform, MOCK_THREAD_ID};
    use std::time::Instant;

    const INTERVAL: Duration = Duration::from_millis(5);

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

    fn running_state() -> Arc<RunState> {
        let state = Arc::new(RunState::new());
        state.begin(MOCK_THREAD_ID);
        state
    }

    #[test]
    fn test_rising_edge_sets_flag_and_posts_quit() {
        // Arrange
        let platform = Arc::new(MockPlatform::new());
        let state = running_state();
        let guard = DebuggerGuard::spawn(Arc::clone(&platform), Arc::clone(&state), INTERVAL)
            .expect("spawn");

        // Act
        platform.set_debugger_present(true);

        // Assert
        assert!(wait_until(Duration::from_secs(2), || state.debugger_present()));
        assert!(wait_until(Duration::from_secs(2), || platform.quit_posts() == 1));

        state.request_stop();
        guard.join();
    }

    #[test]
    fn test_falling_edge_clears_flag_without_posting() {
        let platform = Arc::new(MockPlatform::new());
        let state = running_state();
        let guard =
            DebuggerGuard::spawn(Arc::clone(&platform), Arc::clone(&state), INTERVAL).unwrap();

        platform.set_debugger_present(true);
        assert!(wait_until(Duration::from_secs(2), || state.debugger_present()));
        platform.set_debugger_present(false);
        assert!(wait_until(Duration::from_secs(2), || !state.debugger_present()));

        state.request_stop();
        guard.join();
        assert_eq!(platform.quit_posts(), 1);
    }

    #[test]
    fn test_join_returns_promptly_after_stop() {
        let platform = Arc::new(MockPlatform::new());
        let state = running_state();
        let guard = DebuggerGuard::spawn(
            Arc::clone(&platform),
            Arc::clone(&state),
            Duration::from_secs(30),
        )
        .unwrap();

        let started = Instant::now();
        state.request_stop();
        guard.join();

        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_steady_state_posts_nothing() {
        let platform = Arc::new(MockPlatform::new());
        let state = running_state();
        let guard =
            DebuggerGuard::spawn(Arc::clone(&platform), Arc::clone(&state), INTERVAL).unwrap();

        thread::sleep(INTERVAL * 10);
        state.request_stop();
        guard.join();

        assert_eq!(platform.quit_posts(), 0);
        assert!(!state.debugger_present());
    }
}
