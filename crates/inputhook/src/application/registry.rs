//! HookRegistry: installs and removes the global keyboard and mouse hooks.
//!
//! The registry is owned by the pump thread.  Low-level hooks are bound to
//! the thread that installed them, so it must never be moved to another
//! thread while hooks are registered.

use std::sync::Arc;

use inputhook_core::HookError;
use tracing::{debug, warn};

use super::platform::{HookKind, NativeHook, Platform};

pub struct HookRegistry<P: Platform> {
    platform: Arc<P>,
    keyboard: Option<NativeHook>,
    mouse: Option<NativeHook>,
}

impl<P: Platform> HookRegistry<P> {
    pub fn new(platform: Arc<P>) -> Self {
        Self {
            platform,
            keyboard: None,
            mouse: None,
        }
    }

    /// Installs both hooks.
    ///
    /// Both installs are attempted even if the first fails.  On failure the
    /// hook that did install stays registered; call [`unregister`] to clean up.
    /// A kind whose handle is already set is not installed again.
    ///
    /// [`unregister`]: HookRegistry::unregister
    pub fn register(&mut self) -> Result<(), HookError> {
        let keyboard = Self::install(&self.platform, &mut self.keyboard, HookKind::Keyboard);
        let mouse = Self::install(&self.platform, &mut self.mouse, HookKind::Mouse);
        keyboard.and(mouse)
    }

    /// Removes both hooks.  Safe to call any number of times.
    pub fn unregister(&mut self) {
        for slot in [&mut self.keyboard, &mut self.mouse] {
            if let Some(hook) = slot.take() {
                self.platform.uninstall_hook(hook);
            }
        }
    }

    /// Returns `true` only when both hooks are installed.
    pub fn is_registered(&self) -> bool {
        self.keyboard.is_some() && self.mouse.is_some()
    }

    pub fn keyboard_handle(&self) -> Option<NativeHook> {
        self.keyboard
    }

    pub fn mouse_handle(&self) -> Option<NativeHook> {
        self.mouse
    }

    fn install(
        platform: &P,
        slot: &mut Option<NativeHook>,
        kind: HookKind,
    ) -> Result<(), HookError> {
        if slot.is_some() {
            return Ok(());
        }
        match platform.install_hook(kind) {
            Ok(hook) => {
                debug!(?kind, handle = hook.0, "hook installed");
                *slot = Some(hook);
                Ok(())
            }
            Err(e) => {
                warn!(?kind, "hook installation failed: {e}");
                Err(e)
            }
        }
    }
}

impl<P: Platform> Drop for HookRegistry<P> {
    fn drop(&mut self) {
        self.unregister();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
