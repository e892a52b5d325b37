//! Input helper implementations.

use inputhook_core::HookError;
use tracing::debug;

use crate::application::platform::InputHelper;

/// An [`InputHelper`] with no tables to load.
///
/// Suitable when the dispatcher works with raw virtual-key codes and does
/// not need a keycode translation table.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInputHelper;

impl InputHelper for NoopInputHelper {
    fn load(&self) -> Result<(), HookError> {
        debug!("input helper loaded (no-op)");
        Ok(())
    }

    fn unload(&self) {
        debug!("input helper unloaded (no-op)");
    }
}
