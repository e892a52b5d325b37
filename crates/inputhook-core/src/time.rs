//! Timestamp source selection.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Where event timestamps come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// The OS timestamp carried by the event (milliseconds since boot).
    #[default]
    Native,
    /// Wall-clock milliseconds since the Unix epoch, read when the event arrives.
    Epoch,
}

/// Milliseconds since the Unix epoch, or 0 if the clock reads earlier than that.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
