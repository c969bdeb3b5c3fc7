use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the epoch, truncated to the frame header's 32-bit field.
/// Informational only (§4.1: the timestamp does not participate in the
/// checksum).
#[must_use]
pub fn wire_timestamp() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
