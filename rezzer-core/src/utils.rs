//! Formatting helpers for reports and the terminal summary.

use std::time::Duration;

const BYTE_UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

/// Elapsed time as `HH:MM:SS`, truncated to whole seconds.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let elapsed = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        elapsed / 3600,
        elapsed / 60 % 60,
        elapsed % 60
    )
}

/// Size in binary units with two decimals, plain bytes below 1 KiB.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, BYTE_UNITS[unit])
}
