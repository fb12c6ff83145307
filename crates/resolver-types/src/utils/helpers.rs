//! Helper utilities for timestamps.

/// Current Unix time in milliseconds, 0 if the clock is before the epoch.
pub fn current_timestamp_millis() -> i64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_millis() as i64)
		.unwrap_or(0)
}
