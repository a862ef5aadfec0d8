use std::time::Duration;

/// Whole milliseconds of `d`, clamped to `u64::MAX`.
#[inline]
pub(crate) fn as_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
