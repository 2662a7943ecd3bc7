use std::time::Duration;

/// Formats a duration as seconds with millisecond precision.
///
/// Example output: `"0.148s"`
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{:.3}s", elapsed.as_millis() as f64 / 1000.0)
}

/// Whole milliseconds, saturating at `i64::MAX`.
pub fn elapsed_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_seconds() {
        assert_eq!(format_elapsed(Duration::from_secs(1)), "1.000s");
    }

    #[test]
    fn test_format_with_milliseconds() {
        assert_eq!(format_elapsed(Duration::from_millis(148)), "0.148s");
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_elapsed(Duration::ZERO), "0.000s");
    }

    #[test]
    fn test_sub_millisecond_is_truncated() {
        assert_eq!(format_elapsed(Duration::from_micros(999)), "0.000s");
        assert_eq!(elapsed_millis(Duration::from_micros(1999)), 1);
    }
}
