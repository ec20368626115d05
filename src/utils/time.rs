use chrono::{Duration, NaiveTime};

/// Format used for dates in the entries file and accepted from the user.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Format used for times of day in the entries file and accepted from the user.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Same-day span between two times of day. Negative when `end` precedes `start`.
pub fn span_between(start: NaiveTime, end: NaiveTime) -> Duration {
    end - start
}

/// Renders a total as `<H>h <M>m`. Both parts are truncated, never rounded.
pub fn format_hours_minutes(v: Duration) -> String {
    format!("{}h {}m", v.num_hours(), v.num_minutes() % 60)
}

/// Renders a running timer as `HH:MM:SS`.
pub fn format_clock(v: std::time::Duration) -> String {
    let seconds = v.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveTime};

    use super::{format_clock, format_hours_minutes, span_between};

    #[test]
    fn test_format_hours_minutes_truncates() {
        let value = Duration::hours(1) + Duration::minutes(45) + Duration::seconds(59);
        assert_eq!(format_hours_minutes(value), "1h 45m");
        assert_eq!(format_hours_minutes(Duration::seconds(59)), "0h 0m");
        assert_eq!(format_hours_minutes(Duration::hours(26)), "26h 0m");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(std::time::Duration::from_secs(3723)), "01:02:03");
        assert_eq!(format_clock(std::time::Duration::from_millis(999)), "00:00:00");
    }

    #[test]
    fn test_span_between() {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(10, 30, 0).unwrap();
        assert_eq!(span_between(start, end), Duration::minutes(90));
        assert!(span_between(end, start) < Duration::zero());
    }
}
