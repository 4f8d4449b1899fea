//! Human-readable formatting helpers.

use chrono::{DateTime, Utc};

/// "just now", "5m ago", "3h ago", "2d ago", or a date for anything older
/// than a month.
pub fn format_relative_time(time: DateTime<Utc>) -> String {
    format_relative_time_from(time, Utc::now())
}

fn format_relative_time_from(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);

    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 30 {
        format!("{}d ago", elapsed.num_days())
    } else {
        time.format("%Y-%m-%d").to_string()
    }
}

/// Attachment sizes: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_time_from(now, now), "just now");
        assert_eq!(
            format_relative_time_from(now - Duration::minutes(5), now),
            "5m ago"
        );
        assert_eq!(
            format_relative_time_from(now - Duration::hours(3), now),
            "3h ago"
        );
        assert_eq!(
            format_relative_time_from(now - Duration::days(2), now),
            "2d ago"
        );
    }

    #[test]
    fn old_times_show_a_date() {
        let now = Utc::now();
        let then = now - Duration::days(90);
        assert_eq!(
            format_relative_time_from(then, now),
            then.format("%Y-%m-%d").to_string()
        );
    }

    #[test]
    fn byte_sizes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(2 * 1024 * 1024), "2.0 MB");
    }
}
