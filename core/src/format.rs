//! Display formatting for sizes and timestamps.

use chrono::{DateTime, Utc};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte size with two decimals, e.g. `2.40 MB`
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, SIZE_UNITS[unit])
}

/// Absolute upload time, e.g. `Jan 5, 2024, 09:30 AM`
pub fn format_upload_datetime(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "Unknown".to_string(),
    }
}

/// Age of `ts` relative to `now`: minutes, hours, days, then weeks; after
/// thirty days the calendar date.
pub fn format_relative(ts: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(ts) = ts else {
        return "Unknown".to_string();
    };
    let diff = now.signed_duration_since(ts);
    let mins = diff.num_minutes().max(0);
    let hours = diff.num_hours().max(0);
    let days = diff.num_days().max(0);

    if mins < 60 {
        plural(mins, "minute")
    } else if hours < 24 {
        plural(hours, "hour")
    } else if days < 7 {
        plural(days, "day")
    } else if days < 30 {
        plural(days / 7, "week")
    } else {
        ts.format("%-m/%-d/%Y").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
