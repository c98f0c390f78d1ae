//! Human-readable sizes and counts for stats summaries.

const SIZE_UNITS: [&str; 9] = ["B", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];
const COUNT_SUFFIXES: [&str; 9] = [" ", "K", "M", "B", "T", "P", "E", "Z", "Y"];

/// Format a byte count with base-1024 units, rounded to two decimals.
///
/// `0` renders as `"0B"`, `1536` as `"1.5 KB"`, `1024` as `"1.0 KB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut exp = 0;
    let mut unit = 1u128;
    while exp < SIZE_UNITS.len() - 1 && u128::from(bytes) >= unit * 1024 {
        unit *= 1024;
        exp += 1;
    }
    let scaled = ((bytes as f64 / unit as f64) * 100.0).round() / 100.0;
    format!("{} {}", trim_float(scaled), SIZE_UNITS[exp])
}

/// Format a count with base-1000 suffixes and one decimal, e.g. `"12.3M"`.
pub fn format_count(count: u64) -> String {
    let mut value = count as f64;
    let mut idx = 0;
    while value >= 1000.0 && idx < COUNT_SUFFIXES.len() - 1 {
        value /= 1000.0;
        idx += 1;
    }
    format!("{value:.1}{}", COUNT_SUFFIXES[idx])
}

// Shortest decimal form, keeping at least one fractional digit.
fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
