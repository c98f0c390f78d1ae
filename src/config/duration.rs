//! Duration parsing for command-line flags.

use std::time::Duration;

/// Parse a duration such as `"1h"`, `"30m"`, `"300s"` or `"300"`.
///
/// A bare number is taken as seconds. Millisecond values are accepted with
/// the `ms` suffix.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Empty duration string".to_string());
    }

    let parse = |num: &str, unit: &str| -> Result<u64, String> {
        num.trim()
            .parse::<u64>()
            .map_err(|e| format!("Invalid {unit} value '{num}': {e}"))
    };

    if let Some(num) = s.strip_suffix("ms") {
        return Ok(Duration::from_millis(parse(num, "milliseconds")?));
    }
    let scaled = |num: &str, unit: &str, factor: u64| -> Result<Duration, String> {
        parse(num, unit)?
            .checked_mul(factor)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("Duration '{s}' is too large"))
    };

    if let Some(num) = s.strip_suffix('h') {
        return scaled(num, "hours", 3600);
    }
    if let Some(num) = s.strip_suffix('m') {
        return scaled(num, "minutes", 60);
    }
    if let Some(num) = s.strip_suffix('s') {
        return Ok(Duration::from_secs(parse(num, "seconds")?));
    }

    Ok(Duration::from_secs(parse(s, "duration")?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units() {
        assert_eq!(parse_duration("300").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("300s").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration(" 5s ").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("1d").is_err());
    }

    #[test]
    fn test_overflow_is_an_error() {
        let huge = format!("{}h", u64::MAX / 60);
        assert!(parse_duration(&huge).unwrap_err().contains("too large"));
        assert!(parse_duration(&format!("{}m", u64::MAX)).is_err());
        assert_eq!(
            parse_duration(&format!("{}s", u64::MAX)).unwrap(),
            Duration::from_secs(u64::MAX)
        );
    }
}
