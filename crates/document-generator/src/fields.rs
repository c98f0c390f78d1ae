//! Value generators for individual document attributes.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// Upper bound of the large random identifiers embedded in generated records.
pub const MAX_RANDOM_ID: u64 = 922_337_203_685_477_580;

/// Format used for every timestamp attribute.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Years covered by the timestamp window, starting at the Unix epoch.
const WINDOW_YEARS: i64 = 54;

/// Start and end of the window timestamps are drawn from.
pub fn timestamp_window() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = DateTime::<Utc>::UNIX_EPOCH;
    (start, start + Duration::days(365 * WINDOW_YEARS))
}

/// A timestamp drawn uniformly from the window, formatted with [`TIMESTAMP_FORMAT`].
pub fn random_timestamp<R: Rng>(rng: &mut R) -> String {
    let (start, end) = timestamp_window();
    let secs = rng.random_range(start.timestamp()..end.timestamp());
    let dt = DateTime::from_timestamp(secs, 0).unwrap_or(start);
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// Random identifier in `0..=MAX_RANDOM_ID`.
pub fn random_id<R: Rng>(rng: &mut R) -> u64 {
    rng.random_range(0..=MAX_RANDOM_ID)
}

/// Random single digit in `0..=max`.
pub fn digit<R: Rng>(rng: &mut R, max: u32) -> u32 {
    rng.random_range(0..=max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDateTime};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_window_spans_54_years_of_365_days() {
        let (start, end) = timestamp_window();
        assert_eq!(start.year(), 1970);
        assert_eq!((end - start).num_days(), 365 * 54);
    }

    #[test]
    fn test_random_timestamp_in_window() {
        let mut rng = StdRng::seed_from_u64(42);
        let (start, end) = timestamp_window();
        for _ in 0..200 {
            let ts = random_timestamp(&mut rng);
            let parsed = NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT)
                .unwrap()
                .and_utc();
            assert!(parsed >= start && parsed < end, "{ts} outside window");
        }
    }

    #[test]
    fn test_random_id_deterministic() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        assert_eq!(random_id(&mut a), random_id(&mut b));
    }
}
