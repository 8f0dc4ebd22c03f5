use chrono::{DateTime, Utc};

/// Next poll interval in seconds, derived from the publish timestamps of the
/// feed's current entry batch (sorted ascending).
///
/// A single entry tells us nothing about cadence, so the configured default
/// applies. With two or more, the batch spread divided by three polls the
/// feed faster than its observed publication rate, capped by `ceiling_secs`
/// so bursty feeds aren't hammered and floored by `floor_secs` so identical
/// timestamps can't produce a zero interval.
pub fn poll_interval(
    stamps: &[DateTime<Utc>],
    default_secs: i64,
    ceiling_secs: i64,
    floor_secs: i64,
) -> i64 {
    match stamps {
        [] | [_] => default_secs,
        [first, .., last] => {
            let spread = (*last - *first).num_seconds();
            (spread / 3).min(ceiling_secs).max(floor_secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn stamps(offsets_secs: &[i64]) -> Vec<DateTime<Utc>> {
        let base = Utc::now();
        offsets_secs
            .iter()
            .map(|&s| base + Duration::seconds(s))
            .collect()
    }

    #[test]
    fn test_single_entry_uses_default() {
        assert_eq!(poll_interval(&stamps(&[0]), 3600, 7200, 60), 3600);
    }

    #[test]
    fn test_empty_batch_uses_default() {
        assert_eq!(poll_interval(&[], 3600, 7200, 60), 3600);
    }

    #[test]
    fn test_spread_divided_by_three() {
        // Entries at T, T+30s, T+90s: spread 90s, interval 30s.
        assert_eq!(poll_interval(&stamps(&[0, 30, 90]), 3600, 7200, 1), 30);
    }

    #[test]
    fn test_ceiling_caps_slow_feeds() {
        assert_eq!(poll_interval(&stamps(&[0, 86400]), 3600, 7200, 60), 7200);
    }

    #[test]
    fn test_floor_prevents_zero_interval() {
        // All entries share one timestamp.
        assert_eq!(poll_interval(&stamps(&[0, 0, 0]), 3600, 7200, 60), 60);
    }
}
