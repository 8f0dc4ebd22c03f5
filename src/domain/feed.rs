use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Polling state for one feed, keyed by the feed URL.
///
/// Created on the first poll and mutated on every poll after that; never
/// deleted. `retry_count` resets to zero on a successful poll and
/// `poll_interval_secs` stays within the configured bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedStatus {
    pub feed_url: String,
    pub tag: Option<String>,
    pub poll_interval_secs: i64,
    pub retry_count: i64,
    pub last_fetch_at: Option<DateTime<Utc>>,
    pub last_published_at: Option<DateTime<Utc>>,
}

impl FeedStatus {
    pub fn new(feed_url: impl Into<String>, tag: Option<String>, interval_secs: i64) -> Self {
        Self {
            feed_url: feed_url.into(),
            tag,
            poll_interval_secs: interval_secs,
            retry_count: 0,
            last_fetch_at: None,
            last_published_at: None,
        }
    }

    /// Whether the feed should be polled at `now`. A never-fetched feed is
    /// always due; otherwise the poll interval must have elapsed since the
    /// last attempt (success or failure).
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_fetch_at {
            None => true,
            Some(last) => now >= last + Duration::seconds(self.poll_interval_secs),
        }
    }

    /// Record a successful poll: new interval, retries cleared.
    pub fn record_success(
        &mut self,
        interval_secs: i64,
        last_published_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.poll_interval_secs = interval_secs;
        self.retry_count = 0;
        self.last_fetch_at = Some(now);
        if last_published_at.is_some() {
            self.last_published_at = last_published_at;
        }
    }

    /// Record a failed poll: interval untouched, retry bumped, and the next
    /// attempt deferred until the interval elapses again.
    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.retry_count += 1;
        self.last_fetch_at = Some(now);
    }
}
