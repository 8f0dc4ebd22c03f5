pub mod sqlite;

use crate::app::Result;
use crate::domain::{FeedStatus, Page};

pub use sqlite::SqliteStore;

/// Persistence contract for crawled pages and feed polling state.
///
/// Upserts are keyed by origin URL, so concurrent workers writing the same
/// page are naturally idempotent.
pub trait Store: Send + Sync {
    // Page operations
    fn get_page(&self, origin_url: &str) -> Result<Option<Page>>;
    fn upsert_page(&self, page: &Page) -> Result<()>;

    /// Origin URLs that have never been fetched successfully, optionally
    /// narrowed to URLs containing a domain substring.
    fn scan_pending(&self, domain: Option<&str>) -> Result<Vec<String>>;

    // Feed operations
    fn get_feed_status(&self, feed_url: &str) -> Result<Option<FeedStatus>>;
    fn upsert_feed_status(&self, status: &FeedStatus) -> Result<()>;
    fn all_feed_statuses(&self) -> Result<Vec<FeedStatus>>;
}
