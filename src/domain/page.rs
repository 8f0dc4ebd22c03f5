use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A crawled page, keyed by the URL it was originally requested under.
///
/// Distinct origin URLs may redirect to the same canonical page, so
/// `origin_url` (not `resolved_url`) is the identity. A page with a 2xx
/// `http_status` is considered done; anything else is retryable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub origin_url: String,
    pub resolved_url: Option<String>,
    pub http_status: Option<u16>,

    // Feed-entry metadata, filled in when the page was discovered via a feed.
    pub entry_title: Option<String>,
    pub entry_summary: Option<String>,
    pub entry_published_at: Option<DateTime<Utc>>,
    pub entry_tickers: Vec<String>,
    pub feed_urls: Vec<String>,

    // Extracted article content.
    pub article_title: Option<String>,
    pub article_text: Option<String>,
    pub article_published_at: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,

    pub created_at: DateTime<Utc>,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl Page {
    pub fn new(origin_url: impl Into<String>) -> Self {
        Self {
            origin_url: origin_url.into(),
            resolved_url: None,
            http_status: None,
            entry_title: None,
            entry_summary: None,
            entry_published_at: None,
            entry_tickers: Vec::new(),
            feed_urls: Vec::new(),
            article_title: None,
            article_text: None,
            article_published_at: None,
            keywords: Vec::new(),
            created_at: Utc::now(),
            fetched_at: None,
        }
    }

    /// A record holding only transport metadata, persisted when the fetch
    /// came back with a non-2xx status so the failure is visible to
    /// scan-based re-seeding.
    pub fn partial(
        origin_url: impl Into<String>,
        resolved_url: impl Into<String>,
        http_status: u16,
    ) -> Self {
        let mut page = Self::new(origin_url);
        page.resolved_url = Some(resolved_url.into());
        page.http_status = Some(http_status);
        page.fetched_at = Some(Utc::now());
        page
    }

    /// True when the page was fetched and the server answered 2xx.
    pub fn is_done(&self) -> bool {
        matches!(self.http_status, Some(s) if (200..300).contains(&s))
    }

    /// Add a ticker label without duplicating existing ones.
    pub fn add_ticker(&mut self, ticker: &str) {
        if !self.entry_tickers.iter().any(|t| t == ticker) {
            self.entry_tickers.push(ticker.to_string());
        }
    }

    /// Record which feed this page was discovered through.
    pub fn add_feed_url(&mut self, feed_url: &str) {
        if !self.feed_urls.iter().any(|u| u == feed_url) {
            self.feed_urls.push(feed_url.to_string());
        }
    }
}
