//! Adaptive feed polling.
//!
//! Feed-type targets aren't drained like page targets: each feed carries a
//! persistent [`FeedStatus`] whose poll interval is re-estimated from the
//! cadence of the entries it publishes. The due-gate (`now >= last fetch +
//! interval`) is evaluated before a poll task is ever spawned, so a feed
//! that isn't due costs nothing.

pub mod estimator;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use feed_rs::parser;
use html_escape::decode_html_entities;
use tokio::sync::Semaphore;

use crate::app::{Result, TickertapeError};
use crate::config::FeedConfig;
use crate::crawler::ErrorReport;
use crate::domain::{FeedStatus, FetchTarget, Page};
use crate::fetcher::Fetcher;
use crate::store::Store;

pub use estimator::poll_interval;

/// One normalized feed entry, enough to seed a page record.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub link: String,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Outcome counts for one polling pass over the feed list.
#[derive(Debug, Clone)]
pub struct FeedCycleReport {
    pub polled: usize,
    pub deferred: usize,
    pub entries: usize,
    pub failed_urls: Vec<String>,
}

#[derive(Clone)]
pub struct FeedPoller {
    store: Arc<dyn Store>,
    fetcher: Arc<dyn Fetcher>,
    config: FeedConfig,
    workers: usize,
    force_fetch: bool,
}

impl FeedPoller {
    pub fn new(
        store: Arc<dyn Store>,
        fetcher: Arc<dyn Fetcher>,
        config: FeedConfig,
        workers: usize,
    ) -> Self {
        Self {
            store,
            fetcher,
            config,
            workers: workers.max(1),
            force_fetch: false,
        }
    }

    /// Poll even feeds that aren't due yet.
    pub fn force_fetch(mut self, force: bool) -> Self {
        self.force_fetch = force;
        self
    }

    /// Polls every due feed in `seeds` concurrently, bounded by the worker
    /// count. Feeds that aren't due are deferred, not queued.
    pub async fn run_cycle(&self, seeds: Vec<FetchTarget>) -> Result<FeedCycleReport> {
        let now = Utc::now();
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let errors = Arc::new(ErrorReport::new());

        let mut deferred = 0;
        let mut handles = Vec::new();

        for seed in seeds {
            // A store read failing for one feed must not take the cycle
            // down with it; record and move on to the next seed.
            let status = match self.store.get_feed_status(&seed.url) {
                Ok(Some(status)) => status,
                Ok(None) => FeedStatus::new(
                    &seed.url,
                    seed.tag.clone(),
                    self.config.default_interval_secs,
                ),
                Err(e) => {
                    tracing::error!(feed = %seed.url, error = %e, "feed status read failed");
                    errors.record(&seed.url);
                    continue;
                }
            };

            if !self.force_fetch && !status.is_due(now) {
                tracing::debug!(feed = %seed.url, "not due yet, deferred");
                deferred += 1;
                continue;
            }

            let poller = self.clone();
            let semaphore = semaphore.clone();
            let errors = errors.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("Semaphore closed");
                match poller.poll_feed(status).await {
                    Ok(entries) => Some(entries),
                    Err(e) => {
                        tracing::error!(feed = %seed.url, error = %e, "feed poll failed");
                        errors.record(&seed.url);
                        None
                    }
                }
            }));
        }

        let mut polled = 0;
        let mut entries = 0;
        for handle in handles {
            match handle.await {
                Ok(Some(count)) => {
                    polled += 1;
                    entries += count;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!("Task join error: {}", e);
                }
            }
        }

        let report = FeedCycleReport {
            polled,
            deferred,
            entries,
            failed_urls: errors.export(),
        };
        tracing::info!(
            polled = report.polled,
            deferred = report.deferred,
            entries = report.entries,
            failed = report.failed_urls.len(),
            "feed cycle complete"
        );
        Ok(report)
    }

    /// Fetches and parses one feed, updating its status either way.
    ///
    /// Success re-estimates the interval and clears retries; failure (fetch
    /// error or an entryless feed) bumps the retry count, leaves the
    /// interval alone, and still moves `last_fetch_at` so the next attempt
    /// waits out the interval instead of retrying immediately.
    async fn poll_feed(&self, mut status: FeedStatus) -> Result<usize> {
        let feed_url = status.feed_url.clone();

        let entries = match self.fetch_entries(&feed_url).await {
            Ok(entries) => entries,
            Err(e) => {
                status.record_failure(Utc::now());
                self.store.upsert_feed_status(&status)?;
                return Err(e);
            }
        };

        let mut stamps: Vec<DateTime<Utc>> =
            entries.iter().filter_map(|e| e.published_at).collect();
        stamps.sort();

        let interval = poll_interval(
            &stamps,
            self.config.default_interval_secs,
            self.config.max_interval_secs,
            self.config.min_interval_secs,
        );
        status.record_success(interval, stamps.last().copied(), Utc::now());
        self.store.upsert_feed_status(&status)?;

        for entry in &entries {
            self.upsert_entry_stub(entry, &status)?;
        }

        tracing::info!(
            feed = %feed_url,
            entries = entries.len(),
            interval_secs = interval,
            "feed polled"
        );
        Ok(entries.len())
    }

    async fn fetch_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let fetched = self.fetcher.fetch(feed_url).await?;

        let feed = parser::parse(fetched.body.as_bytes())
            .map_err(|e| TickertapeError::FeedParse(e.to_string()))?;

        let entries: Vec<FeedEntry> = feed
            .entries
            .into_iter()
            .filter_map(|entry| {
                let link = entry.links.first().map(|l| l.href.clone())?;
                Some(FeedEntry {
                    link,
                    title: entry
                        .title
                        .map(|t| decode_html_entities(&t.content).to_string()),
                    summary: entry
                        .summary
                        .map(|s| decode_html_entities(&s.content).to_string()),
                    published_at: entry
                        .published
                        .or(entry.updated)
                        .map(|dt| dt.with_timezone(&Utc)),
                })
            })
            .collect();

        if entries.is_empty() {
            return Err(TickertapeError::NoEntries(feed_url.to_string()));
        }

        Ok(entries)
    }

    /// Creates or refreshes the page record for a feed entry without
    /// fetching it; the page crawl picks it up as a pending target. The
    /// store merges ticker and feed-url sets on upsert, so concurrent
    /// feeds sharing an entry link never lose each other's labels.
    fn upsert_entry_stub(&self, entry: &FeedEntry, status: &FeedStatus) -> Result<()> {
        let mut page = Page::new(&entry.link);
        page.entry_title = entry.title.clone();
        page.entry_summary = entry.summary.clone();
        page.entry_published_at = entry.published_at;
        if let Some(tag) = &status.tag {
            page.add_ticker(tag);
        }
        page.add_feed_url(&status.feed_url);

        self.store.upsert_page(&page)
    }
}
