//! The crawl-orchestration core.
//!
//! A cycle puts every seed on a shared [`WorkQueue`], spawns a bounded pool
//! of workers, and blocks until the frontier drains. Each worker runs the
//! per-item pipeline strictly in order: dedup check, cache-or-live fetch,
//! parser dispatch, persist, follow-up enqueue. Failures are recorded to the
//! cycle's [`ErrorReport`] and never abort sibling items.

pub mod queue;
pub mod report;
pub mod supervisor;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::app::{Result, TickertapeError};
use crate::cache::FetchCache;
use crate::domain::{FetchTarget, Page};
use crate::fetcher::{FetchError, Fetcher};
use crate::parser::ParserRegistry;
use crate::store::Store;

pub use queue::WorkQueue;
pub use report::ErrorReport;
pub use supervisor::Supervisor;

/// Outcome counts for one full drain of the frontier.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub persisted: usize,
    pub skipped: usize,
    pub failed_urls: Vec<String>,
}

impl CycleReport {
    /// Writes the failed URLs out as a one-column CSV for reprocessing.
    pub fn write_failed<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut content = String::from("url\n");
        for url in &self.failed_urls {
            content.push_str(url);
            content.push('\n');
        }
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct Crawler {
    store: Arc<dyn Store>,
    cache: Arc<dyn FetchCache>,
    fetcher: Arc<dyn Fetcher>,
    registry: Arc<ParserRegistry>,
    workers: usize,
    force_refetch: bool,
}

enum Outcome {
    /// Dedup oracle says the page is already done.
    Skipped,
    /// Page persisted; any discovered links come back as new targets.
    Persisted(Vec<FetchTarget>),
}

impl Crawler {
    pub fn new(
        store: Arc<dyn Store>,
        cache: Arc<dyn FetchCache>,
        fetcher: Arc<dyn Fetcher>,
        registry: Arc<ParserRegistry>,
        workers: usize,
    ) -> Self {
        Self {
            store,
            cache,
            fetcher,
            registry,
            workers: workers.max(1),
            force_refetch: false,
        }
    }

    /// Bypass both dedup tiers and fetch everything live.
    pub fn force_refetch(mut self, force: bool) -> Self {
        self.force_refetch = force;
        self
    }

    /// Drains `seeds` (plus any follow-up targets parsers discover) with the
    /// configured number of workers. Returns once the queue is empty and all
    /// in-flight items have finished; workers are stopped cooperatively.
    pub async fn run_cycle(&self, seeds: Vec<FetchTarget>) -> Result<CycleReport> {
        let queue = Arc::new(WorkQueue::new());
        let errors = Arc::new(ErrorReport::new());
        let persisted = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));

        let n_seeds = seeds.len();
        for seed in seeds {
            queue.put(seed).await;
        }
        tracing::info!(seeds = n_seeds, workers = self.workers, "cycle started");

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            let crawler = self.clone();
            let queue = queue.clone();
            let errors = errors.clone();
            let persisted = persisted.clone();
            let skipped = skipped.clone();
            handles.push(tokio::spawn(async move {
                crawler
                    .worker_loop(worker_id, queue, errors, persisted, skipped)
                    .await;
            }));
        }

        queue.join().await;
        queue.close();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker join error: {}", e);
            }
        }

        let report = CycleReport {
            persisted: persisted.load(Ordering::Acquire),
            skipped: skipped.load(Ordering::Acquire),
            failed_urls: errors.export(),
        };
        tracing::info!(
            persisted = report.persisted,
            skipped = report.skipped,
            failed = report.failed_urls.len(),
            "cycle complete"
        );
        Ok(report)
    }

    async fn worker_loop(
        &self,
        worker_id: usize,
        queue: Arc<WorkQueue<FetchTarget>>,
        errors: Arc<ErrorReport>,
        persisted: Arc<AtomicUsize>,
        skipped: Arc<AtomicUsize>,
    ) {
        while let Some(target) = queue.get().await {
            match self.process(&target).await {
                Ok(Outcome::Skipped) => {
                    skipped.fetch_add(1, Ordering::AcqRel);
                }
                Ok(Outcome::Persisted(followups)) => {
                    persisted.fetch_add(1, Ordering::AcqRel);
                    for followup in followups {
                        queue.put(followup).await;
                    }
                    tracing::info!(worker = worker_id, url = %target.url, "scraped");
                }
                Err(e) => {
                    tracing::error!(worker = worker_id, url = %target.url, error = %e, "scrape failed");
                    errors.record(&target.url);
                }
            }
            queue.task_done();
        }
    }

    /// The per-item pipeline. Steps are strictly sequential for one target;
    /// nothing here holds shared state across an await point.
    async fn process(&self, target: &FetchTarget) -> Result<Outcome> {
        // Tier 1: skip entirely when a successful record already exists.
        if !self.force_refetch {
            if let Some(existing) = self.store.get_page(&target.url)? {
                if existing.is_done() {
                    tracing::debug!(url = %target.url, "already scraped, skipping");
                    return Ok(Outcome::Skipped);
                }
            }
        }

        // Tier 2: reuse the memoized raw body; parse + persist still run so
        // parser changes take effect without refetching.
        let cached = if self.force_refetch {
            None
        } else {
            self.cache.get(&target.url)?
        };

        let fetched = match cached {
            Some(hit) => {
                tracing::debug!(url = %target.url, "fetch cache hit");
                hit
            }
            None => match self.fetcher.fetch(&target.url).await {
                Ok(fetched) => {
                    self.cache.set(&target.url, &fetched)?;
                    fetched
                }
                Err(FetchError::Status {
                    resolved_url,
                    status,
                }) => {
                    // The failure is still worth a record: scan-based
                    // re-seeding picks it up next cycle.
                    let mut partial = Page::partial(&target.url, &resolved_url, status);
                    if let Some(tag) = &target.tag {
                        partial.add_ticker(tag);
                    }
                    self.store.upsert_page(&partial)?;
                    return Err(TickertapeError::ResponseStatus {
                        resolved_url,
                        status,
                    });
                }
                Err(FetchError::Transport(message)) => {
                    return Err(TickertapeError::Transport(message));
                }
            },
        };

        let parser = self.registry.dispatch(&target.url);
        let pages = parser.parse(
            &target.url,
            &fetched.resolved_url,
            fetched.http_status,
            &fetched.body,
        )?;

        let mut followups = Vec::new();
        for mut page in pages {
            if let Some(tag) = &target.tag {
                page.add_ticker(tag);
            }
            if page.origin_url != target.url {
                followups.push(FetchTarget {
                    url: page.origin_url.clone(),
                    tag: target.tag.clone(),
                });
            }
            self.store.upsert_page(&page)?;
        }

        Ok(Outcome::Persisted(followups))
    }
}
