use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{Result, TickertapeError};
use crate::cache::{FetchCache, SqliteCache};
use crate::config::CrawlConfig;
use crate::crawler::Crawler;
use crate::feed::FeedPoller;
use crate::fetcher::{Fetcher, HttpFetcher, ProxyPool};
use crate::parser::ParserRegistry;
use crate::store::{SqliteStore, Store};

/// Wires the crawl components together from one configuration.
pub struct AppContext {
    pub config: CrawlConfig,
    pub store: Arc<dyn Store>,
    pub cache: Arc<dyn FetchCache>,
    pub fetcher: Arc<dyn Fetcher>,
    pub registry: Arc<ParserRegistry>,
}

impl AppContext {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let db_path = match &config.db_path {
            Some(p) => p.clone(),
            None => Self::default_data_path("tickertape.db")?,
        };
        let cache_path = match &config.cache_path {
            Some(p) => p.clone(),
            None => Self::default_data_path("cache.db")?,
        };

        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&db_path)?);
        let cache: Arc<dyn FetchCache> = Arc::new(SqliteCache::new(&cache_path)?);

        Ok(Self {
            fetcher: Self::build_fetcher(&config)?,
            registry: Arc::new(ParserRegistry::with_default_sites()),
            store,
            cache,
            config,
        })
    }

    /// Everything in memory; used by tests and dry runs.
    pub fn in_memory(config: CrawlConfig) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory()?);
        let cache: Arc<dyn FetchCache> = Arc::new(SqliteCache::in_memory()?);

        Ok(Self {
            fetcher: Self::build_fetcher(&config)?,
            registry: Arc::new(ParserRegistry::with_default_sites()),
            store,
            cache,
            config,
        })
    }

    fn build_fetcher(config: &CrawlConfig) -> Result<Arc<dyn Fetcher>> {
        let mut fetcher = HttpFetcher::new(config.timeout_secs, config.throttle_secs);

        if config.proxy.enabled {
            let path = config.proxy.list_path.as_ref().ok_or_else(|| {
                TickertapeError::Config("proxy.enabled requires proxy.list_path".into())
            })?;
            fetcher = fetcher.with_proxies(ProxyPool::from_path(path)?);
        }

        Ok(Arc::new(fetcher))
    }

    pub fn crawler(&self, workers: usize) -> Crawler {
        Crawler::new(
            self.store.clone(),
            self.cache.clone(),
            self.fetcher.clone(),
            self.registry.clone(),
            workers,
        )
        .force_refetch(self.config.force_refetch)
    }

    pub fn feed_poller(&self, workers: usize) -> FeedPoller {
        FeedPoller::new(
            self.store.clone(),
            self.fetcher.clone(),
            self.config.feed.clone(),
            workers,
        )
        .force_fetch(self.config.force_refetch)
    }

    fn default_data_path(file: &str) -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| TickertapeError::Config("Could not find data directory".into()))?;
        let dir = data_dir.join("tickertape");
        std::fs::create_dir_all(&dir)?;
        Ok(dir.join(file))
    }
}
