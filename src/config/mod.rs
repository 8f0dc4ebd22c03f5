//! Crawler configuration.
//!
//! Loaded from a TOML file when one is given; every field has a default so
//! a missing or sparse file works. The feed intervals bound the adaptive
//! estimator, and `loop_every_secs` absent means "run one cycle and exit".

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::app::{Result, TickertapeError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Concurrent workers draining the frontier.
    pub workers: usize,
    /// Cycle period in seconds; absent runs a single cycle.
    pub loop_every_secs: Option<u64>,
    /// Delay after each live fetch.
    pub throttle_secs: u64,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Bypass dedup and cache, refetching everything.
    pub force_refetch: bool,
    /// Cap on seeds enqueued per cycle.
    pub max_seeds: Option<usize>,
    pub proxy: ProxyConfig,
    pub feed: FeedConfig,
    pub db_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    /// Where to write each cycle's failed-URL list.
    pub error_report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub enabled: bool,
    /// File of `host:port:user:pass` endpoints, one per line.
    pub list_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Interval when the batch gives no cadence signal.
    pub default_interval_secs: i64,
    /// Upper bound on the estimated interval.
    pub max_interval_secs: i64,
    /// Lower bound, so same-timestamp batches can't yield zero.
    pub min_interval_secs: i64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            loop_every_secs: None,
            throttle_secs: 3,
            timeout_secs: 60,
            force_refetch: false,
            max_seeds: None,
            proxy: ProxyConfig::default(),
            feed: FeedConfig::default(),
            db_path: None,
            cache_path: None,
            error_report_path: None,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            list_path: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            // Two days, matching how rarely a dead ticker feed publishes.
            default_interval_secs: 172_800,
            max_interval_secs: 172_800,
            min_interval_secs: 60,
        }
    }
}

impl CrawlConfig {
    /// Loads from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = fs::read_to_string(path).map_err(|e| {
            TickertapeError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content).map_err(|e| {
            TickertapeError::Config(format!("Cannot parse {}: {}", path.display(), e))
        })?;

        Ok(config)
    }
}
