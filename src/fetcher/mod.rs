pub mod http;
pub mod proxy;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpFetcher;
pub use proxy::{ProxyEndpoint, ProxyPool};

/// Raw result of a successful fetch, before any parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub resolved_url: String,
    pub http_status: u16,
    pub body: String,
}

/// The two failure modes a fetch can hit.
///
/// A non-2xx response still tells us where the request landed, which is
/// enough to persist a partial record. A transport failure (timeout, reset,
/// DNS) tells us nothing beyond the original URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {resolved_url}")]
    Status { resolved_url: String, status: u16 },

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

impl From<FetchError> for crate::app::TickertapeError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Status {
                resolved_url,
                status,
            } => crate::app::TickertapeError::ResponseStatus {
                resolved_url,
                status,
            },
            FetchError::Transport(message) => crate::app::TickertapeError::Transport(message),
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
