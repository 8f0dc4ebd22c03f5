//! Durable memo of raw fetch results.
//!
//! Keyed by the original request URL, never the resolved one, because
//! distinct origin URLs may redirect to the same canonical page. Entries are
//! written unconditionally on every live fetch success and never expire
//! in-core, so parser logic can be re-run over cached bodies without touching
//! the network.

pub mod sqlite;

use crate::app::Result;
use crate::fetcher::FetchedPage;

pub use sqlite::SqliteCache;

pub trait FetchCache: Send + Sync {
    fn get(&self, url: &str) -> Result<Option<FetchedPage>>;
    fn set(&self, url: &str, fetched: &FetchedPage) -> Result<()>;
}
