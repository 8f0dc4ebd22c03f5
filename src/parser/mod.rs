//! Per-domain parser dispatch.
//!
//! The registry holds an ordered list of (domain substring, parser) pairs.
//! `dispatch` walks them in registration order and returns the first match,
//! falling back to [`DefaultParser`] so every URL gets at least title and
//! keyword extraction.

pub mod default;
pub mod sites;

use std::sync::Arc;

use crate::app::Result;
use crate::domain::Page;

pub use default::DefaultParser;

/// Structured-field extraction for one fetched page.
///
/// Implementations return zero, one, or many records: an article page yields
/// the article itself, an index page yields one stub record per discovered
/// link. Records other than the origin are enqueued as follow-up targets.
pub trait PageParser: Send + Sync {
    fn parse(
        &self,
        origin_url: &str,
        resolved_url: &str,
        http_status: u16,
        body: &str,
    ) -> Result<Vec<Page>>;
}

pub struct ParserRegistry {
    parsers: Vec<(String, Arc<dyn PageParser>)>,
    fallback: Arc<dyn PageParser>,
}

impl ParserRegistry {
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
            fallback: Arc::new(DefaultParser),
        }
    }

    /// The stock registry: every site parser the crawler ships with.
    pub fn with_default_sites() -> Self {
        let mut registry = Self::new();
        registry.register("cnbc.com", Arc::new(sites::cnbc::CnbcParser));
        registry.register("finance.yahoo.com", Arc::new(sites::yahoo::YahooParser));
        registry
    }

    pub fn register(&mut self, domain: impl Into<String>, parser: Arc<dyn PageParser>) {
        self.parsers.push((domain.into(), parser));
    }

    /// First registered matcher whose domain substring occurs in the URL;
    /// registration order is the precedence order.
    pub fn dispatch(&self, url: &str) -> Arc<dyn PageParser> {
        for (domain, parser) in &self.parsers {
            if url.contains(domain.as_str()) {
                return parser.clone();
            }
        }
        self.fallback.clone()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
