//! Seed-list loading.
//!
//! Seeds come from a delimited `url,tag` file (one target per line, header
//! and `#` comments tolerated) or from a store scan over pages that never
//! fetched successfully.

use std::path::Path;

use crate::app::Result;
use crate::domain::FetchTarget;
use crate::store::Store;

/// Parses `url` or `url,tag` lines into targets.
pub fn from_str(content: &str) -> Vec<FetchTarget> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| *line != "url" && !line.starts_with("url,"))
        .map(|line| {
            let (url, tag) = match line.split_once(',') {
                Some((url, tag)) => (url.trim(), Some(tag.trim())),
                None => (line, None),
            };
            match tag.filter(|t| !t.is_empty()) {
                Some(tag) => FetchTarget::tagged(url, tag),
                None => FetchTarget::new(url),
            }
        })
        .collect()
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<FetchTarget>> {
    Ok(from_str(&std::fs::read_to_string(path)?))
}

/// Re-seeds from persistence: every origin URL whose record is missing a
/// successful status, optionally narrowed by a domain substring.
pub fn from_store(store: &dyn Store, domain: Option<&str>) -> Result<Vec<FetchTarget>> {
    Ok(store
        .scan_pending(domain)?
        .into_iter()
        .map(FetchTarget::new)
        .collect())
}

/// Caps a cycle's seed list at `max` targets, keeping input order.
pub fn cap(mut targets: Vec<FetchTarget>, max: Option<usize>) -> Vec<FetchTarget> {
    if let Some(max) = max {
        targets.truncate(max);
    }
    targets
}
