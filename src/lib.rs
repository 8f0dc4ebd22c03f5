//! # Tickertape
//!
//! A single-process crawler for financial-news sites and feeds.
//!
//! ## Architecture
//!
//! ```text
//! seeds → WorkQueue → workers: dedup → cache/fetch → parse → persist
//!                                 │
//! feeds → due-gate → FeedPoller ──┴→ entry stubs become page seeds
//! ```
//!
//! Each cycle drains a shared FIFO frontier with a bounded pool of tokio
//! tasks. Before any network call, two tiers avoid redundant work: the
//! persisted record (skip pages already fetched successfully) and the raw
//! fetch cache (reparse without refetching). Feed sources are polled on an
//! interval estimated from their observed publication cadence.
//!
//! ## Modules
//!
//! - [`app`]: application context and error types
//! - [`cache`]: durable memo of raw fetch results
//! - [`config`]: TOML configuration surface
//! - [`crawler`]: work queue, worker pool, error report, cycle supervisor
//! - [`domain`]: core models (Page, FeedStatus, FetchTarget)
//! - [`feed`]: adaptive feed polling and the interval estimator
//! - [`fetcher`]: HTTP fetching with proxy and identity rotation
//! - [`parser`]: per-domain parser registry and dispatch
//! - [`seeds`]: seed-list loading
//! - [`store`]: SQLite persistence keyed by origin URL

pub mod app;
pub mod cache;
pub mod config;
pub mod crawler;
pub mod domain;
pub mod feed;
pub mod fetcher;
pub mod parser;
pub mod seeds;
pub mod store;
