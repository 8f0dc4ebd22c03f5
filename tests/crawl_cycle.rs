mod common;

use std::sync::Arc;

use common::{article_html, MockFetcher, MockResponse};

use tickertape::app::{Result, TickertapeError};
use tickertape::cache::{FetchCache, SqliteCache};
use tickertape::crawler::Crawler;
use tickertape::domain::{FetchTarget, Page};
use tickertape::fetcher::FetchedPage;
use tickertape::parser::{PageParser, ParserRegistry};
use tickertape::store::{SqliteStore, Store};

struct Fixture {
    store: Arc<SqliteStore>,
    cache: Arc<SqliteCache>,
    fetcher: Arc<MockFetcher>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            store: Arc::new(SqliteStore::in_memory().unwrap()),
            cache: Arc::new(SqliteCache::in_memory().unwrap()),
            fetcher: Arc::new(MockFetcher::new()),
        }
    }

    fn crawler(&self, workers: usize) -> Crawler {
        self.crawler_with_registry(workers, ParserRegistry::new())
    }

    fn crawler_with_registry(&self, workers: usize, registry: ParserRegistry) -> Crawler {
        Crawler::new(
            self.store.clone(),
            self.cache.clone(),
            self.fetcher.clone(),
            Arc::new(registry),
            workers,
        )
    }
}

#[tokio::test]
async fn second_cycle_over_done_seeds_fetches_nothing() {
    let fx = Fixture::new();
    fx.fetcher.ok("https://a.test/x", &article_html("X"));
    fx.fetcher.ok("https://a.test/y", &article_html("Y"));

    let seeds = vec![
        FetchTarget::tagged("https://a.test/x", "T"),
        FetchTarget::tagged("https://a.test/y", "T"),
    ];
    let crawler = fx.crawler(2);

    let first = crawler.run_cycle(seeds.clone()).await.unwrap();
    assert_eq!(first.persisted, 2);
    assert!(first.failed_urls.is_empty());
    assert_eq!(fx.fetcher.fetch_count(), 2);

    let x = fx.store.get_page("https://a.test/x").unwrap().unwrap();
    assert_eq!(x.http_status, Some(200));
    assert_eq!(x.entry_tickers, vec!["T"]);
    assert!(x.is_done());

    // Identical seeds again: the dedup oracle short-circuits every item.
    let second = crawler.run_cycle(seeds).await.unwrap();
    assert_eq!(second.skipped, 2);
    assert_eq!(second.persisted, 0);
    assert!(second.failed_urls.is_empty());
    assert_eq!(fx.fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn cache_hit_reparses_without_network() {
    let fx = Fixture::new();
    fx.cache
        .set(
            "https://a.test/cached",
            &FetchedPage {
                resolved_url: "https://a.test/cached-final".into(),
                http_status: 200,
                body: article_html("Cached title"),
            },
        )
        .unwrap();

    let crawler = fx.crawler(1);
    let report = crawler
        .run_cycle(vec![FetchTarget::new("https://a.test/cached")])
        .await
        .unwrap();

    assert_eq!(report.persisted, 1);
    assert_eq!(fx.fetcher.fetch_count(), 0);

    let page = fx.store.get_page("https://a.test/cached").unwrap().unwrap();
    assert_eq!(page.article_title.as_deref(), Some("Cached title"));
    assert_eq!(page.resolved_url.as_deref(), Some("https://a.test/cached-final"));
}

#[tokio::test]
async fn every_seed_gets_exactly_one_outcome() {
    let fx = Fixture::new();
    fx.fetcher.ok("https://a.test/ok1", &article_html("1"));
    fx.fetcher
        .respond("https://a.test/gone", MockResponse::Status(404));
    fx.fetcher
        .respond("https://a.test/down", MockResponse::Transport);
    fx.fetcher.ok("https://a.test/ok2", &article_html("2"));

    let seeds = vec![
        FetchTarget::new("https://a.test/ok1"),
        FetchTarget::new("https://a.test/gone"),
        FetchTarget::new("https://a.test/down"),
        FetchTarget::new("https://a.test/ok2"),
    ];
    let report = fx.crawler(3).run_cycle(seeds).await.unwrap();

    assert_eq!(report.persisted, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed_urls.len(), 2);
    assert!(report.failed_urls.contains(&"https://a.test/gone".to_string()));
    assert!(report.failed_urls.contains(&"https://a.test/down".to_string()));

    // The non-2xx failure left a partial record; the transport failure left
    // nothing, so next cycle retries it from scratch.
    let partial = fx.store.get_page("https://a.test/gone").unwrap().unwrap();
    assert_eq!(partial.http_status, Some(404));
    assert!(partial.article_title.is_none());
    assert!(fx.store.get_page("https://a.test/down").unwrap().is_none());
}

struct FailingParser;

impl PageParser for FailingParser {
    fn parse(&self, origin_url: &str, _: &str, _: u16, _: &str) -> Result<Vec<Page>> {
        Err(TickertapeError::Parse {
            url: origin_url.to_string(),
            message: "unexpected markup".into(),
        })
    }
}

#[tokio::test]
async fn parse_failure_does_not_block_siblings() {
    let fx = Fixture::new();
    fx.fetcher.ok("https://bad.test/x", "<html></html>");
    fx.fetcher.ok("https://good.test/y", &article_html("Good"));

    let mut registry = ParserRegistry::new();
    registry.register("bad.test", Arc::new(FailingParser));

    let report = fx
        .crawler_with_registry(2, registry)
        .run_cycle(vec![
            FetchTarget::new("https://bad.test/x"),
            FetchTarget::new("https://good.test/y"),
        ])
        .await
        .unwrap();

    assert_eq!(report.persisted, 1);
    assert_eq!(report.failed_urls, vec!["https://bad.test/x"]);
    let good = fx.store.get_page("https://good.test/y").unwrap().unwrap();
    assert_eq!(good.article_title.as_deref(), Some("Good"));
}

/// Yields one stub per link found in the body, plus nothing for itself.
struct IndexParser;

impl PageParser for IndexParser {
    fn parse(&self, _: &str, _: &str, _: u16, body: &str) -> Result<Vec<Page>> {
        Ok(body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| Page::new(l.trim()))
            .collect())
    }
}

#[tokio::test]
async fn index_links_are_crawled_in_the_same_cycle() {
    let fx = Fixture::new();
    fx.fetcher.ok(
        "https://index.test/",
        "https://a.test/1\nhttps://a.test/2\n",
    );
    fx.fetcher.ok("https://a.test/1", &article_html("One"));
    fx.fetcher.ok("https://a.test/2", &article_html("Two"));

    let mut registry = ParserRegistry::new();
    registry.register("index.test", Arc::new(IndexParser));

    let report = fx
        .crawler_with_registry(2, registry)
        .run_cycle(vec![FetchTarget::new("https://index.test/")])
        .await
        .unwrap();

    // Index page plus its two discovered links.
    assert_eq!(report.persisted, 3);
    assert_eq!(fx.fetcher.fetch_count(), 3);
    let one = fx.store.get_page("https://a.test/1").unwrap().unwrap();
    assert_eq!(one.article_title.as_deref(), Some("One"));
}

#[tokio::test]
async fn force_refetch_bypasses_both_tiers() {
    let fx = Fixture::new();
    fx.fetcher.ok("https://a.test/x", &article_html("X"));

    let seeds = vec![FetchTarget::new("https://a.test/x")];
    fx.crawler(1).run_cycle(seeds.clone()).await.unwrap();
    assert_eq!(fx.fetcher.fetch_count(), 1);

    let forced = fx.crawler(1).force_refetch(true);
    let report = forced.run_cycle(seeds).await.unwrap();
    assert_eq!(report.persisted, 1);
    assert_eq!(fx.fetcher.fetch_count(), 2);
}

#[tokio::test]
async fn empty_seed_list_completes_immediately() {
    let fx = Fixture::new();
    let report = fx.crawler(4).run_cycle(Vec::new()).await.unwrap();
    assert_eq!(report.persisted, 0);
    assert_eq!(report.skipped, 0);
    assert!(report.failed_urls.is_empty());
}
