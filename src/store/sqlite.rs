use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, TickertapeError};
use crate::domain::{FeedStatus, Page};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock_conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| TickertapeError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TickertapeError::Other(format!("Store lock poisoned: {}", e)))
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn opt_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
        Ok(row
            .get::<_, Option<String>>(idx)?
            .and_then(|s| Self::parse_datetime(&s)))
    }

    fn string_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
        let raw: String = row.get(idx)?;
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    fn row_to_page(row: &Row<'_>) -> rusqlite::Result<Page> {
        Ok(Page {
            origin_url: row.get(0)?,
            resolved_url: row.get(1)?,
            http_status: row.get::<_, Option<i64>>(2)?.map(|s| s as u16),
            entry_title: row.get(3)?,
            entry_summary: row.get(4)?,
            entry_published_at: Self::opt_datetime(row, 5)?,
            entry_tickers: Self::string_list(row, 6)?,
            feed_urls: Self::string_list(row, 7)?,
            article_title: row.get(8)?,
            article_text: row.get(9)?,
            article_published_at: Self::opt_datetime(row, 10)?,
            keywords: Self::string_list(row, 11)?,
            created_at: row
                .get::<_, String>(12)
                .ok()
                .and_then(|s| Self::parse_datetime(&s))
                .unwrap_or_else(Utc::now),
            fetched_at: Self::opt_datetime(row, 13)?,
        })
    }

    /// Union of the stored JSON list and the incoming values, stored order
    /// first, duplicates dropped.
    fn merge_list(stored: &str, incoming: &[String]) -> Vec<String> {
        let mut merged: Vec<String> = serde_json::from_str(stored).unwrap_or_default();
        for item in incoming {
            if !merged.iter().any(|m| m == item) {
                merged.push(item.clone());
            }
        }
        merged
    }

    fn row_to_feed_status(row: &Row<'_>) -> rusqlite::Result<FeedStatus> {
        Ok(FeedStatus {
            feed_url: row.get(0)?,
            tag: row.get(1)?,
            poll_interval_secs: row.get(2)?,
            retry_count: row.get(3)?,
            last_fetch_at: Self::opt_datetime(row, 4)?,
            last_published_at: Self::opt_datetime(row, 5)?,
        })
    }
}

const PAGE_COLUMNS: &str = "origin_url, resolved_url, http_status, entry_title, entry_summary, \
     entry_published_at, entry_tickers, feed_urls, article_title, article_text, \
     article_published_at, keywords, created_at, fetched_at";

impl Store for SqliteStore {
    fn get_page(&self, origin_url: &str) -> Result<Option<Page>> {
        let conn = self.lock_conn()?;

        let result = conn
            .query_row(
                &format!("SELECT {} FROM pages WHERE origin_url = ?1", PAGE_COLUMNS),
                params![origin_url],
                Self::row_to_page,
            )
            .optional()?;

        Ok(result)
    }

    fn upsert_page(&self, page: &Page) -> Result<()> {
        let conn = self.lock_conn()?;

        // List columns are a union across writers: a feed poll tagging a
        // stub and the article crawl filling it in must both keep the
        // other's tickers, feed urls and keywords. The read-merge-write is
        // atomic under the connection lock.
        let stored_lists = conn
            .query_row(
                "SELECT entry_tickers, feed_urls, keywords FROM pages WHERE origin_url = ?1",
                params![page.origin_url],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let (entry_tickers, feed_urls, keywords) = match &stored_lists {
            Some((tickers, feeds, keywords)) => (
                Self::merge_list(tickers, &page.entry_tickers),
                Self::merge_list(feeds, &page.feed_urls),
                Self::merge_list(keywords, &page.keywords),
            ),
            None => (
                page.entry_tickers.clone(),
                page.feed_urls.clone(),
                page.keywords.clone(),
            ),
        };

        conn.execute(
            "INSERT INTO pages (origin_url, resolved_url, http_status, entry_title, \
             entry_summary, entry_published_at, entry_tickers, feed_urls, article_title, \
             article_text, article_published_at, keywords, created_at, fetched_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
             ON CONFLICT(origin_url) DO UPDATE SET \
                 resolved_url = COALESCE(excluded.resolved_url, resolved_url), \
                 http_status = COALESCE(excluded.http_status, http_status), \
                 entry_title = COALESCE(excluded.entry_title, entry_title), \
                 entry_summary = COALESCE(excluded.entry_summary, entry_summary), \
                 entry_published_at = COALESCE(excluded.entry_published_at, entry_published_at), \
                 entry_tickers = excluded.entry_tickers, \
                 feed_urls = excluded.feed_urls, \
                 article_title = COALESCE(excluded.article_title, article_title), \
                 article_text = COALESCE(excluded.article_text, article_text), \
                 article_published_at = \
                     COALESCE(excluded.article_published_at, article_published_at), \
                 keywords = excluded.keywords, \
                 fetched_at = COALESCE(excluded.fetched_at, fetched_at)",
            params![
                page.origin_url,
                page.resolved_url,
                page.http_status.map(|s| s as i64),
                page.entry_title,
                page.entry_summary,
                page.entry_published_at.map(|d| d.to_rfc3339()),
                serde_json::to_string(&entry_tickers)?,
                serde_json::to_string(&feed_urls)?,
                page.article_title,
                page.article_text,
                page.article_published_at.map(|d| d.to_rfc3339()),
                serde_json::to_string(&keywords)?,
                page.created_at.to_rfc3339(),
                page.fetched_at.map(|d| d.to_rfc3339()),
            ],
        )?;

        Ok(())
    }

    fn scan_pending(&self, domain: Option<&str>) -> Result<Vec<String>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            "SELECT origin_url FROM pages \
             WHERE (http_status IS NULL OR http_status < 200 OR http_status >= 300) \
               AND (?1 IS NULL OR instr(origin_url, ?1) > 0) \
             ORDER BY created_at",
        )?;

        let urls = stmt
            .query_map(params![domain], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    fn get_feed_status(&self, feed_url: &str) -> Result<Option<FeedStatus>> {
        let conn = self.lock_conn()?;

        let result = conn
            .query_row(
                "SELECT feed_url, tag, poll_interval_secs, retry_count, last_fetch_at, \
                 last_published_at FROM feeds WHERE feed_url = ?1",
                params![feed_url],
                Self::row_to_feed_status,
            )
            .optional()?;

        Ok(result)
    }

    fn upsert_feed_status(&self, status: &FeedStatus) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute(
            "INSERT INTO feeds (feed_url, tag, poll_interval_secs, retry_count, last_fetch_at, \
             last_published_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             ON CONFLICT(feed_url) DO UPDATE SET \
                 tag = COALESCE(excluded.tag, tag), \
                 poll_interval_secs = excluded.poll_interval_secs, \
                 retry_count = excluded.retry_count, \
                 last_fetch_at = excluded.last_fetch_at, \
                 last_published_at = COALESCE(excluded.last_published_at, last_published_at)",
            params![
                status.feed_url,
                status.tag,
                status.poll_interval_secs,
                status.retry_count,
                status.last_fetch_at.map(|d| d.to_rfc3339()),
                status.last_published_at.map(|d| d.to_rfc3339()),
            ],
        )?;

        Ok(())
    }

    fn all_feed_statuses(&self) -> Result<Vec<FeedStatus>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            "SELECT feed_url, tag, poll_interval_secs, retry_count, last_fetch_at, \
             last_published_at FROM feeds ORDER BY feed_url",
        )?;

        let feeds = stmt
            .query_map([], Self::row_to_feed_status)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(feeds)
    }
}
