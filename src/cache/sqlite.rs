use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::app::{Result, TickertapeError};
use crate::cache::FetchCache;
use crate::fetcher::FetchedPage;

pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS fetch_cache (
                url TEXT PRIMARY KEY,
                resolved_url TEXT NOT NULL,
                http_status INTEGER NOT NULL,
                body TEXT NOT NULL,
                stored_at TEXT NOT NULL
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| TickertapeError::Other(format!("Cache lock poisoned: {}", e)))
    }
}

impl FetchCache for SqliteCache {
    fn get(&self, url: &str) -> Result<Option<FetchedPage>> {
        let conn = self.lock_conn()?;

        let result = conn
            .query_row(
                "SELECT resolved_url, http_status, body FROM fetch_cache WHERE url = ?1",
                params![url],
                |row| {
                    Ok(FetchedPage {
                        resolved_url: row.get(0)?,
                        http_status: row.get::<_, i64>(1)? as u16,
                        body: row.get(2)?,
                    })
                },
            )
            .optional()?;

        Ok(result)
    }

    fn set(&self, url: &str, fetched: &FetchedPage) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute(
            "INSERT INTO fetch_cache (url, resolved_url, http_status, body, stored_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(url) DO UPDATE SET \
                 resolved_url = excluded.resolved_url, \
                 http_status = excluded.http_status, \
                 body = excluded.body, \
                 stored_at = excluded.stored_at",
            params![
                url,
                fetched.resolved_url,
                fetched.http_status as i64,
                fetched.body,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }
}
