//! Repository for the `non_crawlable_urls` negative cache

use crate::storage::database::{Assignments, Database};
use crate::storage::error::StorageResult;
use crate::storage::{NonCrawlableUrlPatch, NonCrawlableUrlRow};
use rusqlite::{params, OptionalExtension, Row};

#[derive(Clone)]
pub struct NonCrawlableUrlRepository {
    db: Database,
}

impl NonCrawlableUrlRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Records `url` as not crawlable and returns the row id
    ///
    /// Recording the same URL twice keeps the first entry.
    pub fn create(&self, url: &str, url_type: &str, reason: Option<&str>) -> StorageResult<i64> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO non_crawlable_urls (url, url_type, reason) VALUES (?1, ?2, ?3)",
                params![url, url_type, reason],
            )?;
            conn.query_row(
                "SELECT id FROM non_crawlable_urls WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
        })
    }

    pub fn is_non_crawlable(&self, url: &str) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM non_crawlable_urls WHERE url = ?1)",
                params![url],
                |row| row.get(0),
            )
        })
    }

    pub fn get_by_id(&self, id: i64) -> StorageResult<Option<NonCrawlableUrlRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, url, url_type, reason, created_at FROM non_crawlable_urls WHERE id = ?1",
                params![id],
                non_crawlable_from_row,
            )
            .optional()
        })
    }

    pub fn get_by_url(&self, url: &str) -> StorageResult<Option<NonCrawlableUrlRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, url, url_type, reason, created_at FROM non_crawlable_urls WHERE url = ?1",
                params![url],
                non_crawlable_from_row,
            )
            .optional()
        })
    }

    /// Newest entries first
    pub fn list(&self, limit: u32, offset: u32) -> StorageResult<Vec<NonCrawlableUrlRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, url_type, reason, created_at FROM non_crawlable_urls
                 ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2",
            )?;
            let rows = stmt.query_map(params![limit, offset], non_crawlable_from_row)?;
            rows.collect()
        })
    }

    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM non_crawlable_urls", [], |row| row.get(0))
        })?;
        Ok(count as u64)
    }

    pub fn update(&self, id: i64, patch: &NonCrawlableUrlPatch) -> StorageResult<()> {
        let mut assignments = Assignments::default();
        if let Some(url_type) = &patch.url_type {
            assignments.set("url_type", url_type.clone());
        }
        if let Some(reason) = &patch.reason {
            assignments.set_nullable("reason", reason.clone());
        }
        self.db
            .update_row("non_crawlable_urls", "non-crawlable url", id, assignments)
    }

    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        self.db.delete_row("non_crawlable_urls", id)
    }
}

fn non_crawlable_from_row(row: &Row<'_>) -> rusqlite::Result<NonCrawlableUrlRow> {
    Ok(NonCrawlableUrlRow {
        id: row.get(0)?,
        url: row.get(1)?,
        url_type: row.get(2)?,
        reason: row.get(3)?,
        created_at: row.get(4)?,
    })
}
