//! Repository for the `failed_crawls` ledger
//!
//! The crawl path only appends to this table. `update` and `delete` exist for
//! manual correction of the ledger.

use crate::storage::database::{Assignments, Database};
use crate::storage::error::{unknown_column_value, StorageResult};
use crate::storage::{FailedCrawlPatch, FailedCrawlRow, FailureKind, FailureStatus, NewFailedCrawl};
use rusqlite::{params, OptionalExtension, Row};

#[derive(Clone)]
pub struct FailedCrawlRepository {
    db: Database,
}

impl FailedCrawlRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Appends a failure with status `pending`
    pub fn create(&self, failure: &NewFailedCrawl) -> StorageResult<i64> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO failed_crawls (url, type, error, foreign_id, status) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    failure.url,
                    failure.kind.to_db_string(),
                    failure.error,
                    failure.foreign_id,
                    FailureStatus::Pending.to_db_string()
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_by_id(&self, id: i64) -> StorageResult<Option<FailedCrawlRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, url, type, error, foreign_id, status FROM failed_crawls WHERE id = ?1",
                params![id],
                failed_crawl_from_row,
            )
            .optional()
        })
    }

    pub fn list_all(&self) -> StorageResult<Vec<FailedCrawlRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, type, error, foreign_id, status FROM failed_crawls ORDER BY id",
            )?;
            let rows = stmt.query_map([], failed_crawl_from_row)?;
            rows.collect()
        })
    }

    pub fn list_by_kind(&self, kind: FailureKind) -> StorageResult<Vec<FailedCrawlRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, type, error, foreign_id, status FROM failed_crawls
                 WHERE type = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![kind.to_db_string()], failed_crawl_from_row)?;
            rows.collect()
        })
    }

    pub fn list_by_url(&self, url: &str) -> StorageResult<Vec<FailedCrawlRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, url, type, error, foreign_id, status FROM failed_crawls
                 WHERE url = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![url], failed_crawl_from_row)?;
            rows.collect()
        })
    }

    /// Failure counts per type column value, largest first
    pub fn count_by_kind(&self) -> StorageResult<Vec<(String, u64)>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT type, COUNT(*) AS count FROM failed_crawls GROUP BY type ORDER BY count DESC, type",
            )?;
            let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?;
            rows.collect()
        })
    }

    pub fn update(&self, id: i64, patch: &FailedCrawlPatch) -> StorageResult<()> {
        let mut assignments = Assignments::default();
        if let Some(error) = &patch.error {
            assignments.set_nullable("error", error.clone());
        }
        if let Some(status) = patch.status {
            assignments.set("status", status.to_db_string().to_string());
        }
        self.db
            .update_row("failed_crawls", "failed crawl", id, assignments)
    }

    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        self.db.delete_row("failed_crawls", id)
    }
}

fn failed_crawl_from_row(row: &Row<'_>) -> rusqlite::Result<FailedCrawlRow> {
    // NULL falls back to the column default
    let status = match row.get::<_, Option<String>>(5)? {
        None => FailureStatus::Pending,
        Some(raw) => FailureStatus::from_db_string(&raw)
            .ok_or_else(|| unknown_column_value(5, "status", &raw))?,
    };
    Ok(FailedCrawlRow {
        id: row.get(0)?,
        url: row.get(1)?,
        kind: row.get(2)?,
        error: row.get(3)?,
        foreign_id: row.get(4)?,
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn repo() -> FailedCrawlRepository {
        FailedCrawlRepository::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_append_and_read() {
        let repo = repo();
        let id = repo
            .create(&NewFailedCrawl::new(
                "https://shop.test/p/1",
                FailureKind::Product,
                "connection refused",
            ))
            .unwrap();

        let row = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(row.kind, "product");
        assert_eq!(row.error.as_deref(), Some("connection refused"));
        assert_eq!(row.foreign_id, None);
        assert_eq!(row.status, FailureStatus::Pending);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let repo = repo();
        let id = repo
            .create(&NewFailedCrawl::new("https://a.test", FailureKind::Product, "timeout"))
            .unwrap();
        repo.db
            .with_conn(|conn| {
                conn.execute("UPDATE failed_crawls SET status = 'retrying' WHERE id = ?1", params![id])
            })
            .unwrap();

        assert!(matches!(repo.get_by_id(id), Err(StorageError::Sqlite(_))));
        assert!(repo.list_all().is_err());
    }

    #[test]
    fn test_count_by_kind() {
        let repo = repo();
        for _ in 0..2 {
            repo.create(&NewFailedCrawl::new("https://a.test", FailureKind::Image, "x").with_foreign_id(1))
                .unwrap();
        }
        repo.create(&NewFailedCrawl::new("https://b.test", FailureKind::DbSave, "y"))
            .unwrap();

        let counts = repo.count_by_kind().unwrap();
        assert_eq!(counts[0], ("image".to_string(), 2));
        assert_eq!(counts[1], ("db_save".to_string(), 1));
        assert_eq!(repo.list_by_kind(FailureKind::Image).unwrap().len(), 2);
    }

    #[test]
    fn test_manual_correction() {
        let repo = repo();
        let id = repo
            .create(&NewFailedCrawl::new("https://a.test", FailureKind::Product, "timeout"))
            .unwrap();

        repo.update(
            id,
            &FailedCrawlPatch {
                status: Some(FailureStatus::Resolved),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            repo.get_by_id(id).unwrap().unwrap().status,
            FailureStatus::Resolved
        );
        assert!(matches!(
            repo.update(id, &FailedCrawlPatch::default()),
            Err(StorageError::InvalidArgument(_))
        ));
    }
}
