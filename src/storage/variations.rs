//! Repository for the `product_variations` table

use crate::storage::database::{Assignments, Database};
use crate::storage::error::StorageResult;
use crate::storage::{NewVariation, VariationPatch, VariationRow};
use rusqlite::{params, OptionalExtension, Row};

#[derive(Clone)]
pub struct VariationRepository {
    db: Database,
}

impl VariationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, variation: &NewVariation) -> StorageResult<i64> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO product_variations (product_id, variation_code, image_id) VALUES (?1, ?2, ?3)",
                params![variation.product_id, variation.variation_code, variation.image_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_by_id(&self, id: i64) -> StorageResult<Option<VariationRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, product_id, variation_code, image_id FROM product_variations WHERE id = ?1",
                params![id],
                variation_from_row,
            )
            .optional()
        })
    }

    /// Looks a variation up by its natural key
    pub fn get_by_code(&self, product_id: i64, code: &str) -> StorageResult<Option<VariationRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, product_id, variation_code, image_id FROM product_variations
                 WHERE product_id = ?1 AND variation_code = ?2",
                params![product_id, code],
                variation_from_row,
            )
            .optional()
        })
    }

    pub fn list_by_product(&self, product_id: i64) -> StorageResult<Vec<VariationRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, product_id, variation_code, image_id FROM product_variations
                 WHERE product_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![product_id], variation_from_row)?;
            rows.collect()
        })
    }

    pub fn update(&self, id: i64, patch: &VariationPatch) -> StorageResult<()> {
        let mut assignments = Assignments::default();
        if let Some(code) = &patch.variation_code {
            assignments.set("variation_code", code.clone());
        }
        if let Some(image_id) = patch.image_id {
            assignments.set_nullable("image_id", image_id);
        }
        self.db
            .update_row("product_variations", "variation", id, assignments)
    }

    /// Points a variation at the image that illustrates it
    pub fn set_image(&self, id: i64, image_id: i64) -> StorageResult<()> {
        self.update(
            id,
            &VariationPatch {
                image_id: Some(Some(image_id)),
                ..Default::default()
            },
        )
    }

    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        self.db.delete_row("product_variations", id)
    }

    pub fn delete_by_product(&self, product_id: i64) -> StorageResult<usize> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM product_variations WHERE product_id = ?1",
                params![product_id],
            )
        })
    }

    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self.db.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM product_variations", [], |row| row.get(0))
        })?;
        Ok(count as u64)
    }
}

fn variation_from_row(row: &Row<'_>) -> rusqlite::Result<VariationRow> {
    Ok(VariationRow {
        id: row.get(0)?,
        product_id: row.get(1)?,
        variation_code: row.get(2)?,
        image_id: row.get(3)?,
    })
}
