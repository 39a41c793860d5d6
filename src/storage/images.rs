//! Repository for the `images` table

use crate::storage::database::{Assignments, Database};
use crate::storage::error::{unknown_column_value, StorageResult};
use crate::storage::{ImagePatch, ImageRow, ImageType, NewImage};
use rusqlite::{params, OptionalExtension, Row};

#[derive(Clone)]
pub struct ImageRepository {
    db: Database,
}

impl ImageRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, image: &NewImage) -> StorageResult<i64> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO images (product_id, image_url, image_type, variation_id) VALUES (?1, ?2, ?3, ?4)",
                params![
                    image.product_id,
                    image.image_url,
                    image.image_type.to_db_string(),
                    image.variation_id
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_by_id(&self, id: i64) -> StorageResult<Option<ImageRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, product_id, image_url, image_type, variation_id FROM images WHERE id = ?1",
                params![id],
                image_from_row,
            )
            .optional()
        })
    }

    /// First image stored for `url`
    pub fn get_by_url(&self, url: &str) -> StorageResult<Option<ImageRow>> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT id, product_id, image_url, image_type, variation_id FROM images
                 WHERE image_url = ?1 ORDER BY id LIMIT 1",
                params![url],
                image_from_row,
            )
            .optional()
        })
    }

    pub fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM images WHERE image_url = ?1)",
                params![url],
                |row| row.get(0),
            )
        })
    }

    /// Images of a product, optionally restricted to one [`ImageType`]
    pub fn list_by_product(
        &self,
        product_id: i64,
        image_type: Option<ImageType>,
    ) -> StorageResult<Vec<ImageRow>> {
        self.db.with_conn(|conn| match image_type {
            Some(image_type) => {
                let mut stmt = conn.prepare(
                    "SELECT id, product_id, image_url, image_type, variation_id FROM images
                     WHERE product_id = ?1 AND image_type = ?2 ORDER BY id",
                )?;
                let rows =
                    stmt.query_map(params![product_id, image_type.to_db_string()], image_from_row)?;
                rows.collect()
            }
            None => {
                let mut stmt = conn.prepare(
                    "SELECT id, product_id, image_url, image_type, variation_id FROM images
                     WHERE product_id = ?1 ORDER BY id",
                )?;
                let rows = stmt.query_map(params![product_id], image_from_row)?;
                rows.collect()
            }
        })
    }

    pub fn list_by_variation(&self, variation_id: i64) -> StorageResult<Vec<ImageRow>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, product_id, image_url, image_type, variation_id FROM images
                 WHERE variation_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![variation_id], image_from_row)?;
            rows.collect()
        })
    }

    pub fn update(&self, id: i64, patch: &ImagePatch) -> StorageResult<()> {
        let mut assignments = Assignments::default();
        if let Some(url) = &patch.image_url {
            assignments.set("image_url", url.clone());
        }
        if let Some(image_type) = patch.image_type {
            assignments.set("image_type", image_type.to_db_string().to_string());
        }
        if let Some(variation_id) = patch.variation_id {
            assignments.set_nullable("variation_id", variation_id);
        }
        self.db.update_row("images", "image", id, assignments)
    }

    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        self.db.delete_row("images", id)
    }

    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .db
            .with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM images", [], |row| row.get(0)))?;
        Ok(count as u64)
    }
}

fn image_from_row(row: &Row<'_>) -> rusqlite::Result<ImageRow> {
    // NULL falls back to the column default
    let image_type = match row.get::<_, Option<String>>(3)? {
        None => ImageType::Product,
        Some(raw) => ImageType::from_db_string(&raw)
            .ok_or_else(|| unknown_column_value(3, "image_type", &raw))?,
    };
    Ok(ImageRow {
        id: row.get(0)?,
        product_id: row.get(1)?,
        image_url: row.get(2)?,
        image_type,
        variation_id: row.get(4)?,
    })
}
