//! Repository for the `products` table

use crate::storage::database::{Assignments, Database};
use crate::storage::error::StorageResult;
use crate::storage::{NewProduct, ProductPatch, ProductRow};
use rusqlite::{params, OptionalExtension, Row};

const PRODUCT_COLUMNS: &str =
    "id, title, price, sales_price, category, short_desc, brand, url, has_variations, parent_id";

#[derive(Clone)]
pub struct ProductRepository {
    db: Database,
}

impl ProductRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a product and returns its id
    pub fn create(&self, product: &NewProduct) -> StorageResult<i64> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO products (title, price, sales_price, category, short_desc, brand, url, has_variations, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    product.title,
                    product.price,
                    product.sales_price,
                    product.category,
                    product.short_desc,
                    product.brand,
                    product.url,
                    product.has_variations,
                    product.parent_id
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_by_id(&self, id: i64) -> StorageResult<Option<ProductRow>> {
        let sql = format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLUMNS);
        self.db
            .with_conn(|conn| conn.query_row(&sql, params![id], product_from_row).optional())
    }

    pub fn get_by_url(&self, url: &str) -> StorageResult<Option<ProductRow>> {
        let sql = format!("SELECT {} FROM products WHERE url = ?1", PRODUCT_COLUMNS);
        self.db
            .with_conn(|conn| conn.query_row(&sql, params![url], product_from_row).optional())
    }

    pub fn exists_by_url(&self, url: &str) -> StorageResult<bool> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM products WHERE url = ?1)",
                params![url],
                |row| row.get(0),
            )
        })
    }

    pub fn update(&self, id: i64, patch: &ProductPatch) -> StorageResult<()> {
        let mut assignments = Assignments::default();
        if let Some(title) = &patch.title {
            assignments.set("title", title.clone());
        }
        if let Some(price) = &patch.price {
            assignments.set("price", price.clone());
        }
        if let Some(sales_price) = &patch.sales_price {
            assignments.set_nullable("sales_price", sales_price.clone());
        }
        if let Some(category) = &patch.category {
            assignments.set_nullable("category", category.clone());
        }
        if let Some(short_desc) = &patch.short_desc {
            assignments.set_nullable("short_desc", short_desc.clone());
        }
        if let Some(brand) = &patch.brand {
            assignments.set_nullable("brand", brand.clone());
        }
        if let Some(has_variations) = patch.has_variations {
            assignments.set("has_variations", has_variations);
        }
        if let Some(parent_id) = patch.parent_id {
            assignments.set_nullable("parent_id", parent_id);
        }
        self.db.update_row("products", "product", id, assignments)
    }

    /// Deletes a product; its variations and images go with it
    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        self.db.delete_row("products", id)
    }

    pub fn list_all(&self) -> StorageResult<Vec<ProductRow>> {
        let sql = format!("SELECT {} FROM products ORDER BY id", PRODUCT_COLUMNS);
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], product_from_row)?;
            rows.collect()
        })
    }

    /// Products materialized as children of `parent_id`
    pub fn list_by_parent(&self, parent_id: i64) -> StorageResult<Vec<ProductRow>> {
        let sql = format!(
            "SELECT {} FROM products WHERE parent_id = ?1 ORDER BY id",
            PRODUCT_COLUMNS
        );
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![parent_id], product_from_row)?;
            rows.collect()
        })
    }

    pub fn mark_has_variations(&self, id: i64, has_variations: bool) -> StorageResult<()> {
        self.update(
            id,
            &ProductPatch {
                has_variations: Some(has_variations),
                ..Default::default()
            },
        )
    }

    pub fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .db
            .with_conn(|conn| conn.query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0)))?;
        Ok(count as u64)
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<ProductRow> {
    Ok(ProductRow {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        sales_price: row.get(3)?,
        category: row.get(4)?,
        short_desc: row.get(5)?,
        brand: row.get(6)?,
        url: row.get(7)?,
        has_variations: row.get::<_, Option<bool>>(8)?.unwrap_or(false),
        parent_id: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    fn repo() -> ProductRepository {
        ProductRepository::new(Database::open_in_memory().unwrap())
    }

    fn sample(url: &str) -> NewProduct {
        NewProduct {
            title: "Acrylic Paint Set".to_string(),
            price: "150".to_string(),
            sales_price: Some("100".to_string()),
            category: Some("Art > Paint".to_string()),
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_get() {
        let repo = repo();
        let id = repo.create(&sample("https://shop.test/p/1")).unwrap();

        let row = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(row.title, "Acrylic Paint Set");
        assert_eq!(row.sales_price.as_deref(), Some("100"));
        assert!(!row.has_variations);

        let by_url = repo.get_by_url("https://shop.test/p/1").unwrap().unwrap();
        assert_eq!(by_url.id, id);
    }

    #[test]
    fn test_duplicate_url_rejected() {
        let repo = repo();
        repo.create(&sample("https://shop.test/p/1")).unwrap();
        let result = repo.create(&sample("https://shop.test/p/1"));
        assert!(matches!(result, Err(StorageError::Sqlite(_))));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_exists_by_url() {
        let repo = repo();
        assert!(!repo.exists_by_url("https://shop.test/p/1").unwrap());
        repo.create(&sample("https://shop.test/p/1")).unwrap();
        assert!(repo.exists_by_url("https://shop.test/p/1").unwrap());
    }

    #[test]
    fn test_update_fields() {
        let repo = repo();
        let id = repo.create(&sample("https://shop.test/p/1")).unwrap();

        repo.update(
            id,
            &ProductPatch {
                title: Some("Oil Paint Set".to_string()),
                sales_price: Some(None),
                ..Default::default()
            },
        )
        .unwrap();

        let row = repo.get_by_id(id).unwrap().unwrap();
        assert_eq!(row.title, "Oil Paint Set");
        assert_eq!(row.sales_price, None);
        assert_eq!(row.price, "150");
    }

    #[test]
    fn test_empty_patch_is_invalid_argument() {
        let repo = repo();
        let id = repo.create(&sample("https://shop.test/p/1")).unwrap();
        let result = repo.update(id, &ProductPatch::default());
        assert!(matches!(result, Err(StorageError::InvalidArgument(_))));
    }

    #[test]
    fn test_update_missing_product() {
        let repo = repo();
        let result = repo.mark_has_variations(42, true);
        assert!(matches!(result, Err(StorageError::NotFound { id: 42, .. })));
    }

    #[test]
    fn test_list_by_parent() {
        let repo = repo();
        let parent = repo.create(&sample("https://shop.test/p/1")).unwrap();
        let mut child = sample("https://shop.test/p/1?color=red");
        child.parent_id = Some(parent);
        repo.create(&child).unwrap();

        let children = repo.list_by_parent(parent).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].parent_id, Some(parent));
    }
}
