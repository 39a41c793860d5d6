//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Shelf-Scout database.

/// SQL schema for the database
///
/// `products` and `product_variations`/`images` reference each other; SQLite
/// resolves foreign keys at statement time, so declaration order is free.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    price TEXT NOT NULL,
    sales_price TEXT,
    category TEXT,
    short_desc TEXT,
    brand TEXT,
    url TEXT NOT NULL UNIQUE,
    has_variations BOOLEAN DEFAULT 0,
    parent_id INTEGER,
    FOREIGN KEY (parent_id) REFERENCES products (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS product_variations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL,
    variation_code TEXT NOT NULL,
    image_id INTEGER,
    FOREIGN KEY (product_id) REFERENCES products (id) ON DELETE CASCADE,
    FOREIGN KEY (image_id) REFERENCES images (id) ON DELETE SET NULL,
    UNIQUE(product_id, variation_code)
);

CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id INTEGER NOT NULL,
    image_url TEXT NOT NULL,
    image_type TEXT DEFAULT 'product',
    variation_id INTEGER,
    FOREIGN KEY (product_id) REFERENCES products (id) ON DELETE CASCADE,
    FOREIGN KEY (variation_id) REFERENCES product_variations (id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_images_product ON images(product_id);
CREATE INDEX IF NOT EXISTS idx_images_url ON images(image_url);

CREATE TABLE IF NOT EXISTS failed_crawls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    type TEXT NOT NULL,
    error TEXT,
    foreign_id INTEGER,
    status TEXT
);

CREATE TABLE IF NOT EXISTS non_crawlable_urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL UNIQUE,
    url_type TEXT NOT NULL,
    reason TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_non_crawlable_urls_url ON non_crawlable_urls(url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
