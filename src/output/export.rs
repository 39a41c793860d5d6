use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::storage::{ImageRow, ProductRow, Store, VariationRow};
use crate::Result;

/// A product with its variations and images
#[derive(Debug, Clone, Serialize)]
pub struct ProductExport {
    #[serde(flatten)]
    pub product: ProductRow,
    pub variations: Vec<VariationRow>,
    pub images: Vec<ImageRow>,
}

/// Loads every stored product together with its owned rows
pub fn collect_products(store: &Store) -> Result<Vec<ProductExport>> {
    store
        .products
        .list_all()?
        .into_iter()
        .map(|product| {
            Ok(ProductExport {
                variations: store.variations.list_by_product(product.id)?,
                images: store.images.list_by_product(product.id, None)?,
                product,
            })
        })
        .collect()
}

/// Writes all stored products to `path` as a pretty-printed JSON array
///
/// # Returns
///
/// The number of products written
pub fn export_products(store: &Store, path: &Path) -> Result<usize> {
    let products = collect_products(store)?;

    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &products)?;

    info!("Exported {} products to {}", products.len(), path.display());
    Ok(products.len())
}
