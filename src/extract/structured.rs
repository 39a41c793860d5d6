//! JSON-LD layer

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use super::document::{clean_text, DocumentView};
use super::PartialRecord;

const JSON_LD_SELECTOR: &str = r#"script[type="application/ld+json"]"#;

static BR_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

/// Strips markup and raw line breaks that some shops leave inside JSON strings
fn normalize_block(raw: &str) -> String {
    BR_TAG_RE
        .replace_all(raw, " ")
        .chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

fn parse_blocks(doc: &DocumentView) -> Vec<Value> {
    doc.select_all(JSON_LD_SELECTOR)
        .into_iter()
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            let normalized = normalize_block(&raw);
            if normalized.trim().is_empty() {
                return None;
            }
            match serde_json::from_str::<Value>(&normalized) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Skipping malformed JSON-LD block on {}: {}", doc.base(), e);
                    None
                }
            }
        })
        .collect()
}

fn is_product_type(node_type: Option<&Value>) -> bool {
    match node_type {
        Some(Value::String(s)) => s == "Product",
        Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).any(|s| s == "Product"),
        _ => false,
    }
}

/// Finds the first `Product` node in a block: the block itself, an array
/// element, or an entry of `@graph`
fn find_product(value: &Value) -> Option<&Map<String, Value>> {
    match value {
        Value::Object(map) => {
            if is_product_type(map.get("@type")) {
                return Some(map);
            }
            map.get("@graph").and_then(find_product)
        }
        Value::Array(items) => items.iter().find_map(find_product),
        _ => None,
    }
}

pub(super) fn declares_product(doc: &DocumentView) -> bool {
    parse_blocks(doc).iter().any(|block| find_product(block).is_some())
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => clean_text(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn image_field(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.iter().find_map(image_field),
        Value::Object(map) => map.get("url").and_then(Value::as_str),
        _ => None,
    }
}

fn brand_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(s),
        Value::Object(map) => string_field(map, "name"),
        _ => None,
    }
}

/// Reads name, ids, image, description and brand from the first `Product`
/// node found in any JSON-LD block
pub(super) fn extract(doc: &DocumentView) -> PartialRecord {
    let blocks = parse_blocks(doc);
    let Some(product) = blocks.iter().find_map(find_product) else {
        return PartialRecord::default();
    };

    PartialRecord {
        name: string_field(product, "name"),
        external_id: string_field(product, "productID"),
        sku: string_field(product, "sku"),
        main_image: product
            .get("image")
            .and_then(image_field)
            .and_then(|href| doc.resolve(href)),
        description: string_field(product, "description"),
        brand: product.get("brand").and_then(brand_field),
        ..Default::default()
    }
}
