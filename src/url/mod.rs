//! URL handling for Shelf-Scout
//!
//! Resolves page-relative links into absolute HTTP(S) URLs and loads the
//! seed URL lists handed to the orchestrator.

mod list;

pub use list::{load_url_list, parse_sitemap, parse_url_list};

use url::Url;

/// Resolves a possibly relative reference against a page URL
///
/// References that cannot point at a fetchable resource are rejected:
/// empty strings, fragment-only anchors, and `javascript:`, `mailto:`,
/// `tel:` or `data:` schemes. Only `http` and `https` results are returned.
///
/// # Arguments
///
/// * `href` - The raw attribute value (may be relative)
/// * `base_url` - The URL of the page the reference was found on
///
/// # Returns
///
/// The absolute URL string, or `None` if the reference is unusable
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute) if matches!(absolute.scheme(), "http" | "https") => Some(absolute.to_string()),
        _ => None,
    }
}
