use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};
use url::Url;

use crate::{Result, ScoutError};

/// Loads a seed URL list from disk
///
/// The format follows the file extension:
/// - `.json`: a JSON array of strings
/// - `.xml`: a sitemap; every `<url><loc>` in document order
/// - anything else: one URL per line, blank lines and `#` comments ignored
pub fn load_url_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let urls: Vec<String> = serde_json::from_str(&content)?;
            Ok(urls
                .into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect())
        }
        Some("xml") => parse_sitemap(&content),
        _ => parse_url_list(&content),
    }
}

/// Collects the `<loc>` of every `<url>` entry of a sitemap `urlset`
///
/// `<loc>` elements outside `<url>` (for example in a sitemap index) are
/// ignored.
pub fn parse_sitemap(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut urls = Vec::new();
    let mut in_url = false;
    let mut loc: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"url" => in_url = true,
                b"loc" if in_url => loc = Some(String::new()),
                _ => {}
            },
            Event::Text(e) => {
                if let Some(current) = loc.as_mut() {
                    current.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = loc.as_mut() {
                    current.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"loc" => {
                    if let Some(current) = loc.take() {
                        let current = current.trim();
                        if !current.is_empty() {
                            urls.push(current.to_string());
                        }
                    }
                }
                b"url" => in_url = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    debug!("Sitemap lists {} URLs", urls.len());
    Ok(urls)
}

/// Parses the line-oriented URL list format
///
/// Every remaining line must parse as an absolute URL.
pub fn parse_url_list(content: &str) -> Result<Vec<String>> {
    let mut urls = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Err(e) = Url::parse(line) {
            warn!("Invalid URL on line {}: {}", index + 1, line);
            return Err(ScoutError::InvalidArgument(format!(
                "line {}: {} ({})",
                index + 1,
                line,
                e
            )));
        }
        urls.push(line.to_string());
    }

    Ok(urls)
}
