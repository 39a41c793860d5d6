use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::url::resolve_link;

/// A parsed product page together with the URL it was fetched from
///
/// Every extraction layer reads the page through this view so relative
/// references resolve against the same base.
pub struct DocumentView {
    html: Html,
    base: Url,
}

impl DocumentView {
    pub fn parse(html: &str, base: &Url) -> Self {
        Self {
            html: Html::parse_document(html),
            base: base.clone(),
        }
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// All elements matching `css`, in document order
    pub fn select_all(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn first(&self, css: &str) -> Option<ElementRef<'_>> {
        self.select_all(css).into_iter().next()
    }

    /// Cleaned text of the first match with non-empty text
    pub fn first_text(&self, css: &str) -> Option<String> {
        self.select_all(css).into_iter().find_map(element_text)
    }

    /// Trimmed attribute value of the first match carrying a non-empty one
    pub fn first_attr(&self, css: &str, attr: &str) -> Option<String> {
        self.select_all(css)
            .into_iter()
            .find_map(|el| element_attr(el, attr))
    }

    pub fn resolve(&self, href: &str) -> Option<String> {
        resolve_link(href, &self.base)
    }
}

/// Collapses runs of whitespace and trims; empty results become `None`
pub(crate) fn clean_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

pub(crate) fn element_text(el: ElementRef<'_>) -> Option<String> {
    clean_text(&el.text().collect::<String>())
}

pub(crate) fn element_attr(el: ElementRef<'_>, attr: &str) -> Option<String> {
    el.value().attr(attr).and_then(clean_text)
}

/// Selects descendants of `el` matching `css`
pub(crate) fn select_within<'a>(el: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => el.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Image source of an `<img>`, preferring the lazy-load attribute
pub(crate) fn image_source(el: ElementRef<'_>) -> Option<String> {
    element_attr(el, "data-src").or_else(|| element_attr(el, "src"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(html: &str) -> DocumentView {
        DocumentView::parse(html, &Url::parse("https://shop.example.com/p/1").unwrap())
    }

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  Blue \n\t Kettle  "), Some("Blue Kettle".to_string()));
        assert_eq!(clean_text(" \n "), None);
    }

    #[test]
    fn test_first_text_skips_empty_matches() {
        let doc = view("<p class='x'> </p><p class='x'>second</p>");
        assert_eq!(doc.first_text("p.x"), Some("second".to_string()));
    }

    #[test]
    fn test_first_attr() {
        let doc = view(r#"<meta name="product_id" content=" 42 ">"#);
        assert_eq!(doc.first_attr("meta[name=product_id]", "content"), Some("42".to_string()));
        assert_eq!(doc.first_attr("meta[name=missing]", "content"), None);
    }

    #[test]
    fn test_image_source_prefers_data_src() {
        let doc = view(r#"<img id="a" data-src="/lazy.jpg" src="/placeholder.gif"><img id="b" data-src="" src="/real.jpg">"#);
        assert_eq!(image_source(doc.first("#a").unwrap()), Some("/lazy.jpg".to_string()));
        assert_eq!(image_source(doc.first("#b").unwrap()), Some("/real.jpg".to_string()));
    }

    #[test]
    fn test_resolve_against_page() {
        let doc = view("");
        assert_eq!(doc.resolve("/img/a.jpg"), Some("https://shop.example.com/img/a.jpg".to_string()));
    }
}
