//! HTML body and link extraction
//!
//! The parser is deliberately small: the crawl needs exactly two views of
//! a page, its body markup for the output record and its raw anchor hrefs
//! for frontier expansion. Malformed HTML is tolerated; a document simply
//! yields no body or no links.

use scraper::{Html, Selector};

/// HTML page parser with precompiled selectors
pub struct PageParser {
    body: Selector,
    anchor: Selector,
}

impl PageParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            body: Selector::parse("body").unwrap(),
            anchor: Selector::parse("a[href]").unwrap(),
        }
    }

    /// Extract the page's body markup, if the document has a body element.
    ///
    /// Returns the outer HTML of `<body>`, matching the record format of
    /// the output chunks.
    pub fn extract_body(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document.select(&self.body).next().map(|body| body.html())
    }

    /// Extract raw anchor href values in document order.
    ///
    /// Values are returned exactly as written in the markup; resolution
    /// against the page URL and eligibility filtering happen in the
    /// crawler's link policy.
    pub fn extract_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.anchor)
            .filter_map(|anchor| anchor.value().attr("href"))
            .map(str::to_owned)
            .collect()
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new()
    }
}
