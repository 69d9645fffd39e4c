use scraper::{Html, Selector};
use url::Url;

/// A fetched document plus the URL it finally resolved to
///
/// `LoadedPage` holds the raw body text, not a parsed DOM: `scraper::Html`
/// is not `Send`, so documents are parsed on demand inside synchronous
/// extraction code and never held across an await point.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    final_url: Url,
    body: String,
}

impl LoadedPage {
    /// Creates a loaded page from a final URL and a body
    pub fn new(final_url: Url, body: String) -> Self {
        Self { final_url, body }
    }

    /// The URL the navigation ended on, after redirects
    pub fn final_url(&self) -> &Url {
        &self.final_url
    }

    /// The raw document text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body into a queryable document
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    /// Returns true if the document contains at least one element matching
    /// `selector`
    ///
    /// An unparseable selector matches nothing.
    pub fn has_selector(&self, selector: &str) -> bool {
        let document = self.document();
        match Selector::parse(selector) {
            Ok(sel) => document.select(&sel).next().is_some(),
            Err(_) => false,
        }
    }
}
