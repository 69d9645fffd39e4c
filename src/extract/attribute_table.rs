//! Attribute-table extraction profile
//!
//! Covers sites that render the property page as a detail view with a
//! features table: one row per characteristic, a label cell and a value
//! cell. These sites expose no explicit transaction-type signal, so the
//! pipeline falls back to price-based inference.

use crate::engine::LoadedPage;
use crate::extract::{dom, ExtractError, ExtractionProfile, ProfileKind, RawFields};
use scraper::Selector;
use url::Url;

const COUNT_INDICATOR: &str = "span.results-count";
const LISTING_LINKS: &str = "a.listing-item-link";
const PROPERTY_ANCHOR: &str = "div.listing-detail";

const NAME: &str = "h1.listing-title";
const DESCRIPTION: &str = "div.listing-description";
const ADDRESS: &str = "span.listing-address";
const PRICE: &str = "div.listing-price";
const FEATURE_ROWS: &str = "table.listing-features tr";

/// Detail-table site profile
pub struct AttributeTableProfile;

impl ExtractionProfile for AttributeTableProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::AttributeTable
    }

    fn count_indicator_selector(&self) -> &'static str {
        COUNT_INDICATOR
    }

    fn extract_listing_links(&self, page: &LoadedPage) -> Vec<Url> {
        let document = page.document();
        let mut links = Vec::new();

        if let Ok(sel) = Selector::parse(LISTING_LINKS) {
            for element in document.select(&sel) {
                if let Some(href) = element.value().attr("href") {
                    if let Some(url) = dom::resolve_link(href, page.final_url()) {
                        links.push(url);
                    }
                }
            }
        }

        links
    }

    fn extract_transaction_label(&self, _page: &LoadedPage) -> Option<String> {
        // No explicit signal on these sites
        None
    }

    fn extract_property_fields(&self, page: &LoadedPage) -> Result<RawFields, ExtractError> {
        let document = page.document();

        if !dom::exists(&document, PROPERTY_ANCHOR) {
            return Err(ExtractError::MissingStructure {
                url: page.final_url().to_string(),
                selector: PROPERTY_ANCHOR.to_string(),
            });
        }

        let mut fields = RawFields {
            name: dom::first_text(&document, NAME),
            description: dom::first_text(&document, DESCRIPTION),
            address: dom::first_text(&document, ADDRESS),
            price: dom::first_text(&document, PRICE),
            characteristics: Vec::new(),
        };

        // One feature per row: <th> label, <td> value
        if let (Ok(row_sel), Ok(label_sel), Ok(value_sel)) = (
            Selector::parse(FEATURE_ROWS),
            Selector::parse("th"),
            Selector::parse("td"),
        ) {
            for row in document.select(&row_sel) {
                let label = row
                    .select(&label_sel)
                    .next()
                    .map(|cell| cell.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty());

                let value = row
                    .select(&value_sel)
                    .next()
                    .map(|cell| cell.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty());

                if let (Some(label), Some(value)) = (label, value) {
                    fields.characteristics.push((label, value));
                }
            }
        }

        Ok(fields)
    }
}
