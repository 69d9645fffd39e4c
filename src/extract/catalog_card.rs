//! Catalog-card extraction profile
//!
//! Covers sites that render search results as property cards and the
//! property page itself as a card-styled detail view. Characteristics are
//! icon-tagged: a list of `<li>` items, each holding an `<i>` whose class
//! names the characteristic and a `<span>` holding the value.

use crate::engine::LoadedPage;
use crate::extract::{dom, ExtractError, ExtractionProfile, ProfileKind, RawFields};
use scraper::Selector;
use url::Url;

/// Listing-count indicator region
const COUNT_INDICATOR: &str = "header.block-alert h2";

/// Property links on a listing page (the priced card anchors)
const LISTING_LINKS: &str = "a.property-card-link.property-price";

/// Explicit transaction-type toggle on the listing page
const TRANSACTION_LABEL: &str = "a.handle";

/// Structural anchor: the card container a property page must have
const PROPERTY_ANCHOR: &str = "div.property-card";

const NAME_META: &str = "meta[name='og:title']";
const DESCRIPTION: &str = "div.collapsed p";
const ADDRESS: &str = "div.block-localisation-address";
const PRICE: &str = "span.property-card-price";
const CHARACTERISTIC_ITEMS: &str = "ul.property-card-info-icons li";

/// Card-markup site profile
pub struct CatalogCardProfile;

impl ExtractionProfile for CatalogCardProfile {
    fn kind(&self) -> ProfileKind {
        ProfileKind::CatalogCard
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

    fn extract_transaction_label(&self, page: &LoadedPage) -> Option<String> {
        dom::first_text(&page.document(), TRANSACTION_LABEL).map(|label| label.to_lowercase())
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
            name: dom::first_attr(&document, NAME_META, "content"),
            description: dom::first_text(&document, DESCRIPTION),
            address: dom::first_text(&document, ADDRESS),
            price: dom::first_text(&document, PRICE),
            characteristics: Vec::new(),
        };

        // Each characteristic item pairs an icon (the key) with a span (the
        // value); items missing either half are skipped
        if let (Ok(item_sel), Ok(icon_sel), Ok(value_sel)) = (
            Selector::parse(CHARACTERISTIC_ITEMS),
            Selector::parse("i"),
            Selector::parse("span"),
        ) {
            for item in document.select(&item_sel) {
                let icon_class = item
                    .select(&icon_sel)
                    .next()
                    .and_then(|icon| icon.value().attr("class"))
                    .map(|class| class.trim().to_string())
                    .filter(|class| !class.is_empty());

                let value = item
                    .select(&value_sel)
                    .next()
                    .map(|span| span.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty());

                if let (Some(icon_class), Some(value)) = (icon_class, value) {
                    fields.characteristics.push((icon_class, value));
                }
            }
        }

        Ok(fields)
    }
}
