//! Site-specific extraction profiles
//!
//! Listing sites differ in markup, not in shape: every source has listing
//! pages that link to property pages, a listing-count indicator, and a set
//! of property fields. A profile captures one site's markup rules behind a
//! common trait so the crawl pipeline stays site-agnostic. Profiles are
//! selected per source at configuration time, never by sniffing URLs.
//!
//! Known variants:
//! - [`CatalogCardProfile`] - card markup with icon-tagged characteristics
//! - [`AttributeTableProfile`] - detail table with label/value rows

pub mod dom;

mod attribute_table;
mod catalog_card;

pub use attribute_table::AttributeTableProfile;
pub use catalog_card::CatalogCardProfile;

use crate::engine::LoadedPage;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Extraction failures
///
/// Individual fields never fail: a field whose element is missing is simply
/// absent. The only hard failure is a page whose structural anchor is
/// missing entirely, meaning the navigation landed somewhere that is not a
/// property page at all. Retrying such a page would refetch the same markup,
/// so the error is permanent.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required element '{selector}' missing on {url}")]
    MissingStructure { url: String, selector: String },
}

impl ExtractError {
    /// Whether retrying the extraction has any chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::MissingStructure { .. } => false,
        }
    }
}

/// Which extraction profile a source follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileKind {
    /// Card markup, characteristics tagged by icon class
    CatalogCard,
    /// Detail-table markup, characteristics as label/value rows
    AttributeTable,
}

impl ProfileKind {
    /// The configuration string for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::CatalogCard => "catalog-card",
            ProfileKind::AttributeTable => "attribute-table",
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raw field harvest from one property page
///
/// Every field is optional; normalization decides what to make of them.
/// Characteristic pairs keep their document order and their raw keys
/// (icon class string or table label, depending on the profile).
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: Option<String>,
    pub characteristics: Vec<(String, String)>,
}

/// One site variant's markup rules
pub trait ExtractionProfile: Send + Sync {
    /// The kind this profile implements
    fn kind(&self) -> ProfileKind;

    /// Selector of the page region holding the listing-count indicator
    ///
    /// Also serves as the navigation wait target for the first listing page.
    fn count_indicator_selector(&self) -> &'static str;

    /// Reads the raw listing-count indicator text from a listing page
    fn extract_listing_count(&self, page: &LoadedPage) -> Option<String> {
        dom::first_text(&page.document(), self.count_indicator_selector())
    }

    /// Collects property-detail URLs from a listing page, in document order,
    /// resolved absolute against the page URL
    fn extract_listing_links(&self, page: &LoadedPage) -> Vec<Url>;

    /// Reads the site's explicit transaction-type signal, when it has one
    fn extract_transaction_label(&self, page: &LoadedPage) -> Option<String>;

    /// Harvests the raw property fields from a property page
    ///
    /// Fails only when the profile's structural anchor is absent; every
    /// individual field lookup degrades to `None`.
    fn extract_property_fields(&self, page: &LoadedPage) -> Result<RawFields, ExtractError>;
}

/// Returns the profile implementation for a configured kind
pub fn profile_for(kind: ProfileKind) -> Arc<dyn ExtractionProfile> {
    match kind {
        ProfileKind::CatalogCard => Arc::new(CatalogCardProfile),
        ProfileKind::AttributeTable => Arc::new(AttributeTableProfile),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_kind_round_trip() {
        assert_eq!(ProfileKind::CatalogCard.to_string(), "catalog-card");
        assert_eq!(ProfileKind::AttributeTable.to_string(), "attribute-table");
    }

    #[test]
    fn test_profile_for_matches_kind() {
        assert_eq!(
            profile_for(ProfileKind::CatalogCard).kind(),
            ProfileKind::CatalogCard
        );
        assert_eq!(
            profile_for(ProfileKind::AttributeTable).kind(),
            ProfileKind::AttributeTable
        );
    }

    #[test]
    fn test_missing_structure_is_permanent() {
        let err = ExtractError::MissingStructure {
            url: "https://a.example/p/1".to_string(),
            selector: "div.property-card".to_string(),
        };
        assert!(!err.is_retryable());
    }
}
