//! Listing-page pagination
//!
//! A source is a search query URL whose results span several listing pages.
//! The walker derives how many pages exist from the site's own listing-count
//! indicator and enumerates the page URLs lazily:
//! - page count is ceil(total listings / page size), never a probe loop
//! - page URLs are the query URL with a `page` parameter appended
//! - enumeration is restartable; each call hands out a fresh iterator

use crate::config::SourceConfig;
use regex::Regex;
use thiserror::Error;
use url::Url;

/// Pagination failures
///
/// Both variants are fatal to a crawl run: without a listing count there is
/// no page count, and guessing one would silently truncate the dataset.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("Listing-count indicator missing or empty on the first listing page")]
    IndicatorMissing,

    #[error("Could not read a listing count out of '{0}'")]
    IndicatorUnparseable(String),
}

/// One listing page the walker will visit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPageRef {
    /// Page number in the source's own numbering convention
    pub number: u32,
    /// Full URL of the listing page
    pub url: Url,
}

/// First integer-like token: a digit run that may continue with grouping
/// separators (comma, dot, regular or non-breaking spaces) between digits
const COUNT_TOKEN: &str = r"\d[\d.,\s]*\d|\d";

/// Parses the total listing count out of an indicator text
///
/// Sites render the count in free-form copy ("1,234 listings on the market",
/// "2 345 résultats"), with locale-dependent digit grouping. The first
/// integer-like token wins; its grouping separators are stripped before
/// parsing.
///
/// # Arguments
///
/// * `indicator_text` - The raw text of the listing-count indicator element
///
/// # Returns
///
/// * `Ok(u64)` - The total number of listings the source reports
/// * `Err(PaginationError)` - No integer-like token found
///
/// # Example
///
/// ```
/// use immoharvest::crawl::parse_listing_count;
///
/// assert_eq!(parse_listing_count("1,234 listings on the market").unwrap(), 1234);
/// assert_eq!(parse_listing_count("2\u{202f}345 résultats").unwrap(), 2345);
/// ```
pub fn parse_listing_count(indicator_text: &str) -> Result<u64, PaginationError> {
    let token = match Regex::new(COUNT_TOKEN) {
        Ok(re) => re
            .find(indicator_text)
            .map(|m| m.as_str().to_string()),
        Err(_) => None,
    };

    let token = token
        .ok_or_else(|| PaginationError::IndicatorUnparseable(indicator_text.to_string()))?;

    // Keep the digits, drop the grouping separators
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    digits
        .parse()
        .map_err(|_| PaginationError::IndicatorUnparseable(indicator_text.to_string()))
}

/// Computes the number of listing pages for a listing count
///
/// Ceiling division: a partially filled last page still counts as a page.
/// Zero listings mean zero pages, as does a zero page size.
pub fn total_pages(total_listings: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    ((total_listings + page_size as u64 - 1) / page_size as u64) as u32
}

/// Builds one listing page URL by appending the source's page parameter
///
/// The query URL is taken as configured; any parameters it already carries
/// stay in place and `page=<number>` is appended after them.
pub fn listing_page_url(query_url: &Url, page_number: u32) -> Url {
    let mut url = query_url.clone();
    url.query_pairs_mut()
        .append_pair("page", &page_number.to_string());
    url
}

/// Lazily enumerates the listing pages of one source
#[derive(Debug, Clone)]
pub struct PaginationWalker {
    page_size: u32,
    first_page: u32,
}

impl PaginationWalker {
    /// Creates a walker from a source's pagination settings
    pub fn for_source(source: &SourceConfig) -> Self {
        Self {
            page_size: source.page_size,
            first_page: source.first_page,
        }
    }

    /// Number of listing pages this source will have for a listing count
    pub fn total_pages(&self, total_listings: u64) -> u32 {
        total_pages(total_listings, self.page_size)
    }

    /// Iterates over every listing page of the source, first page onward
    ///
    /// The iterator is lazy and finite. It borrows nothing from the walker,
    /// so a caller can restart enumeration at any time by calling `walk`
    /// again.
    pub fn walk(&self, query_url: &Url, total_listings: u64) -> impl Iterator<Item = ListingPageRef> {
        let pages = self.total_pages(total_listings);
        let first = self.first_page;
        let base = query_url.clone();

        (first..first.saturating_add(pages)).map(move |number| ListingPageRef {
            number,
            url: listing_page_url(&base, number),
        })
    }
}
