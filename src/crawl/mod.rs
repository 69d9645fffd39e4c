//! Crawl pipeline module
//!
//! This module contains the crawl lifecycle, including:
//! - Pagination walking over listing pages
//! - Bounded retry with error classification
//! - Shared request pacing across the worker pool
//! - Run state and phase tracking
//! - Overall crawl orchestration

mod orchestrator;
mod pagination;
mod retry;
mod run;
mod throttle;

pub use orchestrator::{Orchestrator, PropertyError};
pub use pagination::{
    listing_page_url, parse_listing_count, total_pages, ListingPageRef, PaginationError,
    PaginationWalker,
};
pub use retry::{with_retries, RetryFailure, Retryable};
pub use run::{CrawlPhase, CrawlRun, FailedProperty, PropertyRecord, PropertyRef};
pub use throttle::RateLimiter;

use crate::config::Config;
use crate::engine::{HttpEngine, PageEngine};
use crate::geocode::{Geocoder, NominatimGeocoder};
use crate::HarvestError;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest over every configured source
///
/// This is the main entry point for a harvest. It will:
/// 1. Build the HTTP navigation engine
/// 2. Build the Nominatim geocoding client
/// 3. Crawl each source in configuration order, isolating failures
/// 4. Export one CSV artifact per completed source
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `cancel` - Token that aborts in-progress runs when cancelled
///
/// # Returns
///
/// * `Ok(Vec<CrawlRun>)` - The completed runs (aborted sources are absent)
/// * `Err(HarvestError)` - Engine or geocoder construction failed
pub async fn run_harvest(
    config: &Config,
    cancel: CancellationToken,
) -> Result<Vec<CrawlRun>, HarvestError> {
    let engine: Arc<dyn PageEngine> = Arc::new(HttpEngine::new(&config.engine)?);
    let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimGeocoder::new(&config.geocoding)?);

    let orchestrator = Orchestrator::with_cancellation(engine, geocoder, config, cancel);
    Ok(orchestrator.run_all(&config.sources).await)
}
