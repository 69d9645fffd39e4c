//! Crawl orchestration
//!
//! Drives one source through its whole lifecycle:
//! 1. Read the listing-count indicator off the first listing page
//! 2. Derive the page count and walk every listing page, collecting
//!    property URLs in discovery order
//! 3. Fetch and extract the properties through a worker pool that shares
//!    one politeness budget
//! 4. Export the records as one CSV artifact
//!
//! A property that exhausts its attempt budget is recorded and skipped;
//! only pagination, listing-page navigation and export failures are fatal
//! to a run. Sources are isolated from each other: one aborted source
//! never stops the next.

use crate::config::{Config, CrawlConfig, SourceConfig};
use crate::crawl::pagination::{parse_listing_count, PaginationError, PaginationWalker};
use crate::crawl::retry::{with_retries, RetryFailure, Retryable};
use crate::crawl::run::{CrawlPhase, CrawlRun, FailedProperty, PropertyRecord, PropertyRef};
use crate::crawl::throttle::RateLimiter;
use crate::engine::{EngineError, PageEngine, WaitPolicy};
use crate::export::CsvExporter;
use crate::extract::{profile_for, ExtractError, ExtractionProfile, RawFields};
use crate::geocode::{Coordinates, Geocoder};
use crate::normalize::{
    canonicalize_characteristics, classify_property_type, normalize_price, TransactionType,
};
use crate::HarvestError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Why one property failed
#[derive(Debug, Error)]
pub enum PropertyError {
    #[error(transparent)]
    Navigation(#[from] EngineError),

    #[error(transparent)]
    Extraction(#[from] ExtractError),
}

impl Retryable for PropertyError {
    fn is_retryable(&self) -> bool {
        match self {
            PropertyError::Navigation(e) => e.is_retryable(),
            PropertyError::Extraction(e) => e.is_retryable(),
        }
    }
}

/// Runs crawl lifecycles over a shared engine, geocoder and exporter
pub struct Orchestrator {
    engine: Arc<dyn PageEngine>,
    geocoder: Arc<dyn Geocoder>,
    crawl: CrawlConfig,
    exporter: CsvExporter,
    cancel: CancellationToken,
}

impl Orchestrator {
    /// Creates an orchestrator with its own cancellation token
    pub fn new(engine: Arc<dyn PageEngine>, geocoder: Arc<dyn Geocoder>, config: &Config) -> Self {
        Self::with_cancellation(engine, geocoder, config, CancellationToken::new())
    }

    /// Creates an orchestrator observing an external cancellation token
    pub fn with_cancellation(
        engine: Arc<dyn PageEngine>,
        geocoder: Arc<dyn Geocoder>,
        config: &Config,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            engine,
            geocoder,
            crawl: config.crawl.clone(),
            exporter: CsvExporter::new(&config.output.directory),
            cancel,
        }
    }

    /// The token this orchestrator observes between pages and properties
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Crawls every source in order
    ///
    /// Sources are isolated: an aborted source is logged and the next one
    /// starts. Returns the completed runs.
    pub async fn run_all(&self, sources: &[SourceConfig]) -> Vec<CrawlRun> {
        let mut runs = Vec::new();

        for source in sources {
            if self.cancel.is_cancelled() {
                tracing::info!("Cancellation requested, skipping remaining sources");
                break;
            }

            match self.run_source(source).await {
                Ok(run) => runs.push(run),
                Err(e) => {
                    tracing::error!("Source '{}' failed: {}", source.name, e);
                }
            }
        }

        runs
    }

    /// Runs the full crawl lifecycle for one source
    ///
    /// # Arguments
    ///
    /// * `source` - The source to crawl
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlRun)` - Completed run, artifact written
    /// * `Err(HarvestError)` - The run aborted on a fatal error
    pub async fn run_source(&self, source: &SourceConfig) -> Result<CrawlRun, HarvestError> {
        tracing::info!(
            "Crawling source '{}' ({} profile): {}",
            source.name,
            source.profile,
            source.url
        );

        let mut run = CrawlRun::new(source.clone());
        match self.drive(source, &mut run).await {
            Ok(()) => {
                tracing::info!(
                    "Source '{}' done: {} records, {} failures",
                    source.name,
                    run.records.len(),
                    run.failures.len()
                );
                Ok(run)
            }
            Err(e) => {
                run.abort();
                if matches!(e, HarvestError::Cancelled { .. }) {
                    return Err(e);
                }
                Err(HarvestError::Aborted {
                    source: source.name.clone(),
                    cause: Box::new(e),
                })
            }
        }
    }

    /// Advances one run through every phase
    async fn drive(&self, source: &SourceConfig, run: &mut CrawlRun) -> Result<(), HarvestError> {
        if self.cancel.is_cancelled() {
            return Err(HarvestError::Cancelled {
                source: source.name.clone(),
            });
        }

        let profile = profile_for(source.profile);
        let query_url = Url::parse(&source.url)?;

        // 1. Page count from the site's own listing-count indicator
        run.advance(CrawlPhase::DeterminingPageCount);
        let first_page = self
            .engine
            .navigate(
                &query_url,
                WaitPolicy::selector(profile.count_indicator_selector()),
            )
            .await?;
        let indicator = profile
            .extract_listing_count(&first_page)
            .ok_or(PaginationError::IndicatorMissing)?;
        let total_listings = parse_listing_count(&indicator)?;

        let walker = PaginationWalker::for_source(source);
        let page_count = walker.total_pages(total_listings);
        tracing::info!(
            "Source '{}' reports {} listings across {} pages",
            source.name,
            total_listings,
            page_count
        );

        // The explicit transaction signal, where the site exposes one
        let transaction_label = profile.extract_transaction_label(&first_page);

        // 2. Property URLs from every listing page, in page order
        run.advance(CrawlPhase::CollectingPropertyUrls);
        for page_ref in walker.walk(&query_url, total_listings) {
            if self.cancel.is_cancelled() {
                return Err(HarvestError::Cancelled {
                    source: source.name.clone(),
                });
            }

            let page = self.engine.navigate(&page_ref.url, WaitPolicy::Load).await?;
            let links = profile.extract_listing_links(&page);
            tracing::info!(
                "Listing page {} of source '{}': {} property links",
                page_ref.number,
                source.name,
                links.len()
            );
            run.refs
                .extend(links.into_iter().map(|url| PropertyRef { url }));
        }

        // 3. Fetch and extract the collected properties
        run.advance(CrawlPhase::ExtractingProperties);
        let (records, failures) = self
            .extract_all(source, &profile, transaction_label.as_deref(), &run.refs)
            .await?;
        run.records = records;
        run.failures = failures;

        // 4. One artifact per source
        run.advance(CrawlPhase::Exporting);
        let artifact = self.exporter.export(source, &run.records)?;
        tracing::info!(
            "Exported {} records for source '{}' to {}",
            run.records.len(),
            source.name,
            artifact.display()
        );
        run.artifact = Some(artifact);

        run.advance(CrawlPhase::Done);
        Ok(())
    }

    /// Works through the property queue with a bounded worker pool
    ///
    /// Workers pull from a shared queue and share one rate limiter, so the
    /// politeness delay holds across the whole pool. Outcomes are reordered
    /// into discovery order afterwards; completion order never shows in the
    /// dataset.
    async fn extract_all(
        &self,
        source: &SourceConfig,
        profile: &Arc<dyn ExtractionProfile>,
        transaction_label: Option<&str>,
        refs: &[PropertyRef],
    ) -> Result<(Vec<PropertyRecord>, Vec<FailedProperty>), HarvestError> {
        let total = refs.len();
        if total == 0 {
            return Ok((Vec::new(), Vec::new()));
        }

        let queue: Arc<Mutex<VecDeque<(usize, PropertyRef)>>> =
            Arc::new(Mutex::new(refs.iter().cloned().enumerate().collect()));
        let outcomes: Arc<Mutex<Vec<(usize, Result<PropertyRecord, FailedProperty>)>>> =
            Arc::new(Mutex::new(Vec::with_capacity(total)));
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(
            self.crawl.request_delay_ms,
        )));

        let worker_count = (self.crawl.max_workers as usize).clamp(1, total);
        tracing::debug!(
            "Extracting {} properties with {} workers",
            total,
            worker_count
        );

        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let queue = Arc::clone(&queue);
            let outcomes = Arc::clone(&outcomes);
            let limiter = Arc::clone(&limiter);
            let engine = Arc::clone(&self.engine);
            let geocoder = Arc::clone(&self.geocoder);
            let profile = Arc::clone(profile);
            let cancel = self.cancel.clone();
            let label = transaction_label.map(str::to_string);
            let max_attempts = self.crawl.max_attempts;
            let source_name = source.name.clone();

            handles.push(tokio::spawn(async move {
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }

                    let job = queue.lock().unwrap().pop_front();
                    let (index, property) = match job {
                        Some(job) => job,
                        None => break,
                    };
                    tracing::debug!("Processing property: {}", property.url);

                    // Every attempt pays the politeness delay, retries included
                    let result = tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = with_retries(property.url.as_str(), max_attempts, || async {
                            limiter.acquire().await;
                            extract_property(
                                engine.as_ref(),
                                profile.as_ref(),
                                geocoder.as_ref(),
                                &property.url,
                                label.as_deref(),
                            )
                            .await
                        }) => result,
                    };

                    let outcome = match result {
                        Ok(record) => Ok(record),
                        Err(RetryFailure { error, attempts }) => {
                            tracing::error!(
                                "Property {} of source '{}' failed after {} attempt(s): {}",
                                property.url,
                                source_name,
                                attempts,
                                error
                            );
                            Err(FailedProperty {
                                url: property.url.clone(),
                                reason: error.to_string(),
                                attempts,
                            })
                        }
                    };

                    let done = {
                        let mut guard = outcomes.lock().unwrap();
                        guard.push((index, outcome));
                        guard.len()
                    };
                    if done % 10 == 0 || done == total {
                        tracing::info!(
                            "Source '{}': {}/{} properties processed",
                            source_name,
                            done,
                            total
                        );
                    }
                }
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Extraction worker panicked: {}", e);
            }
        }

        if self.cancel.is_cancelled() {
            return Err(HarvestError::Cancelled {
                source: source.name.clone(),
            });
        }

        // Completion order is whatever the pool made of it; the dataset
        // keeps discovery order
        let mut collected: Vec<(usize, Result<PropertyRecord, FailedProperty>)> = {
            let mut guard = outcomes.lock().unwrap();
            guard.drain(..).collect()
        };
        collected.sort_by_key(|(index, _)| *index);

        let mut records = Vec::new();
        let mut failures = Vec::new();
        for (_, outcome) in collected {
            match outcome {
                Ok(record) => records.push(record),
                Err(failure) => failures.push(failure),
            }
        }

        Ok((records, failures))
    }
}

/// Fetches one property page and turns it into a record
async fn extract_property(
    engine: &dyn PageEngine,
    profile: &dyn ExtractionProfile,
    geocoder: &dyn Geocoder,
    url: &Url,
    transaction_label: Option<&str>,
) -> Result<PropertyRecord, PropertyError> {
    let page = engine.navigate(url, WaitPolicy::Load).await?;
    let raw = profile.extract_property_fields(&page)?;
    Ok(build_record(url.clone(), raw, transaction_label, geocoder).await)
}

/// Normalizes raw fields into a record and resolves coordinates
///
/// The transaction type prefers the site's explicit signal; only sites
/// without one fall back to inferring from the price magnitude. Geocoding
/// runs once per property and only when an address was extracted.
async fn build_record(
    url: Url,
    raw: RawFields,
    transaction_label: Option<&str>,
    geocoder: &dyn Geocoder,
) -> PropertyRecord {
    let characteristics = canonicalize_characteristics(&raw.characteristics);
    let area = characteristics.area();
    let price = raw.price.as_deref().and_then(normalize_price);
    let property_type = raw.name.as_deref().and_then(classify_property_type);

    let transaction_type = transaction_label
        .map(TransactionType::from_site_label)
        .or_else(|| {
            price
                .as_ref()
                .map(|p| TransactionType::infer_from_magnitude(p.magnitude))
        });

    let coordinates = match raw.address.as_deref() {
        Some(address) => geocoder.resolve(address).await,
        None => Coordinates::unknown(),
    };

    PropertyRecord {
        url,
        name: raw.name,
        description: raw.description,
        address: raw.address,
        price: price.map(|p| p.display),
        area,
        characteristics,
        property_type,
        transaction_type,
        latitude: coordinates.latitude,
        longitude: coordinates.longitude,
    }
}
