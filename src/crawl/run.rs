//! Crawl run lifecycle
//!
//! One crawl run covers one configured source from first navigation to
//! exported artifact. The run carries:
//! - the phase machine the orchestrator advances through
//! - the property URLs in discovery order
//! - extracted records and per-property failures
//! - timing and the artifact path once export succeeds

use crate::config::SourceConfig;
use crate::normalize::{Characteristics, PropertyType, TransactionType};
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::PathBuf;
use url::Url;

/// Lifecycle phase of a crawl run
///
/// Phases advance strictly forward; any non-terminal phase may abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    /// Run created, nothing fetched yet
    Init,
    /// Reading the listing-count indicator off the first listing page
    DeterminingPageCount,
    /// Walking the listing pages, collecting property URLs
    CollectingPropertyUrls,
    /// Fetching and extracting the collected properties
    ExtractingProperties,
    /// Writing the dataset artifact
    Exporting,
    /// Run finished and the artifact exists
    Done,
    /// Run died on a fatal error; no artifact was produced
    Aborted,
}

impl CrawlPhase {
    /// Converts the phase to its log/display string
    pub fn as_str(&self) -> &'static str {
        match self {
            CrawlPhase::Init => "init",
            CrawlPhase::DeterminingPageCount => "determining-page-count",
            CrawlPhase::CollectingPropertyUrls => "collecting-property-urls",
            CrawlPhase::ExtractingProperties => "extracting-properties",
            CrawlPhase::Exporting => "exporting",
            CrawlPhase::Done => "done",
            CrawlPhase::Aborted => "aborted",
        }
    }

    /// Whether the run has ended, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, CrawlPhase::Done | CrawlPhase::Aborted)
    }

    /// Whether `next` is a legal successor of this phase
    pub fn can_advance_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        match (self, next) {
            (_, Aborted) => !self.is_terminal(),
            (Init, DeterminingPageCount) => true,
            (DeterminingPageCount, CollectingPropertyUrls) => true,
            (CollectingPropertyUrls, ExtractingProperties) => true,
            (ExtractingProperties, Exporting) => true,
            (Exporting, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A property URL discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub url: Url,
}

/// One extracted, normalized property
///
/// Fields a page did not provide stay `None` and export as empty cells;
/// a sparse record is data, not an error.
#[derive(Debug, Clone)]
pub struct PropertyRecord {
    pub url: Url,
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub price: Option<String>,
    pub area: Option<String>,
    pub characteristics: Characteristics,
    pub property_type: Option<PropertyType>,
    pub transaction_type: Option<TransactionType>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A property whose attempt budget ran out (or died on a permanent error)
#[derive(Debug, Clone)]
pub struct FailedProperty {
    pub url: Url,
    pub reason: String,
    pub attempts: u32,
}

/// State of one source's crawl, from first navigation to artifact
#[derive(Debug)]
pub struct CrawlRun {
    pub source: SourceConfig,
    pub phase: CrawlPhase,
    /// Property URLs in discovery order (listing-page order, top to bottom)
    pub refs: Vec<PropertyRef>,
    /// Extracted records, ordered like `refs` minus the failures
    pub records: Vec<PropertyRecord>,
    pub failures: Vec<FailedProperty>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Path of the exported artifact, set when the run reaches `Done`
    pub artifact: Option<PathBuf>,
}

impl CrawlRun {
    /// Creates a fresh run for a source
    pub fn new(source: SourceConfig) -> Self {
        Self {
            source,
            phase: CrawlPhase::Init,
            refs: Vec::new(),
            records: Vec::new(),
            failures: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
            artifact: None,
        }
    }

    /// Advances the run to the next phase
    ///
    /// Illegal transitions are logged and ignored rather than panicking;
    /// the phase machine is bookkeeping, not a gate.
    pub fn advance(&mut self, next: CrawlPhase) {
        if !self.phase.can_advance_to(next) {
            tracing::warn!(
                "Ignoring illegal phase transition {} -> {} for source '{}'",
                self.phase,
                next,
                self.source.name
            );
            return;
        }

        tracing::debug!(
            "Source '{}' entering phase: {}",
            self.source.name,
            next
        );
        self.phase = next;

        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Marks the run aborted
    pub fn abort(&mut self) {
        self.advance(CrawlPhase::Aborted);
    }

    /// Whether the run produced its artifact
    pub fn is_complete(&self) -> bool {
        self.phase == CrawlPhase::Done
    }
}
