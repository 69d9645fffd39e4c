//! Immoharvest: a real-estate listing harvester
//!
//! This crate crawls paginated listing-site search results, extracts and
//! normalizes property details, geocodes addresses best-effort, and exports
//! one CSV dataset per configured source.

pub mod config;
pub mod crawl;
pub mod engine;
pub mod export;
pub mod extract;
pub mod geocode;
pub mod normalize;

use thiserror::Error;

/// Main error type for harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Navigation error: {0}")]
    Engine(#[from] engine::EngineError),

    #[error("Pagination error: {0}")]
    Pagination(#[from] crawl::PaginationError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("Export error: {0}")]
    Export(#[from] export::ExportError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] geocode::GeocodeError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crawl of source '{source}' aborted: {cause}")]
    Aborted {
        source: String,
        #[source]
        cause: Box<HarvestError>,
    },

    #[error("Crawl of source '{source}' cancelled")]
    // `source` holds the crawl source's name, not an error cause; the raw
    // identifier keeps thiserror from inferring it as Error::source()
    Cancelled { r#source: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, SourceConfig};
pub use crawl::{CrawlPhase, CrawlRun, Orchestrator};
pub use engine::{HttpEngine, LoadedPage, PageEngine, WaitPolicy};
pub use export::CsvExporter;
pub use extract::{profile_for, ExtractionProfile, ProfileKind};
pub use geocode::{Coordinates, Geocoder, NominatimGeocoder};
