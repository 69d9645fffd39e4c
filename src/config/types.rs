use crate::extract::ProfileKind;
use serde::Deserialize;

/// Main configuration structure for the harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Maximum fetch-and-extract attempts per property
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Minimum time between successive property requests (milliseconds),
    /// enforced across all workers
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Number of concurrent extraction workers
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: u32,
}

/// Navigation engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// User-Agent header sent with every page request
    #[serde(rename = "user-agent", default = "default_engine_user_agent")]
    pub user_agent: String,

    /// Overall timeout for a single page navigation (seconds)
    #[serde(rename = "navigation-timeout-secs", default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// How long a wait-for-selector policy may wait (seconds)
    #[serde(rename = "wait-timeout-secs", default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
}

/// Geocoding lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim-compatible search endpoint
    #[serde(default = "default_geocoding_endpoint")]
    pub endpoint: String,

    /// Per-lookup timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_geocoding_timeout")]
    pub timeout_secs: u64,

    /// User-Agent header for geocoding requests (Nominatim requires one)
    #[serde(rename = "user-agent", default = "default_geocoding_user_agent")]
    pub user_agent: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the dataset artifacts are written into (created if absent)
    #[serde(default = "default_output_directory")]
    pub directory: String,
}

/// One listing source: a search query URL plus its extraction settings
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Short identifier used in logs and error messages
    pub name: String,

    /// Search query URL the pagination walker starts from
    pub url: String,

    /// Which extraction profile the site follows
    pub profile: ProfileKind,

    /// Listings shown per listing page
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Number of the first listing page (page offset convention; the known
    /// sites count from 1)
    #[serde(rename = "first-page", default = "default_first_page")]
    pub first_page: u32,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_page_size() -> u32 {
    20
}

fn default_first_page() -> u32 {
    1
}

fn default_request_delay_ms() -> u64 {
    3000
}

fn default_max_workers() -> u32 {
    1
}

fn default_engine_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36"
        .to_string()
}

fn default_navigation_timeout() -> u64 {
    30
}

fn default_wait_timeout() -> u64 {
    10
}

fn default_geocoding_endpoint() -> String {
    "https://nominatim.openstreetmap.org/search".to_string()
}

fn default_geocoding_timeout() -> u64 {
    10
}

fn default_geocoding_user_agent() -> String {
    concat!("immoharvest/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_output_directory() -> String {
    "./output".to_string()
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            request_delay_ms: default_request_delay_ms(),
            max_workers: default_max_workers(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user_agent: default_engine_user_agent(),
            navigation_timeout_secs: default_navigation_timeout(),
            wait_timeout_secs: default_wait_timeout(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocoding_endpoint(),
            timeout_secs: default_geocoding_timeout(),
            user_agent: default_geocoding_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
        }
    }
}
