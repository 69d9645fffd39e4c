//! Best-effort address geocoding
//!
//! Coordinates are enrichment, not substance: a property record is worth
//! keeping whether or not its address resolves. The [`Geocoder`] trait is
//! therefore infallible at the surface; lookup trouble of any kind (service
//! down, no match, unparseable response) degrades to unknown coordinates
//! and a warning in the log, never to a failed property.

mod nominatim;

pub use nominatim::NominatimGeocoder;

use async_trait::async_trait;
use thiserror::Error;

/// Resolved coordinates; both absent when the lookup found nothing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    /// The "nothing resolved" value
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Coordinates from a successful lookup
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Whether the lookup produced a usable position
    pub fn is_known(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Geocoding failures
///
/// Only `Client` ever escapes this module (geocoder construction); the
/// lookup variants are downgraded to unknown coordinates by `resolve`.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Failed to build geocoding client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Geocoding request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Geocoding endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Geocoding response carried unparseable coordinates '{lat}', '{lon}'")]
    Coordinates { lat: String, lon: String },
}

/// Resolves a free-form address to coordinates, best-effort
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks the address up; unknown coordinates on any kind of trouble
    async fn resolve(&self, address: &str) -> Coordinates;
}
