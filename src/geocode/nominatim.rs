//! Nominatim-compatible geocoding client
//!
//! Talks to any endpoint speaking the Nominatim search API (the public
//! OpenStreetMap instance by default). One lookup per address: `q=<address>`,
//! `format=json`, `limit=1`. The public instance requires an identifying
//! User-Agent, so the client always sends the configured one.

use crate::config::GeocodingConfig;
use crate::geocode::{Coordinates, GeocodeError, Geocoder};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// One place in a Nominatim search response
///
/// Nominatim serializes coordinates as strings, not numbers.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Geocoder backed by a Nominatim-compatible search endpoint
pub struct NominatimGeocoder {
    client: reqwest::Client,
    endpoint: String,
}

impl NominatimGeocoder {
    /// Creates a geocoder from the geocoding configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, timeout and User-Agent settings
    ///
    /// # Returns
    ///
    /// * `Ok(NominatimGeocoder)` - Ready to resolve addresses
    /// * `Err(GeocodeError)` - The HTTP client could not be built
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GeocodeError::Client)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Runs one search request and picks the best match, if any
    async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(GeocodeError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> =
            response.json().await.map_err(GeocodeError::Request)?;

        let place = match places.into_iter().next() {
            Some(place) => place,
            None => return Ok(None),
        };

        match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Some(Coordinates::new(lat, lon))),
            _ => Err(GeocodeError::Coordinates {
                lat: place.lat,
                lon: place.lon,
            }),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Coordinates {
        match self.lookup(address).await {
            Ok(Some(coordinates)) => {
                tracing::debug!(
                    "Geocoded '{}' to ({:?}, {:?})",
                    address,
                    coordinates.latitude,
                    coordinates.longitude
                );
                coordinates
            }
            Ok(None) => {
                tracing::warn!("Geocoding found no match for '{}'", address);
                Coordinates::unknown()
            }
            Err(e) => {
                tracing::warn!("Geocoding unavailable for '{}': {}", address, e);
                Coordinates::unknown()
            }
        }
    }
}
