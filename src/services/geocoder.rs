use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::models::Coordinate;

/// Errors that can occur when talking to a geocoding provider
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Resolves free-text place names to coordinates
///
/// Implementations never surface errors: a lookup that fails for any reason
/// yields `None`, and the caller leaves its state untouched.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Option<Coordinate>;
}

/// One entry of a Nominatim `/search?format=json` response
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// OpenStreetMap Nominatim client
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    client: Client,
}

impl NominatimGeocoder {
    /// Create a new Nominatim client
    pub fn new(base_url: String, user_agent: String, timeout_secs: u64) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            user_agent,
            client,
        })
    }

    /// Look up the best match for `query`
    ///
    /// `Ok(None)` means the provider answered but found nothing.
    pub async fn lookup(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        );

        tracing::debug!("Geocoding '{}' via {}", query, url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Failed to geocode: {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;

        let Some(place) = places.first() else {
            return Ok(None);
        };

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::InvalidResponse(format!("bad lat '{}': {}", place.lat, e)))?;
        let lng = place
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::InvalidResponse(format!("bad lon '{}': {}", place.lon, e)))?;

        Ok(Some(Coordinate::new(lat, lng)))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Option<Coordinate> {
        match self.lookup(query).await {
            Ok(Some(location)) => Some(location),
            Ok(None) => {
                tracing::info!("No geocode result for '{}'", query);
                None
            }
            Err(e) => {
                tracing::warn!("Geocode lookup for '{}' failed: {}", query, e);
                None
            }
        }
    }
}

/// Fixed place-name table, for offline deployments and tests
#[derive(Debug, Clone, Default)]
pub struct GazetteerGeocoder {
    places: HashMap<String, Coordinate>,
}

impl GazetteerGeocoder {
    pub fn new<I, S>(places: I) -> Self
    where
        I: IntoIterator<Item = (S, Coordinate)>,
        S: AsRef<str>,
    {
        Self {
            places: places
                .into_iter()
                .map(|(name, coordinate)| (normalize(name.as_ref()), coordinate))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[async_trait]
impl Geocoder for GazetteerGeocoder {
    async fn geocode(&self, query: &str) -> Option<Coordinate> {
        let found = self.places.get(&normalize(query)).copied();
        if found.is_none() {
            tracing::info!("No gazetteer entry for '{}'", query);
        }
        found
    }
}
