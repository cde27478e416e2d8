//! Address geocoding with a bounded in-memory cache.
//!
//! [`Geocoder`] keys its cache by normalized address, answers repeats from
//! it and delegates misses to a [`GeocodeProvider`] with the caller's
//! trimmed address. Only successful lookups are cached, so a transient
//! provider error is retried on the next call. Once the cache holds
//! `capacity` addresses the least recently used one is evicted.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// A resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Errors from geocoding.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Address is empty")]
    InvalidAddress,

    /// The provider knows no location for the address.
    #[error("No location found for address: {0}")]
    NotFound(String),

    /// The API key is missing, invalid, or lacks billing.
    #[error("Geocoding request denied: {0}")]
    PermissionDenied(String),

    /// Any other non-OK provider status.
    #[error("Geocoding provider error: {0}")]
    Provider(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Something that turns an address into coordinates.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;
}

/// Trim, lowercase and collapse internal whitespace.
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Addresses kept by a [`Geocoder`] unless configured otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Least-recently-used map from normalized address to coordinates.
struct AddressCache {
    capacity: usize,
    entries: HashMap<String, Coordinates>,
    /// Keys from least to most recently used.
    order: VecDeque<String>,
}

impl AddressCache {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&mut self, key: &str) -> Option<Coordinates> {
        let hit = *self.entries.get(key)?;
        self.touch(key);
        Some(hit)
    }

    fn insert(&mut self, key: String, coordinates: Coordinates) {
        if self.entries.insert(key.clone(), coordinates).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }

    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

/// Caching front for a [`GeocodeProvider`].
pub struct Geocoder<P = HttpGeocodeProvider> {
    provider: P,
    cache: Mutex<AddressCache>,
}

impl<P: GeocodeProvider> Geocoder<P> {
    pub fn new(provider: P) -> Self {
        Self::with_capacity(provider, DEFAULT_CACHE_CAPACITY)
    }

    /// A geocoder caching at most `capacity` addresses (minimum one).
    pub fn with_capacity(provider: P, capacity: usize) -> Self {
        Self {
            provider,
            cache: Mutex::new(AddressCache::new(capacity)),
        }
    }

    pub async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let key = normalize_address(address);
        if key.is_empty() {
            return Err(GeocodeError::InvalidAddress);
        }

        if let Some(hit) = self.cache.lock().await.get(&key) {
            return Ok(hit);
        }

        let coordinates = self.provider.geocode(address.trim()).await?;
        self.cache.lock().await.insert(key, coordinates);
        Ok(coordinates)
    }

    /// Number of cached addresses.
    pub async fn cached(&self) -> usize {
        self.cache.lock().await.entries.len()
    }
}

// ---------------------------------------------------------------------------
// HTTP provider
// ---------------------------------------------------------------------------

/// Default endpoint of the hosted geocoding API.
pub const DEFAULT_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Geocoding over HTTP against a Google-style JSON endpoint.
pub struct HttpGeocodeProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Coordinates,
}

impl HttpGeocodeProvider {
    /// A provider without a key fails every lookup with
    /// [`GeocodeError::PermissionDenied`].
    pub fn new(base_url: String, api_key: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(client: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

/// Map a provider response body onto coordinates or a typed error.
fn interpret_response(address: &str, response: GeocodeResponse) -> Result<Coordinates, GeocodeError> {
    let detail = || response.error_message.clone().unwrap_or_else(|| response.status.clone());
    match response.status.as_str() {
        "OK" => response
            .results
            .first()
            .map(|r| r.geometry.location)
            .ok_or_else(|| GeocodeError::NotFound(address.to_string())),
        "ZERO_RESULTS" => Err(GeocodeError::NotFound(address.to_string())),
        "REQUEST_DENIED" => Err(GeocodeError::PermissionDenied(detail())),
        _ => Err(GeocodeError::Provider(detail())),
    }
}

#[async_trait]
impl GeocodeProvider for HttpGeocodeProvider {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(GeocodeError::PermissionDenied(
                "Geocoding API key is not configured".into(),
            ));
        };

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", key)])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GeocodeError::PermissionDenied(status.to_string()));
        }
        if !status.is_success() {
            return Err(GeocodeError::Provider(status.to_string()));
        }

        let body: GeocodeResponse = response.json().await?;
        interpret_response(address, body)
    }
}
