use anyhow::Context;
use steward_core::timeline::DEFAULT_FETCH_LIMIT;
use steward_integrations::geocode::{DEFAULT_CACHE_CAPACITY, DEFAULT_GEOCODE_URL};

/// Endpoint and credentials for one external sync provider.
#[derive(Debug, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
    pub token: Option<String>,
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Minimum rows requested from each timeline source per round trip.
    pub timeline_fetch_batch: usize,
    /// Geocoding endpoint.
    pub geocode_base_url: String,
    /// Geocoding API key. Without one every lookup is denied.
    pub geocode_api_key: Option<String>,
    /// Addresses kept in the geocoding cache before the least recently
    /// used one is evicted.
    pub geocode_cache_capacity: usize,
    /// Chat platform sync; `None` leaves the provider unconfigured.
    pub chat_sync: Option<ProviderEndpoint>,
    /// Meeting platform sync; `None` leaves the provider unconfigured.
    pub meeting_sync: Option<ProviderEndpoint>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                                               |
    /// |--------------------------|-------------------------------------------------------|
    /// | `HOST`                   | `0.0.0.0`                                             |
    /// | `PORT`                   | `3000`                                                |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`                               |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                                                  |
    /// | `TIMELINE_FETCH_BATCH`   | `100`                                                 |
    /// | `GEOCODE_BASE_URL`       | `https://maps.googleapis.com/maps/api/geocode/json`   |
    /// | `GEOCODE_API_KEY`        | unset                                                 |
    /// | `GEOCODE_CACHE_CAPACITY` | `1024`                                                |
    /// | `CHAT_SYNC_BASE_URL`     | unset (chat sync not configured)                      |
    /// | `CHAT_SYNC_TOKEN`        | unset                                                 |
    /// | `MEETING_SYNC_BASE_URL`  | unset (meeting sync not configured)                   |
    /// | `MEETING_SYNC_TOKEN`     | unset                                                 |
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .context("PORT must be a valid u16")?;

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .context("REQUEST_TIMEOUT_SECS must be a valid u64")?;

        let timeline_fetch_batch: usize = match std::env::var("TIMELINE_FETCH_BATCH") {
            Ok(v) => v
                .parse()
                .context("TIMELINE_FETCH_BATCH must be a valid usize")?,
            Err(_) => DEFAULT_FETCH_LIMIT,
        };

        let geocode_base_url =
            std::env::var("GEOCODE_BASE_URL").unwrap_or_else(|_| DEFAULT_GEOCODE_URL.into());
        let geocode_api_key = non_empty_var("GEOCODE_API_KEY");
        let geocode_cache_capacity: usize = match std::env::var("GEOCODE_CACHE_CAPACITY") {
            Ok(v) => v
                .parse()
                .context("GEOCODE_CACHE_CAPACITY must be a valid usize")?,
            Err(_) => DEFAULT_CACHE_CAPACITY,
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            timeline_fetch_batch,
            geocode_base_url,
            geocode_api_key,
            geocode_cache_capacity,
            chat_sync: provider_endpoint("CHAT_SYNC"),
            meeting_sync: provider_endpoint("MEETING_SYNC"),
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `{prefix}_BASE_URL` plus optional `{prefix}_TOKEN`.
fn provider_endpoint(prefix: &str) -> Option<ProviderEndpoint> {
    let base_url = non_empty_var(&format!("{prefix}_BASE_URL"))?;
    Some(ProviderEndpoint {
        base_url,
        token: non_empty_var(&format!("{prefix}_TOKEN")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_blank_entries_dropped() {
        assert_eq!(
            parse_origins(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
