//! Best-effort IP geolocation client.
//!
//! Resolves an IP to (country, city) against an ip-api.com compatible
//! endpoint. Any failure - network error, timeout, non-success status,
//! malformed body - degrades to empty strings. Nothing here ever reaches a
//! caller as an error.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::GeoSettings;

/// Geo lookup client with a hard per-request timeout.
#[derive(Clone)]
pub struct GeoClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    city: String,
}

impl GeoClient {
    /// Create a new client from configuration.
    pub fn new(settings: &GeoSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }

    /// Resolve an IP to (country, city); both empty on any failure.
    /// Skipped entirely for requests without a resolvable client IP.
    pub async fn lookup(&self, ip: &str) -> (String, String) {
        if ip.is_empty() {
            return (String::new(), String::new());
        }

        match self.try_lookup(ip).await {
            Some(place) => place,
            None => {
                debug!("Geo lookup yielded nothing for {}", ip);
                (String::new(), String::new())
            }
        }
    }

    async fn try_lookup(&self, ip: &str) -> Option<(String, String)> {
        let url = format!("{}/{}?fields=status,country,city", self.base_url, ip);

        let response = self
            .http
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: GeoResponse = response.json().await.ok()?;
        if body.status == "success" {
            Some((body.country, body.city))
        } else {
            None
        }
    }
}
