//! IP geolocation client backed by an ip-api.com style HTTP endpoint.
//!
//! Every tracked event triggers exactly one lookup; there is no caching or
//! backoff, so a throttled upstream surfaces through the normal error path.

use serde::Deserialize;
use std::env;
use thiserror::Error;

const DEFAULT_GEO_API_URL: &str = "http://ip-api.com/json";

/// Errors that can occur during geolocation lookups
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Geolocation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geolocation lookup failed: {0}")]
    Lookup(String),
}

/// Raw response shape of the lookup service.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeoApiResponse {
    pub status: String,
    pub message: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub timezone: Option<String>,
    pub isp: Option<String>,
    pub org: Option<String>,
}

/// Location metadata for one IP, normalized so absent fields read "Unknown".
#[derive(Debug, Clone)]
pub struct GeoInfo {
    pub company: String, // from the lookup's `org` field
    pub city: String,
    pub country: String,
    pub region: String,
    pub timezone: String,
    pub isp: String,
}

fn or_unknown(value: Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => String::from("Unknown"),
    }
}

pub fn parse_lookup(response: GeoApiResponse) -> Result<GeoInfo, GeoError> {
    if response.status != "success" {
        return Err(GeoError::Lookup(
            response
                .message
                .unwrap_or_else(|| String::from("lookup service reported failure")),
        ));
    }

    Ok(GeoInfo {
        company: or_unknown(response.org),
        city: or_unknown(response.city),
        country: or_unknown(response.country),
        region: or_unknown(response.region),
        timezone: or_unknown(response.timezone),
        isp: or_unknown(response.isp),
    })
}

/// HTTP client for the external IP-to-location service.
pub struct GeoClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeoClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Base URL comes from GEO_API_URL, falling back to the public endpoint.
    pub fn from_env() -> Self {
        let base_url =
            env::var("GEO_API_URL").unwrap_or_else(|_| String::from(DEFAULT_GEO_API_URL));
        Self::new(base_url)
    }

    pub async fn lookup(&self, ip: &str) -> Result<GeoInfo, GeoError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);
        let response = self
            .http
            .get(&url)
            .send()
            .await?
            .json::<GeoApiResponse>()
            .await?;

        parse_lookup(response)
    }
}
