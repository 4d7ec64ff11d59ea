//! Utility functions for common operations

use crate::error::ExtractError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Join the API base address and an endpoint name into a request URL
pub fn endpoint_url(base_url: &str, endpoint: &str) -> Result<String, ExtractError> {
    let name = endpoint.trim().trim_matches('/');

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'));
    if !valid {
        return Err(ExtractError::InvalidEndpoint(endpoint.to_string()));
    }

    Ok(format!("{}/{}", base_url.trim_end_matches('/'), name))
}

/// GET a JSON document with bearer authentication
pub async fn http_get_json(client: &Client, url: &str, api_key: &str) -> Result<Value, ExtractError> {
    info!("Requesting {}", url);

    let response = client
        .get(url)
        .bearer_auth(api_key)
        .header(CONTENT_TYPE, "application/json")
        .send()
        .await
        .map_err(|source| ExtractError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response
        .json::<Value>()
        .await
        .map_err(|source| ExtractError::Decode {
            url: url.to_string(),
            source,
        })?;
    debug!("Received JSON body from {}", url);

    Ok(body)
}

/// Parse a sale date in any of the accepted layouts.
/// Offsets are normalized to UTC; bare dates mean midnight.
pub fn parse_sale_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
