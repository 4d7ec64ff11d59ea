//! Fetch functions - retrieve raw sales records from the source API

use crate::error::{ExtractError, RejectReason};
use crate::ingestion::types::{ExtractOutcome, RawSaleRecord, RejectedRecord};
use crate::ingestion::utils::{endpoint_url, http_get_json};
use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};

/// Connection details for the sales API
#[derive(Debug, Clone)]
pub struct Extractor {
    client: Client,
    base_url: String,
    api_key: String,
}

impl Extractor {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Extractor {
            client,
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

/// Fetch sales records from `{base_url}/{endpoint}`.
///
/// Never fails: transport errors, non-success statuses and unusable bodies
/// are logged and returned as `ExtractOutcome::Failed`.
pub async fn fetch_sales(extractor: &Extractor, endpoint: &str) -> ExtractOutcome {
    let span = info_span!("extract", endpoint = endpoint);

    async {
        match try_fetch_sales(extractor, endpoint).await {
            Ok(SalesBatch { records, skipped }) => {
                info!(
                    "Extracted {} sales records ({} entries skipped)",
                    records.len(),
                    skipped.len()
                );
                ExtractOutcome::Fetched { records, skipped }
            }
            Err(e) => {
                error!("Extraction failed: {}", e);
                ExtractOutcome::Failed(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn try_fetch_sales(extractor: &Extractor, endpoint: &str) -> Result<SalesBatch, ExtractError> {
    let url = endpoint_url(&extractor.base_url, endpoint)?;
    let body = http_get_json(&extractor.client, &url, &extractor.api_key).await?;

    records_from_body(body, Utc::now())
}

/// Records read from one response, plus the entries that could not be read
#[derive(Debug, Default)]
pub struct SalesBatch {
    pub records: Vec<RawSaleRecord>,
    pub skipped: Vec<RejectedRecord>,
}

/// Pull the `sales` array out of a response body and stamp every record
/// with the same extraction time.
///
/// Only JSON objects are records. Any other entry is skipped and reported
/// with its array position; the rest of the batch is kept.
pub fn records_from_body(
    mut body: Value,
    extracted_at: DateTime<Utc>,
) -> Result<SalesBatch, ExtractError> {
    let sales = match body.get_mut("sales").map(Value::take) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ExtractError::MissingSales(format!(
                "expected an array, got {}",
                json_kind(&other)
            )))
        }
        None => return Err(ExtractError::MissingSales("key not present".to_string())),
    };

    let mut batch = SalesBatch::default();

    for (index, item) in sales.into_iter().enumerate() {
        match record_from_entry(item, extracted_at) {
            Ok(record) => batch.records.push(record),
            Err(reason) => {
                warn!("Skipping sales entry {}: {}", index, reason);
                batch.skipped.push(RejectedRecord {
                    index,
                    sale_id: None,
                    reason,
                });
            }
        }
    }

    Ok(batch)
}

fn record_from_entry(item: Value, extracted_at: DateTime<Utc>) -> Result<RawSaleRecord, RejectReason> {
    if !item.is_object() {
        return Err(RejectReason::MalformedEntry(format!(
            "expected an object, got {}",
            json_kind(&item)
        )));
    }

    serde_json::from_value::<RawSaleRecord>(item)
        .map(|record| RawSaleRecord {
            extraction_timestamp: extracted_at,
            ..record
        })
        .map_err(|e| RejectReason::MalformedEntry(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
