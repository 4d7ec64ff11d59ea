//! Core data types for the sales pipeline
//! Pure data structures with no behavior beyond formatting

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ExtractError, LoadError, RejectReason};

/// Sales record as received from the source API.
///
/// Every field is kept as a loose JSON value; typing happens in `parse`.
/// Fields the API sends beyond these are dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawSaleRecord {
    #[serde(default)]
    pub sale_id: Option<Value>,
    #[serde(default)]
    pub customer_id: Option<Value>,
    #[serde(default)]
    pub product_id: Option<Value>,
    #[serde(default)]
    pub sale_value: Option<Value>,
    #[serde(default)]
    pub sale_date: Option<Value>,

    /// Set by the extractor, never read from the payload
    #[serde(skip, default = "Utc::now")]
    pub extraction_timestamp: DateTime<Utc>,
}

/// Fixed value buckets. Bin edges are right-inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleCategory {
    Low,
    Medium,
    High,
    Premium,
}

impl SaleCategory {
    pub const LOW_MAX: f64 = 50.0;
    pub const MEDIUM_MAX: f64 = 200.0;
    pub const HIGH_MAX: f64 = 500.0;

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleCategory::Low => "Low",
            SaleCategory::Medium => "Medium",
            SaleCategory::High => "High",
            SaleCategory::Premium => "Premium",
        }
    }
}

impl std::fmt::Display for SaleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized row ready for the `sales_data` table
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalSaleRow {
    pub sale_id: String,
    pub customer_id: String,
    pub product_id: Option<String>,
    pub sale_value: f64,
    pub sale_date: NaiveDateTime,
    pub month: i32,
    pub year: i32,
    pub quarter: i32,
    pub sale_category: SaleCategory,
}

/// Record dropped before it reached the loader
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// Position in the batch being processed when it was dropped
    pub index: usize,
    pub sale_id: Option<String>,
    pub reason: RejectReason,
}

/// Result of transforming one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOutput {
    pub rows: Vec<CanonicalSaleRow>,
    pub rejected: Vec<RejectedRecord>,
}

/// What the extractor produced. A failure carries the reason instead of records.
#[derive(Debug)]
pub enum ExtractOutcome {
    Fetched {
        records: Vec<RawSaleRecord>,
        /// `sales` entries that were not JSON objects, indexed by array position
        skipped: Vec<RejectedRecord>,
    },
    Failed(ExtractError),
}

impl ExtractOutcome {
    pub fn records(&self) -> &[RawSaleRecord] {
        match self {
            ExtractOutcome::Fetched { records, .. } => records,
            ExtractOutcome::Failed(_) => &[],
        }
    }

    pub fn skipped(&self) -> &[RejectedRecord] {
        match self {
            ExtractOutcome::Fetched { skipped, .. } => skipped,
            ExtractOutcome::Failed(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<RawSaleRecord> {
        match self {
            ExtractOutcome::Fetched { records, .. } => records,
            ExtractOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn error(&self) -> Option<&ExtractError> {
        match self {
            ExtractOutcome::Fetched { .. } => None,
            ExtractOutcome::Failed(e) => Some(e),
        }
    }
}

/// Upsert statistics for one committed batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub inserted: usize,
    pub updated: usize,
}

impl LoadStats {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

impl std::fmt::Display for LoadStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inserted: {}, updated: {}", self.inserted, self.updated)
    }
}

/// What the loader did with a batch
#[derive(Debug)]
pub enum LoadOutcome {
    /// Table ensured and every row upserted; an empty batch commits with zero stats
    Committed(LoadStats),
    RolledBack(LoadError),
}

impl LoadOutcome {
    pub fn rows_written(&self) -> usize {
        match self {
            LoadOutcome::Committed(stats) => stats.total(),
            LoadOutcome::RolledBack(_) => 0,
        }
    }
}

impl std::fmt::Display for LoadOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadOutcome::Committed(stats) => write!(f, "committed ({})", stats),
            LoadOutcome::RolledBack(e) => write!(f, "rolled back ({})", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_ignores_unknown_fields() {
        let raw: RawSaleRecord = serde_json::from_value(serde_json::json!({
            "sale_id": "S1",
            "sale_value": 10.5,
            "channel": "web",
        }))
        .unwrap();

        assert_eq!(raw.sale_id, Some(Value::from("S1")));
        assert_eq!(raw.sale_value, Some(Value::from(10.5)));
        assert_eq!(raw.customer_id, None);
        assert_eq!(raw.sale_date, None);
    }

    #[test]
    fn test_raw_record_null_reads_as_missing() {
        let raw: RawSaleRecord =
            serde_json::from_value(serde_json::json!({ "sale_id": "S1", "customer_id": null }))
                .unwrap();

        // Missing and null both end up as None
        assert_eq!(raw.customer_id, None);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(SaleCategory::Low.to_string(), "Low");
        assert_eq!(SaleCategory::Premium.to_string(), "Premium");
    }

    #[test]
    fn test_load_outcome_rows_written() {
        let committed = LoadOutcome::Committed(LoadStats {
            inserted: 2,
            updated: 3,
        });
        assert_eq!(committed.rows_written(), 5);
        assert_eq!(
            LoadOutcome::RolledBack(LoadError::ConnectTimeout(std::time::Duration::from_secs(1)))
                .rows_written(),
            0
        );
        assert_eq!(committed.to_string(), "committed (inserted: 2, updated: 3)");
    }
}
