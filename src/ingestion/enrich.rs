//! Enrichment functions - derive calendar and category fields, and the
//! composed batch transform

use crate::ingestion::parse::{parse_record, ParsedSale};
use crate::ingestion::types::{
    CanonicalSaleRow, RawSaleRecord, RejectedRecord, SaleCategory, TransformOutput,
};
use chrono::Datelike;
use serde_json::Value;

/// Bucket a sale value. Pure function - no side effects
pub fn categorize(sale_value: f64) -> SaleCategory {
    if sale_value <= SaleCategory::LOW_MAX {
        SaleCategory::Low
    } else if sale_value <= SaleCategory::MEDIUM_MAX {
        SaleCategory::Medium
    } else if sale_value <= SaleCategory::HIGH_MAX {
        SaleCategory::High
    } else {
        SaleCategory::Premium
    }
}

/// Calendar quarter 1-4 for a month 1-12
pub fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Add month, year, quarter and category to a parsed sale
pub fn enrich(sale: ParsedSale) -> CanonicalSaleRow {
    let month = sale.sale_date.month();

    CanonicalSaleRow {
        month: month as i32,
        year: sale.sale_date.year(),
        quarter: quarter_of(month) as i32,
        sale_category: categorize(sale.sale_value),
        sale_id: sale.sale_id,
        customer_id: sale.customer_id,
        product_id: sale.product_id,
        sale_value: sale.sale_value,
        sale_date: sale.sale_date,
    }
}

/// Run parse and enrichment over a batch.
///
/// Each row depends only on its own raw record. Records that cannot be
/// parsed are dropped and reported in `rejected`; the rest of the batch
/// carries on.
pub fn transform(records: &[RawSaleRecord]) -> TransformOutput {
    let mut output = TransformOutput::default();

    for (index, raw) in records.iter().enumerate() {
        match parse_record(raw) {
            Ok(sale) => output.rows.push(enrich(sale)),
            Err(reason) => output.rejected.push(RejectedRecord {
                index,
                sale_id: raw.sale_id.as_ref().map(display_id),
                reason,
            }),
        }
    }

    output
}

fn display_id(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
