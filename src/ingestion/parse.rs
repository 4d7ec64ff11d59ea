//! Parse functions - map loose raw records onto typed sale fields

use crate::error::RejectReason;
use crate::ingestion::types::RawSaleRecord;
use crate::ingestion::utils::parse_sale_date;
use chrono::NaiveDateTime;
use serde_json::Value;

pub const UNKNOWN_CUSTOMER: &str = "UNKNOWN";

/// Typed, null-filled sale before derived fields are added
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSale {
    pub sale_id: String,
    pub customer_id: String,
    pub product_id: Option<String>,
    pub sale_value: f64,
    pub sale_date: NaiveDateTime,
}

/// Select the canonical fields, coerce types and fill nulls.
/// Pure function - no side effects
pub fn parse_record(raw: &RawSaleRecord) -> Result<ParsedSale, RejectReason> {
    let sale_id = identifier(raw.sale_id.as_ref(), "sale_id")?
        .filter(|id| !id.trim().is_empty())
        .ok_or(RejectReason::MissingSaleId)?;

    let sale_date = match raw.sale_date.as_ref() {
        None => return Err(RejectReason::MissingSaleDate),
        Some(Value::String(s)) => {
            parse_sale_date(s).ok_or_else(|| RejectReason::MalformedSaleDate(s.clone()))?
        }
        Some(other) => return Err(RejectReason::MalformedSaleDate(other.to_string())),
    };

    let sale_value = sale_value(raw.sale_value.as_ref())?.unwrap_or(0.0);

    let customer_id = identifier(raw.customer_id.as_ref(), "customer_id")?
        .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());
    let product_id = identifier(raw.product_id.as_ref(), "product_id")?;

    Ok(ParsedSale {
        sale_id,
        customer_id,
        product_id,
        sale_value,
        sale_date,
    })
}

/// Identifiers arrive as strings or integers
fn identifier(value: Option<&Value>, field: &'static str) -> Result<Option<String>, RejectReason> {
    match value {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(Some(n.to_string())),
        Some(other) => Err(RejectReason::InvalidIdentifier {
            field,
            value: other.to_string(),
        }),
    }
}

/// Numbers and numeric strings coerce to f64. Null and "NaN" stay None so
/// they are filled like missing values.
fn sale_value(value: Option<&Value>) -> Result<Option<f64>, RejectReason> {
    let parsed = match value {
        None => return Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| RejectReason::NonNumericValue(n.to_string()))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| RejectReason::NonNumericValue(s.clone()))?,
        Some(other) => return Err(RejectReason::NonNumericValue(other.to_string())),
    };

    if parsed.is_nan() {
        return Ok(None);
    }
    if parsed.is_infinite() {
        return Err(RejectReason::NonFiniteValue(parsed.to_string()));
    }

    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    fn raw(value: Value) -> RawSaleRecord {
        let mut record: RawSaleRecord = serde_json::from_value(value).unwrap();
        record.extraction_timestamp = Utc::now();
        record
    }

    #[test]
    fn test_parse_record_fills_nulls() {
        let parsed = parse_record(&raw(json!({
            "sale_id": "S1",
            "customer_id": null,
            "product_id": "P1",
            "sale_value": null,
            "sale_date": "2023-07-04",
        })))
        .unwrap();

        assert_eq!(parsed.customer_id, UNKNOWN_CUSTOMER);
        assert_eq!(parsed.sale_value, 0.0);
        assert_eq!(parsed.product_id, Some("P1".to_string()));
        assert_eq!(
            parsed.sale_date,
            NaiveDate::from_ymd_opt(2023, 7, 4)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_record_missing_fields_fill_like_nulls() {
        let parsed = parse_record(&raw(json!({
            "sale_id": "S2",
            "sale_date": "2023-07-04",
        })))
        .unwrap();

        assert_eq!(parsed.customer_id, UNKNOWN_CUSTOMER);
        assert_eq!(parsed.sale_value, 0.0);
        assert_eq!(parsed.product_id, None);
    }

    #[test]
    fn test_parse_record_coerces_numeric_strings_and_ids() {
        let parsed = parse_record(&raw(json!({
            "sale_id": 1001,
            "customer_id": 42,
            "sale_value": " 199.90 ",
            "sale_date": "2023-07-04",
        })))
        .unwrap();

        assert_eq!(parsed.sale_id, "1001");
        assert_eq!(parsed.customer_id, "42");
        assert!((parsed.sale_value - 199.90).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_record_rejects_missing_sale_id() {
        let result = parse_record(&raw(json!({ "sale_date": "2023-07-04" })));
        assert_eq!(result, Err(RejectReason::MissingSaleId));

        let result = parse_record(&raw(json!({ "sale_id": "  ", "sale_date": "2023-07-04" })));
        assert_eq!(result, Err(RejectReason::MissingSaleId));
    }

    #[test]
    fn test_parse_record_rejects_bad_dates() {
        let result = parse_record(&raw(json!({ "sale_id": "S1" })));
        assert_eq!(result, Err(RejectReason::MissingSaleDate));

        let result = parse_record(&raw(json!({ "sale_id": "S1", "sale_date": "not a date" })));
        assert_eq!(
            result,
            Err(RejectReason::MalformedSaleDate("not a date".to_string()))
        );

        let result = parse_record(&raw(json!({ "sale_id": "S1", "sale_date": 20230704 })));
        assert!(matches!(result, Err(RejectReason::MalformedSaleDate(_))));
    }

    #[test]
    fn test_parse_record_rejects_bad_values() {
        let result = parse_record(&raw(json!({
            "sale_id": "S1",
            "sale_value": "ten",
            "sale_date": "2023-07-04",
        })));
        assert_eq!(result, Err(RejectReason::NonNumericValue("ten".to_string())));

        let result = parse_record(&raw(json!({
            "sale_id": "S1",
            "sale_value": "inf",
            "sale_date": "2023-07-04",
        })));
        assert!(matches!(result, Err(RejectReason::NonFiniteValue(_))));

        let result = parse_record(&raw(json!({
            "sale_id": "S1",
            "sale_value": "-Infinity",
            "sale_date": "2023-07-04",
        })));
        assert!(matches!(result, Err(RejectReason::NonFiniteValue(_))));

        let result = parse_record(&raw(json!({
            "sale_id": "S1",
            "sale_value": true,
            "sale_date": "2023-07-04",
        })));
        assert!(matches!(result, Err(RejectReason::NonNumericValue(_))));
    }

    #[test]
    fn test_parse_record_nan_value_fills_like_null() {
        let parsed = parse_record(&raw(json!({
            "sale_id": "S1",
            "sale_value": "NaN",
            "sale_date": "2023-07-04",
        })))
        .unwrap();

        assert_eq!(parsed.sale_value, 0.0);
    }

    #[test]
    fn test_parse_record_rejects_structured_ids() {
        let result = parse_record(&raw(json!({
            "sale_id": "S1",
            "customer_id": { "id": 1 },
            "sale_date": "2023-07-04",
        })));
        assert!(matches!(
            result,
            Err(RejectReason::InvalidIdentifier { field: "customer_id", .. })
        ));
    }
}
