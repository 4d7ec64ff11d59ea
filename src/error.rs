//! Error types for each pipeline stage

use thiserror::Error;

/// Why an extraction produced no records.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("response body has no usable 'sales' array: {0}")]
    MissingSales(String),
}

/// Why a single raw record was dropped by the transformer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("malformed sales entry: {0}")]
    MalformedEntry(String),
    #[error("missing sale_id")]
    MissingSaleId,
    #[error("field '{field}' has unsupported type: {value}")]
    InvalidIdentifier { field: &'static str, value: String },
    #[error("missing sale_date")]
    MissingSaleDate,
    #[error("malformed sale_date '{0}'")]
    MalformedSaleDate(String),
    #[error("sale_value '{0}' is not a number")]
    NonNumericValue(String),
    #[error("sale_value {0} is not finite")]
    NonFiniteValue(String),
}

/// Why a batch was rolled back.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid database connection string: {0}")]
    InvalidUrl(#[source] sqlx::Error),
    #[error("database connection failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("database connection timed out after {0:?}")]
    ConnectTimeout(std::time::Duration),
    #[error("could not begin transaction: {0}")]
    Begin(#[source] sqlx::Error),
    #[error("could not create table sales_data: {0}")]
    CreateTable(#[source] sqlx::Error),
    #[error("upsert of sale {sale_id} failed: {source}")]
    Upsert {
        sale_id: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("commit failed: {0}")]
    Commit(#[source] sqlx::Error),
}
