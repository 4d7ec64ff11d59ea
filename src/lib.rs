//! Sales ETL: pull sales records from an HTTP API, normalize them and
//! upsert them into the `sales_data` table.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;

pub use config::Config;
pub use pipeline::{run_pipeline, PipelineReport};
