//! Sales ingestion - fetch, parse, enrich and write stages over plain data

pub mod enrich;
pub mod fetch;
pub mod parse;
pub mod types;
pub mod utils;
pub mod write;

pub use enrich::transform;
pub use fetch::{fetch_sales, Extractor};
pub use types::*;
pub use write::{write_sales, Loader};
