//! Pipeline orchestration - extract, transform and load in strict sequence

use crate::error::ExtractError;
use crate::ingestion::{
    fetch_sales, transform, write_sales, ExtractOutcome, Extractor, LoadOutcome, Loader,
    RejectedRecord,
};
use tracing::{info, info_span, warn};

/// Only the first few rejected records are logged individually
const MAX_LOGGED_REJECTS: usize = 10;

/// Summary of one pipeline run, for the caller to decide whether to alert
#[derive(Debug)]
pub struct PipelineReport {
    pub extracted: usize,
    pub extract_error: Option<ExtractError>,
    /// `sales` entries the extractor could not read as records
    pub skipped: Vec<RejectedRecord>,
    pub transformed: usize,
    pub rejected: Vec<RejectedRecord>,
    pub load: LoadOutcome,
}

impl PipelineReport {
    /// Rows actually persisted
    pub fn loaded(&self) -> usize {
        self.load.rows_written()
    }

    /// True when nothing was dropped or swallowed along the way
    pub fn is_clean(&self) -> bool {
        self.extract_error.is_none()
            && self.skipped.is_empty()
            && self.rejected.is_empty()
            && !matches!(self.load, LoadOutcome::RolledBack(_))
    }
}

impl std::fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "extracted: {}, skipped: {}, transformed: {}, rejected: {}, load: {}",
            self.extracted,
            self.skipped.len(),
            self.transformed,
            self.rejected.len(),
            self.load
        )?;
        if let Some(e) = &self.extract_error {
            write!(f, ", extraction error: {}", e)?;
        }
        Ok(())
    }
}

/// Run extract -> transform -> load once.
///
/// Extraction and load failures do not abort the run; they are reported
/// in the returned `PipelineReport`.
pub async fn run_pipeline(extractor: &Extractor, loader: &Loader, endpoint: &str) -> PipelineReport {
    info!("=== Sales ETL Pipeline ===");

    info!("Step 1/3: Extracting sales records...");
    let outcome = fetch_sales(extractor, endpoint).await;
    let extracted = outcome.records().len();
    let (records, skipped, extract_error) = match outcome {
        ExtractOutcome::Fetched { records, skipped } => (records, skipped, None),
        ExtractOutcome::Failed(e) => (Vec::new(), Vec::new(), Some(e)),
    };

    info!("Step 2/3: Transforming {} records...", extracted);
    let output = {
        let _span = info_span!("transform", records = extracted).entered();
        let output = transform(&records);
        log_rejected(&output.rejected);
        info!(
            "Transformed {} rows ({} rejected)",
            output.rows.len(),
            output.rejected.len()
        );
        output
    };

    info!("Step 3/3: Loading {} rows...", output.rows.len());
    let load = write_sales(loader, &output.rows).await;

    let report = PipelineReport {
        extracted,
        extract_error,
        skipped,
        transformed: output.rows.len(),
        rejected: output.rejected,
        load,
    };
    info!("Pipeline finished: {}", report);

    report
}

fn log_rejected(rejected: &[RejectedRecord]) {
    for record in rejected.iter().take(MAX_LOGGED_REJECTS) {
        warn!(
            "Dropped record {} (sale_id: {}): {}",
            record.index,
            record.sale_id.as_deref().unwrap_or("<none>"),
            record.reason
        );
    }
    if rejected.len() > MAX_LOGGED_REJECTS {
        warn!(
            "{} more records dropped",
            rejected.len() - MAX_LOGGED_REJECTS
        );
    }
}
