//! Sales ETL entry point - runs the pipeline once and prints the result

use anyhow::Result;
use sales_etl::ingestion::{Extractor, Loader};
use sales_etl::{run_pipeline, Config, PipelineReport};
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging once for the whole process
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    match run().await {
        Ok(report) => {
            if !report.is_clean() {
                warn!("Pipeline completed with issues: {}", report);
            }
            println!("ETL pipeline completed successfully! ({})", report);
        }
        Err(e) => println!("ETL pipeline error: {:#}", e),
    }
}

async fn run() -> Result<PipelineReport> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    info!("Configuration loaded");

    let extractor = Extractor::new(&config.api_base_url, &config.api_key, config.http_timeout)?;
    let loader = Loader::new(&config.database_url, config.db_connect_timeout)?;

    Ok(run_pipeline(&extractor, &loader, &config.endpoint).await)
}
