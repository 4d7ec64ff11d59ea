//! Write functions - upsert canonical rows into PostgreSQL

use crate::error::LoadError;
use crate::ingestion::types::{CanonicalSaleRow, LoadOutcome, LoadStats};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Postgres, Transaction};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};

pub const TABLE_NAME: &str = "sales_data";

pub const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sales_data (
    sale_id VARCHAR PRIMARY KEY,
    customer_id VARCHAR,
    product_id VARCHAR,
    sale_value DOUBLE PRECISION,
    sale_date TIMESTAMP,
    month INTEGER,
    year INTEGER,
    quarter INTEGER,
    sale_category VARCHAR
)
"#;

/// Insert or fully overwrite one row. Returns true when the row was new.
pub const UPSERT_SQL: &str = r#"
INSERT INTO sales_data (
    sale_id, customer_id, product_id, sale_value, sale_date,
    month, year, quarter, sale_category
) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
ON CONFLICT (sale_id) DO UPDATE SET
    customer_id = EXCLUDED.customer_id,
    product_id = EXCLUDED.product_id,
    sale_value = EXCLUDED.sale_value,
    sale_date = EXCLUDED.sale_date,
    month = EXCLUDED.month,
    year = EXCLUDED.year,
    quarter = EXCLUDED.quarter,
    sale_category = EXCLUDED.sale_category
RETURNING (xmax = 0) AS inserted
"#;

/// Database target for the loader.
///
/// Holds only connection options: every `write_sales` call opens its own
/// connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct Loader {
    options: PgConnectOptions,
    connect_timeout: Duration,
}

impl Loader {
    pub fn new(database_url: &str, connect_timeout: Duration) -> Result<Self, LoadError> {
        let options = PgConnectOptions::from_str(database_url).map_err(LoadError::InvalidUrl)?;

        Ok(Loader {
            options,
            connect_timeout,
        })
    }
}

/// Ensure `sales_data` exists and upsert a batch of rows into it inside
/// one transaction. An empty batch still creates the table.
///
/// Never fails: on any error the transaction is rolled back, the error is
/// logged, and `LoadOutcome::RolledBack` is returned.
pub async fn write_sales(loader: &Loader, rows: &[CanonicalSaleRow]) -> LoadOutcome {
    let span = info_span!("load", table = TABLE_NAME, rows = rows.len());

    async {
        info!("Writing {} sales rows to database", rows.len());

        match try_write_sales(loader, rows).await {
            Ok(stats) => {
                info!("Load complete: {}", stats);
                LoadOutcome::Committed(stats)
            }
            Err(e) => {
                error!("Load failed, batch rolled back: {}", e);
                LoadOutcome::RolledBack(e)
            }
        }
    }
    .instrument(span)
    .await
}

async fn try_write_sales(loader: &Loader, rows: &[CanonicalSaleRow]) -> Result<LoadStats, LoadError> {
    let mut conn = connect(loader).await?;

    let result = write_batch(&mut conn, rows).await;

    if let Err(e) = conn.close().await {
        warn!("Failed to close database connection cleanly: {}", e);
    }

    result
}

async fn connect(loader: &Loader) -> Result<PgConnection, LoadError> {
    match tokio::time::timeout(
        loader.connect_timeout,
        PgConnection::connect_with(&loader.options),
    )
    .await
    {
        Ok(conn) => conn.map_err(LoadError::Connect),
        Err(_) => Err(LoadError::ConnectTimeout(loader.connect_timeout)),
    }
}

/// Commit if every statement succeeds, roll back otherwise
async fn write_batch(conn: &mut PgConnection, rows: &[CanonicalSaleRow]) -> Result<LoadStats, LoadError> {
    let mut tx = conn.begin().await.map_err(LoadError::Begin)?;

    match upsert_rows(&mut tx, rows).await {
        Ok(stats) => {
            tx.commit().await.map_err(LoadError::Commit)?;
            Ok(stats)
        }
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn upsert_rows(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[CanonicalSaleRow],
) -> Result<LoadStats, LoadError> {
    sqlx::query(CREATE_TABLE_SQL)
        .execute(&mut **tx)
        .await
        .map_err(LoadError::CreateTable)?;

    let mut stats = LoadStats::default();

    for row in rows {
        let inserted = sqlx::query_scalar::<_, bool>(UPSERT_SQL)
            .bind(&row.sale_id)
            .bind(&row.customer_id)
            .bind(&row.product_id)
            .bind(row.sale_value)
            .bind(row.sale_date)
            .bind(row.month)
            .bind(row.year)
            .bind(row.quarter)
            .bind(row.sale_category.as_str())
            .fetch_one(&mut **tx)
            .await
            .map_err(|source| LoadError::Upsert {
                sale_id: row.sale_id.clone(),
                source,
            })?;

        if inserted {
            stats.inserted += 1;
            debug!("Inserted sale {}", row.sale_id);
        } else {
            stats.updated += 1;
            debug!("Overwrote sale {}", row.sale_id);
        }
    }

    Ok(stats)
}
