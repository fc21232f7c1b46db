use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::db::{decode_timestamp, encode_timestamp};
use crate::errors::{Result, StoreError};
use crate::models::{DataBoundary, PriceRecord};

/// Multi-row inserts are chunked to respect statement-size limits on the
/// store side.
pub const INSERT_CHUNK_SIZE: usize = 10_000;

fn decode_rows(op: &'static str, rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<PriceRecord>> {
    rows.iter()
        .map(|row| {
            let raw_timestamp: String = row.get("unix_timestamp");
            Ok(PriceRecord {
                asset_id: row.get("asset_id"),
                price_usd: row.get("price_usd"),
                timestamp: decode_timestamp(op, "unix_timestamp", &raw_timestamp)?,
            })
        })
        .collect()
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<PriceRecord>> {
    const OP: &str = "coingecko_prices.get_all";
    debug!("{OP}");

    let rows = sqlx::query("SELECT asset_id, price_usd, unix_timestamp FROM coingecko_prices")
        .fetch_all(pool)
        .await
        .map_err(StoreError::query(OP))?;

    decode_rows(OP, rows)
}

pub async fn get_by_timestamp(pool: &SqlitePool, timestamp: DateTime<Utc>) -> Result<Vec<PriceRecord>> {
    const OP: &str = "coingecko_prices.get_by_timestamp";
    debug!(timestamp = %timestamp, "{OP}");

    let rows = sqlx::query(
        "SELECT asset_id, price_usd, unix_timestamp FROM coingecko_prices WHERE unix_timestamp = ?",
    )
    .bind(encode_timestamp(timestamp))
    .fetch_all(pool)
    .await
    .map_err(StoreError::query(OP))?;

    decode_rows(OP, rows)
}

pub async fn get_by_token(pool: &SqlitePool, asset_id: &str) -> Result<Vec<PriceRecord>> {
    const OP: &str = "coingecko_prices.get_by_token";
    debug!(asset_id, "{OP}");

    let rows = sqlx::query(
        "SELECT asset_id, price_usd, unix_timestamp FROM coingecko_prices WHERE asset_id = ?",
    )
    .bind(asset_id)
    .fetch_all(pool)
    .await
    .map_err(StoreError::query(OP))?;

    decode_rows(OP, rows)
}

/// Bulk insert, one multi-row statement per chunk of [`INSERT_CHUNK_SIZE`]
/// records. Returns the number of rows inserted. A failing chunk surfaces
/// after whatever prefix already committed; there is no cross-chunk rollback.
pub async fn add_many(pool: &SqlitePool, records: &[PriceRecord]) -> Result<u64> {
    const OP: &str = "coingecko_prices.add_many";
    debug!(count = records.len(), "{OP}");

    if records.is_empty() {
        return Ok(0);
    }

    let mut inserted = 0;
    for chunk in records.chunks(INSERT_CHUNK_SIZE) {
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("INSERT INTO coingecko_prices (asset_id, price_usd, unix_timestamp) ");

        query_builder.push_values(chunk, |mut b, record| {
            b.push_bind(&record.asset_id)
                .push_bind(record.price_usd)
                .push_bind(encode_timestamp(record.timestamp));
        });

        let result = query_builder
            .build()
            .execute(pool)
            .await
            .map_err(StoreError::query(OP))?;
        inserted += result.rows_affected();
    }

    Ok(inserted)
}

pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    debug!("coingecko_prices.delete_all");

    let result = sqlx::query("DELETE FROM coingecko_prices")
        .execute(pool)
        .await
        .map_err(StoreError::query("coingecko_prices.delete_all"))?;

    Ok(result.rows_affected())
}

/// Earliest and latest observed timestamp per asset, one aggregate query.
/// The map has one entry per asset present in the table.
pub async fn calc_data_boundaries(pool: &SqlitePool) -> Result<HashMap<String, DataBoundary>> {
    const OP: &str = "coingecko_prices.calc_data_boundaries";
    debug!("{OP}");

    let rows = sqlx::query(
        "SELECT asset_id,
                MIN(CAST(unix_timestamp AS INTEGER)) AS earliest,
                MAX(CAST(unix_timestamp AS INTEGER)) AS latest
         FROM coingecko_prices
         GROUP BY asset_id",
    )
    .fetch_all(pool)
    .await
    .map_err(StoreError::query(OP))?;

    let mut boundaries = HashMap::with_capacity(rows.len());
    for row in &rows {
        let earliest: i64 = row.get("earliest");
        let latest: i64 = row.get("latest");
        boundaries.insert(
            row.get("asset_id"),
            DataBoundary {
                earliest: Utc
                    .timestamp_opt(earliest, 0)
                    .single()
                    .ok_or_else(|| StoreError::decode(OP, "earliest", &earliest.to_string()))?,
                latest: Utc
                    .timestamp_opt(latest, 0)
                    .single()
                    .ok_or_else(|| StoreError::decode(OP, "latest", &latest.to_string()))?,
            },
        );
    }

    Ok(boundaries)
}
