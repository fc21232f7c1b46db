use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::db::{decode_timestamp, encode_block_number, encode_timestamp};
use crate::errors::{Result, StoreError};
use crate::models::BlockNumberRecord;

/// Inserts one observed chain height and returns the generated row id.
/// Duplicate timestamps are permitted and create separate rows.
pub async fn add(pool: &SqlitePool, record: &BlockNumberRecord) -> Result<i64> {
    const OP: &str = "block_numbers.add";
    debug!(block_number = record.block_number, "{OP}");

    let result = sqlx::query("INSERT INTO block_numbers (unix_timestamp, block_number) VALUES (?, ?)")
        .bind(encode_timestamp(record.timestamp))
        .bind(encode_block_number(OP, record.block_number)?)
        .execute(pool)
        .await
        .map_err(StoreError::query(OP))?;

    Ok(result.last_insert_rowid())
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<BlockNumberRecord>> {
    const OP: &str = "block_numbers.get_all";
    debug!("{OP}");

    let rows = sqlx::query("SELECT unix_timestamp, block_number FROM block_numbers")
        .fetch_all(pool)
        .await
        .map_err(StoreError::query(OP))?;

    rows.iter()
        .map(|row| {
            let raw_timestamp: String = row.get("unix_timestamp");
            Ok(BlockNumberRecord {
                timestamp: decode_timestamp(OP, "unix_timestamp", &raw_timestamp)?,
                block_number: row.get::<i64, _>("block_number") as u64,
            })
        })
        .collect()
}

pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    debug!("block_numbers.delete_all");

    let result = sqlx::query("DELETE FROM block_numbers")
        .execute(pool)
        .await
        .map_err(StoreError::query("block_numbers.delete_all"))?;

    Ok(result.rows_affected())
}

/// Block number of the entry with the maximal recorded timestamp, or `None`
/// when no heights have been recorded yet. Timestamp ties are broken in
/// favour of the highest block number.
pub(crate) async fn latest_block_number(pool: &SqlitePool) -> Result<Option<u64>> {
    let row = sqlx::query(
        "SELECT block_number FROM block_numbers
         ORDER BY CAST(unix_timestamp AS INTEGER) DESC, block_number DESC
         LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(StoreError::query("block_numbers.latest_block_number"))?;

    Ok(row.map(|row| row.get::<i64, _>("block_number") as u64))
}
