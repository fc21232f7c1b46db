use std::collections::HashMap;
use std::str::FromStr;

use alloy_primitives::{Address, U256};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use crate::db::{block_number, encode_block_number};
use crate::errors::{Result, StoreError};
use crate::models::BalanceRecord;

fn decode_rows(op: &'static str, rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<BalanceRecord>> {
    rows.iter()
        .map(|row| {
            let raw_holder: String = row.get("holder_address");
            let raw_balance: String = row.get("balance");
            Ok(BalanceRecord {
                block_number: row.get::<i64, _>("block_number") as u64,
                holder_address: Address::from_str(&raw_holder)
                    .map_err(|_| StoreError::decode(op, "holder_address", &raw_holder))?,
                asset_id: row.get("asset_id"),
                balance: U256::from_str(&raw_balance)
                    .map_err(|_| StoreError::decode(op, "balance", &raw_balance))?,
            })
        })
        .collect()
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<BalanceRecord>> {
    const OP: &str = "balances.get_all";
    debug!("{OP}");

    let rows = sqlx::query("SELECT block_number, holder_address, asset_id, balance FROM balances")
        .fetch_all(pool)
        .await
        .map_err(StoreError::query(OP))?;

    decode_rows(OP, rows)
}

/// All balance rows recorded at the given block. Unknown blocks yield an
/// empty vec.
pub async fn get_by_block(pool: &SqlitePool, block_number: u64) -> Result<Vec<BalanceRecord>> {
    const OP: &str = "balances.get_by_block";
    debug!(block_number, "{OP}");

    // Heights beyond the storable range cannot have rows
    let Ok(block_number) = i64::try_from(block_number) else {
        return Ok(Vec::new());
    };

    let rows = sqlx::query(
        "SELECT block_number, holder_address, asset_id, balance FROM balances WHERE block_number = ?",
    )
    .bind(block_number)
    .fetch_all(pool)
    .await
    .map_err(StoreError::query(OP))?;

    decode_rows(OP, rows)
}

/// Full balance history of one (holder, asset) pair across all recorded
/// blocks, in no particular order.
pub async fn get_by_holder_and_asset(
    pool: &SqlitePool,
    holder_address: Address,
    asset_id: &str,
) -> Result<Vec<BalanceRecord>> {
    const OP: &str = "balances.get_by_holder_and_asset";
    debug!(holder = %holder_address, asset_id, "{OP}");

    let rows = sqlx::query(
        "SELECT block_number, holder_address, asset_id, balance FROM balances
         WHERE holder_address = ? AND asset_id = ?",
    )
    .bind(holder_address.to_string())
    .bind(asset_id)
    .fetch_all(pool)
    .await
    .map_err(StoreError::query(OP))?;

    decode_rows(OP, rows)
}

pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    debug!("balances.delete_all");

    let result = sqlx::query("DELETE FROM balances")
        .execute(pool)
        .await
        .map_err(StoreError::query("balances.delete_all"))?;

    Ok(result.rows_affected())
}

/// Idempotent bulk upsert keyed on (block_number, holder_address, asset_id).
/// One multi-row statement, so concurrent collectors re-reporting the same
/// block cannot interleave a read-then-write race. An existing key gets its
/// balance overwritten; applying the same batch twice leaves the same rows.
pub async fn add_or_update_many(pool: &SqlitePool, records: &[BalanceRecord]) -> Result<()> {
    const OP: &str = "balances.add_or_update_many";
    debug!(count = records.len(), "{OP}");

    if records.is_empty() {
        return Ok(());
    }

    // Pre-encode every row so an out-of-range height fails the whole batch
    // before any statement is issued.
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        rows.push((
            encode_block_number(OP, record.block_number)?,
            record.holder_address.to_string(),
            record.asset_id.clone(),
            record.balance.to_string(),
        ));
    }

    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO balances (block_number, holder_address, asset_id, balance) ");

    query_builder.push_values(rows, |mut b, (block_number, holder_address, asset_id, balance)| {
        b.push_bind(block_number)
            .push_bind(holder_address)
            .push_bind(asset_id)
            .push_bind(balance);
    });

    query_builder.push(
        " ON CONFLICT(block_number, holder_address, asset_id)
          DO UPDATE SET balance = excluded.balance",
    );

    query_builder
        .build()
        .execute(pool)
        .await
        .map_err(StoreError::query(OP))?;

    Ok(())
}

/// Balance rows at the most recent known block, grouped by holder. "Most
/// recent" is the block whose recorded timestamp is maximal across the
/// block-number timeline (ties broken by highest block number). Holders with
/// no rows at that block are absent from the map.
pub async fn get_latest_per_holder(pool: &SqlitePool) -> Result<HashMap<Address, Vec<BalanceRecord>>> {
    debug!("balances.get_latest_per_holder");

    let Some(latest_block) = block_number::latest_block_number(pool).await? else {
        return Ok(HashMap::new());
    };

    let rows = get_by_block(pool, latest_block).await?;

    let mut by_holder: HashMap<Address, Vec<BalanceRecord>> = HashMap::new();
    for record in rows {
        by_holder.entry(record.holder_address).or_default().push(record);
    }

    Ok(by_holder)
}
