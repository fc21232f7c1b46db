pub mod balance;
pub mod block_number;
pub mod connection;
pub mod migration;
pub mod price;

use chrono::{DateTime, TimeZone, Utc};

use crate::errors::{Result, StoreError};

pub const INIT_SCHEMA: &str = r#"
-- Observed chain heights, append-only
CREATE TABLE IF NOT EXISTS block_numbers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    unix_timestamp TEXT NOT NULL,
    block_number INTEGER NOT NULL
);

-- Price samples per asset
CREATE TABLE IF NOT EXISTS coingecko_prices (
    asset_id TEXT NOT NULL,
    price_usd REAL NOT NULL,
    unix_timestamp TEXT NOT NULL
);

-- Asset balances per holder per observed block
CREATE TABLE IF NOT EXISTS balances (
    block_number INTEGER NOT NULL,
    holder_address TEXT NOT NULL,
    asset_id TEXT NOT NULL,
    balance TEXT NOT NULL,
    UNIQUE (block_number, holder_address, asset_id)
);

-- Indexes for the equality-filtered lookups
CREATE INDEX IF NOT EXISTS idx_block_numbers_timestamp ON block_numbers(unix_timestamp);
CREATE INDEX IF NOT EXISTS idx_coingecko_prices_asset ON coingecko_prices(asset_id);
CREATE INDEX IF NOT EXISTS idx_balances_holder_asset ON balances(holder_address, asset_id);
"#;

/// Block numbers live in a signed INTEGER column; heights beyond i64::MAX
/// cannot be stored and are rejected instead of silently wrapping.
pub(crate) fn encode_block_number(op: &'static str, block_number: u64) -> Result<i64> {
    i64::try_from(block_number)
        .map_err(|_| StoreError::decode(op, "block_number", &block_number.to_string()))
}

/// Timestamps are persisted as text-encoded integer seconds.
pub(crate) fn encode_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.timestamp().to_string()
}

pub(crate) fn decode_timestamp(
    op: &'static str,
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>> {
    let secs: i64 = raw
        .parse()
        .map_err(|_| StoreError::decode(op, column, raw))?;
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| StoreError::decode(op, column, raw))
}
