use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An observed chain height at a point in time. Timestamps are not unique;
/// the collector may record the same instant twice and both rows are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockNumberRecord {
    pub timestamp: DateTime<Utc>,
    pub block_number: u64,
}

/// One observed USD price sample for an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub asset_id: String,
    pub price_usd: f64,
    pub timestamp: DateTime<Utc>,
}

/// Balance of one asset held by one address at one observed block.
/// (block_number, holder_address, asset_id) is unique in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub block_number: u64,
    pub holder_address: Address,
    pub asset_id: String,
    pub balance: U256,
}

/// Earliest and latest observed price timestamp for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBoundary {
    pub earliest: DateTime<Utc>,
    pub latest: DateTime<Utc>,
}
