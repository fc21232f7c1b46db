pub mod config;
pub mod db;
pub mod errors;
pub mod models;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use db::connection;
pub use db::{balance, block_number, price};
pub use errors::{Result, StoreError};
pub use models::{BalanceRecord, BlockNumberRecord, DataBoundary, PriceRecord};
