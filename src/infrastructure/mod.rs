//! Persistence gateways implementing `domain::ports::AccountRepository`.

pub mod csv_store;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
