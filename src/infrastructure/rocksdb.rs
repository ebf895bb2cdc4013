use crate::domain::account::Account;
use crate::domain::ports::AccountRepository;
use crate::error::{LedgerError, Result};
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing accounts, keyed by list position.
pub const CF_ACCOUNTS: &str = "accounts";

/// A persistent repository using RocksDB.
///
/// Each account is stored as JSON under its big-endian position so that
/// iteration order is the saved list order. A save replaces the whole
/// column family content in one atomic write batch.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbAccountRepository {
    db: Arc<DB>,
}

impl RocksDbAccountRepository {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_accounts = ColumnFamilyDescriptor::new(CF_ACCOUNTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_accounts])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn accounts_cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_ACCOUNTS).ok_or_else(|| {
            LedgerError::InternalError(Box::new(std::io::Error::other(
                "Accounts column family not found",
            )))
        })
    }
}

impl AccountRepository for RocksDbAccountRepository {
    fn load(&self) -> Result<Vec<Account>> {
        let cf = self.accounts_cf()?;
        let mut accounts = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            accounts.push(serde_json::from_slice(&value)?);
        }
        Ok(accounts)
    }

    fn save(&self, accounts: &[Account]) -> Result<()> {
        let cf = self.accounts_cf()?;
        let mut batch = WriteBatch::default();

        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (key, _value) = item?;
            batch.delete_cf(cf, key);
        }
        for (position, account) in accounts.iter().enumerate() {
            let key = (position as u64).to_be_bytes();
            batch.put_cf(cf, key, serde_json::to_vec(account)?);
        }

        self.db.write(batch)?;
        Ok(())
    }
}
