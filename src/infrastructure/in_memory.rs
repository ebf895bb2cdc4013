use crate::domain::account::Account;
use crate::domain::ports::AccountRepository;
use crate::error::{LedgerError, Result};
use std::sync::{Arc, RwLock};

/// An in-memory account repository.
///
/// Clones share the same storage, so a test can keep a handle and inspect
/// what the ledger saved. Used when no data directory is configured.
#[derive(Default, Clone)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl InMemoryAccountRepository {
    /// Creates a new, empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository that already holds `accounts`.
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(accounts)),
        }
    }
}

impl AccountRepository for InMemoryAccountRepository {
    fn load(&self) -> Result<Vec<Account>> {
        let accounts = self
            .accounts
            .read()
            .map_err(|e| LedgerError::InternalError(e.to_string().into()))?;
        Ok(accounts.clone())
    }

    fn save(&self, accounts: &[Account]) -> Result<()> {
        let mut stored = self
            .accounts
            .write()
            .map_err(|e| LedgerError::InternalError(e.to_string().into()))?;
        *stored = accounts.to_vec();
        Ok(())
    }
}
