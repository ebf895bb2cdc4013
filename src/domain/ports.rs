use super::account::Account;
use crate::error::Result;

/// Persistence gateway for the full, ordered list of accounts.
///
/// The ledger loads once at startup and saves wholesale after every
/// mutation. A `save` followed by `load` must return an equal list.
pub trait AccountRepository: Send + Sync {
    /// Returns every stored account in saved order, or an empty list when
    /// nothing has been stored yet.
    fn load(&self) -> Result<Vec<Account>>;
    fn save(&self, accounts: &[Account]) -> Result<()>;
}

pub type AccountRepositoryBox = Box<dyn AccountRepository>;
