use super::command::{Command, CommandKind, Effect};
use super::history::CommandLog;
use crate::domain::account::{Account, NewAccount};
use crate::domain::allocation::{AllocationOutcome, PaymentMode};
use crate::domain::money::Amount;
use crate::domain::ports::AccountRepositoryBox;
use crate::error::{LedgerError, Result};
use chrono::{Local, NaiveDate};
use tracing::{debug, error, info, warn};

pub type Clock = Box<dyn Fn() -> NaiveDate + Send + Sync>;

/// Result of a mutation that was applied in memory.
///
/// The mutation and its undo entry stand even when flushing to the
/// repository fails; the failure is carried in `save_error` and the
/// in-memory state stays authoritative until the next successful save.
#[derive(Debug)]
pub struct Applied<T> {
    pub outcome: T,
    pub save_error: Option<LedgerError>,
}

impl<T> Applied<T> {
    pub fn is_persisted(&self) -> bool {
        self.save_error.is_none()
    }
}

/// The entry point for the installment ledger.
///
/// `Ledger` owns the in-memory account list, the undo history and the
/// repository. Every mutation runs through a `Command`, is pushed onto the
/// history, and is followed by a wholesale save.
pub struct Ledger {
    accounts: Vec<Account>,
    history: CommandLog,
    repository: AccountRepositoryBox,
    clock: Clock,
}

impl Ledger {
    /// Creates an empty ledger without reading from `repository`.
    pub fn new(repository: AccountRepositoryBox) -> Self {
        Self {
            accounts: Vec::new(),
            history: CommandLog::new(),
            repository,
            clock: Box::new(|| Local::now().date_naive()),
        }
    }

    /// Creates a ledger hydrated from `repository`.
    ///
    /// A load failure leaves the ledger empty and is handed back next to it,
    /// so the caller can decide whether saving over the store is safe.
    pub fn load(repository: AccountRepositoryBox) -> (Self, Option<LedgerError>) {
        let mut ledger = Self::new(repository);
        match ledger.repository.load() {
            Ok(accounts) => {
                info!(accounts = accounts.len(), "loaded ledger");
                ledger.accounts = accounts;
                (ledger, None)
            }
            Err(e) => {
                warn!(error = %e, "failed to load ledger, starting empty");
                (ledger, Some(e))
            }
        }
    }

    /// Replaces the clock used to stamp paid dates.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Kind of the mutation the next `undo` would revert.
    pub fn last_command(&self) -> Option<CommandKind> {
        self.history.peek_kind()
    }

    /// Opens an account with a schedule starting on `start`.
    pub fn open_account(&mut self, new: NewAccount, start: NaiveDate) -> Result<Applied<()>> {
        let account = Account::open(new, start)?;
        self.add_account(account)
    }

    /// Adds an already-built account.
    pub fn add_account(&mut self, account: Account) -> Result<Applied<()>> {
        if self.account(&account.id).is_some() {
            return Err(LedgerError::DuplicateAccount(account.id));
        }
        let applied = self.run(Command::add_account(account))?;
        Ok(Applied {
            outcome: (),
            save_error: applied.save_error,
        })
    }

    /// Removes an account; returns the index it occupied.
    pub fn delete_account(&mut self, id: &str) -> Result<Applied<usize>> {
        if self.account(id).is_none() {
            return Err(LedgerError::AccountNotFound(id.to_string()));
        }
        let applied = self.run(Command::delete_account(id))?;
        let index = match applied.outcome {
            Effect::AccountDeleted { index } => index,
            other => {
                return Err(LedgerError::CommandState(format!(
                    "delete produced {:?}",
                    other
                )));
            }
        };
        Ok(Applied {
            outcome: index,
            save_error: applied.save_error,
        })
    }

    /// Registers a payment against account `id`.
    pub fn register_payment(
        &mut self,
        id: &str,
        amount: Amount,
        mode: PaymentMode,
    ) -> Result<Applied<AllocationOutcome>> {
        let account = self
            .account(id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
        let command = Command::register_payment(account, amount, mode);
        let applied = self.run(command)?;
        let outcome = match applied.outcome {
            Effect::PaymentApplied(outcome) => outcome,
            other => {
                return Err(LedgerError::CommandState(format!(
                    "payment produced {:?}",
                    other
                )));
            }
        };
        debug!(
            account = id,
            pool = %outcome.pool,
            applied = %outcome.applied,
            credit = %outcome.carried_credit,
            shortfall = ?outcome.shortfall,
            "allocated payment"
        );
        Ok(Applied {
            outcome,
            save_error: applied.save_error,
        })
    }

    /// Reverts the most recent mutation.
    ///
    /// `outcome` is `None` when the history is empty; nothing is saved in
    /// that case.
    pub fn undo(&mut self) -> Result<Applied<Option<CommandKind>>> {
        let undone = self.history.undo(&mut self.accounts)?;
        let save_error = match undone {
            Some(kind) => {
                info!(?kind, "undid command");
                self.persist()
            }
            None => {
                debug!("nothing to undo");
                None
            }
        };
        Ok(Applied {
            outcome: undone,
            save_error,
        })
    }

    /// Flushes the current state to the repository.
    pub fn save(&self) -> Result<()> {
        self.repository.save(&self.accounts)?;
        info!(accounts = self.accounts.len(), "saved ledger");
        Ok(())
    }

    fn run(&mut self, mut command: Command) -> Result<Applied<Effect>> {
        let today = self.today();
        let effect = command.execute(&mut self.accounts, today)?;
        info!(kind = ?command.kind(), account = command.account_id(), "executed command");
        self.history.push(command)?;
        Ok(Applied {
            outcome: effect,
            save_error: self.persist(),
        })
    }

    fn persist(&self) -> Option<LedgerError> {
        match self.save() {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, "failed to save ledger; in-memory state is ahead of storage");
                Some(e)
            }
        }
    }
}
