use crate::domain::account::{Account, LedgerSnapshot};
use crate::domain::allocation::{AllocationOutcome, PaymentMode};
use crate::domain::money::{Amount, Money};
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;

/// Lifecycle of a single command. `Executed` and `Undone` are terminal for
/// forward progress: a command never runs twice.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandState {
    Pending,
    Executed,
    Undone,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CommandKind {
    AddAccount,
    DeleteAccount,
    RegisterPayment,
}

/// The reversible operations the ledger knows about, each carrying what it
/// needs to invert itself.
#[derive(Debug, PartialEq, Clone)]
pub enum Operation {
    AddAccount {
        account: Account,
    },
    DeleteAccount {
        account_id: String,
        /// Filled on execute: original index and the removed account.
        removed: Option<(usize, Account)>,
    },
    RegisterPayment {
        account_id: String,
        amount: Amount,
        mode: PaymentMode,
        /// Taken when the command is built, before anything can mutate
        /// the account.
        before: LedgerSnapshot,
    },
}

/// What an executed command did.
#[derive(Debug, PartialEq, Clone)]
pub enum Effect {
    AccountAdded,
    AccountDeleted { index: usize },
    PaymentApplied(AllocationOutcome),
}

#[derive(Debug, PartialEq, Clone)]
pub struct Command {
    operation: Operation,
    state: CommandState,
}

impl Command {
    pub fn add_account(account: Account) -> Self {
        Self::pending(Operation::AddAccount { account })
    }

    pub fn delete_account(account_id: impl Into<String>) -> Self {
        Self::pending(Operation::DeleteAccount {
            account_id: account_id.into(),
            removed: None,
        })
    }

    /// Builds a payment command, snapshotting `account` by value right now.
    pub fn register_payment(account: &Account, amount: Amount, mode: PaymentMode) -> Self {
        Self::pending(Operation::RegisterPayment {
            account_id: account.id.clone(),
            amount,
            mode,
            before: account.snapshot(),
        })
    }

    fn pending(operation: Operation) -> Self {
        Self {
            operation,
            state: CommandState::Pending,
        }
    }

    pub fn state(&self) -> CommandState {
        self.state
    }

    pub fn kind(&self) -> CommandKind {
        match self.operation {
            Operation::AddAccount { .. } => CommandKind::AddAccount,
            Operation::DeleteAccount { .. } => CommandKind::DeleteAccount,
            Operation::RegisterPayment { .. } => CommandKind::RegisterPayment,
        }
    }

    pub fn account_id(&self) -> &str {
        match &self.operation {
            Operation::AddAccount { account } => &account.id,
            Operation::DeleteAccount { account_id, .. } => account_id,
            Operation::RegisterPayment { account_id, .. } => account_id,
        }
    }

    pub fn execute(&mut self, accounts: &mut Vec<Account>, today: NaiveDate) -> Result<Effect> {
        if self.state != CommandState::Pending {
            return Err(LedgerError::CommandState(format!(
                "cannot execute a command that is {:?}",
                self.state
            )));
        }

        let effect = match &mut self.operation {
            Operation::AddAccount { account } => {
                if accounts.iter().any(|a| a.id == account.id) {
                    return Err(LedgerError::DuplicateAccount(account.id.clone()));
                }
                accounts.push(account.clone());
                Effect::AccountAdded
            }
            Operation::DeleteAccount {
                account_id,
                removed,
            } => {
                let index = position(accounts, account_id)?;
                let account = accounts.remove(index);
                *removed = Some((index, account));
                Effect::AccountDeleted { index }
            }
            Operation::RegisterPayment {
                account_id,
                amount,
                mode,
                ..
            } => {
                let index = position(accounts, account_id)?;
                let outcome =
                    accounts[index].apply_payment_with(Money::from(*amount), *mode, today)?;
                Effect::PaymentApplied(outcome)
            }
        };

        self.state = CommandState::Executed;
        Ok(effect)
    }

    pub fn undo(&mut self, accounts: &mut Vec<Account>) -> Result<()> {
        if self.state != CommandState::Executed {
            return Err(LedgerError::CommandState(format!(
                "cannot undo a command that is {:?}",
                self.state
            )));
        }

        match &mut self.operation {
            Operation::AddAccount { account } => {
                let index = position(accounts, &account.id)?;
                accounts.remove(index);
            }
            Operation::DeleteAccount {
                account_id,
                removed,
            } => {
                let (index, account) = removed.take().ok_or_else(|| {
                    LedgerError::CommandState(format!(
                        "no removed account recorded for '{}'",
                        account_id
                    ))
                })?;
                // Best effort: the original slot may no longer exist.
                if index <= accounts.len() {
                    accounts.insert(index, account);
                } else {
                    accounts.push(account);
                }
            }
            Operation::RegisterPayment {
                account_id, before, ..
            } => {
                let index = position(accounts, account_id)?;
                accounts[index].restore(before.clone());
            }
        }

        self.state = CommandState::Undone;
        Ok(())
    }
}

fn position(accounts: &[Account], account_id: &str) -> Result<usize> {
    accounts
        .iter()
        .position(|a| a.id == account_id)
        .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
}
