use crate::application::ledger::Ledger;
use crate::domain::account::NewAccount;
use crate::domain::allocation::PaymentMode;
use crate::domain::money::{Amount, Money};
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Open,
    Pay,
    PayClose,
    Delete,
    Undo,
}

/// One row of an operation script.
///
/// Which columns are required depends on `op`: `open` needs account, amount
/// (the product price), name and installments; `pay`/`pay_close` need
/// account and amount; `delete` needs account; `undo` needs nothing.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationType,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cadence: Option<String>,
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub installments: Option<u32>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl Operation {
    /// Runs the operation against `ledger`.
    ///
    /// `Ok(Some(_))` means the operation was applied but the ledger could not
    /// be saved afterwards.
    pub fn apply(self, ledger: &mut Ledger) -> Result<Option<LedgerError>> {
        let op = self.op;
        let save_error = match op {
            OperationType::Open => {
                let new = NewAccount {
                    id: required(self.account, "account", op)?,
                    name: required(self.name, "name", op)?,
                    cadence: self.cadence.unwrap_or_default(),
                    product: self.product.unwrap_or_default(),
                    product_price: Money::new(required(self.amount, "amount", op)?),
                    installment_count: required(self.installments, "installments", op)?,
                };
                let start = self.start_date.unwrap_or_else(|| ledger.today());
                ledger.open_account(new, start)?.save_error
            }
            OperationType::Pay | OperationType::PayClose => {
                let account = required(self.account, "account", op)?;
                let amount = Amount::new(required(self.amount, "amount", op)?)?;
                let mode = if op == OperationType::PayClose {
                    PaymentMode::CloseWithShortfall
                } else {
                    PaymentMode::Partial
                };
                ledger.register_payment(&account, amount, mode)?.save_error
            }
            OperationType::Delete => {
                let account = required(self.account, "account", op)?;
                ledger.delete_account(&account)?.save_error
            }
            OperationType::Undo => {
                let applied = ledger.undo()?;
                if applied.outcome.is_none() {
                    info!("nothing to undo");
                }
                applied.save_error
            }
        };
        Ok(save_error)
    }
}

fn required<T>(value: Option<T>, field: &str, op: OperationType) -> Result<T> {
    value.ok_or_else(|| {
        LedgerError::ValidationError(format!("'{}' is required for {:?}", field, op))
    })
}
