use crate::domain::account::Account;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// Column names of the summary output.
pub const SUMMARY_HEADER: [&str; 9] = [
    "account",
    "name",
    "product",
    "installments",
    "paid",
    "pending",
    "total_paid",
    "outstanding",
    "carried_credit",
];

/// One summary line per account.
#[derive(Debug, Serialize, PartialEq)]
pub struct AccountSummary {
    pub account: String,
    pub name: String,
    pub product: String,
    pub installments: usize,
    pub paid: usize,
    pub pending: usize,
    pub total_paid: Decimal,
    pub outstanding: Decimal,
    pub carried_credit: Decimal,
}

impl From<&Account> for AccountSummary {
    fn from(account: &Account) -> Self {
        Self {
            account: account.id.clone(),
            name: account.name.clone(),
            product: account.product.clone(),
            installments: account.installments.len(),
            paid: account.paid_count(),
            pending: account.pending_count(),
            total_paid: account.total_paid().value().normalize(),
            outstanding: account.outstanding_debt().value().normalize(),
            carried_credit: account.carried_credit.value().normalize(),
        }
    }
}

/// Writes account summaries as CSV, header first even when empty.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_accounts(&mut self, accounts: &[Account]) -> Result<()> {
        self.writer.write_record(SUMMARY_HEADER)?;
        for account in accounts {
            self.writer.serialize(AccountSummary::from(account))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
