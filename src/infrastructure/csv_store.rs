use crate::domain::account::Account;
use crate::domain::installment::Installment;
use crate::domain::money::Money;
use crate::domain::ports::AccountRepository;
use crate::error::{LedgerError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// File holding one row per account.
pub const ACCOUNTS_FILE: &str = "accounts.csv";
/// File holding one row per installment, linked to accounts by id.
pub const INSTALLMENTS_FILE: &str = "installments.csv";

#[derive(Debug, Serialize, Deserialize)]
struct AccountRow {
    id: String,
    name: String,
    cadence: String,
    product: String,
    #[serde(with = "rust_decimal::serde::str")]
    product_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    carried_credit: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
struct InstallmentRow {
    account_id: String,
    number: u32,
    #[serde(with = "rust_decimal::serde::str")]
    original_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    paid_amount: Decimal,
    due_date: Option<NaiveDate>,
    paid_date: Option<NaiveDate>,
    is_shortfall: bool,
}

impl AccountRow {
    fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            cadence: account.cadence.clone(),
            product: account.product.clone(),
            product_price: account.product_price.value(),
            carried_credit: account.carried_credit.value(),
        }
    }

    fn into_account(self) -> Account {
        let mut account = Account::new(
            self.id,
            self.name,
            self.cadence,
            self.product,
            Money::new(self.product_price),
        );
        account.carried_credit = Money::new(self.carried_credit);
        account
    }
}

impl InstallmentRow {
    fn from_installment(account_id: &str, installment: &Installment) -> Self {
        Self {
            account_id: account_id.to_string(),
            number: installment.number,
            original_amount: installment.original_amount.value(),
            paid_amount: installment.paid_amount.value(),
            due_date: installment.due_date,
            paid_date: installment.paid_date,
            is_shortfall: installment.is_shortfall,
        }
    }

    fn into_installment(self) -> Installment {
        Installment {
            number: self.number,
            original_amount: Money::new(self.original_amount),
            paid_amount: Money::new(self.paid_amount),
            due_date: self.due_date,
            paid_date: self.paid_date,
            is_shortfall: self.is_shortfall,
        }
    }
}

/// A row-oriented repository backed by two CSV files in a directory.
///
/// Accounts and installments live in separate tables; installment rows are
/// attached to their account by id in file order. Each file is written to a
/// temporary file next to it and renamed into place.
#[derive(Debug, Clone)]
pub struct CsvAccountRepository {
    dir: PathBuf,
}

impl CsvAccountRepository {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn accounts_path(&self) -> PathBuf {
        self.dir.join(ACCOUNTS_FILE)
    }

    pub fn installments_path(&self) -> PathBuf {
        self.dir.join(INSTALLMENTS_FILE)
    }

    /// Writes `rows` to a synced temporary file next to the tables.
    fn stage_rows<T: Serialize>(&self, rows: impl Iterator<Item = T>) -> Result<NamedTempFile> {
        let tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file());
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }
}

impl AccountRepository for CsvAccountRepository {
    fn load(&self) -> Result<Vec<Account>> {
        let accounts_path = self.accounts_path();
        if !accounts_path.exists() {
            debug!(path = %accounts_path.display(), "no accounts file, starting empty");
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_reader(File::open(&accounts_path)?);
        let mut accounts = Vec::new();
        for row in reader.deserialize::<AccountRow>() {
            accounts.push(row?.into_account());
        }

        let installments_path = self.installments_path();
        if !installments_path.exists() {
            warn!(path = %installments_path.display(), "installments file missing, accounts have no installments");
            return Ok(accounts);
        }

        let by_id: HashMap<String, usize> = accounts
            .iter()
            .enumerate()
            .map(|(index, account)| (account.id.clone(), index))
            .collect();

        let mut reader = csv::Reader::from_reader(File::open(&installments_path)?);
        for row in reader.deserialize::<InstallmentRow>() {
            let row = row?;
            match by_id.get(&row.account_id) {
                Some(&index) => accounts[index].installments.push(row.into_installment()),
                None => warn!(
                    account = %row.account_id,
                    number = row.number,
                    "skipping installment for unknown account"
                ),
            }
        }

        Ok(accounts)
    }

    fn save(&self, accounts: &[Account]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        // Both tables are fully written before either replaces its file.
        let account_rows = self.stage_rows(accounts.iter().map(AccountRow::from_account))?;
        let installment_rows = self.stage_rows(accounts.iter().flat_map(|account| {
            account
                .installments
                .iter()
                .map(|installment| InstallmentRow::from_installment(&account.id, installment))
        }))?;

        // Installments go first: rows for accounts missing from the old
        // accounts table are skipped on load.
        installment_rows
            .persist(self.installments_path())
            .map_err(|e| LedgerError::IoError(e.error))?;
        account_rows
            .persist(self.accounts_path())
            .map_err(|e| LedgerError::IoError(e.error))?;

        debug!(dir = %self.dir.display(), accounts = accounts.len(), "wrote csv ledger");
        Ok(())
    }
}
