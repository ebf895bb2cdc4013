use super::allocation::{self, AllocationOutcome, PaymentMode};
use super::installment::Installment;
use super::money::Money;
use crate::error::LedgerError;
use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Installment cadence derived from an account's free-form tag.
///
/// The tag itself is stored verbatim on the account; the cadence is only
/// consulted when a schedule is generated.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Cadence {
    Monthly,
    Biweekly,
    Unscheduled,
}

impl Cadence {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "mensual" | "monthly" => Cadence::Monthly,
            "quincenal" | "biweekly" => Cadence::Biweekly,
            _ => Cadence::Unscheduled,
        }
    }

    /// Due date of the installment at zero-based `index` in a schedule
    /// starting on `start`.
    pub fn due_date(&self, start: NaiveDate, index: u32) -> Option<NaiveDate> {
        match self {
            Cadence::Monthly => start.checked_add_months(Months::new(index)),
            Cadence::Biweekly => start.checked_add_days(Days::new(14 * u64::from(index))),
            Cadence::Unscheduled => None,
        }
    }
}

/// Input for opening an account with a freshly generated schedule.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewAccount {
    pub id: String,
    pub name: String,
    pub cadence: String,
    pub product: String,
    pub product_price: Money,
    pub installment_count: u32,
}

/// Pre-payment state of an account, captured by value for undo.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct LedgerSnapshot {
    pub installments: Vec<Installment>,
    pub carried_credit: Money,
}

/// A customer account paying off a product in installments.
///
/// Owns its installments (creation order, shortfalls appended at the end)
/// and the credit banked from overpayments.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    /// External identifier (document number), unique across the ledger.
    pub id: String,
    pub name: String,
    /// Free-form cadence tag, e.g. "monthly" or "biweekly".
    pub cadence: String,
    pub product: String,
    pub product_price: Money,
    /// Overpayment waiting to be applied to future installments.
    pub carried_credit: Money,
    pub installments: Vec<Installment>,
}

impl Account {
    /// An account with no installments and no credit.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cadence: impl Into<String>,
        product: impl Into<String>,
        product_price: Money,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cadence: cadence.into(),
            product: product.into(),
            product_price,
            carried_credit: Money::ZERO,
            installments: Vec::new(),
        }
    }

    /// Opens an account, splitting the product price into
    /// `installment_count` installments due from `start` on.
    ///
    /// Each installment is the price divided evenly and rounded to cents;
    /// the rounding residue goes to the last one so the schedule sums to
    /// the price exactly.
    pub fn open(new: NewAccount, start: NaiveDate) -> Result<Self, LedgerError> {
        if new.id.trim().is_empty() {
            return Err(LedgerError::ValidationError(
                "Account id must not be empty".to_string(),
            ));
        }
        if new.name.trim().is_empty() {
            return Err(LedgerError::ValidationError(
                "Account name must not be empty".to_string(),
            ));
        }
        if new.product_price <= Money::ZERO {
            return Err(LedgerError::ValidationError(
                "Product price must be positive".to_string(),
            ));
        }
        if new.installment_count == 0 {
            return Err(LedgerError::ValidationError(
                "Installment count must be greater than zero".to_string(),
            ));
        }

        let count = new.installment_count;
        let value = Money::new(new.product_price.value() / Decimal::from(count)).round_cents();
        let last = value
            .value()
            .checked_mul(Decimal::from(count - 1))
            .and_then(|scheduled| new.product_price.checked_sub(Money::new(scheduled)))
            .unwrap_or(Money::ZERO);
        if value <= Money::ZERO || last <= Money::ZERO {
            return Err(LedgerError::ValidationError(
                "Product price is too small for that many installments".to_string(),
            ));
        }

        let cadence = Cadence::parse(&new.cadence);
        let installments = (0..count)
            .map(|index| {
                let amount = if index + 1 == count { last } else { value };
                Installment::new(index + 1, amount, cadence.due_date(start, index))
            })
            .collect();

        Ok(Self {
            installments,
            ..Self::new(
                new.id.trim(),
                new.name.trim(),
                new.cadence,
                new.product,
                new.product_price,
            )
        })
    }

    /// Applies a payment with ordinary partial-payment semantics.
    pub fn apply_payment(
        &mut self,
        amount: Money,
        today: NaiveDate,
    ) -> Result<AllocationOutcome, LedgerError> {
        self.apply_payment_with(amount, PaymentMode::Partial, today)
    }

    /// Applies a payment, closing any partially covered installment and
    /// moving its uncovered difference to a new shortfall installment.
    pub fn apply_payment_closing_short(
        &mut self,
        amount: Money,
        today: NaiveDate,
    ) -> Result<AllocationOutcome, LedgerError> {
        self.apply_payment_with(amount, PaymentMode::CloseWithShortfall, today)
    }

    /// Folds the carried credit into `amount` and allocates the pool.
    ///
    /// Fails without touching the account when the pool does not fit in a
    /// `Decimal`.
    pub fn apply_payment_with(
        &mut self,
        amount: Money,
        mode: PaymentMode,
        today: NaiveDate,
    ) -> Result<AllocationOutcome, LedgerError> {
        debug_assert!(amount >= Money::ZERO, "negative payment reached the engine");
        let pool = amount.checked_add(self.carried_credit).ok_or_else(|| {
            LedgerError::ValidationError(format!(
                "Payment of {} plus carried credit of {} is out of range",
                amount, self.carried_credit
            ))
        })?;
        self.carried_credit = Money::ZERO;

        let outcome = allocation::allocate(&mut self.installments, pool, mode, today);
        self.carried_credit = outcome.carried_credit;

        debug_assert!(self.carried_credit >= Money::ZERO);
        debug_assert!(self.installments.iter().all(|i| i.paid_amount <= i.original_amount));
        Ok(outcome)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            installments: self.installments.clone(),
            carried_credit: self.carried_credit,
        }
    }

    /// Replaces installments and credit wholesale with `snapshot`.
    pub fn restore(&mut self, snapshot: LedgerSnapshot) {
        self.installments = snapshot.installments;
        self.carried_credit = snapshot.carried_credit;
    }

    pub fn total_paid(&self) -> Money {
        self.installments.iter().map(|i| i.paid_amount).sum()
    }

    /// Sum of what every installment still needs.
    pub fn outstanding_debt(&self) -> Money {
        self.installments.iter().map(|i| i.remaining()).sum()
    }

    pub fn paid_count(&self) -> usize {
        self.installments.iter().filter(|i| i.is_paid()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.installments.len() - self.paid_count()
    }

    /// Scheduled value of one installment (first non-shortfall one).
    pub fn installment_value(&self) -> Money {
        self.installments
            .iter()
            .find(|i| !i.is_shortfall)
            .map(|i| i.original_amount)
            .unwrap_or(Money::ZERO)
    }
}
