use super::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One scheduled slice of an account's debt.
///
/// The number is fixed at creation; amounts and the paid date move as
/// payments are applied and reversed. `Clone` is the deep copy used for
/// undo snapshots.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Installment {
    /// Position in the account's schedule, never reused.
    pub number: u32,
    /// The amount this installment must cover.
    pub original_amount: Money,
    /// How much of `original_amount` has been covered so far.
    pub paid_amount: Money,
    /// `None` for unscheduled installments (shortfalls, free-form cadences).
    pub due_date: Option<NaiveDate>,
    /// Date on which a payment fully covered this installment.
    pub paid_date: Option<NaiveDate>,
    /// Marks an installment synthesized from the uncovered part of another.
    pub is_shortfall: bool,
}

impl Installment {
    pub fn new(number: u32, original_amount: Money, due_date: Option<NaiveDate>) -> Self {
        Self {
            number,
            original_amount,
            paid_amount: Money::ZERO,
            due_date,
            paid_date: None,
            is_shortfall: false,
        }
    }

    pub fn shortfall(number: u32, original_amount: Money) -> Self {
        Self {
            is_shortfall: true,
            ..Self::new(number, original_amount, None)
        }
    }

    pub fn remaining(&self) -> Money {
        self.original_amount - self.paid_amount
    }

    pub fn is_paid(&self) -> bool {
        self.paid_amount >= self.original_amount
    }

    /// Applies up to `amount` to this installment and returns the overflow.
    ///
    /// Covering the remainder closes the installment and stamps `today` as
    /// its paid date. A partial application leaves it open with no paid date.
    pub fn apply_payment(&mut self, amount: Money, today: NaiveDate) -> Money {
        debug_assert!(amount >= Money::ZERO, "negative payment applied");
        let remaining = self.remaining();
        if amount >= remaining {
            self.paid_amount = self.original_amount;
            self.paid_date = Some(today);
            amount - remaining
        } else {
            self.paid_amount += amount;
            self.paid_date = None;
            Money::ZERO
        }
    }

    /// Takes back up to `amount` from what was paid; returns the part that
    /// could not be absorbed by this installment.
    pub fn reverse_payment(&mut self, amount: Money) -> Money {
        debug_assert!(amount >= Money::ZERO, "negative reversal");
        let absorbed = amount.min(self.paid_amount);
        self.paid_amount -= absorbed;
        if self.paid_amount < self.original_amount {
            self.paid_date = None;
        }
        amount - absorbed
    }

    /// Closes a partially paid installment at its paid amount.
    ///
    /// Returns the uncovered difference, or `None` when there is nothing to
    /// close (untouched or already paid).
    pub fn close_short(&mut self, today: NaiveDate) -> Option<Money> {
        if self.is_paid() || self.paid_amount.is_zero() {
            return None;
        }
        let difference = self.remaining();
        self.original_amount = self.paid_amount;
        self.paid_date = Some(today);
        Some(difference)
    }
}
