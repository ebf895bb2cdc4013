//! Distribution of a payment across an account's installments.
//!
//! The walk is oldest-debt-first: unpaid installments before paid ones, then
//! by due date (unscheduled last), then by installment number. Whatever the
//! walk cannot place is returned to the caller as carried credit.

use super::installment::Installment;
use super::money::Money;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How a payment treats an installment it can only partially cover.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// The installment stays open with a partial paid amount.
    #[default]
    Partial,
    /// The installment is closed at what it received and the uncovered
    /// difference moves to a new shortfall installment at the end.
    CloseWithShortfall,
}

/// What one allocation run did to an account.
#[derive(Debug, PartialEq, Clone)]
pub struct AllocationOutcome {
    /// New money plus the credit that was folded back in.
    pub pool: Money,
    /// Part of the pool that landed on installments.
    pub applied: Money,
    /// Numbers of the installments that received money, in walk order.
    pub touched: Vec<u32>,
    /// Number of the shortfall installment appended by this run, if any.
    pub shortfall: Option<u32>,
    /// Credit left on the account after the run.
    pub carried_credit: Money,
}

/// Processing order for allocation.
pub fn allocation_order(a: &Installment, b: &Installment) -> Ordering {
    a.is_paid()
        .cmp(&b.is_paid())
        .then_with(|| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.number.cmp(&b.number))
}

/// Walks `installments` in allocation order, spending `pool`.
///
/// Returns the outcome with `carried_credit` set to the unspent pool. Paid
/// installments are never mutated. In `CloseWithShortfall` mode at most one
/// shortfall is appended, since a partial cover exhausts the pool.
pub fn allocate(
    installments: &mut Vec<Installment>,
    pool: Money,
    mode: PaymentMode,
    today: NaiveDate,
) -> AllocationOutcome {
    let mut order: Vec<usize> = (0..installments.len()).collect();
    order.sort_by(|&a, &b| allocation_order(&installments[a], &installments[b]));

    let mut left = pool;
    let mut touched = Vec::new();
    let mut uncovered = None;

    for idx in order {
        if left <= Money::ZERO {
            break;
        }
        let installment = &mut installments[idx];
        if installment.is_paid() {
            continue;
        }

        let covers = left >= installment.remaining();
        left = installment.apply_payment(left, today);
        touched.push(installment.number);

        if !covers && mode == PaymentMode::CloseWithShortfall && !installment.is_shortfall {
            uncovered = installment.close_short(today);
        }
    }

    let shortfall = uncovered.map(|difference| {
        let number = next_number(installments);
        installments.push(Installment::shortfall(number, difference));
        number
    });

    AllocationOutcome {
        pool,
        applied: pool - left,
        touched,
        shortfall,
        carried_credit: left,
    }
}

/// The number the next appended installment receives.
pub fn next_number(installments: &[Installment]) -> u32 {
    installments.iter().map(|i| i.number).max().unwrap_or(0) + 1
}
