//! Ledger data model and the payment-allocation engine.
//!
//! Everything here is synchronous and free of I/O; persistence goes through
//! the `ports::AccountRepository` trait.

pub mod account;
pub mod allocation;
pub mod installment;
pub mod money;
pub mod ports;
