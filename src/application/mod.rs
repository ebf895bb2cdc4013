//! Application layer: reversible commands, the undo history and the
//! `Ledger` service that ties them to a persistence gateway.

pub mod command;
pub mod history;
pub mod ledger;
