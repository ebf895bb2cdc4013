//! CSV driver surface: operation scripts in, account summaries out.

pub mod csv;
