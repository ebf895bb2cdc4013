pub mod account_writer;
pub mod operation;
pub mod operation_reader;
