#![allow(dead_code)]

use std::fs::File;
use std::io::Error;
use std::path::Path;
use tempfile::NamedTempFile;

pub const SCRIPT_HEADER: [&str; 8] = [
    "op",
    "account",
    "amount",
    "name",
    "cadence",
    "product",
    "installments",
    "start_date",
];

/// Writes an operation script with the standard header followed by `rows`.
///
/// Rows may be shorter than the header; the reader accepts them.
pub fn write_script(rows: &[&[&str]]) -> Result<NamedTempFile, Error> {
    let file = NamedTempFile::new()?;
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(file.reopen()?);

    wtr.write_record(SCRIPT_HEADER)?;
    for row in rows {
        wtr.write_record(*row)?;
    }

    wtr.flush()?;
    Ok(file)
}

/// Generates a script that opens `accounts` monthly accounts of 12 x 100
/// and pays each of them `payments` times.
pub fn generate_script(path: &Path, accounts: usize, payments: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(file);

    wtr.write_record(SCRIPT_HEADER)?;

    for id in 1..=accounts {
        wtr.write_record([
            "open",
            &id.to_string(),
            "1200",
            &format!("Customer {id}"),
            "monthly",
            "Fridge",
            "12",
            "2024-01-01",
        ])?;
    }

    for _ in 0..payments {
        for id in 1..=accounts {
            wtr.write_record(["pay", &id.to_string(), "75.5"])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
