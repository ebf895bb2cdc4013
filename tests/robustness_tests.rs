mod common;

use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_malformed_rows_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
    let script = common::write_script(&[
        &["open", "1", "300", "Ana", "monthly", "TV", "3", "2024-01-15"],
        // Unknown op
        &["refund", "1", "10"],
        // Amount is not a number
        &["pay", "1", "lots"],
        // Installment count is not an integer
        &["open", "2", "100", "Bea", "monthly", "TV", "two"],
        &["pay", "1", "100"],
    ])?;

    let mut cmd = Command::new(cargo_bin!("installment-ledger"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error reading operation"))
        .stdout(predicate::str::contains("1,Ana,TV,3,1,2,100,200,0"))
        .stdout(predicate::str::contains("\n2,").not());

    Ok(())
}

#[test]
fn test_rejected_operations_leave_state_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let script = common::write_script(&[
        &["open", "1", "300", "Ana", "monthly", "TV", "3", "2024-01-15"],
        // Non-positive payments
        &["pay", "1", "0"],
        &["pay", "1", "-50"],
        // Unknown account
        &["pay", "99", "10"],
        &["delete", "99"],
        // Duplicate id
        &["open", "1", "500", "Other", "monthly", "Sofa", "5", "2024-01-15"],
        // Zero installments and missing name
        &["open", "2", "100", "Bea", "monthly", "TV", "0"],
        &["open", "3", "100", "", "monthly", "TV", "2"],
        // Missing amount
        &["pay", "1"],
    ])?;

    let output = Command::new(cargo_bin!("installment-ledger"))
        .arg(script.path())
        .output()?;
    assert!(output.status.success());

    let stderr = String::from_utf8(output.stderr)?;
    assert_eq!(stderr.matches("Error applying operation").count(), 8);
    assert!(stderr.contains("already exists"));
    assert!(stderr.contains("No account with id '99'"));

    let stdout = String::from_utf8(output.stdout)?;
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("1,Ana,TV,3,0,3,0,300,0"));

    Ok(())
}

#[test]
fn test_rejected_operation_does_not_enter_undo_history() -> Result<(), Box<dyn std::error::Error>> {
    let script = common::write_script(&[
        &["open", "1", "300", "Ana", "monthly", "TV", "3", "2024-01-15"],
        &["pay", "1", "100"],
        &["pay", "1", "-1"],
        // Reverts the 100 payment, not the rejected one
        &["undo"],
    ])?;

    let mut cmd = Command::new(cargo_bin!("installment-ledger"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1,Ana,TV,3,0,3,0,300,0"));

    Ok(())
}

#[test]
fn test_whitespace_and_short_rows() -> Result<(), Box<dyn std::error::Error>> {
    let mut script = tempfile::NamedTempFile::new()?;
    writeln!(script, "op, account, amount, name, cadence, product, installments, start_date")?;
    writeln!(script, "open , 7 , 90 , Eva , quincenal , Phone , 3 , 2024-03-01")?;
    writeln!(script, "pay_close, 7, 40")?;
    writeln!(script, "undo")?;
    writeln!(script, "pay, 7, 40")?;

    let mut cmd = Command::new(cargo_bin!("installment-ledger"));
    cmd.arg(script.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("Error").not())
        .stdout(predicate::str::contains("7,Eva,Phone,3,1,2,40,50,0"));

    Ok(())
}
