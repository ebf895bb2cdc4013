use chrono::NaiveDate;
use clap::Parser;
use installment_ledger::application::ledger::Ledger;
use installment_ledger::domain::ports::AccountRepositoryBox;
use installment_ledger::infrastructure::csv_store::CsvAccountRepository;
use installment_ledger::infrastructure::in_memory::InMemoryAccountRepository;
#[cfg(feature = "storage-rocksdb")]
use installment_ledger::infrastructure::rocksdb::RocksDbAccountRepository;
use installment_ledger::interfaces::csv::account_writer::AccountWriter;
use installment_ledger::interfaces::csv::operation_reader::OperationReader;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Operations CSV file (op, account, amount, name, cadence, product, installments, start_date)
    input: PathBuf,

    /// Directory holding accounts.csv and installments.csv (optional).
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Date used to stamp payments and default schedule starts (YYYY-MM-DD).
    #[arg(long)]
    today: Option<NaiveDate>,
}

fn local_repository(data_dir: Option<&Path>) -> AccountRepositoryBox {
    match data_dir {
        Some(dir) => Box::new(CsvAccountRepository::new(dir)),
        None => Box::new(InMemoryAccountRepository::new()),
    }
}

fn repository(cli: &Cli) -> Result<AccountRepositoryBox> {
    let store: AccountRepositoryBox = match &cli.db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(db_path) => Box::new(RocksDbAccountRepository::open(db_path).into_diagnostic()?),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to {} storage.",
                if cli.data_dir.is_some() { "CSV" } else { "In-Memory" }
            );
            local_repository(cli.data_dir.as_deref())
        }
        None => local_repository(cli.data_dir.as_deref()),
    };
    Ok(store)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "installment_ledger=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let (mut ledger, load_error) = Ledger::load(repository(&cli)?);
    // Saving over a store that could not be read would drop its contents
    if let Some(e) = load_error {
        return Err(e)
            .into_diagnostic()
            .wrap_err("Error loading ledger; stored data left untouched");
    }
    if let Some(today) = cli.today {
        ledger = ledger.with_clock(move || today);
    }

    // Replay operations
    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = OperationReader::new(file);
    for op_result in reader.operations() {
        match op_result {
            Ok(op) => match op.apply(&mut ledger) {
                Ok(None) => {}
                Ok(Some(e)) => eprintln!("Warning: ledger not saved: {}", e),
                Err(e) => eprintln!("Error applying operation: {}", e),
            },
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    // Final flush before exit
    ledger.save().into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(ledger.accounts()).into_diagnostic()?;

    Ok(())
}
