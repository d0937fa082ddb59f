//! CODA Show - CLI tool for listing the statements of a CODA file.

use clap::Parser;
use coda_parser::{csv_export, CodaFile, ParseOptions, Result, Statement};
use std::fs::File;
use std::io::{self, Read, Write};
use tracing::debug;

#[derive(Parser)]
#[command(name = "coda_show")]
#[command(about = "List the statements and transactions of a Belgian CODA file", long_about = None)]
struct Cli {
    /// Input file path (or stdin if not provided)
    #[arg(short, long)]
    input: Option<String>,

    /// Parse even if the structural validation fails
    #[arg(long = "skip-validation")]
    skip_validation: bool,

    /// Only validate the file; exit code 2 when it is malformed
    #[arg(long = "validate-only", conflicts_with = "skip_validation")]
    validate_only: bool,

    /// Write transactions as CSV to this path ("-" for stdout) instead of the listing
    #[arg(long)]
    csv: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coda_parser={},coda_show={}", log_level, log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(io::stderr),
        )
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let bytes = if let Some(ref input_path) = cli.input {
        read_all(&mut File::open(input_path)?)?
    } else {
        read_all(&mut io::stdin())?
    };
    let text = coda_parser::coda_format::decode_latin1(&bytes);
    debug!(bytes = bytes.len(), "input read");

    if cli.validate_only {
        return if coda_parser::validate(&text) {
            println!("valid");
            Ok(0)
        } else {
            println!("invalid");
            Ok(2)
        };
    }

    let options = ParseOptions {
        skip_validation: cli.skip_validation,
    };
    let coda = CodaFile::from_str(&text, &options)?;

    match cli.csv.as_deref() {
        Some("-") => csv_export::write_transactions(&coda.statements, &mut io::stdout())?,
        Some(path) => csv_export::write_transactions(&coda.statements, &mut File::create(path)?)?,
        None => {
            let mut stdout = io::stdout();
            for statement in &coda.statements {
                write_statement(&mut stdout, statement)?;
            }
        }
    }

    Ok(0)
}

fn read_all<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn write_statement<W: Write>(writer: &mut W, statement: &Statement) -> Result<()> {
    writeln!(writer, "**--Transactions--**\n")?;
    writeln!(
        writer,
        "Account: {} Account type: {} BIC: {}",
        show(statement.account_number()),
        show(statement.account_type()),
        show(statement.bank_identifier.as_deref())
    )?;
    writeln!(
        writer,
        "Old balance: {} New balance: {} ({})\n",
        show(statement.old_balance),
        show(statement.new_balance),
        show(statement.new_balance_date)
    )?;

    for (index, transaction) in statement.transactions.iter().enumerate() {
        writeln!(
            writer,
            "-- Transaction n.{} - number {} - in date {} --\n",
            index + 1,
            show(transaction.communication.as_ref()),
            show(transaction.entry_date)
        )?;
        writeln!(
            writer,
            "   RN: {} Account: {} BIC: {}",
            show(transaction.reference_number.as_deref()),
            show(transaction.counterparty_account.as_deref()),
            show(transaction.bic.as_deref())
        )?;
        writeln!(
            writer,
            "   Amount: {} {}",
            show(transaction.amount),
            transaction.currency.as_deref().unwrap_or_default()
        )?;
        writeln!(writer, "   Name: {}", show(transaction.counterparty_name.as_deref()))?;
        writeln!(writer, "   Address: {}\n", show(transaction.address.as_deref()))?;
    }

    Ok(())
}
