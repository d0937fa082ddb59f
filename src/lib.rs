//! CODA Parser Library
//!
//! A library for reading Belgian CODA bank statement files.
//!
//! CODA files are line-oriented with fixed column positions. Each line is
//! typed by its leading characters, and the parser folds the typed lines
//! into [`Statement`]s holding ordered [`Transaction`]s.
//!
//! # Record kinds
//!
//! | Prefix | Record |
//! |---|---|
//! | `0` | header (bank BIC) |
//! | `1` | old balance and account |
//! | `21` / `22` / `23` | movement, parts 1 to 3 |
//! | `32` | information, part 2 (address) |
//! | `8` | new balance |
//!
//! Other lines are ignored.
//!
//! # Examples
//!
//! ## Parsing a CODA file
//!
//! ```no_run
//! use std::fs::File;
//! use coda_parser::coda_format::{CodaFile, ParseOptions};
//!
//! let mut file = File::open("statement.cod")?;
//! let coda = CodaFile::from_read(&mut file, &ParseOptions::default())?;
//! for statement in &coda.statements {
//!     println!("{:?}: {} movements", statement.account_number(), statement.transactions.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Validating before parsing
//!
//! ```
//! let input = "0000031031520005                  MMIF SA/BANK              GEBABEBB   00538839354 00000                                       2\n100/0000/00135";
//! assert!(!coda_parser::validate(input));
//! assert!(coda_parser::parse(input).unwrap().is_empty());
//! ```

pub mod error;
pub mod types;
pub mod field;
pub mod normalize;
pub mod record;
pub mod coda_format;
pub mod csv_export;

// Re-export commonly used types
pub use coda_format::{CodaFile, ParseOptions};
pub use error::{Error, Result};
pub use record::{classify, RecordKind};
pub use types::{Account, AccountType, Communication, Statement, Transaction};

/// `true` iff every line of `input` passes structural validation.
pub fn validate(input: &str) -> bool {
    coda_format::validate_str(input)
}

/// Parse decoded CODA text with validation enabled.
///
/// Returns an empty list when validation fails.
pub fn parse(input: &str) -> Result<Vec<Statement>> {
    parse_with(input, &ParseOptions::default())
}

/// Parse decoded CODA text with explicit options.
pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Vec<Statement>> {
    CodaFile::from_str(input, options).map(|coda| coda.statements)
}
