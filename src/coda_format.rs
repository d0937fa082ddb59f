//! CODA file reader.
//!
//! CODA is the Belgian bank statement exchange format: fixed-width lines,
//! each typed by its leading characters. This module decodes the Latin-1
//! input, runs the structural validation pre-pass and folds the typed
//! lines into statements and transactions.

use crate::error::{Error, Result};
use crate::record::{Record, RecordKind};
use crate::types::{Statement, Transaction};
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::{debug, trace, warn};

/// Options controlling a parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Skip the structural validation pre-pass.
    #[serde(default)]
    pub skip_validation: bool,
}

impl ParseOptions {
    pub fn skip_validation() -> Self {
        Self {
            skip_validation: true,
        }
    }
}

/// Represents a parsed CODA file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodaFile {
    /// Statements in file order, one per header record.
    pub statements: Vec<Statement>,
}

impl CodaFile {
    /// Parse a CODA file from any source implementing `Read`.
    ///
    /// The bytes are decoded as Latin-1. A file that fails validation
    /// yields a `CodaFile` without statements.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use coda_parser::coda_format::{CodaFile, ParseOptions};
    ///
    /// let mut file = File::open("statement.cod")?;
    /// let coda = CodaFile::from_read(&mut file, &ParseOptions::default())?;
    /// println!("Statements: {}", coda.statements.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R, options: &ParseOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = decode_latin1(&bytes);
        Self::from_str(&text, options)
    }

    /// Parse already decoded CODA text.
    pub fn from_str(input: &str, options: &ParseOptions) -> Result<Self> {
        if !options.skip_validation && !validate_str(input) {
            warn!("CODA input failed structural validation, no statements returned");
            return Ok(Self::default());
        }

        let statements = assemble(input.lines())?;
        debug!(
            statements = statements.len(),
            transactions = statements.iter().map(|s| s.transactions.len()).sum::<usize>(),
            "parsed CODA input"
        );
        Ok(Self { statements })
    }
}

/// Decode single-byte Latin-1 input.
///
/// WHATWG maps the `latin1` label onto windows-1252, which agrees with
/// ISO-8859-1 on every printable character CODA uses.
pub fn decode_latin1(bytes: &[u8]) -> String {
    WINDOWS_1252
        .decode_without_bom_handling(bytes)
        .0
        .into_owned()
}

/// `true` iff every line passes structural validation.
pub fn validate_str(input: &str) -> bool {
    input.lines().enumerate().all(|(index, line)| {
        let record = Record::new(index + 1, line);
        let valid = record.is_valid();
        if !valid {
            debug!(line = index + 1, kind = ?record.kind(), "malformed record");
        }
        valid
    })
}

/// Fold state of one parse run.
#[derive(Debug, Default)]
struct Assembler {
    statements: Vec<Statement>,
    // Set once the current statement has a primary movement to attach to.
    in_transaction: bool,
}

impl Assembler {
    fn apply(&mut self, record: &Record<'_>) -> Result<()> {
        match record.kind() {
            RecordKind::Header => {
                debug!(line = record.line_number(), "statement opened");
                self.statements.push(Statement::new(record.bank_identifier()));
                self.in_transaction = false;
            }
            RecordKind::OldBalance => {
                let statement = self.statement(record)?;
                statement.account = record.account()?;
                statement.old_balance = record.old_balance();
            }
            RecordKind::NewBalance => {
                let statement = self.statement(record)?;
                statement.new_balance = record.new_balance();
                statement.new_balance_date = record.new_balance_date();
            }
            RecordKind::Movement1 => {
                let transaction = Transaction {
                    entry_date: record.entry_date(),
                    reference_number: record.reference_number(),
                    detail_number: record.detail_number(),
                    amount: record.amount(),
                    communication: record.communication(),
                    ..Transaction::default()
                };
                self.statement(record)?.add_transaction(transaction);
                self.in_transaction = true;
            }
            RecordKind::Movement2 => {
                let transaction = self.transaction(record)?;
                transaction.bic = record.bic();
                transaction.client_reference = record.client_reference();
            }
            RecordKind::Movement3 => {
                let transaction = self.transaction(record)?;
                transaction.currency = record.currency();
                transaction.counterparty_name = record.counterparty_name();
                transaction.counterparty_account = record.counterparty_account();
            }
            RecordKind::Information2 => {
                self.transaction(record)?.address = record.address();
            }
            RecordKind::Unknown => {
                trace!(line = record.line_number(), "skipping unhandled record");
            }
        }
        Ok(())
    }

    fn statement(&mut self, record: &Record<'_>) -> Result<&mut Statement> {
        self.statements
            .last_mut()
            .ok_or_else(|| Error::ProtocolViolation {
                line: record.line_number(),
                kind: record.kind(),
                missing: "statement header",
            })
    }

    fn transaction(&mut self, record: &Record<'_>) -> Result<&mut Transaction> {
        let violation = Error::ProtocolViolation {
            line: record.line_number(),
            kind: record.kind(),
            missing: "primary movement",
        };
        if !self.in_transaction {
            return Err(violation);
        }
        self.statements
            .last_mut()
            .and_then(|s| s.transactions.last_mut())
            .ok_or(violation)
    }
}

/// Run the assembly state machine over `lines` in a single pass.
pub fn assemble<'a, I>(lines: I) -> Result<Vec<Statement>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut assembler = Assembler::default();
    for (index, line) in lines.into_iter().enumerate() {
        assembler.apply(&Record::new(index + 1, line))?;
    }
    Ok(assembler.statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountType, Communication};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const HEADER: &str = "0000031031520005                  MMIF SA/BANK              GEBABEBB   00538839354 00000                                       2";
    const OLD_BALANCE: &str = "10016539007547034 eur0be                  0000000057900000300315mmif sa/evocure                                              017";
    const MOVEMENT1: &str = "21000100000001500000103        0000000000500860010415001500001101100000834941                                      31031501601 0";
    const MOVEMENT2: &str = "2200010000                                                                                        GKCCBEBB                   1 0";
    const MOVEMENT3: &str = "2300010000BE53900754703405                  EURLASTNM PERSON                                                                 0 1";
    const INFORMATION2: &str = "32000200015 STREET                                     3654 CITY BELGIQUE                                                    0 0";
    const NEW_BALANCE: &str = "8016035918134040 EUR0BE                  0000000058900000140122                                                                0";
    const TRAILER: &str = "9               000015000000016789000000000000000000                                                                           2";

    fn join(lines: &[&str]) -> String {
        lines.join("\n")
    }

    #[test]
    fn test_single_statement_single_transaction() {
        let input = join(&[
            HEADER,
            OLD_BALANCE,
            MOVEMENT1,
            MOVEMENT2,
            MOVEMENT3,
            INFORMATION2,
            NEW_BALANCE,
            TRAILER,
        ]);
        let coda = CodaFile::from_str(&input, &ParseOptions::default()).unwrap();

        assert_eq!(coda.statements.len(), 1);
        let statement = &coda.statements[0];
        assert_eq!(statement.bank_identifier.as_deref(), Some("GEBABEBB"));
        assert_eq!(statement.account_type(), Some(AccountType::BelgianBasic));
        assert_eq!(statement.account_number(), Some("539007547034"));
        assert_eq!(statement.old_balance.unwrap().to_string(), "57900.000");
        assert_eq!(statement.new_balance.unwrap().to_string(), "58900.000");
        assert_eq!(statement.new_balance_date, NaiveDate::from_ymd_opt(2022, 1, 14));

        assert_eq!(statement.transactions.len(), 1);
        let transaction = &statement.transactions[0];
        assert_eq!(transaction.entry_date, NaiveDate::from_ymd_opt(2015, 3, 31));
        assert_eq!(transaction.reference_number.as_deref(), Some("0001500000103"));
        assert_eq!(transaction.detail_number, None);
        assert_eq!(transaction.amount.unwrap().to_string(), "500.860");
        assert_eq!(
            transaction.communication,
            Some(Communication::Structured("100000834941".into()))
        );
        assert_eq!(transaction.bic.as_deref(), Some("GKCCBEBB"));
        assert_eq!(transaction.client_reference, None);
        assert_eq!(transaction.currency.as_deref(), Some("EUR"));
        assert_eq!(transaction.counterparty_name.as_deref(), Some("LASTNM PERSON"));
        assert_eq!(transaction.counterparty_account.as_deref(), Some("BE53900754703405"));
        assert_eq!(transaction.address.as_deref(), Some("5 STREET 3654 CITY BELGIQUE"));
    }

    #[test]
    fn test_optional_movement_records_may_be_missing() {
        let input = join(&[HEADER, OLD_BALANCE, MOVEMENT1, MOVEMENT1, MOVEMENT3]);
        let coda = CodaFile::from_str(&input, &ParseOptions::default()).unwrap();

        let transactions = &coda.statements[0].transactions;
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].bic, None);
        assert_eq!(transactions[0].currency, None);
        assert_eq!(transactions[1].currency.as_deref(), Some("EUR"));
        assert_eq!(transactions[1].address, None);
    }

    #[test]
    fn test_unknown_record_between_movement_parts_is_skipped() {
        let information1 = "31000200010001500000103        001500001001LASTNM PERSON                                                                     1 0";
        let input = join(&[HEADER, MOVEMENT1, MOVEMENT3, information1, INFORMATION2]);
        let coda = CodaFile::from_str(&input, &ParseOptions::default()).unwrap();

        let transaction = &coda.statements[0].transactions[0];
        assert_eq!(transaction.currency.as_deref(), Some("EUR"));
        assert_eq!(transaction.address.as_deref(), Some("5 STREET 3654 CITY BELGIQUE"));
    }

    #[test]
    fn test_last_balance_record_wins() {
        let second_old = OLD_BALANCE.replacen("0000000057900000", "1000000000100000", 1);
        let second_new = NEW_BALANCE.replacen("0000000058900000140122", "0000000000200000150122", 1);
        let input = join(&[HEADER, OLD_BALANCE, NEW_BALANCE, &second_old, &second_new]);
        let coda = CodaFile::from_str(&input, &ParseOptions::default()).unwrap();

        let statement = &coda.statements[0];
        assert_eq!(statement.old_balance.unwrap().to_string(), "-100.000");
        assert_eq!(statement.new_balance.unwrap().to_string(), "200.000");
        assert_eq!(statement.new_balance_date, NaiveDate::from_ymd_opt(2022, 1, 15));
    }

    #[test]
    fn test_one_statement_per_header() {
        let input = join(&[HEADER, OLD_BALANCE, MOVEMENT1, HEADER, MOVEMENT1, MOVEMENT1]);
        let coda = CodaFile::from_str(&input, &ParseOptions::default()).unwrap();

        assert_eq!(coda.statements.len(), 2);
        assert_eq!(coda.statements[0].transactions.len(), 1);
        assert_eq!(coda.statements[1].transactions.len(), 2);
        assert_eq!(coda.statements[1].account, None);
    }

    #[test]
    fn test_header_resets_transaction_cursor() {
        let input = join(&[HEADER, MOVEMENT1, HEADER, MOVEMENT2]);
        let err = CodaFile::from_str(&input, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ProtocolViolation { line: 4, kind: RecordKind::Movement2, .. }
        ));
    }

    #[test]
    fn test_movement_before_header_is_rejected() {
        let err = CodaFile::from_str(MOVEMENT1, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ProtocolViolation { line: 1, kind: RecordKind::Movement1, .. }
        ));

        let err = CodaFile::from_str(OLD_BALANCE, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::ProtocolViolation { kind: RecordKind::OldBalance, .. }
        ));
    }

    #[test]
    fn test_invalid_file_yields_no_statements() {
        let input = join(&[HEADER, "100/0000/00135", MOVEMENT1]);
        assert!(!validate_str(&input));

        let coda = CodaFile::from_str(&input, &ParseOptions::default()).unwrap();
        assert!(coda.statements.is_empty());
    }

    #[test]
    fn test_skip_validation() {
        let input = join(&[HEADER, "100/0000/00135", MOVEMENT1]);
        let coda = CodaFile::from_str(&input, &ParseOptions::skip_validation()).unwrap();

        assert_eq!(coda.statements.len(), 1);
        assert_eq!(coda.statements[0].account, None);
        assert_eq!(coda.statements[0].transactions.len(), 1);
    }

    #[test]
    fn test_unsupported_account_type_aborts() {
        let old_balance = OLD_BALANCE.replacen("10016", "17016", 1);
        let input = join(&[HEADER, &old_balance, MOVEMENT1]);
        let err = CodaFile::from_str(&input, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAccountType { line: 2, .. }));
    }

    #[test]
    fn test_from_read_decodes_latin1() {
        let mut line = MOVEMENT3.replacen("LASTNM", "LASTNÉ", 1).into_bytes();
        // Re-encode the 'É' as a single Latin-1 byte.
        let pos = line.windows(2).position(|w| w == [0xC3, 0x89]).unwrap();
        line.splice(pos..pos + 2, [0xC9]);

        let mut bytes = join(&[HEADER, MOVEMENT1]).into_bytes();
        bytes.push(b'\n');
        bytes.extend_from_slice(&line);
        bytes.extend_from_slice(b"\r\n");

        let coda = CodaFile::from_read(&mut bytes.as_slice(), &ParseOptions::default()).unwrap();
        let transaction = &coda.statements[0].transactions[0];
        assert_eq!(transaction.counterparty_name.as_deref(), Some("LASTNÉ PERSON"));
        assert_eq!(transaction.currency.as_deref(), Some("EUR"));
    }
}
