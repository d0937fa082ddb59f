//! Record classification and typed field access for single CODA lines.

use crate::error::{Error, Result};
use crate::field::{extract, Field};
use crate::normalize;
use crate::types::{Account, Communication};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of a CODA line, decided by its leading characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// `0`: statement header.
    Header,
    /// `1`: old balance and account.
    OldBalance,
    /// `8`: new balance.
    NewBalance,
    /// `21`: primary movement record.
    Movement1,
    /// `22`: secondary movement record.
    Movement2,
    /// `23`: tertiary movement record.
    Movement3,
    /// `32`: information record, part 2.
    Information2,
    /// Anything else; ignored by the parser.
    Unknown,
}

impl RecordKind {
    /// Prefix table. No prefix is a prefix of another one.
    pub const PREFIXES: [(&'static str, RecordKind); 7] = [
        ("0", RecordKind::Header),
        ("1", RecordKind::OldBalance),
        ("8", RecordKind::NewBalance),
        ("21", RecordKind::Movement1),
        ("22", RecordKind::Movement2),
        ("23", RecordKind::Movement3),
        ("32", RecordKind::Information2),
    ];

    /// Classify a line by prefix.
    pub fn classify(line: &str) -> Self {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(_, kind)| *kind)
            .unwrap_or(RecordKind::Unknown)
    }
}

/// Classify a line by prefix.
pub fn classify(line: &str) -> RecordKind {
    RecordKind::classify(line)
}

/// A single CODA line together with its 1-based position in the input.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    line_number: usize,
    line: &'a str,
    kind: RecordKind,
}

impl<'a> Record<'a> {
    pub fn new(line_number: usize, line: &'a str) -> Self {
        Self {
            line_number,
            line,
            kind: classify(line),
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Raw trimmed payload of `field`, empty when the line does not carry it.
    pub fn raw(&self, field: Field) -> &'a str {
        extract(self.line, field)
    }

    /// Structural check: an old balance line must carry a splittable
    /// account column. Every other kind is accepted as-is.
    pub fn is_valid(&self) -> bool {
        match self.kind {
            RecordKind::OldBalance => normalize::account_is_well_formed(self.raw(Field::Account)),
            _ => true,
        }
    }

    pub fn bank_identifier(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::Bic))
    }

    /// Account of the statement.
    ///
    /// Fails with [`Error::UnsupportedAccountType`] when the structure digit
    /// is not one of `0`..`3`.
    pub fn account(&self) -> Result<Option<Account>> {
        normalize::account(self.raw(Field::Account)).map_err(|digit| {
            Error::UnsupportedAccountType {
                line: self.line_number,
                digit,
            }
        })
    }

    pub fn old_balance(&self) -> Option<Decimal> {
        normalize::amount(self.raw(Field::OldBalance))
    }

    pub fn new_balance(&self) -> Option<Decimal> {
        normalize::amount(self.raw(Field::NewBalance))
    }

    pub fn new_balance_date(&self) -> Option<NaiveDate> {
        normalize::date(self.raw(Field::NewBalanceDate))
    }

    pub fn entry_date(&self) -> Option<NaiveDate> {
        normalize::date(self.raw(Field::EntryDate))
    }

    pub fn reference_number(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::ReferenceNumber))
    }

    pub fn detail_number(&self) -> Option<u32> {
        normalize::detail_number(self.raw(Field::DetailNumber))
    }

    pub fn amount(&self) -> Option<Decimal> {
        normalize::amount(self.raw(Field::Amount))
    }

    pub fn communication(&self) -> Option<Communication> {
        normalize::communication(self.raw(Field::Communication))
    }

    pub fn bic(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::CounterpartyBic))
    }

    pub fn client_reference(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::ClientReference))
    }

    pub fn currency(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::Currency))
    }

    pub fn counterparty_name(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::CounterpartyName))
    }

    pub fn counterparty_account(&self) -> Option<String> {
        normalize::non_empty(self.raw(Field::CounterpartyAccount))
    }

    pub fn address(&self) -> Option<String> {
        normalize::address(self.raw(Field::Address))
    }
}
