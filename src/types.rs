//! Statement and transaction entities produced by the CODA parser.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account structure announced by the first character of the account column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// `0`: Belgian account number, 12 digits.
    BelgianBasic,
    /// `1`: foreign account number, 34 characters.
    ForeignBasic,
    /// `2`: Belgian IBAN, 31 characters.
    BelgianIban,
    /// `3`: foreign IBAN, 34 characters.
    ForeignIban,
}

impl AccountType {
    /// Map the account structure digit to its kind.
    pub fn from_digit(digit: char) -> Result<Self, String> {
        match digit {
            '0' => Ok(AccountType::BelgianBasic),
            '1' => Ok(AccountType::ForeignBasic),
            '2' => Ok(AccountType::BelgianIban),
            '3' => Ok(AccountType::ForeignIban),
            other => Err(other.to_string()),
        }
    }

    /// Number of characters the account number occupies for this kind.
    pub fn width(&self) -> usize {
        match self {
            AccountType::BelgianBasic => 12,
            AccountType::ForeignBasic => 34,
            AccountType::BelgianIban => 31,
            AccountType::ForeignIban => 34,
        }
    }

    /// Short identifier, stable across releases.
    pub fn code(&self) -> &'static str {
        match self {
            AccountType::BelgianBasic => "bban_be_account",
            AccountType::ForeignBasic => "bban_foreign_account",
            AccountType::BelgianIban => "iban_be_account",
            AccountType::ForeignIban => "iban_foreign_account",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Account holding the statement, taken from the old balance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_type: AccountType,

    /// Account number, cut to the width of `account_type`.
    pub number: String,
}

/// Remittance information of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Communication {
    /// Bank-assigned structured reference (digits only).
    Structured(String),
    /// Free-text message.
    FreeText(String),
}

impl Communication {
    /// The reference or message text.
    pub fn as_str(&self) -> &str {
        match self {
            Communication::Structured(s) | Communication::FreeText(s) => s,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Communication::Structured(_))
    }
}

impl fmt::Display for Communication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logical movement, assembled from a primary movement record and the
/// optional secondary, tertiary and information records that follow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date.
    pub entry_date: Option<NaiveDate>,

    /// Bank reference number of the movement.
    pub reference_number: Option<String>,

    /// Continuation marker; `None` for the main record of a movement.
    pub detail_number: Option<u32>,

    /// Signed amount with three decimals. Negative for debits.
    pub amount: Option<Decimal>,

    pub communication: Option<Communication>,

    /// Counterparty bank (BIC).
    pub bic: Option<String>,

    pub client_reference: Option<String>,

    /// Currency code (e.g., EUR).
    pub currency: Option<String>,

    pub counterparty_name: Option<String>,

    pub counterparty_account: Option<String>,

    /// Counterparty address, whitespace collapsed.
    pub address: Option<String>,
}

impl Transaction {
    /// Amount expressed in cents, truncating the third decimal.
    pub fn amount_cents(&self) -> Option<i64> {
        use rust_decimal::prelude::ToPrimitive;

        self.amount
            .map(|amount| (amount * Decimal::ONE_HUNDRED).trunc())
            .and_then(|cents| cents.to_i64())
    }

    /// Whether this movement carries the given structured reference.
    pub fn matches_structured_communication(&self, reference: &str) -> bool {
        matches!(&self.communication, Some(Communication::Structured(s)) if s == reference)
    }
}

/// One account statement: header, balances and the movements in between.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Bank identifier (BIC) from the header record.
    pub bank_identifier: Option<String>,

    /// Account from the old balance record.
    pub account: Option<Account>,

    pub old_balance: Option<Decimal>,

    pub new_balance: Option<Decimal>,

    pub new_balance_date: Option<NaiveDate>,

    /// Movements in file order.
    pub transactions: Vec<Transaction>,
}

impl Statement {
    /// Create an empty statement for the given bank.
    pub fn new(bank_identifier: Option<String>) -> Self {
        Self {
            bank_identifier,
            ..Self::default()
        }
    }

    /// Add a transaction to the statement.
    pub fn add_transaction(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn account_number(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.number.as_str())
    }

    pub fn account_type(&self) -> Option<AccountType> {
        self.account.as_ref().map(|a| a.account_type)
    }

    /// Sum of all transaction amounts that are present.
    pub fn total_movements(&self) -> Decimal {
        self.transactions.iter().filter_map(|t| t.amount).sum()
    }
}
