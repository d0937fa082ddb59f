//! CSV export of parsed CODA statements.
//!
//! One row per transaction, carrying the statement's account and bank so
//! rows from several statements stay distinguishable.

use crate::error::Result;
use crate::types::Statement;
use csv::Writer;
use serde::Serialize;
use std::io::Write;

/// CSV transaction row.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Statement")]
    statement: usize,
    #[serde(rename = "Account")]
    account: &'a str,
    #[serde(rename = "Account Type")]
    account_type: &'a str,
    #[serde(rename = "Bank")]
    bank: &'a str,
    #[serde(rename = "Entry Date")]
    entry_date: String,
    #[serde(rename = "Reference")]
    reference: &'a str,
    #[serde(rename = "Detail")]
    detail: Option<u32>,
    #[serde(rename = "Amount")]
    amount: String,
    #[serde(rename = "Currency")]
    currency: &'a str,
    #[serde(rename = "Structured")]
    structured: bool,
    #[serde(rename = "Communication")]
    communication: &'a str,
    #[serde(rename = "Counterparty")]
    counterparty_name: &'a str,
    #[serde(rename = "Counterparty Account")]
    counterparty_account: &'a str,
    #[serde(rename = "Counterparty BIC")]
    counterparty_bic: &'a str,
    #[serde(rename = "Client Reference")]
    client_reference: &'a str,
    #[serde(rename = "Address")]
    address: &'a str,
}

/// Write every transaction of `statements` as CSV.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
/// use coda_parser::csv_export::write_transactions;
///
/// let statements = coda_parser::parse("")?;
/// let mut file = File::create("transactions.csv")?;
/// write_transactions(&statements, &mut file)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn write_transactions<W: Write>(statements: &[Statement], writer: &mut W) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);

    for (index, statement) in statements.iter().enumerate() {
        let account_type = statement.account_type().map(|t| t.code()).unwrap_or_default();

        for transaction in &statement.transactions {
            let communication = transaction.communication.as_ref();

            let record = CsvRecord {
                statement: index + 1,
                account: statement.account_number().unwrap_or_default(),
                account_type,
                bank: statement.bank_identifier.as_deref().unwrap_or_default(),
                entry_date: transaction
                    .entry_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                reference: transaction.reference_number.as_deref().unwrap_or_default(),
                detail: transaction.detail_number,
                amount: transaction
                    .amount
                    .map(|a| a.to_string())
                    .unwrap_or_default(),
                currency: transaction.currency.as_deref().unwrap_or_default(),
                structured: communication.is_some_and(|c| c.is_structured()),
                communication: communication.map(|c| c.as_str()).unwrap_or_default(),
                counterparty_name: transaction.counterparty_name.as_deref().unwrap_or_default(),
                counterparty_account: transaction
                    .counterparty_account
                    .as_deref()
                    .unwrap_or_default(),
                counterparty_bic: transaction.bic.as_deref().unwrap_or_default(),
                client_reference: transaction.client_reference.as_deref().unwrap_or_default(),
                address: transaction.address.as_deref().unwrap_or_default(),
            };

            csv_writer.serialize(record)?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, AccountType, Communication, Transaction};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_write_transactions() {
        let mut statement = Statement::new(Some("GEBABEBB".into()));
        statement.account = Some(Account {
            account_type: AccountType::BelgianBasic,
            number: "539007547034".into(),
        });
        statement.add_transaction(Transaction {
            entry_date: NaiveDate::from_ymd_opt(2015, 3, 31),
            reference_number: Some("0001500000103".into()),
            amount: Some(Decimal::from_str("-500.860").unwrap()),
            communication: Some(Communication::Structured("100000834941".into())),
            currency: Some("EUR".into()),
            counterparty_name: Some("LASTNM PERSON".into()),
            ..Transaction::default()
        });

        let mut out = Vec::new();
        write_transactions(&[statement], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert!(lines.next().unwrap().starts_with("Statement,Account,Account Type,Bank,Entry Date"));
        assert_eq!(
            lines.next().unwrap(),
            "1,539007547034,bban_be_account,GEBABEBB,2015-03-31,0001500000103,,-500.860,EUR,true,100000834941,LASTNM PERSON,,,,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_no_transactions() {
        let mut out = Vec::new();
        write_transactions(&[Statement::default()], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
