//! Fixed-column field table and extractor.
//!
//! Every field is a `(anchor, offset, length)` tuple: the line must start
//! with `anchor`, and the payload is the `length` characters found `offset`
//! characters from the start of the line. Offsets count characters rather
//! than bytes so that decoded Latin-1 text keeps its column alignment.

/// Shape constraint on a field payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Any characters.
    Text,
    /// ASCII digits only.
    Digits,
    /// The leading run of word characters (letters, digits, `_`).
    Word,
}

/// Column layout of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub anchor: &'static str,
    pub offset: usize,
    pub length: usize,
    pub payload: Payload,
}

/// Fields the parser reads, grouped by the record that carries them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // header `0`
    Bic,
    // old balance `1`
    Account,
    OldBalance,
    // new balance `8`
    NewBalance,
    NewBalanceDate,
    // movement `21`
    DetailNumber,
    ReferenceNumber,
    Amount,
    Communication,
    EntryDate,
    // movement `22`
    ClientReference,
    CounterpartyBic,
    // movement `23`
    CounterpartyAccount,
    Currency,
    CounterpartyName,
    // information `32`
    Address,
}

impl Field {
    pub const fn spec(self) -> FieldSpec {
        use Payload::{Digits, Text, Word};

        let (anchor, offset, length, payload) = match self {
            Field::Bic => ("0", 60, 11, Text),
            Field::Account => ("1", 1, 41, Text),
            Field::OldBalance => ("1", 42, 16, Digits),
            Field::NewBalance => ("8", 41, 16, Digits),
            Field::NewBalanceDate => ("8", 57, 6, Digits),
            Field::DetailNumber => ("21", 6, 4, Text),
            Field::ReferenceNumber => ("21", 10, 21, Text),
            Field::Amount => ("21", 31, 16, Digits),
            Field::Communication => ("21", 62, 53, Text),
            Field::EntryDate => ("21", 115, 6, Digits),
            Field::ClientReference => ("22", 63, 35, Text),
            Field::CounterpartyBic => ("22", 98, 11, Text),
            Field::CounterpartyAccount => ("23", 10, 34, Word),
            Field::Currency => ("23", 44, 3, Text),
            Field::CounterpartyName => ("23", 47, 35, Text),
            Field::Address => ("32", 10, 105, Text),
        };

        FieldSpec {
            anchor,
            offset,
            length,
            payload,
        }
    }
}

/// Slice `length` characters starting at character `offset`.
///
/// Returns `None` when the line is too short to hold the whole column.
pub fn column(line: &str, offset: usize, length: usize) -> Option<&str> {
    let mut indices = line
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line.len()));

    let start = indices.nth(offset)?;
    let end = if length == 0 {
        start
    } else {
        indices.nth(length - 1)?
    };
    line.get(start..end)
}

/// Extract the trimmed payload of `field` from `line`.
///
/// Yields an empty string whenever the line does not carry the field: wrong
/// anchor, line too short, or a payload that violates its shape.
pub fn extract(line: &str, field: Field) -> &str {
    let spec = field.spec();
    if !line.starts_with(spec.anchor) {
        return "";
    }

    let Some(raw) = column(line, spec.offset, spec.length) else {
        return "";
    };

    match spec.payload {
        Payload::Text => raw.trim(),
        Payload::Digits if raw.bytes().all(|b| b.is_ascii_digit()) => raw,
        Payload::Digits => "",
        Payload::Word => {
            let end = raw
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(raw.len());
            &raw[..end]
        }
    }
}
