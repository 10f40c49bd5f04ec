use crate::constants::{DISPLAY_SUFFIX, NUMERIC_SUFFIX};
use crate::error::{ParseError, ValidationError, WriteError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// One input row before any schema is applied.
///
/// Values are keyed by column name so that unknown or extra columns can be
/// carried along and ignored by the transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    row: usize,
    values: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(row: usize, values: HashMap<String, String>) -> Self {
        Self { row, values }
    }

    /// 1-based position of the row among the data rows of its file
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A currency amount rounded to a fixed scale plus its display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub amount: Decimal,
    pub display: String,
}

/// A normalized, typed field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Currency(Currency),
    Integer(i64),
    Nested(Vec<(String, FieldValue)>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_currency(&self) -> Option<&Currency> {
        match self {
            FieldValue::Currency(c) => Some(c),
            _ => None,
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            FieldValue::Currency(c) => serializer.collect_str(&c.amount),
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Nested(fields) => Fields(fields).serialize(serializer),
        }
    }
}

/// Serializes an ordered field list as a map, expanding currency values into
/// a `<name>_numeric` / `<name>_display` pair.
struct Fields<'a>(&'a [(String, FieldValue)]);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.0 {
            match value {
                FieldValue::Currency(c) => {
                    map.serialize_entry(&format!("{name}{NUMERIC_SUFFIX}"), &c.amount.to_string())?;
                    map.serialize_entry(&format!("{name}{DISPLAY_SUFFIX}"), &c.display)?;
                }
                other => map.serialize_entry(name, other)?,
            }
        }
        map.end()
    }
}

/// The document persisted for one accepted input row.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    row: usize,
    fields: Vec<(String, FieldValue)>,
}

impl NormalizedRecord {
    pub fn new(row: usize, fields: Vec<(String, FieldValue)>) -> Self {
        Self { row, fields }
    }

    /// Row of the RawRecord this document was built from
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Fields(&self.fields).serialize(serializer)
    }
}

/// Why a row did not end up in the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Parse(ParseError),
    Validation(ValidationError),
    Write(WriteError),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Parse(e) => write!(f, "{e}"),
            RejectReason::Validation(e) => write!(f, "{e}"),
            RejectReason::Write(e) => write!(f, "{e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub row: usize,
    pub field: Option<String>,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn parse(row: usize, err: ParseError) -> Self {
        Self {
            row,
            field: Some(err.field.clone()),
            reason: RejectReason::Parse(err),
        }
    }

    pub fn validation(row: usize, err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::MissingField { field } => Some(field.clone()),
            _ => None,
        };
        Self {
            row,
            field,
            reason: RejectReason::Validation(err),
        }
    }

    pub fn write(row: usize, err: WriteError) -> Self {
        Self {
            row,
            field: None,
            reason: RejectReason::Write(err),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// What happened to a single row on its way through the loader
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted,
    Rejected(Rejection),
    WriteFailed(Rejection),
}

/// Per-file outcome of a load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadResult {
    pub attempted: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub write_failed: usize,
    pub rejections: Vec<Rejection>,
}

impl LoadResult {
    pub fn record(&mut self, outcome: RowOutcome) {
        self.attempted += 1;
        match outcome {
            RowOutcome::Accepted => self.accepted += 1,
            RowOutcome::Rejected(r) => {
                self.rejected += 1;
                self.rejections.push(r);
            }
            RowOutcome::WriteFailed(r) => {
                self.write_failed += 1;
                self.rejections.push(r);
            }
        }
    }

    /// True when every attempted row reached the sink
    pub fn is_clean(&self) -> bool {
        self.rejected == 0 && self.write_failed == 0
    }
}
