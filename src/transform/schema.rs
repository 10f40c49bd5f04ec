use crate::constants::*;
use crate::error::ParseError;
use crate::transform::parsers;
use crate::types::FieldValue;
use serde::Deserialize;

/// How a raw column is parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Name,
    Date,
    Currency,
    Numeric,
}

impl FieldKind {
    pub fn parse(self, field: &str, raw: &str) -> Result<Option<FieldValue>, ParseError> {
        Ok(match self {
            FieldKind::Text => parsers::parse_text(field, raw)?.map(FieldValue::Text),
            FieldKind::Name => parsers::parse_name(field, raw)?.map(FieldValue::Text),
            FieldKind::Date => parsers::parse_date(field, raw)?.map(FieldValue::Date),
            FieldKind::Currency => parsers::parse_currency(field, raw)?.map(FieldValue::Currency),
            FieldKind::Numeric => parsers::parse_numeric(field, raw)?.map(FieldValue::Text),
        })
    }
}

/// Maps one source column onto one document field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    pub source: String,
    pub target: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(source: &str, target: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            kind,
            required,
        }
    }
}

/// A field computed from already-parsed fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Derivation {
    /// Joins the non-empty name parts with a space
    FullName {
        first: String,
        last: String,
        target: String,
    },
    /// Whole years between a date field and the reference date
    Age { birth_date: String, target: String },
    /// A/B/C band of a currency field
    SalaryBucket { salary: String, target: String },
    /// Moves the listed fields into one sub-document
    Nest { members: Vec<String>, target: String },
}

/// Ordered field mapping plus derived fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub derivations: Vec<Derivation>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            fields,
            derivations: Vec::new(),
        }
    }

    pub fn with_derivations(mut self, derivations: Vec<Derivation>) -> Self {
        self.derivations = derivations;
        self
    }

    /// Source column names in schema order, used for headerless files.
    pub fn source_columns(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.source.clone()).collect()
    }

    /// The member-data layout.
    pub fn member_data() -> Self {
        use FieldKind::*;
        Schema::new(vec![
            FieldSpec::new(FIRST_NAME_COLUMN, FIRST_NAME_FIELD, Name, true),
            FieldSpec::new(LAST_NAME_COLUMN, LAST_NAME_FIELD, Name, true),
            FieldSpec::new(COMPANY_COLUMN, COMPANY_FIELD, Text, false),
            FieldSpec::new(BIRTH_DATE_COLUMN, BIRTH_DATE_FIELD, Date, true),
            FieldSpec::new(SALARY_COLUMN, SALARY_FIELD, Currency, true),
            FieldSpec::new(ADDRESS_COLUMN, STREET_FIELD, Text, false),
            FieldSpec::new(SUBURB_COLUMN, SUBURB_FIELD, Text, false),
            FieldSpec::new(STATE_COLUMN, STATE_FIELD, Text, false),
            FieldSpec::new(POST_COLUMN, POST_FIELD, Numeric, false),
            FieldSpec::new(PHONE_COLUMN, PHONE_FIELD, Numeric, false),
            FieldSpec::new(MOBILE_COLUMN, MOBILE_FIELD, Numeric, false),
            FieldSpec::new(EMAIL_COLUMN, EMAIL_FIELD, Text, false),
        ])
        .with_derivations(vec![
            Derivation::FullName {
                first: FIRST_NAME_FIELD.to_string(),
                last: LAST_NAME_FIELD.to_string(),
                target: FULL_NAME_FIELD.to_string(),
            },
            Derivation::Age {
                birth_date: BIRTH_DATE_FIELD.to_string(),
                target: AGE_FIELD.to_string(),
            },
            Derivation::SalaryBucket {
                salary: SALARY_FIELD.to_string(),
                target: SALARY_BUCKET_FIELD.to_string(),
            },
            Derivation::Nest {
                members: vec![
                    STREET_FIELD.to_string(),
                    SUBURB_FIELD.to_string(),
                    STATE_FIELD.to_string(),
                    POST_FIELD.to_string(),
                ],
                target: ADDRESS_FIELD.to_string(),
            },
        ])
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("schema has no fields".to_string());
        }
        let mut targets = std::collections::HashSet::new();
        for field in &self.fields {
            if !targets.insert(field.target.as_str()) {
                return Err(format!("duplicate target field '{}'", field.target));
            }
        }
        Ok(())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::member_data()
    }
}
