use crate::constants::{SALARY_BUCKET_LOWER, SALARY_BUCKET_UPPER};
use crate::transform::schema::Derivation;
use crate::types::FieldValue;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

type FieldList = Vec<(String, FieldValue)>;

fn lookup<'a>(fields: &'a FieldList, name: &str) -> Option<&'a FieldValue> {
    fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

fn set(fields: &mut FieldList, name: &str, value: Option<FieldValue>) {
    fields.retain(|(n, _)| n != name);
    if let Some(value) = value {
        fields.push((name.to_string(), value));
    }
}

pub fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [first, last]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// Completed years from `born` to `today`; never negative.
pub fn age_on(born: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

pub fn salary_bucket(amount: &Decimal) -> &'static str {
    if *amount < Decimal::from(SALARY_BUCKET_LOWER) {
        "A"
    } else if *amount > Decimal::from(SALARY_BUCKET_UPPER) {
        "C"
    } else {
        "B"
    }
}

/// Apply one derivation to a field list in place. Missing inputs leave the
/// target absent.
pub fn apply(derivation: &Derivation, fields: &mut FieldList, reference_date: NaiveDate) {
    match derivation {
        Derivation::FullName { first, last, target } => {
            let value = full_name(
                lookup(fields, first).and_then(FieldValue::as_text),
                lookup(fields, last).and_then(FieldValue::as_text),
            );
            set(fields, target, value.map(FieldValue::Text));
        }
        Derivation::Age { birth_date, target } => {
            let value = lookup(fields, birth_date)
                .and_then(FieldValue::as_date)
                .map(|born| FieldValue::Integer(i64::from(age_on(born, reference_date))));
            set(fields, target, value);
        }
        Derivation::SalaryBucket { salary, target } => {
            let value = lookup(fields, salary)
                .and_then(FieldValue::as_currency)
                .map(|c| FieldValue::Text(salary_bucket(&c.amount).to_string()));
            set(fields, target, value);
        }
        Derivation::Nest { members, target } => {
            let mut nested = Vec::new();
            for member in members {
                if let Some(pos) = fields.iter().position(|(n, _)| n == member) {
                    nested.push(fields.remove(pos));
                }
            }
            set(fields, target, (!nested.is_empty()).then_some(FieldValue::Nested(nested)));
        }
    }
}
