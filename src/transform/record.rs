use crate::error::ValidationError;
use crate::transform::derive;
use crate::transform::schema::Schema;
use crate::types::{NormalizedRecord, RawRecord, Rejection};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Turns RawRecords into NormalizedRecords according to a [`Schema`].
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    schema: Schema,
    reference_date: NaiveDate,
}

impl RecordTransformer {
    pub fn new(schema: Schema, reference_date: NaiveDate) -> Self {
        Self {
            schema,
            reference_date,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Transform one row.
    ///
    /// The first failing required field rejects the whole row. An optional
    /// field that fails to parse is left out of the document.
    pub fn transform(&self, raw: &RawRecord) -> Result<NormalizedRecord, Rejection> {
        let row = raw.row();
        let mut fields = Vec::with_capacity(self.schema.fields.len());

        for spec in &self.schema.fields {
            let value = match raw.get(&spec.source) {
                Some(text) => match spec.kind.parse(&spec.target, text) {
                    Ok(value) => value,
                    Err(e) if spec.required => return Err(Rejection::parse(row, e)),
                    Err(e) => {
                        warn!(row, field = %spec.target, "Dropping optional field: {}", e);
                        None
                    }
                },
                None => None,
            };

            match value {
                Some(value) => fields.push((spec.target.clone(), value)),
                None if spec.required => {
                    return Err(Rejection::validation(
                        row,
                        ValidationError::MissingField {
                            field: spec.target.clone(),
                        },
                    ));
                }
                None => {}
            }
        }

        for derivation in &self.schema.derivations {
            derive::apply(derivation, &mut fields, self.reference_date);
        }

        debug!(row, fields = fields.len(), "Transformed row");
        Ok(NormalizedRecord::new(row, fields))
    }
}
