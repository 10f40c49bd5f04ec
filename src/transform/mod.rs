//! Row-level transformation: field parsers, schema and the record transformer.

pub mod derive;
pub mod parsers;
pub mod record;
pub mod schema;

pub use record::RecordTransformer;
pub use schema::{Derivation, FieldKind, FieldSpec, Schema};
