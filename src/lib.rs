//! Batch ETL for member-data files.
//!
//! Delimited files are read row by row, each row is normalized against a
//! [`transform::Schema`] and every accepted document is appended to a
//! [`sink::Sink`], usually a MongoDB collection.

pub mod config;
pub mod constants;
pub mod error;
pub mod load;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod sink;
pub mod transform;
pub mod types;

pub use config::{Config, Credentials};
pub use error::{EtlError, Result};
pub use pipeline::{FileStatus, Pipeline, RunSummary};
pub use types::{LoadResult, NormalizedRecord, RawRecord};
