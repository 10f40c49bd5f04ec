//! Destinations for normalized documents.

pub mod mongo;

pub use mongo::MongoSink;

use crate::error::WriteError;
use crate::types::NormalizedRecord;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::debug;

/// Append-only document sink.
///
/// Each accepted record gets exactly one `insert` call; retries, if any, are
/// the driver's business.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn insert(&self, record: &NormalizedRecord) -> Result<(), WriteError>;

    /// Release the underlying connection. Called once at the end of a run.
    async fn close(&self);

    fn describe(&self) -> String;
}

/// In-memory sink for dry runs and tests. Documents are kept as JSON.
#[derive(Default)]
pub struct InMemorySink {
    documents: Mutex<Vec<serde_json::Value>>,
    failing_rows: HashSet<usize>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that refuses inserts for the given source rows.
    pub fn failing_on(rows: impl IntoIterator<Item = usize>) -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            failing_rows: rows.into_iter().collect(),
        }
    }

    pub fn documents(&self) -> Vec<serde_json::Value> {
        self.documents.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().map(|d| d.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Sink for InMemorySink {
    async fn insert(&self, record: &NormalizedRecord) -> Result<(), WriteError> {
        if self.failing_rows.contains(&record.row()) {
            return Err(WriteError::new(format!("insert refused for row {}", record.row())));
        }
        let document = serde_json::to_value(record).map_err(|e| WriteError::new(e.to_string()))?;
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| WriteError::new("in-memory sink poisoned"))?;
        documents.push(document);
        debug!("Stored document for row {}", record.row());
        Ok(())
    }

    async fn close(&self) {
        debug!("Closing in-memory sink with {} documents", self.len());
    }

    fn describe(&self) -> String {
        "in-memory".to_string()
    }
}
