use crate::config::InputConfig;
use crate::error::Result;
use crate::load::reader::RowReader;
use crate::metrics::LoadMetrics;
use crate::sink::Sink;
use crate::transform::RecordTransformer;
use crate::types::{LoadResult, RawRecord, Rejection, RowOutcome};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Streams one file through the transformer into the sink.
pub struct BatchLoader<'a> {
    transformer: &'a RecordTransformer,
    input: &'a InputConfig,
    sink: &'a dyn Sink,
}

impl<'a> BatchLoader<'a> {
    pub fn new(transformer: &'a RecordTransformer, input: &'a InputConfig, sink: &'a dyn Sink) -> Self {
        Self {
            transformer,
            input,
            sink,
        }
    }

    /// Load every row of `path`.
    ///
    /// Failing to open or read the file is the only error; row-level
    /// rejections and write failures are collected in the returned [`LoadResult`].
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn load_file(&self, path: &Path) -> Result<LoadResult> {
        let columns = self.transformer.schema().source_columns();
        let reader = RowReader::open(path, self.input, &columns)?;
        let file = path.display().to_string();
        info!("Streaming {} into {}", file, self.sink.describe());

        let mut result = LoadResult::default();
        for row in reader {
            let outcome = match row? {
                Ok(raw) => self.load_row(&raw).await,
                Err(bad) => RowOutcome::Rejected(Rejection::validation(bad.row, bad.error)),
            };

            match &outcome {
                RowOutcome::Accepted => LoadMetrics::record_row_accepted(&file),
                RowOutcome::Rejected(r) => {
                    warn!("Rejected {}", r);
                    LoadMetrics::record_row_rejected(&file);
                }
                RowOutcome::WriteFailed(r) => {
                    warn!("Write failed {}", r);
                    LoadMetrics::record_write_failed(&file);
                }
            }
            result.record(outcome);

            if result.attempted % 1000 == 0 {
                debug!("Processed {} rows", result.attempted);
            }
        }

        LoadMetrics::record_file_completed(result.attempted);
        info!(
            "✅ Finished {}: {} attempted, {} accepted, {} rejected, {} write failures",
            file, result.attempted, result.accepted, result.rejected, result.write_failed
        );
        Ok(result)
    }

    async fn load_row(&self, raw: &RawRecord) -> RowOutcome {
        let record = match self.transformer.transform(raw) {
            Ok(record) => record,
            Err(rejection) => return RowOutcome::Rejected(rejection),
        };
        match self.sink.insert(&record).await {
            Ok(()) => RowOutcome::Accepted,
            Err(e) => RowOutcome::WriteFailed(Rejection::write(record.row(), e)),
        }
    }
}
