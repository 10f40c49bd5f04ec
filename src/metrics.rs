//! Run counters.
//!
//! Emitted through the `metrics` facade; nothing is recorded unless the
//! host process installs a recorder.

use metrics::counter;

pub struct LoadMetrics;

impl LoadMetrics {
    pub fn record_row_accepted(file: &str) {
        counter!("etl_rows_accepted_total", "file" => file.to_string()).increment(1);
    }

    pub fn record_row_rejected(file: &str) {
        counter!("etl_rows_rejected_total", "file" => file.to_string()).increment(1);
    }

    pub fn record_write_failed(file: &str) {
        counter!("etl_write_failures_total", "file" => file.to_string()).increment(1);
    }

    pub fn record_file_completed(attempted: usize) {
        counter!("etl_files_completed_total").increment(1);
        counter!("etl_rows_attempted_total").increment(attempted as u64);
    }

    pub fn record_file_failed() {
        counter!("etl_files_failed_total").increment(1);
    }
}
