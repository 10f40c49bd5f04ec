use crate::config::InputConfig;
use crate::load::BatchLoader;
use crate::metrics::LoadMetrics;
use crate::sink::Sink;
use crate::transform::RecordTransformer;
use crate::types::LoadResult;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Final state of one input file
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Every row was read; row-level problems are inside the result
    Exhausted(LoadResult),
    /// The file could not be opened; no rows were read
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileReport {
    pub fn result(&self) -> Option<&LoadResult> {
        match &self.status {
            FileStatus::Exhausted(result) => Some(result),
            FileStatus::Failed(_) => None,
        }
    }
}

/// Aggregate of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub files: Vec<FileReport>,
}

impl RunSummary {
    fn total(&self, count: impl Fn(&LoadResult) -> usize) -> usize {
        self.files.iter().filter_map(FileReport::result).map(count).sum()
    }

    pub fn attempted(&self) -> usize {
        self.total(|r| r.attempted)
    }

    pub fn accepted(&self) -> usize {
        self.total(|r| r.accepted)
    }

    pub fn rejected(&self) -> usize {
        self.total(|r| r.rejected)
    }

    pub fn write_failed(&self) -> usize {
        self.total(|r| r.write_failed)
    }

    pub fn failed_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.status, FileStatus::Failed(_)))
            .count()
    }

    /// A run succeeds when every file was opened and read to the end. In
    /// strict mode any rejected row or failed write also fails the run.
    pub fn is_success(&self, strict: bool) -> bool {
        if self.failed_files() > 0 {
            return false;
        }
        !strict || (self.rejected() == 0 && self.write_failed() == 0)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "📊 Run {} summary", self.run_id)?;
        for file in &self.files {
            match &file.status {
                FileStatus::Exhausted(r) => writeln!(
                    f,
                    "   {}: attempted {}, accepted {}, rejected {}, write failures {}",
                    file.path.display(),
                    r.attempted,
                    r.accepted,
                    r.rejected,
                    r.write_failed
                )?,
                FileStatus::Failed(reason) => {
                    writeln!(f, "   {}: FAILED ({})", file.path.display(), reason)?
                }
            }
        }
        write!(
            f,
            "   Total: attempted {}, accepted {}, rejected {}, write failures {}, failed files {}",
            self.attempted(),
            self.accepted(),
            self.rejected(),
            self.write_failed(),
            self.failed_files()
        )
    }
}

/// Runs the batch loader over each input file in order.
pub struct Pipeline {
    transformer: RecordTransformer,
    input: InputConfig,
    sink: Arc<dyn Sink>,
}

impl Pipeline {
    pub fn new(transformer: RecordTransformer, input: InputConfig, sink: Arc<dyn Sink>) -> Self {
        Self {
            transformer,
            input,
            sink,
        }
    }

    /// Process `paths` sequentially. A file that fails to open is recorded
    /// and the run moves on to the next one.
    #[instrument(skip_all, fields(files = paths.len()))]
    pub async fn run(&self, paths: &[PathBuf]) -> RunSummary {
        let run_id = Uuid::new_v4();
        info!(%run_id, "🚀 Starting run over {} file(s)", paths.len());
        let loader = BatchLoader::new(&self.transformer, &self.input, self.sink.as_ref());

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            info!("Processing file [{}]", path.display());
            let status = match loader.load_file(path).await {
                Ok(result) => FileStatus::Exhausted(result),
                Err(e) => {
                    error!("File {} failed: {}", path.display(), e);
                    LoadMetrics::record_file_failed();
                    FileStatus::Failed(e.to_string())
                }
            };
            files.push(FileReport {
                path: path.clone(),
                status,
            });
        }

        RunSummary { run_id, files }
    }

    /// Run over `paths` and then close the sink, whatever the outcome.
    pub async fn run_and_close(self, paths: &[PathBuf]) -> RunSummary {
        let summary = self.run(paths).await;
        self.sink.close().await;
        summary
    }
}
