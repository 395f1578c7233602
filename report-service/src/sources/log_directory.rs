use std::{fs, path::PathBuf};

use meter_domain::domain::LogRecord;

use crate::pipeline::{Envelope, PipelineError, Source};
use crate::sources::log_file::{is_log_file_name, LogBatch};

/// A directory of daily meter logs, read the same way as a zip bundle.
///
/// Not recursive. Files are processed in lexicographic file-name order.
pub struct LogDirectorySource {
    dir: PathBuf,
}

impl LogDirectorySource {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn read_batch(&self) -> Result<LogBatch, PipelineError> {
        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_log_file_name(&name) {
                files.push((name, entry.path()));
            }
        }
        files.sort();

        if files.is_empty() {
            tracing::warn!(dir = %self.dir.display(), "directory holds no .csv files");
            return Err(PipelineError::NoInputFiles);
        }

        let mut batch = LogBatch::default();
        for (name, path) in &files {
            let bytes = fs::read(path)?;
            batch.push_file(name, &bytes);
        }
        Ok(batch)
    }
}

impl Source<LogRecord> for LogDirectorySource {
    fn read(&self) -> Result<Vec<Envelope<LogRecord>>, PipelineError> {
        self.read_batch()?.finish()
    }
}
