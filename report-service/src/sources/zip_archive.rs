use std::{
    fs,
    io::{Cursor, Read},
    path::Path,
};

use meter_domain::domain::LogRecord;
use zip::ZipArchive;

use crate::pipeline::{Envelope, PipelineError, Source};
use crate::sources::log_file::{is_log_file_name, LogBatch};

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 8 * 1024 * 1024;

/// Bytes to reserve for an entry; the declared size is not trusted past
/// [`MAX_PREALLOC`].
fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOC) as usize
}

/// Zip bundle of daily meter logs, held in memory.
///
/// Only `.csv` entries (any case) are read, in lexicographic name order.
pub struct ZipArchiveSource {
    bytes: Vec<u8>,
}

impl ZipArchiveSource {
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let bytes = fs::read(path.as_ref())?;
        Ok(Self::from_bytes(bytes))
    }

    /// Read every log entry into a batch without the final emptiness check.
    pub fn read_batch(&self) -> Result<LogBatch, PipelineError> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))
            .map_err(|e| PipelineError::Archive(format!("failed to open zip archive: {e}")))?;

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| is_log_file_name(name))
            .map(str::to_string)
            .collect();
        names.sort();

        if names.is_empty() {
            tracing::warn!(entries = archive.len(), "zip archive holds no .csv entries");
            return Err(PipelineError::NoInputFiles);
        }

        let mut batch = LogBatch::default();
        for name in &names {
            let mut entry = archive
                .by_name(name)
                .map_err(|e| PipelineError::Archive(format!("failed to open entry '{name}': {e}")))?;
            let mut buf = Vec::with_capacity(initial_capacity(entry.size()));
            entry
                .read_to_end(&mut buf)
                .map_err(|e| PipelineError::Archive(format!("failed to read entry '{name}': {e}")))?;
            batch.push_file(name, &buf);
        }

        Ok(batch)
    }
}

impl Source<LogRecord> for ZipArchiveSource {
    fn read(&self) -> Result<Vec<Envelope<LogRecord>>, PipelineError> {
        self.read_batch()?.finish()
    }
}
