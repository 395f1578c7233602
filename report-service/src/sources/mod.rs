pub mod log_directory;
pub mod log_file;
pub mod zip_archive;

pub use log_directory::LogDirectorySource;
pub use log_file::{parse_log, BatchStats, LogBatch, LogLayout, ParsedLog};
pub use zip_archive::ZipArchiveSource;
