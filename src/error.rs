use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Boxed error surfaced by a [`crate::store::TableStore`] implementation.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type returned by ingestion functions.
///
/// Every variant is file-scoped: a failed file is reported and the directory
/// scan proceeds with the next file. None of these abort a whole run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source file could not be opened or parsed at the container level
    /// (missing file, permission denied, corrupt workbook, malformed stream).
    #[error("source unreadable ({}): {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    /// The source yielded zero rows, or a header row with zero columns.
    ///
    /// The orchestrator maps this to [`crate::pipeline::FileOutcome::SkippedEmpty`]
    /// rather than a failure.
    #[error("empty header: {message}")]
    EmptyHeader { message: String },

    /// A single field could not be decoded into text.
    ///
    /// Only surfaced under [`crate::source::FieldErrorPolicy::Propagate`]; the
    /// default policy substitutes an empty string instead.
    #[error("failed to decode field at row {row} column {column}: {message}")]
    FieldDecode {
        row: usize,
        column: usize,
        message: String,
    },

    /// Dropping or creating the destination table was rejected by the store.
    #[error("provisioning failed for table '{table}': {source}")]
    Provisioning {
        table: String,
        #[source]
        source: StoreError,
    },

    /// A batch flush was rejected by the store. `loaded` counts the rows
    /// already committed before the failing flush.
    #[error("bulk load failed for table '{table}' after {loaded} rows: {source}")]
    Load {
        table: String,
        loaded: usize,
        #[source]
        source: StoreError,
    },
}

impl IngestError {
    pub(crate) fn source_unreadable(path: &Path, source: impl Into<StoreError>) -> Self {
        Self::SourceUnreadable {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}
