//! Per-file ingestion orchestration and the recursive directory runner.
//!
//! [`ingest_file`] wires the pipeline for one file, in order: open the
//! source, extract the schema from the first row, derive the table identity,
//! provision the table, then batch-load the remaining rows. Any stage's
//! failure short-circuits to a terminal [`FileOutcome`]; a
//! provisioned-but-unloaded table is left in place on load failure.
//!
//! [`ingest_directory`] scans a directory tree, classifies files by
//! extension, and ingests them one at a time over a single store connection.
//! Per-file failures never abort the scan.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::error::{IngestError, IngestResult};
use crate::loader::{self, DEFAULT_BATCH_SIZE, LoadStats};
use crate::observer::{severity_for_error, FileContext, IngestObserver, IngestSeverity, RunStats};
use crate::schema::{Schema, SourceKind, TableIdentity};
use crate::source::{open_source, FieldErrorPolicy};
use crate::store::{provision_table, TableStore};

/// Options controlling ingestion behavior.
///
/// Use [`Default`] for common cases. Passed explicitly at call time; there is
/// no process-wide configuration state.
#[derive(Clone)]
pub struct IngestOptions {
    /// Field delimiter for delimited-text sources.
    pub delimiter: u8,
    /// Rows buffered per bulk write.
    pub batch_size: usize,
    /// What to do when a single field fails to decode.
    pub field_errors: FieldErrorPolicy,
    /// Optional observer for per-file status and the run summary.
    pub observer: Option<Arc<dyn IngestObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestSeverity,
}

impl fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("batch_size", &self.batch_size)
            .field("field_errors", &self.field_errors)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            batch_size: DEFAULT_BATCH_SIZE,
            field_errors: FieldErrorPolicy::default(),
            observer: None,
            alert_at_or_above: IngestSeverity::Critical,
        }
    }
}

/// Terminal, per-file ingestion outcome. Reported once; never retried.
#[derive(Debug)]
pub enum FileOutcome {
    /// Table provisioned and all surviving rows loaded.
    Loaded {
        /// Rows written to the destination table.
        rows: usize,
        /// Rows dropped for not matching the header's field count.
        dropped: usize,
    },
    /// The file had no header to build a schema from; nothing was provisioned.
    SkippedEmpty,
    /// File-scoped failure; the run continues with the next file.
    Failed(IngestError),
}

impl FileOutcome {
    /// Rows loaded, if the file loaded.
    pub fn rows_loaded(&self) -> Option<usize> {
        match self {
            Self::Loaded { rows, .. } => Some(*rows),
            _ => None,
        }
    }
}

/// Ingest one file into a freshly provisioned destination table.
///
/// The table identity is derived from the file name and `kind` before any
/// I/O, so the same file always targets the same table. The store connection
/// is borrowed only for the duration of the call.
pub fn ingest_file<S: TableStore + ?Sized>(
    store: &mut S,
    path: &Path,
    kind: SourceKind,
    options: &IngestOptions,
) -> FileOutcome {
    let table = TableIdentity::derive(path, kind);
    let ctx = FileContext {
        path: path.to_path_buf(),
        kind,
        table: table.clone(),
    };

    let result = run_stages(store, path, kind, &table, options);

    let outcome = match result {
        Ok(stats) => FileOutcome::Loaded {
            rows: stats.loaded,
            dropped: stats.dropped,
        },
        Err(IngestError::EmptyHeader { .. }) => FileOutcome::SkippedEmpty,
        Err(e) => FileOutcome::Failed(e),
    };

    if let Some(obs) = options.observer.as_ref() {
        match &outcome {
            FileOutcome::Loaded { rows, dropped } => obs.on_file_loaded(
                &ctx,
                LoadStats {
                    loaded: *rows,
                    dropped: *dropped,
                },
            ),
            FileOutcome::SkippedEmpty => obs.on_file_skipped(&ctx),
            FileOutcome::Failed(e) => {
                let severity = severity_for_error(e);
                obs.on_file_failed(&ctx, severity, e);
                if severity >= options.alert_at_or_above {
                    obs.on_alert(&ctx, severity, e);
                }
            }
        }
    }

    outcome
}

fn run_stages<S: TableStore + ?Sized>(
    store: &mut S,
    path: &Path,
    kind: SourceKind,
    table: &TableIdentity,
    options: &IngestOptions,
) -> IngestResult<LoadStats> {
    let mut rows = open_source(path, kind, options.delimiter, options.field_errors)?;

    let header = match rows.next() {
        Some(first) => first?,
        None => {
            return Err(IngestError::EmptyHeader {
                message: format!("no rows in {}", path.display()),
            });
        }
    };
    let schema = Schema::from_header(&header)?;

    provision_table(store, table, &schema)?;
    loader::load_rows(store, table, &schema, rows, options.batch_size)
}

/// Result of one directory scan: per-file outcomes in traversal order.
///
/// Unsupported extensions are skipped silently and do not appear here.
#[derive(Debug)]
pub struct RunSummary {
    /// Outcome for every candidate file, in deterministic traversal order.
    pub outcomes: Vec<(PathBuf, FileOutcome)>,
}

impl RunSummary {
    /// Aggregate counters across all outcomes.
    pub fn stats(&self) -> RunStats {
        let mut stats = RunStats::default();
        for (_, outcome) in &self.outcomes {
            match outcome {
                FileOutcome::Loaded { rows, .. } => {
                    stats.loaded_files += 1;
                    stats.total_rows += rows;
                }
                FileOutcome::SkippedEmpty => stats.skipped_files += 1,
                FileOutcome::Failed(_) => stats.failed_files += 1,
            }
        }
        stats
    }
}

/// Recursively scan `root` and ingest every supported file, one at a time,
/// over the single `store` connection.
///
/// Files are visited in sorted order so repeated runs are deterministic.
/// Per-file failures are recorded in the summary and never abort the scan;
/// traversal errors (unreadable entries) are reported through the observer's
/// `on_scan_error` and skipped. The only error this function itself returns
/// is an unreadable root.
pub fn ingest_directory<S: TableStore + ?Sized>(
    store: &mut S,
    root: impl AsRef<Path>,
    options: &IngestOptions,
) -> IngestResult<RunSummary> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(IngestError::source_unreadable(
            root,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut outcomes: Vec<(PathBuf, FileOutcome)> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // Unreadable entries are reported, never silently dropped.
                if let Some(obs) = options.observer.as_ref() {
                    obs.on_scan_error(e.path(), &e);
                }
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        let Some(kind) = SourceKind::from_path(&path) else {
            continue;
        };
        let outcome = ingest_file(store, &path, kind, options);
        outcomes.push((path, outcome));
    }

    let summary = RunSummary { outcomes };
    if let Some(obs) = options.observer.as_ref() {
        obs.on_run_complete(summary.stats());
    }
    Ok(summary)
}
