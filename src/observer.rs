//! Reporting hooks for ingestion runs.
//!
//! The pipeline reports one event per file plus a run summary through the
//! [`IngestObserver`] trait. [`StdErrObserver`] prints human-readable status
//! lines; [`FileObserver`] appends them to a log file; [`CompositeObserver`]
//! fans out to several observers.

use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestError;
use crate::loader::LoadStats;
use crate::schema::{SourceKind, TableIdentity};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the file failed).
    Error,
    /// Critical error (typically I/O or other infrastructure failures).
    Critical,
}

/// Context about one file ingestion attempt.
#[derive(Debug, Clone)]
pub struct FileContext {
    /// The source file path.
    pub path: PathBuf,
    /// Source classification used for the attempt.
    pub kind: SourceKind,
    /// Destination table identity derived for the file.
    pub table: TableIdentity,
}

/// End-of-run counters reported once per directory scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    /// Files fully loaded.
    pub loaded_files: usize,
    /// Files skipped because they had no header.
    pub skipped_files: usize,
    /// Files that failed.
    pub failed_files: usize,
    /// Total rows loaded across all files.
    pub total_rows: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestObserver: Send + Sync {
    /// Called when a file's table was provisioned and its rows loaded.
    fn on_file_loaded(&self, _ctx: &FileContext, _stats: LoadStats) {}

    /// Called when a file was skipped for having no header.
    fn on_file_skipped(&self, _ctx: &FileContext) {}

    /// Called when ingestion of a file fails.
    fn on_file_failed(&self, _ctx: &FileContext, _severity: IngestSeverity, _error: &IngestError) {}

    /// Called when a failure meets the configured alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_file_failed`].
    fn on_alert(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        self.on_file_failed(ctx, severity, error)
    }

    /// Called when the directory walk itself fails to read an entry
    /// (e.g. an unreadable subdirectory). The scan continues past it.
    fn on_scan_error(&self, _path: Option<&Path>, _error: &(dyn StdError + 'static)) {}

    /// Called once after the directory scan completes, regardless of
    /// individual file failures.
    fn on_run_complete(&self, _stats: RunStats) {}
}

/// Classify an error for observer callbacks and alert thresholds.
///
/// Failures with an I/O error anywhere in their source chain are
/// infrastructure problems and rank Critical; everything else that fails a
/// file is Error. The `EmptyHeader` arm only matters for direct callers:
/// the pipeline maps that error to a skip before the failure path.
pub fn severity_for_error(error: &IngestError) -> IngestSeverity {
    match error {
        IngestError::EmptyHeader { .. } => IngestSeverity::Info,
        IngestError::FieldDecode { .. } => IngestSeverity::Error,
        IngestError::SourceUnreadable { .. }
        | IngestError::Provisioning { .. }
        | IngestError::Load { .. } => {
            if error_chain_contains_io(error) {
                IngestSeverity::Critical
            } else {
                IngestSeverity::Error
            }
        }
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestObserver for CompositeObserver {
    fn on_file_loaded(&self, ctx: &FileContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_file_loaded(ctx, stats);
        }
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        for o in &self.observers {
            o.on_file_skipped(ctx);
        }
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        for o in &self.observers {
            o.on_file_failed(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }

    fn on_scan_error(&self, path: Option<&Path>, error: &(dyn StdError + 'static)) {
        for o in &self.observers {
            o.on_scan_error(path, error);
        }
    }

    fn on_run_complete(&self, stats: RunStats) {
        for o in &self.observers {
            o.on_run_complete(stats);
        }
    }
}

/// Logs ingestion events to stderr, one status line per file plus a summary.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestObserver for StdErrObserver {
    fn on_file_loaded(&self, ctx: &FileContext, stats: LoadStats) {
        eprintln!(
            "[ingest][ok] kind={:?} path={} table={} rows={} dropped={}",
            ctx.kind,
            ctx.path.display(),
            ctx.table,
            stats.loaded,
            stats.dropped
        );
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        eprintln!(
            "[ingest][skip] kind={:?} path={} (no header)",
            ctx.kind,
            ctx.path.display()
        );
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        eprintln!(
            "[ingest][{:?}] kind={:?} path={} err={}",
            severity,
            ctx.kind,
            ctx.path.display(),
            error
        );
    }

    fn on_alert(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        eprintln!(
            "[ALERT][ingest][{:?}] kind={:?} path={} err={}",
            severity,
            ctx.kind,
            ctx.path.display(),
            error
        );
    }

    fn on_scan_error(&self, path: Option<&Path>, error: &(dyn StdError + 'static)) {
        match path {
            Some(p) => eprintln!("[ingest][scan] path={} err={}", p.display(), error),
            None => eprintln!("[ingest][scan] err={error}"),
        }
    }

    fn on_run_complete(&self, stats: RunStats) {
        eprintln!(
            "[ingest][done] loaded={} skipped={} failed={} rows={}",
            stats.loaded_files, stats.skipped_files, stats.failed_files, stats.total_rows
        );
    }
}

/// Appends ingestion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestObserver for FileObserver {
    fn on_file_loaded(&self, ctx: &FileContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok kind={:?} path={} table={} rows={} dropped={}",
            unix_ts(),
            ctx.kind,
            ctx.path.display(),
            ctx.table,
            stats.loaded,
            stats.dropped
        ));
    }

    fn on_file_skipped(&self, ctx: &FileContext) {
        self.append_line(&format!(
            "{} skip kind={:?} path={}",
            unix_ts(),
            ctx.kind,
            ctx.path.display()
        ));
    }

    fn on_file_failed(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        self.append_line(&format!(
            "{} fail severity={:?} kind={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.kind,
            ctx.path.display(),
            error
        ));
    }

    fn on_alert(&self, ctx: &FileContext, severity: IngestSeverity, error: &IngestError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} kind={:?} path={} err={}",
            unix_ts(),
            severity,
            ctx.kind,
            ctx.path.display(),
            error
        ));
    }

    fn on_scan_error(&self, path: Option<&Path>, error: &(dyn StdError + 'static)) {
        self.append_line(&format!(
            "{} scan-error path={} err={}",
            unix_ts(),
            path.map(Path::display).map(|d| d.to_string()).unwrap_or_default(),
            error
        ));
    }

    fn on_run_complete(&self, stats: RunStats) {
        self.append_line(&format!(
            "{} done loaded={} skipped={} failed={} rows={}",
            unix_ts(),
            stats.loaded_files,
            stats.skipped_files,
            stats.failed_files,
            stats.total_rows
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
