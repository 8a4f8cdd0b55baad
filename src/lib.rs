//! `tabular-sql-ingest` materializes heterogeneous tabular files (delimited
//! text and spreadsheet workbooks) discovered under a directory tree as
//! freshly provisioned tables in a relational store, loading all rows as
//! text.
//!
//! The primary entrypoint is [`pipeline::ingest_directory`], which scans a
//! tree, classifies each file by extension, and runs the per-file pipeline:
//! schema extraction from the first row, idempotent drop-and-recreate table
//! provisioning, and batched bulk loading. [`pipeline::ingest_file`] runs the
//! same pipeline for a single file.
//!
//! ## What you can ingest
//!
//! **File formats (auto-detected by extension):**
//!
//! - **Delimited text**: `.csv` (delimiter configurable via
//!   [`pipeline::IngestOptions`])
//! - **Spreadsheets** (requires the Cargo feature `excel`, on by default):
//!   `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods` (first worksheet only)
//!
//! Every column of the destination table is unconstrained text; there is no
//! type inference. Column names come from the file's first row, sanitized
//! into unique identifier-safe names; the table name is derived
//! deterministically from the file name, so re-ingesting a file replaces its
//! table with identical shape.
//!
//! ## Quick example
//!
//! ```no_run
//! use tabular_sql_ingest::pipeline::{ingest_directory, IngestOptions};
//! use tabular_sql_ingest::store::SqliteStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut store = SqliteStore::open("warehouse.db")?;
//! let summary = ingest_directory(&mut store, "input/", &IngestOptions::default())?;
//! println!("loaded {} rows", summary.stats().total_rows);
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure model
//!
//! All errors are file-scoped: a failed file is reported (see
//! [`observer::IngestObserver`]) and the scan proceeds. A file with no header
//! is skipped, not failed. Rows whose field count does not match the header
//! are dropped and counted. Individual undecodable fields become empty
//! strings under the default [`source::FieldErrorPolicy`].
//!
//! ## Modules
//!
//! - [`pipeline`]: per-file orchestration and the directory runner
//! - [`source`]: delimited-text and spreadsheet row adapters
//! - [`schema`]: rows, schemas, sanitization, table identities
//! - [`store`]: the destination-store trait and the SQLite implementation
//! - [`loader`]: batched bulk loading
//! - [`observer`]: per-file status reporting and run summaries
//! - [`error`]: error types used across ingestion

pub mod error;
pub mod loader;
pub mod observer;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod store;

pub use error::{IngestError, IngestResult};
pub use pipeline::{ingest_directory, ingest_file, FileOutcome, IngestOptions, RunSummary};
