//! Destination store abstraction.
//!
//! The pipeline consumes exactly three store operations: drop-if-exists,
//! create, and bulk insert. [`SqliteStore`] is the bundled implementation;
//! tests substitute their own [`TableStore`] to observe batching behavior.

pub mod sqlite;

use crate::error::{IngestError, IngestResult, StoreError};
use crate::schema::{Row, Schema, TableIdentity};

pub use sqlite::SqliteStore;

/// The three operations the ingestion pipeline needs from a destination store.
///
/// All columns are unconstrained variable-length text; the trait deliberately
/// has no notion of types, constraints, or migrations.
pub trait TableStore {
    /// Drop the table with this identity if it exists. A no-op otherwise.
    fn drop_table_if_exists(&mut self, table: &TableIdentity) -> Result<(), StoreError>;

    /// Create the table fresh with one text column per schema column, in order.
    fn create_table(&mut self, table: &TableIdentity, schema: &Schema) -> Result<(), StoreError>;

    /// Write one batch of rows. Each row has exactly `schema.width()` fields.
    fn bulk_insert(
        &mut self,
        table: &TableIdentity,
        schema: &Schema,
        rows: &[Row],
    ) -> Result<(), StoreError>;
}

/// Guarantee that `table` exists with exactly `schema`'s columns and is empty.
///
/// Unconditionally drops any pre-existing table of that identity, then
/// creates it fresh, so provisioning is idempotent regardless of prior state.
pub fn provision_table<S: TableStore + ?Sized>(
    store: &mut S,
    table: &TableIdentity,
    schema: &Schema,
) -> IngestResult<()> {
    store
        .drop_table_if_exists(table)
        .and_then(|()| store.create_table(table, schema))
        .map_err(|source| IngestError::Provisioning {
            table: table.as_str().to_string(),
            source,
        })
}
