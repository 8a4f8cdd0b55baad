//! Batch loader: drains a row stream into a provisioned table.
//!
//! Rows accumulate into a bounded batch; a full batch is flushed (bulk
//! written and cleared) immediately, and whatever remains is flushed once the
//! stream is exhausted. A stream of exactly `2 * batch_size` rows therefore
//! produces exactly two flushes and no empty trailing one.

use crate::error::{IngestError, IngestResult};
use crate::schema::{Row, Schema, TableIdentity};
use crate::store::TableStore;

/// Default number of rows buffered per bulk write.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Totals reported after draining one row stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStats {
    /// Rows written to the destination table.
    pub loaded: usize,
    /// Rows dropped because their field count did not match the schema.
    pub dropped: usize,
}

/// Stream all remaining rows (header already consumed) into `table`.
///
/// Rows whose field count does not match `schema.width()` are dropped and
/// counted, never aborting the file. A rejected flush aborts the remaining
/// stream with [`IngestError::Load`], which records how many rows were
/// already committed.
///
/// # Panics
///
/// Panics if `batch_size == 0`.
pub fn load_rows<S, I>(
    store: &mut S,
    table: &TableIdentity,
    schema: &Schema,
    rows: I,
    batch_size: usize,
) -> IngestResult<LoadStats>
where
    S: TableStore + ?Sized,
    I: IntoIterator<Item = IngestResult<Row>>,
{
    assert!(batch_size > 0, "batch_size must be > 0");

    let width = schema.width();
    let mut batch: Vec<Row> = Vec::with_capacity(batch_size);
    let mut stats = LoadStats::default();

    for row in rows {
        let row = row?;
        if row.len() != width {
            stats.dropped += 1;
            continue;
        }
        batch.push(row);
        if batch.len() == batch_size {
            flush(store, table, schema, &mut batch, &mut stats)?;
        }
    }
    if !batch.is_empty() {
        flush(store, table, schema, &mut batch, &mut stats)?;
    }

    Ok(stats)
}

fn flush<S: TableStore + ?Sized>(
    store: &mut S,
    table: &TableIdentity,
    schema: &Schema,
    batch: &mut Vec<Row>,
    stats: &mut LoadStats,
) -> IngestResult<()> {
    store
        .bulk_insert(table, schema, batch)
        .map_err(|source| IngestError::Load {
            table: table.as_str().to_string(),
            loaded: stats.loaded,
            source,
        })?;
    stats.loaded += batch.len();
    batch.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::schema::SourceKind;

    #[derive(Default)]
    struct RecordingStore {
        batches: Vec<usize>,
    }

    impl TableStore for RecordingStore {
        fn drop_table_if_exists(&mut self, _table: &TableIdentity) -> Result<(), StoreError> {
            Ok(())
        }

        fn create_table(&mut self, _table: &TableIdentity, _schema: &Schema) -> Result<(), StoreError> {
            Ok(())
        }

        fn bulk_insert(
            &mut self,
            _table: &TableIdentity,
            _schema: &Schema,
            rows: &[Row],
        ) -> Result<(), StoreError> {
            self.batches.push(rows.len());
            Ok(())
        }
    }

    fn two_column_schema() -> Schema {
        Schema::from_header(&["a".to_string(), "b".to_string()]).unwrap()
    }

    fn data_rows(n: usize) -> Vec<IngestResult<Row>> {
        (0..n)
            .map(|i| Ok(vec![i.to_string(), "x".to_string()]))
            .collect()
    }

    #[test]
    fn shape_mismatch_rows_are_dropped_and_counted() {
        let mut store = RecordingStore::default();
        let table = TableIdentity::derive("t.csv", SourceKind::DelimitedText);
        let schema = two_column_schema();

        let rows = vec![
            Ok(vec!["1".to_string(), "x".to_string()]),
            Ok(vec!["short".to_string()]),
            Ok(vec!["2".to_string(), "y".to_string()]),
        ];
        let stats = load_rows(&mut store, &table, &schema, rows, 10).unwrap();
        assert_eq!(stats, LoadStats { loaded: 2, dropped: 1 });
        assert_eq!(store.batches, vec![2]);
    }

    #[test]
    fn exact_multiple_of_batch_size_flushes_full_batches_only() {
        let mut store = RecordingStore::default();
        let table = TableIdentity::derive("t.csv", SourceKind::DelimitedText);
        let schema = two_column_schema();

        let stats = load_rows(&mut store, &table, &schema, data_rows(8), 4).unwrap();
        assert_eq!(stats.loaded, 8);
        assert_eq!(store.batches, vec![4, 4]);
    }

    #[test]
    fn remainder_flushes_one_partial_batch() {
        let mut store = RecordingStore::default();
        let table = TableIdentity::derive("t.csv", SourceKind::DelimitedText);
        let schema = two_column_schema();

        let stats = load_rows(&mut store, &table, &schema, data_rows(9), 4).unwrap();
        assert_eq!(stats.loaded, 9);
        assert_eq!(store.batches, vec![4, 4, 1]);
    }

    #[test]
    fn empty_stream_loads_zero_rows_with_no_flush() {
        let mut store = RecordingStore::default();
        let table = TableIdentity::derive("t.csv", SourceKind::DelimitedText);
        let schema = two_column_schema();

        let stats = load_rows(&mut store, &table, &schema, data_rows(0), 4).unwrap();
        assert_eq!(stats, LoadStats::default());
        assert!(store.batches.is_empty());
    }
}
