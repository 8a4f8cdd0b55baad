use std::fs;
use std::io;
use std::path::PathBuf;

use tabular_sql_ingest::error::{IngestError, StoreError};
use tabular_sql_ingest::pipeline::{ingest_file, FileOutcome, IngestOptions};
use tabular_sql_ingest::schema::{Row, Schema, SourceKind, TableIdentity};
use tabular_sql_ingest::store::{SqliteStore, TableStore};

fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Store that fails a chosen operation, delegating everything else to SQLite.
struct FaultyStore {
    inner: SqliteStore,
    fail_create: bool,
    /// Fail the nth bulk_insert call (1-based), if set.
    fail_insert_at: Option<usize>,
    insert_calls: usize,
}

impl FaultyStore {
    fn new(fail_create: bool, fail_insert_at: Option<usize>) -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            fail_create,
            fail_insert_at,
            insert_calls: 0,
        }
    }
}

impl TableStore for FaultyStore {
    fn drop_table_if_exists(&mut self, table: &TableIdentity) -> Result<(), StoreError> {
        self.inner.drop_table_if_exists(table)
    }

    fn create_table(&mut self, table: &TableIdentity, schema: &Schema) -> Result<(), StoreError> {
        if self.fail_create {
            return Err(Box::new(io::Error::other("create rejected")));
        }
        self.inner.create_table(table, schema)
    }

    fn bulk_insert(
        &mut self,
        table: &TableIdentity,
        schema: &Schema,
        rows: &[Row],
    ) -> Result<(), StoreError> {
        self.insert_calls += 1;
        if self.fail_insert_at == Some(self.insert_calls) {
            return Err(Box::new(io::Error::other("connection lost mid-batch")));
        }
        self.inner.bulk_insert(table, schema, rows)
    }
}

#[test]
fn rejected_create_fails_the_file_with_provisioning_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "t.csv", "a,b\n1,2\n");

    let mut store = FaultyStore::new(true, None);
    let outcome = ingest_file(
        &mut store,
        &path,
        SourceKind::DelimitedText,
        &IngestOptions::default(),
    );

    match outcome {
        FileOutcome::Failed(IngestError::Provisioning { table, .. }) => {
            assert_eq!(table, "csv_t");
        }
        other => panic!("expected provisioning failure, got {other:?}"),
    }
}

#[test]
fn rejected_flush_aborts_the_file_and_reports_committed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "t.csv", "a,b\n1,2\n3,4\n5,6\n7,8\n9,0\n");

    let mut store = FaultyStore::new(false, Some(2));
    let options = IngestOptions {
        batch_size: 2,
        ..Default::default()
    };
    let outcome = ingest_file(&mut store, &path, SourceKind::DelimitedText, &options);

    match outcome {
        FileOutcome::Failed(IngestError::Load { table, loaded, .. }) => {
            assert_eq!(table, "csv_t");
            assert_eq!(loaded, 2);
        }
        other => panic!("expected load failure, got {other:?}"),
    }
    // No third flush after the abort.
    assert_eq!(store.insert_calls, 2);
}

#[test]
fn failed_load_leaves_the_provisioned_table_in_place() {
    // Documented accepted behavior: no rollback of the created table.
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "t.csv", "a,b\n1,2\n3,4\n5,6\n");

    let mut store = FaultyStore::new(false, Some(1));
    let options = IngestOptions {
        batch_size: 2,
        ..Default::default()
    };
    let outcome = ingest_file(&mut store, &path, SourceKind::DelimitedText, &options);
    assert!(matches!(outcome, FileOutcome::Failed(IngestError::Load { loaded: 0, .. })));

    let n: i64 = store
        .inner
        .connection()
        .query_row("SELECT COUNT(*) FROM \"csv_t\"", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}
