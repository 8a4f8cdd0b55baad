use std::fs;
use std::path::PathBuf;

use tabular_sql_ingest::error::IngestError;
use tabular_sql_ingest::pipeline::{ingest_file, FileOutcome, IngestOptions};
use tabular_sql_ingest::schema::SourceKind;
use tabular_sql_ingest::source::FieldErrorPolicy;
use tabular_sql_ingest::store::SqliteStore;

fn write_bad_utf8_csv(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("enc.csv");
    // Second data field is not valid UTF-8.
    fs::write(&path, b"a,b\nx,\xff\xfe\n").unwrap();
    path
}

#[test]
fn substitute_empty_keeps_the_row() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_bad_utf8_csv(&dir);

    let mut store = SqliteStore::open_in_memory().unwrap();
    let outcome = ingest_file(
        &mut store,
        &path,
        SourceKind::DelimitedText,
        &IngestOptions::default(),
    );

    assert!(matches!(outcome, FileOutcome::Loaded { rows: 1, dropped: 0 }));
    let b: String = store
        .connection()
        .query_row("SELECT \"b\" FROM \"csv_enc\"", [], |r| r.get(0))
        .unwrap();
    assert_eq!(b, "");
}

#[test]
fn propagate_fails_the_file_with_field_position() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_bad_utf8_csv(&dir);

    let mut store = SqliteStore::open_in_memory().unwrap();
    let options = IngestOptions {
        field_errors: FieldErrorPolicy::Propagate,
        ..Default::default()
    };
    let outcome = ingest_file(&mut store, &path, SourceKind::DelimitedText, &options);

    match outcome {
        FileOutcome::Failed(IngestError::FieldDecode { row, column, .. }) => {
            assert_eq!(row, 2);
            assert_eq!(column, 1);
        }
        other => panic!("expected field decode failure, got {other:?}"),
    }
}
