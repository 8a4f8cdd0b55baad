//! Delimited-text adapter built on the `csv` crate.
//!
//! Quoting follows standard delimited-text rules: a field wrapped in quote
//! characters may contain the delimiter or doubled embedded quotes. The
//! reader is `flexible`, so ragged rows come through as rows; enforcing the
//! header's field count is the batch loader's job, not the adapter's.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, IngestResult};
use crate::schema::Row;

use super::FieldErrorPolicy;

pub(crate) struct DelimitedRows {
    records: csv::ByteRecordsIntoIter<File>,
    path: PathBuf,
    field_errors: FieldErrorPolicy,
    row: usize,
}

pub(crate) fn open(
    path: &Path,
    delimiter: u8,
    field_errors: FieldErrorPolicy,
) -> IngestResult<DelimitedRows> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestError::source_unreadable(path, e))?;

    Ok(DelimitedRows {
        records: reader.into_byte_records(),
        path: path.to_path_buf(),
        field_errors,
        row: 0,
    })
}

impl Iterator for DelimitedRows {
    type Item = IngestResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(IngestError::source_unreadable(&self.path, e))),
        };
        self.row += 1;

        // Byte records so that a bad-encoding field is a field-level failure,
        // not a record-level one.
        let mut fields: Row = Vec::with_capacity(record.len());
        for (column, raw) in record.iter().enumerate() {
            match std::str::from_utf8(raw) {
                Ok(s) => fields.push(s.to_string()),
                Err(e) => match self.field_errors {
                    FieldErrorPolicy::SubstituteEmpty => fields.push(String::new()),
                    FieldErrorPolicy::Propagate => {
                        return Some(Err(IngestError::FieldDecode {
                            row: self.row,
                            column,
                            message: e.to_string(),
                        }));
                    }
                },
            }
        }
        Some(Ok(fields))
    }
}
