#![cfg(feature = "excel")]

//! Spreadsheet adapter built on `calamine`.
//!
//! Only the first worksheet is read. Every cell is stringified as-is (no
//! per-type reformatting); empty and missing cells become empty text fields.
//! `calamine` materializes the used range up front, so the stream here
//! iterates an in-memory range rather than the file itself.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{IngestError, IngestResult};
use crate::schema::Row;

use super::FieldErrorPolicy;

pub(crate) struct SheetRows {
    rows: std::vec::IntoIter<Vec<Data>>,
    field_errors: FieldErrorPolicy,
    row: usize,
}

pub(crate) fn open(path: &Path, field_errors: FieldErrorPolicy) -> IngestResult<SheetRows> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| IngestError::source_unreadable(path, e))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyHeader {
            message: format!("workbook has no sheets ({})", path.display()),
        })?;

    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| IngestError::source_unreadable(path, e))?;

    let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
    Ok(SheetRows {
        rows: rows.into_iter(),
        field_errors,
        row: 0,
    })
}

impl Iterator for SheetRows {
    type Item = IngestResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        let cells = self.rows.next()?;
        self.row += 1;

        let mut fields: Row = Vec::with_capacity(cells.len());
        for (column, cell) in cells.iter().enumerate() {
            match cell {
                Data::Empty => fields.push(String::new()),
                Data::String(s) => fields.push(s.clone()),
                Data::Error(e) => match self.field_errors {
                    FieldErrorPolicy::SubstituteEmpty => fields.push(String::new()),
                    FieldErrorPolicy::Propagate => {
                        return Some(Err(IngestError::FieldDecode {
                            row: self.row,
                            column,
                            message: format!("cell error: {e:?}"),
                        }));
                    }
                },
                other => fields.push(other.to_string()),
            }
        }
        Some(Ok(fields))
    }
}
