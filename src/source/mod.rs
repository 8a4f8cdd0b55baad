//! Source adapters: normalize delimited-text and spreadsheet files into an
//! ordered, forward-only sequence of text rows.
//!
//! [`open_source`] dispatches on [`SourceKind`] and returns a [`RowStream`]
//! whose first yielded element is always the header row. Encoding and
//! cell-formatting differences are hidden here; downstream code only ever
//! sees `Vec<String>` rows.

pub mod delimited;
#[cfg(feature = "excel")]
pub mod workbook;

use std::path::Path;

use crate::error::IngestResult;
use crate::schema::{Row, SourceKind};

/// What to do when a single field fails to decode.
///
/// Field-level failures are local: under the default policy the offending
/// field becomes an empty string and the row survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldErrorPolicy {
    /// Replace the offending field with an empty string and keep going.
    #[default]
    SubstituteEmpty,
    /// Surface the failure as [`crate::error::IngestError::FieldDecode`],
    /// failing the file.
    Propagate,
}

/// Lazy row sequence produced by a source adapter.
///
/// Consumed exactly once: the schema extractor takes the first row, the batch
/// loader drains the rest.
pub struct RowStream {
    inner: Inner,
}

enum Inner {
    Delimited(delimited::DelimitedRows),
    #[cfg(feature = "excel")]
    Workbook(workbook::SheetRows),
}

impl Iterator for RowStream {
    type Item = IngestResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Delimited(rows) => rows.next(),
            #[cfg(feature = "excel")]
            Inner::Workbook(rows) => rows.next(),
        }
    }
}

/// Open a source file as a row stream.
///
/// Fails with [`crate::error::IngestError::SourceUnreadable`] when the file
/// cannot be opened or parsed at the container level; this is fatal for the
/// file (but not for the run).
pub fn open_source(
    path: &Path,
    kind: SourceKind,
    delimiter: u8,
    field_errors: FieldErrorPolicy,
) -> IngestResult<RowStream> {
    let inner = match kind {
        SourceKind::DelimitedText => {
            Inner::Delimited(delimited::open(path, delimiter, field_errors)?)
        }
        SourceKind::Spreadsheet => {
            #[cfg(feature = "excel")]
            {
                Inner::Workbook(workbook::open(path, field_errors)?)
            }
            #[cfg(not(feature = "excel"))]
            {
                return Err(crate::error::IngestError::source_unreadable(
                    path,
                    "spreadsheet ingestion not enabled (enable cargo feature 'excel')",
                ));
            }
        }
    };
    Ok(RowStream { inner })
}
