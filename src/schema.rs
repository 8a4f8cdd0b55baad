//! Core data model: rows, columns, schemas, and destination table identities.
//!
//! A [`Schema`] is derived from the first row of a source file and fixes both
//! the destination table shape and the field alignment of every later [`Row`].
//! A [`TableIdentity`] is a pure function of the source file name and its
//! [`SourceKind`], so re-ingesting the same file always targets the same table.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{IngestError, IngestResult};

/// A single ingested row: one text field per column, positionally aligned
/// with the [`Schema`].
pub type Row = Vec<String>;

/// Characters that are unsafe inside a quoted SQL identifier (quotes and the
/// bracket delimiters some dialects use). Stripped from column and table names.
const RESERVED_IDENT_CHARS: &[char] = &['"', '\'', '`', '[', ']'];

/// Classification of a source file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Delimited text (CSV and friends).
    DelimitedText,
    /// Spreadsheet/workbook formats (`.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`).
    Spreadsheet,
}

impl SourceKind {
    /// Classify a file extension (case-insensitive). Unknown extensions return
    /// `None` and are skipped by the directory runner.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::DelimitedText),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    fn table_prefix(self) -> &'static str {
        match self {
            Self::DelimitedText => "csv_",
            Self::Spreadsheet => "excel_",
        }
    }
}

/// A destination column: the header cell as it appeared in the source, plus
/// the identifier-safe name used in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header cell text as read from the source.
    pub original: String,
    /// Sanitized, unique identifier used for the destination column.
    pub sanitized: String,
}

/// Ordered column descriptors for one ingestion run.
///
/// Sanitized names are unique within a schema and free of
/// quote/bracket characters, so the whole set can be quoted verbatim in DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of columns.
    pub columns: Vec<Column>,
}

impl Schema {
    /// Build a schema from the header row of a source file.
    ///
    /// Sanitization is deterministic and idempotent:
    ///
    /// - reserved characters are stripped and surrounding whitespace trimmed
    /// - a name that ends up empty becomes `column_<index>` (0-based)
    /// - a name that duplicates an earlier one gets a `_2`, `_3`, ... suffix
    ///
    /// Duplicate detection ignores ASCII case, since SQL identifiers are
    /// case-insensitive in the stores this crate targets.
    pub fn from_header(header: &[String]) -> IngestResult<Self> {
        if header.is_empty() {
            return Err(IngestError::EmptyHeader {
                message: "header row has zero columns".to_string(),
            });
        }

        let mut taken: HashSet<String> = HashSet::with_capacity(header.len());
        let mut columns = Vec::with_capacity(header.len());
        for (idx, original) in header.iter().enumerate() {
            let mut sanitized = strip_reserved(original).trim().to_string();
            if sanitized.is_empty() {
                sanitized = format!("column_{idx}");
            }
            if taken.contains(&sanitized.to_ascii_lowercase()) {
                let base = sanitized;
                let mut n = 2usize;
                sanitized = loop {
                    let candidate = format!("{base}_{n}");
                    if !taken.contains(&candidate.to_ascii_lowercase()) {
                        break candidate;
                    }
                    n += 1;
                };
            }
            taken.insert(sanitized.to_ascii_lowercase());
            columns.push(Column {
                original: original.clone(),
                sanitized,
            });
        }

        Ok(Self { columns })
    }

    /// Number of columns; every well-formed row has exactly this many fields.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Iterate sanitized column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.sanitized.as_str())
    }
}

/// Deterministic, sanitized name of the destination table for one source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdentity {
    name: String,
}

impl TableIdentity {
    /// Derive the table identity from a source path and kind.
    ///
    /// The name is the kind prefix (`csv_` or `excel_`) plus the file stem
    /// with spaces replaced by underscores and reserved characters stripped.
    /// Identical source file name and kind always yield the identical
    /// identity, which is what makes re-ingestion idempotent.
    pub fn derive(path: impl AsRef<Path>, kind: SourceKind) -> Self {
        let stem = path
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let mut cleaned = strip_reserved(&stem.replace(' ', "_"));
        if cleaned.is_empty() {
            cleaned = "table".to_string();
        }
        Self {
            name: format!("{}{}", kind.table_prefix(), cleaned),
        }
    }

    /// The table name as a plain string (already identifier-safe).
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

fn strip_reserved(s: &str) -> String {
    s.chars()
        .filter(|c| !RESERVED_IDENT_CHARS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sanitize_strips_reserved_characters() {
        let schema = Schema::from_header(&header(&["\"Trade Id\"", "[Symbol]"])).unwrap();
        let names: Vec<&str> = schema.column_names().collect();
        assert_eq!(names, vec!["Trade Id", "Symbol"]);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let first = Schema::from_header(&header(&["A", "A", "", "b]c"])).unwrap();
        let names: Vec<String> = first.column_names().map(str::to_string).collect();
        let second = Schema::from_header(&names).unwrap();
        let renamed: Vec<&str> = second.column_names().collect();
        assert_eq!(names, renamed);
    }

    #[test]
    fn duplicate_names_get_numeric_suffixes() {
        let schema = Schema::from_header(&header(&["A", "A", "a"])).unwrap();
        let names: Vec<&str> = schema.column_names().collect();
        assert_eq!(names, vec!["A", "A_2", "a_3"]);
    }

    #[test]
    fn empty_names_get_positional_placeholders() {
        let schema = Schema::from_header(&header(&["", "x", "\"\""])).unwrap();
        let names: Vec<&str> = schema.column_names().collect();
        assert_eq!(names, vec!["column_0", "x", "column_2"]);
    }

    #[test]
    fn zero_column_header_is_empty_header() {
        let err = Schema::from_header(&[]).unwrap_err();
        assert!(matches!(err, IngestError::EmptyHeader { .. }));
    }

    #[test]
    fn table_identity_is_deterministic() {
        let a = TableIdentity::derive("in/Daily Trades.csv", SourceKind::DelimitedText);
        let b = TableIdentity::derive("other/Daily Trades.csv", SourceKind::DelimitedText);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "csv_Daily_Trades");
    }

    #[test]
    fn table_identity_prefix_distinguishes_kinds() {
        let csv = TableIdentity::derive("book.csv", SourceKind::DelimitedText);
        let xlsx = TableIdentity::derive("book.xlsx", SourceKind::Spreadsheet);
        assert_eq!(csv.as_str(), "csv_book");
        assert_eq!(xlsx.as_str(), "excel_book");
    }

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(SourceKind::from_extension("CSV"), Some(SourceKind::DelimitedText));
        assert_eq!(SourceKind::from_extension("XlSx"), Some(SourceKind::Spreadsheet));
        assert_eq!(SourceKind::from_extension("parquet"), None);
    }
}
