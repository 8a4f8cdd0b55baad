//! SQLite-backed [`TableStore`] implementation.

use std::path::Path;
use std::time::Duration;

use rusqlite::{params_from_iter, Connection};

use crate::error::StoreError;
use crate::schema::{Row, Schema, TableIdentity};

use super::TableStore;

/// Generous upper bound on a single batch flush while the database is locked
/// by another writer; past it, the store's busy error surfaces as a load
/// failure for the file.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite destination store.
///
/// Holds one connection for the lifetime of the value. SQLite connections are
/// not thread-safe; one ingestion run owns the store exclusively.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, rusqlite::Error> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, rusqlite::Error> {
        conn.busy_timeout(FLUSH_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Direct access to the underlying connection, for queries against loaded
    /// tables.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl TableStore for SqliteStore {
    fn drop_table_if_exists(&mut self, table: &TableIdentity) -> Result<(), StoreError> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table.as_str())))?;
        Ok(())
    }

    fn create_table(&mut self, table: &TableIdentity, schema: &Schema) -> Result<(), StoreError> {
        let columns = schema
            .column_names()
            .map(|name| format!("{} TEXT", quote_ident(name)))
            .collect::<Vec<_>>()
            .join(", ");
        self.conn.execute_batch(&format!(
            "CREATE TABLE {} ({columns})",
            quote_ident(table.as_str())
        ))?;
        Ok(())
    }

    fn bulk_insert(
        &mut self,
        table: &TableIdentity,
        schema: &Schema,
        rows: &[Row],
    ) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let placeholders = vec!["?"; schema.width()].join(", ");
        let sql = format!(
            "INSERT INTO {} VALUES ({placeholders})",
            quote_ident(table.as_str())
        );

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            for row in rows {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
