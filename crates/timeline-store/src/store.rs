use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::types::ValueRef;
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::value::{Record, Value};
use crate::{schema, seed};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected blob value in {table}.{column}")]
    UnexpectedBlob { table: String, column: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle to the one live embedded database.
///
/// Cloning shares the same connection; the handle is created once at
/// application start and passed to the data provider explicitly; there is
/// no global accessor.
#[derive(Debug, Clone)]
pub struct RecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl RecordStore {
    /// Open (or create) a file-backed database and bring its schema up to
    /// date. Safe to call on every startup.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        initialize(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_secs(5))?;
        initialize(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Idempotently (re-)create tables and run additive migrations.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        schema::init(&conn)?;
        Ok(())
    }

    pub fn insert(&self, table: &str, record: &Record) -> Result<()> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let columns = record.keys().map(String::as_str).collect::<Vec<_>>();
        let placeholders = (1..=columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );
        conn.execute(&sql, params_from_iter(record.values()))?;
        Ok(())
    }

    /// Update columns of the row matching `key_value`. An empty field set is
    /// a no-op. Returns the number of rows affected.
    pub fn update(
        &self,
        table: &str,
        key_field: &str,
        key_value: &str,
        record: &Record,
    ) -> Result<usize> {
        if record.is_empty() {
            return Ok(0);
        }
        let conn = self.conn.lock().expect("store mutex poisoned");
        let assignments = record
            .keys()
            .enumerate()
            .map(|(i, column)| format!("{column} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {assignments} WHERE {key_field} = ?{}",
            record.len() + 1
        );
        let mut values = record.values().cloned().collect::<Vec<_>>();
        values.push(Value::Text(key_value.to_string()));
        let affected = conn.execute(&sql, params_from_iter(values.iter()))?;
        Ok(affected)
    }

    /// Delete the row matching `key_value`. Returns the number of rows
    /// affected (zero when the row was already gone).
    pub fn delete(&self, table: &str, key_field: &str, key_value: &str) -> Result<usize> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        let sql = format!("DELETE FROM {table} WHERE {key_field} = ?1");
        let affected = conn.execute(&sql, [key_value])?;
        Ok(affected)
    }

    /// All rows of a table, in storage order. Querying a table that does not
    /// exist is a programming bug and surfaces as the SQLite error.
    pub fn list(&self, table: &str) -> Result<Vec<Record>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        collect_rows(&conn, table, &format!("SELECT * FROM {table}"), &[])
    }

    /// Rows of a table matching `predicate`, a SQL boolean expression over
    /// the table's columns with `?N` placeholders bound from `params`.
    /// Filtering happens inside SQLite, where the schema's indexes apply.
    /// Bound timestamps coerce to the same sortable text as on insert, so
    /// range predicates compare correctly.
    pub fn list_filtered(
        &self,
        table: &str,
        predicate: &str,
        params: &[Value],
    ) -> Result<Vec<Record>> {
        let conn = self.conn.lock().expect("store mutex poisoned");
        collect_rows(
            &conn,
            table,
            &format!("SELECT * FROM {table} WHERE {predicate}"),
            params,
        )
    }

    /// Serialize the entire database into one self-contained byte buffer.
    pub fn export_bytes(&self) -> Result<Vec<u8>> {
        let staging = NamedTempFile::new()?;
        {
            let conn = self.conn.lock().expect("store mutex poisoned");
            let mut dst = Connection::open(staging.path())?;
            let backup = Backup::new(&conn, &mut dst)?;
            backup.run_to_completion(64, Duration::from_millis(5), None)?;
        }
        let bytes = std::fs::read(staging.path())?;
        debug!(len = bytes.len(), "exported database image");
        Ok(bytes)
    }

    /// Atomically replace the live database with `bytes`.
    ///
    /// The backup API commits into the destination only on completion, so
    /// callers observe either the old or the fully-new state, never a mix.
    /// Invalid bytes fail the copy and leave the old state untouched.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<()> {
        let staging = NamedTempFile::new()?;
        std::fs::write(staging.path(), bytes)?;
        let src = Connection::open_with_flags(
            staging.path(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let mut conn = self.conn.lock().expect("store mutex poisoned");
        {
            let backup = Backup::new(&src, &mut conn)?;
            backup.run_to_completion(64, Duration::from_millis(5), None)?;
        }
        // Imported images may predate newer columns; migrate, never seed.
        schema::init(&conn)?;
        debug!(len = bytes.len(), "imported database image");
        Ok(())
    }
}

fn collect_rows(
    conn: &Connection,
    table: &str,
    sql: &str,
    params: &[Value],
) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(sql)?;
    let columns = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect::<Vec<_>>();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (index, column) in columns.iter().enumerate() {
            let value = match row.get_ref(index)? {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(v) => Value::Integer(v),
                ValueRef::Real(v) => Value::Real(v),
                ValueRef::Text(text) => {
                    Value::Text(String::from_utf8_lossy(text).into_owned())
                }
                ValueRef::Blob(_) => {
                    return Err(StoreError::UnexpectedBlob {
                        table: table.to_string(),
                        column: column.clone(),
                    })
                }
            };
            record.insert(column.clone(), value);
        }
        out.push(record);
    }
    Ok(out)
}

fn initialize(conn: &Connection) -> Result<()> {
    schema::init(conn)?;
    let equipment_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM equipment", [], |r| r.get(0))?;
    if equipment_count == 0 {
        seed::demo_data(conn)?;
    }
    Ok(())
}
