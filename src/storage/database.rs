//! Shared SQLite connection handle

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::schema::initialize_schema;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Handle to the one connection backing a store
///
/// The connection is opened exactly once, when the handle is built, and every
/// clone shares it behind a mutex. Repositories receive a clone, so all of
/// them serialize against the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    identity: String,
}

impl Database {
    /// Opens (or creates) the database file and initializes the schema
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;
        tracing::debug!("Opened database {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            identity: path.display().to_string(),
        })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            identity: ":memory:".to_string(),
        })
    }

    /// The path (or `:memory:`) this handle was opened with
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Runs `f` with exclusive access to the connection
    pub fn with_conn<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        Ok(f(&conn)?)
    }

    /// Applies a column-by-column update to one row
    ///
    /// Fails with `InvalidArgument` when `assignments` is empty and with
    /// `NotFound` when no row has the given id.
    pub(crate) fn update_row(
        &self,
        table: &'static str,
        entity: &'static str,
        id: i64,
        assignments: Assignments,
    ) -> StorageResult<()> {
        if assignments.is_empty() {
            return Err(StorageError::InvalidArgument(format!(
                "no fields to update provided for {} {}",
                entity, id
            )));
        }

        let set_clause = assignments
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            set_clause,
            assignments.columns.len() + 1
        );

        let mut values = assignments.values;
        values.push(Value::Integer(id));

        let changed = self.with_conn(|conn| conn.execute(&sql, params_from_iter(values.iter())))?;
        if changed == 0 {
            return Err(StorageError::NotFound { entity, id });
        }
        Ok(())
    }

    /// Deletes one row by id, returning whether a row existed
    pub(crate) fn delete_row(&self, table: &'static str, id: i64) -> StorageResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let changed = self.with_conn(|conn| conn.execute(&sql, [id]))?;
        Ok(changed > 0)
    }
}

/// Column assignments collected from a typed patch
#[derive(Debug, Default)]
pub(crate) struct Assignments {
    columns: Vec<&'static str>,
    values: Vec<Value>,
}

impl Assignments {
    pub(crate) fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        self.columns.push(column);
        self.values.push(value.into());
    }

    pub(crate) fn set_nullable<T: Into<Value>>(&mut self, column: &'static str, value: Option<T>) {
        match value {
            Some(v) => self.set(column, v),
            None => self.set(column, Value::Null),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
