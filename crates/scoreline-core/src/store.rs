// Read-only SQLite access behind the generic query interface.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Tables the aggregation layer reads. Provisioning them is somebody else's job.
pub const EXPECTED_TABLES: &[&str] = &[
    "sports",
    "tournaments",
    "teams",
    "players",
    "matches",
    "standings",
    "match_stats",
    "match_events",
    "lineups",
];

// ---------------------------------------------------------------------------
// Query interface
// ---------------------------------------------------------------------------

/// "Run a parameterized SELECT, get rows back."
///
/// Implementations prepare `sql`, bind `params` positionally (`?1`, `?2`, ...),
/// execute it and drain every row into owned values. `context` names the
/// calling operation and is attached to any `QueryFailed` error.
pub trait QueryInterface {
    fn select(&self, context: &'static str, sql: &str, params: &[Value]) -> Result<Vec<Row>>;

    /// Run a query and decode each row with `decode`.
    fn select_map<T, F>(
        &self,
        context: &'static str,
        sql: &str,
        params: &[Value],
        decode: F,
    ) -> Result<Vec<T>>
    where
        Self: Sized,
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        self.select(context, sql, params)?
            .iter()
            .map(decode)
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::query(context))
    }

    /// Run a query expected to yield at most one interesting row; extra rows
    /// are ignored.
    fn select_first<T, F>(
        &self,
        context: &'static str,
        sql: &str,
        params: &[Value],
        decode: F,
    ) -> Result<Option<T>>
    where
        Self: Sized,
        F: FnOnce(&Row) -> rusqlite::Result<T>,
    {
        match self.select(context, sql, params)?.first() {
            Some(row) => decode(row).map(Some).map_err(Error::query(context)),
            None => Ok(None),
        }
    }
}

/// One fetched row, detached from the statement that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert the cell at `idx` into a typed scalar.
    pub fn get<T: FromSql>(&self, idx: usize) -> rusqlite::Result<T> {
        let value = self
            .values
            .get(idx)
            .ok_or(rusqlite::Error::InvalidColumnIndex(idx))?;
        T::column_result(ValueRef::from(value)).map_err(|e| match e {
            FromSqlError::InvalidType => {
                rusqlite::Error::InvalidColumnType(idx, format!("#{idx}"), value.data_type())
            }
            other => rusqlite::Error::FromSqlConversionFailure(idx, value.data_type(), Box::new(other)),
        })
    }
}

/// Bind a calendar date the way the store keeps it (`YYYY-MM-DD` text).
pub fn date_param(date: NaiveDate) -> Value {
    Value::Text(date.format("%Y-%m-%d").to_string())
}

// ---------------------------------------------------------------------------
// SQLite implementation
// ---------------------------------------------------------------------------

/// The single store handle held for the session.
pub struct Database {
    conn: Mutex<Connection>,
    location: String,
}

impl Database {
    /// Open an existing SQLite file read-only. The file must already exist;
    /// any failure to reach it is `StoreUnavailable`.
    ///
    /// `busy_timeout` bounds how long a query waits on a locked database
    /// before failing with `QueryFailed`.
    pub fn open(path: &str, busy_timeout: Duration) -> Result<Self> {
        let unavailable = |source| Error::StoreUnavailable {
            path: path.to_string(),
            source,
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)?;

        conn.busy_timeout(busy_timeout).map_err(unavailable)?;

        // Opening is lazy; reading the schema proves the file is a database.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(unavailable)?;

        Ok(Self {
            conn: Mutex::new(conn),
            location: path.to_string(),
        })
    }

    /// Adopt an already-open connection (e.g. an in-memory store).
    pub fn from_connection(conn: Connection) -> Self {
        let location = conn
            .path()
            .filter(|p| !p.is_empty())
            .unwrap_or(":memory:")
            .to_string();
        Self {
            conn: Mutex::new(conn),
            location,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Lock the connection. Nothing here writes, so a poisoned lock still
    /// guards a consistent connection.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Tables from [`EXPECTED_TABLES`] that the store does not have. Views do
    /// not count: store order is read from `rowid`, which views lack.
    pub fn missing_tables(&self) -> Result<Vec<&'static str>> {
        let present = self.select_map(
            "missing_tables",
            "SELECT name FROM sqlite_master WHERE type = 'table'",
            &[],
            |row| row.get::<String>(0),
        )?;
        let missing: Vec<&'static str> = EXPECTED_TABLES
            .iter()
            .copied()
            .filter(|table| !present.iter().any(|p| p == table))
            .collect();
        if !missing.is_empty() {
            warn!(
                "store at {} is missing tables: {}",
                self.location,
                missing.join(", ")
            );
        }
        Ok(missing)
    }
}

impl QueryInterface for Database {
    fn select(&self, context: &'static str, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(sql).map_err(Error::query(context))?;
        let column_count = stmt.column_count();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(Error::query(context))?;

        let mut fetched = Vec::new();
        while let Some(row) = rows.next().map_err(Error::query(context))? {
            let values = (0..column_count)
                .map(|idx| row.get::<_, Value>(idx))
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::query(context))?;
            fetched.push(Row::new(values));
        }

        debug!(context, rows = fetched.len(), "query executed");
        Ok(fetched)
    }
}
