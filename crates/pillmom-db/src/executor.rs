//! # Statement Executor
//!
//! Thin layer over a `libsql::Connection` that every other module goes
//! through. It logs each statement with its parameters inlined, collects
//! rows into owned [`Row`]s and runs multi-statement writes atomically.
//!
//! ```text
//! Repository ──► Executor::query / execute / atomic ──► libsql::Connection
//!                   │
//!                   └── debug!(sql = Dialect::explain(..))
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use libsql::params::Params;
use libsql::{Connection, Value};
use tracing::{debug, warn};

use crate::dialect::{Dialect, SqliteDialect};
use crate::error::{DbError, DbResult};

// =============================================================================
// Rows
// =============================================================================

/// One result row, detached from the cursor.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Row {
    /// Reads a column by name.
    pub fn get<T: FromValue>(&self, column: &str) -> DbResult<T> {
        let index = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| DbError::decode(column, "no such column in result"))?;
        T::from_value(column, &self.values[index])
    }

    /// Reads a column by position.
    pub fn get_at<T: FromValue>(&self, index: usize) -> DbResult<T> {
        let column = self.columns.get(index).map(String::as_str).unwrap_or("?");
        let value = self
            .values
            .get(index)
            .ok_or_else(|| DbError::decode(column, "column index out of range"))?;
        T::from_value(column, value)
    }
}

/// Conversion from a stored value.
pub trait FromValue: Sized {
    fn from_value(column: &str, value: &Value) -> DbResult<Self>;
}

impl FromValue for i64 {
    fn from_value(column: &str, value: &Value) -> DbResult<Self> {
        match value {
            Value::Integer(i) => Ok(*i),
            other => Err(DbError::decode(column, format!("expected integer, got {:?}", other))),
        }
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: &Value) -> DbResult<Self> {
        match value {
            Value::Integer(i) => Ok(*i != 0),
            Value::Real(f) => Ok(*f != 0.0),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(DbError::decode(column, format!("expected boolean, got {:?}", other))),
        }
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: &Value) -> DbResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            // Optional text columns written by older clients may hold NULL.
            Value::Null => Ok(String::new()),
            other => Err(DbError::decode(column, format!("expected text, got {:?}", other))),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(column: &str, value: &Value) -> DbResult<Self> {
        match value {
            Value::Text(s) => {
                pillmom_core::parse_timestamp(s).map_err(|e| DbError::decode(column, e.to_string()))
            }
            Value::Integer(secs) => DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| DbError::decode(column, "timestamp out of range")),
            Value::Null => Ok(DateTime::default()),
            other => Err(DbError::decode(column, format!("expected timestamp, got {:?}", other))),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: &Value) -> DbResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

/// Conversion from a [`Row`] into a record.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> DbResult<Self>;
}

// =============================================================================
// Statements
// =============================================================================

/// A statement and its positional parameters.
#[derive(Debug, Clone)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
    /// Abort the batch if this statement touches no rows.
    pub required: bool,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Statement {
            sql: sql.into(),
            params,
            required: false,
        }
    }

    /// Marks the statement as required. See [`Executor::atomic`].
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

// =============================================================================
// Executor
// =============================================================================

/// Runs statements on one connection.
#[derive(Clone)]
pub struct Executor {
    conn: Connection,
    dialect: SqliteDialect,
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("dialect", &self.dialect.name())
            .finish()
    }
}

impl Executor {
    pub fn new(conn: Connection) -> Self {
        Executor {
            conn,
            dialect: SqliteDialect,
        }
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn dialect(&self) -> &SqliteDialect {
        &self.dialect
    }

    /// Executes one statement, returning the number of affected rows.
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> DbResult<u64> {
        debug!(sql = %self.dialect.explain(sql, &params), "execute");
        let affected = self.conn.execute(sql, Params::Positional(params)).await?;
        Ok(affected)
    }

    /// Runs a query and collects every row.
    pub async fn query(&self, sql: &str, params: Vec<Value>) -> DbResult<Vec<Row>> {
        debug!(sql = %self.dialect.explain(sql, &params), "query");
        collect_rows(&self.conn, sql, params).await
    }

    /// Runs a query and returns its first row, if any.
    pub async fn query_one(&self, sql: &str, params: Vec<Value>) -> DbResult<Option<Row>> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }

    /// Runs a query whose first column of the first row is an integer.
    pub async fn query_scalar(&self, sql: &str, params: Vec<Value>) -> DbResult<i64> {
        match self.query_one(sql, params).await? {
            Some(row) => row.get_at(0),
            None => Err(DbError::QueryFailed(format!("no row returned: {}", sql))),
        }
    }

    /// Queries and converts each row into `T`.
    pub async fn fetch_all<T: FromRow>(&self, sql: &str, params: Vec<Value>) -> DbResult<Vec<T>> {
        self.query(sql, params)
            .await?
            .iter()
            .map(T::from_row)
            .collect()
    }

    /// Queries and converts the first row into `T`.
    pub async fn fetch_optional<T: FromRow>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> DbResult<Option<T>> {
        match self.query_one(sql, params).await? {
            Some(row) => T::from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Executes statements in one transaction.
    ///
    /// Either all of them take effect or none do. Returns the affected-row
    /// count of each statement that ran.
    ///
    /// ## Required Statements
    /// ```text
    /// [UPDATE parent (required), UPDATE children]
    ///        │
    ///        ├── 0 rows → rollback, return [0]
    ///        └── n rows → continue, commit, return [n, m]
    /// ```
    pub async fn atomic(&self, statements: Vec<Statement>) -> DbResult<Vec<u64>> {
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut counts = Vec::with_capacity(statements.len());
        for stmt in statements {
            debug!(sql = %self.dialect.explain(&stmt.sql, &stmt.params), "execute (tx)");
            let result = tx.execute(&stmt.sql, Params::Positional(stmt.params)).await;
            let abort = match &result {
                Ok(n) => {
                    counts.push(*n);
                    stmt.required && *n == 0
                }
                Err(_) => true,
            };
            if abort {
                if let Err(rollback) = tx.rollback().await {
                    warn!(error = %rollback, "Rollback failed");
                }
                return result.map(|_| counts).map_err(DbError::from);
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        Ok(counts)
    }
}

async fn collect_rows(conn: &Connection, sql: &str, params: Vec<Value>) -> DbResult<Vec<Row>> {
    let mut rows = conn.query(sql, Params::Positional(params)).await?;

    let count = rows.column_count();
    let columns: Arc<Vec<String>> = Arc::new(
        (0..count)
            .map(|i| rows.column_name(i).unwrap_or_default().to_string())
            .collect(),
    );

    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..count {
            values.push(row.get_value(i)?);
        }
        out.push(Row {
            columns: Arc::clone(&columns),
            values,
        });
    }
    Ok(out)
}

/// Helpers for binding record fields.
pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn timestamp(ts: &DateTime<Utc>) -> Value {
    Value::Text(pillmom_core::format_timestamp(ts))
}
