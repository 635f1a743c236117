//! # SQL Dialect Adapter
//!
//! Maps the generic record/migration contract used by the repositories onto
//! the SQL that libsql (SQLite) understands.
//!
//! ## Two Interfaces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Dialect Adapter                                     │
//! │                                                                         │
//! │  trait Dialect (sync, pure string work)                                │
//! │  ├── name()           "sqlite"                                         │
//! │  ├── data_type_of()   Bool→numeric Int→integer Float→real              │
//! │  │                    String→text Time→datetime Bytes→blob             │
//! │  ├── quote()          `identifier`                                     │
//! │  ├── bind_var()       ?                                                │
//! │  └── explain()        SQL with params inlined (for logs)               │
//! │                                                                         │
//! │  trait Migrator (async, talks to the store)                            │
//! │  ├── has_table()      sqlite_master  type='table'                      │
//! │  ├── has_column()     pragma_table_info (logical → column name first)  │
//! │  ├── has_index()      sqlite_master  type='index'                      │
//! │  ├── has_constraint() sqlite_master  type='index'                      │
//! │  ├── alter_column()   no-op, Ok      (engine can't ALTER COLUMN)       │
//! │  ├── create_constraint() no-op, Ok   (engine can't ADD CONSTRAINT)     │
//! │  ├── current_database() "main"                                         │
//! │  └── auto_migrate()   ensure-schema built from the checks above        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The adapter adds no failure modes: driver errors pass through as
//! [`DbError`](crate::DbError).

use async_trait::async_trait;
use libsql::Value;
use tracing::{debug, info};

use crate::error::DbResult;
use crate::executor::{text, Executor};
use crate::schema::{FieldDef, IndexDef, TableDef};

// =============================================================================
// Field Kinds
// =============================================================================

/// Logical type of a record field, independent of any SQL dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Time,
    Bytes,
}

// =============================================================================
// Dialect
// =============================================================================

/// SQL syntax of one backend.
pub trait Dialect: Send + Sync {
    /// Backend name.
    fn name(&self) -> &'static str;

    /// Column type used to store a field of the given kind.
    fn data_type_of(&self, kind: FieldKind) -> &'static str;

    /// Quotes an identifier (table, column or index name).
    fn quote(&self, ident: &str) -> String;

    /// Placeholder for the parameter at `position` (1-based).
    fn bind_var(&self, position: usize) -> String;

    /// Renders `sql` with its parameters inlined. For logging only.
    fn explain(&self, sql: &str, params: &[Value]) -> String;
}

/// The SQLite dialect spoken by libsql.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn data_type_of(&self, kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Bool => "numeric",
            FieldKind::Int | FieldKind::Uint => "integer",
            FieldKind::Float => "real",
            FieldKind::String => "text",
            FieldKind::Time => "datetime",
            FieldKind::Bytes => "blob",
        }
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn bind_var(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn explain(&self, sql: &str, params: &[Value]) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut params = params.iter();
        // Open quote character while inside a literal or quoted identifier.
        // A doubled quote ('it''s') closes and reopens, which lands in the
        // right state.
        let mut quote: Option<char> = None;
        for ch in sql.chars() {
            match (quote, ch) {
                (Some(open), c) if c == open => quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"' | '`') => quote = Some(ch),
                (None, '?') => {
                    if let Some(value) = params.next() {
                        out.push_str(&render_value(value));
                        continue;
                    }
                }
                (None, _) => {}
            }
            out.push(ch);
        }
        out
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        Value::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

// =============================================================================
// Migrator
// =============================================================================

/// Schema introspection and ensure-schema operations for one backend.
#[async_trait]
pub trait Migrator: Send + Sync {
    /// Name of the schema being migrated.
    fn current_database(&self) -> &str;

    async fn has_table(&self, table: &TableDef) -> DbResult<bool>;

    /// `field` may be a logical name (`MedicationID`) or a column name.
    async fn has_column(&self, table: &TableDef, field: &str) -> DbResult<bool>;

    async fn has_index(&self, table: &TableDef, index: &str) -> DbResult<bool>;

    async fn has_constraint(&self, table: &TableDef, constraint: &str) -> DbResult<bool>;

    /// Declared type of an existing column, lowercase. `None` if absent.
    async fn column_type(&self, table: &TableDef, column: &str) -> DbResult<Option<String>>;

    async fn create_table(&self, table: &TableDef) -> DbResult<()>;

    async fn add_column(&self, table: &TableDef, field: &FieldDef) -> DbResult<()>;

    async fn create_index(&self, table: &TableDef, index: &IndexDef) -> DbResult<()>;

    async fn alter_column(&self, table: &TableDef, field: &str) -> DbResult<()>;

    async fn create_constraint(&self, table: &TableDef, constraint: &str) -> DbResult<()>;

    /// Brings every table up to its declaration without dropping anything.
    ///
    /// ## Steps per table
    /// ```text
    /// has_table? ── no ──► create_table + create_index (all)
    ///     │
    ///    yes
    ///     ▼
    /// for each field:  has_column? no → add_column
    ///                  type differs?    → alter_column (no-op)
    /// for each FK:     has_constraint? no → create_constraint (no-op)
    /// for each index:  has_index? no → create_index
    /// ```
    async fn auto_migrate(&self, tables: &[&TableDef]) -> DbResult<()> {
        for table in tables {
            if !self.has_table(table).await? {
                info!(table = table.name, "Creating table");
                self.create_table(table).await?;
                for index in table.indexes {
                    self.create_index(table, index).await?;
                }
                continue;
            }

            for field in table.fields {
                match self.column_type(table, field.column).await? {
                    None => {
                        info!(table = table.name, column = field.column, "Adding missing column");
                        self.add_column(table, field).await?;
                    }
                    Some(existing) if !existing.eq_ignore_ascii_case(field.sql_type()) => {
                        debug!(
                            table = table.name,
                            column = field.column,
                            existing = %existing,
                            declared = field.sql_type(),
                            "Column type differs"
                        );
                        self.alter_column(table, field.name).await?;
                    }
                    Some(_) => {}
                }
            }

            for field in table.fields.iter().filter(|f| f.references.is_some()) {
                let name = table.foreign_key_name(field);
                if !self.has_constraint(table, &name).await? {
                    self.create_constraint(table, &name).await?;
                }
            }

            for index in table.indexes {
                if !self.has_index(table, index.name).await? {
                    info!(table = table.name, index = index.name, "Creating missing index");
                    self.create_index(table, index).await?;
                }
            }
        }
        Ok(())
    }
}

/// [`Migrator`] for SQLite/libsql.
pub struct SqliteMigrator<'a> {
    executor: &'a Executor,
    dialect: SqliteDialect,
}

impl<'a> SqliteMigrator<'a> {
    pub fn new(executor: &'a Executor) -> Self {
        SqliteMigrator {
            executor,
            dialect: SqliteDialect,
        }
    }

    fn column_definition(&self, field: &FieldDef) -> String {
        let mut def = format!(
            "{} {}",
            self.dialect.quote(field.column),
            self.dialect.data_type_of(field.kind)
        );
        if field.primary_key {
            def.push_str(" PRIMARY KEY AUTOINCREMENT");
        }
        if field.not_null && !field.primary_key {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = field.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }
}

#[async_trait]
impl Migrator for SqliteMigrator<'_> {
    fn current_database(&self) -> &str {
        "main"
    }

    async fn has_table(&self, table: &TableDef) -> DbResult<bool> {
        let count = self
            .executor
            .query_scalar(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name=?",
                vec![text(table.name)],
            )
            .await?;
        Ok(count > 0)
    }

    async fn has_column(&self, table: &TableDef, field: &str) -> DbResult<bool> {
        let column = table.lookup_field(field).map(|f| f.column).unwrap_or(field);
        if column.is_empty() {
            return Ok(false);
        }
        let count = self
            .executor
            .query_scalar(
                "SELECT count(*) FROM pragma_table_info(?) WHERE name = ?",
                vec![text(table.name), text(column)],
            )
            .await?;
        Ok(count > 0)
    }

    async fn has_index(&self, table: &TableDef, index: &str) -> DbResult<bool> {
        let count = self
            .executor
            .query_scalar(
                "SELECT count(*) FROM sqlite_master WHERE type='index' AND tbl_name=? AND name=?",
                vec![text(table.name), text(index)],
            )
            .await?;
        Ok(count > 0)
    }

    async fn has_constraint(&self, table: &TableDef, constraint: &str) -> DbResult<bool> {
        // SQLite keeps no catalog entry for FK/CHECK constraints; only the
        // index-backed ones (UNIQUE) are visible here.
        let count = self
            .executor
            .query_scalar(
                "SELECT count(*) FROM sqlite_master WHERE type='index' AND tbl_name=? AND name=?",
                vec![text(table.name), text(constraint)],
            )
            .await?;
        Ok(count > 0)
    }

    async fn column_type(&self, table: &TableDef, column: &str) -> DbResult<Option<String>> {
        let row = self
            .executor
            .query_one(
                "SELECT type FROM pragma_table_info(?) WHERE name = ?",
                vec![text(table.name), text(column)],
            )
            .await?;
        match row {
            Some(row) => Ok(Some(row.get::<String>("type")?.to_lowercase())),
            None => Ok(None),
        }
    }

    async fn create_table(&self, table: &TableDef) -> DbResult<()> {
        let mut parts: Vec<String> = table
            .fields
            .iter()
            .map(|f| self.column_definition(f))
            .collect();

        for field in table.fields {
            if let Some((ref_table, ref_column)) = field.references {
                parts.push(format!(
                    "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({})",
                    self.dialect.quote(&table.foreign_key_name(field)),
                    self.dialect.quote(field.column),
                    self.dialect.quote(ref_table),
                    self.dialect.quote(ref_column)
                ));
            }
        }

        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.dialect.quote(table.name),
            parts.join(", ")
        );
        self.executor.execute(&sql, Vec::new()).await?;
        Ok(())
    }

    async fn add_column(&self, table: &TableDef, field: &FieldDef) -> DbResult<()> {
        // ADD COLUMN cannot carry PRIMARY KEY, and NOT NULL needs a default.
        let mut def = format!(
            "{} {}",
            self.dialect.quote(field.column),
            self.dialect.data_type_of(field.kind)
        );
        match (field.not_null, field.default) {
            (_, Some(default)) => {
                if field.not_null {
                    def.push_str(" NOT NULL");
                }
                def.push_str(" DEFAULT ");
                def.push_str(default);
            }
            (true, None) => def.push_str(" NOT NULL DEFAULT ''"),
            (false, None) => {}
        }

        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.dialect.quote(table.name),
            def
        );
        self.executor.execute(&sql, Vec::new()).await?;
        Ok(())
    }

    async fn create_index(&self, table: &TableDef, index: &IndexDef) -> DbResult<()> {
        let columns: Vec<String> = index.columns.iter().map(|c| self.dialect.quote(c)).collect();
        let sql = format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
            if index.unique { "UNIQUE " } else { "" },
            self.dialect.quote(index.name),
            self.dialect.quote(table.name),
            columns.join(", ")
        );
        self.executor.execute(&sql, Vec::new()).await?;
        Ok(())
    }

    async fn alter_column(&self, table: &TableDef, field: &str) -> DbResult<()> {
        debug!(table = table.name, field, "ALTER COLUMN unsupported, skipping");
        Ok(())
    }

    async fn create_constraint(&self, table: &TableDef, constraint: &str) -> DbResult<()> {
        debug!(table = table.name, constraint, "ADD CONSTRAINT unsupported, skipping");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::schema::{MEDICATIONS, REMINDERS};

    #[test]
    fn test_dialect_surface() {
        let d = SqliteDialect;
        assert_eq!(d.name(), "sqlite");
        assert_eq!(d.data_type_of(FieldKind::Bool), "numeric");
        assert_eq!(d.data_type_of(FieldKind::Uint), "integer");
        assert_eq!(d.data_type_of(FieldKind::Float), "real");
        assert_eq!(d.data_type_of(FieldKind::String), "text");
        assert_eq!(d.data_type_of(FieldKind::Time), "datetime");
        assert_eq!(d.data_type_of(FieldKind::Bytes), "blob");
        assert_eq!(d.quote("medications"), "`medications`");
        assert_eq!(d.bind_var(3), "?");
    }

    #[test]
    fn test_explain_inlines_params() {
        let sql = SqliteDialect.explain(
            "SELECT * FROM t WHERE id = ? AND name = ?",
            &[Value::Integer(4), Value::Text("x".to_string())],
        );
        assert_eq!(sql, "SELECT * FROM t WHERE id = 4 AND name = \"x\"");
    }

    #[test]
    fn test_explain_leaves_quoted_question_marks() {
        let sql = SqliteDialect.explain(
            "SELECT 'why?', `odd?col`, 'it''s ?' FROM t WHERE id = ?",
            &[Value::Integer(7)],
        );
        assert_eq!(sql, "SELECT 'why?', `odd?col`, 'it''s ?' FROM t WHERE id = 7");
    }

    #[tokio::test]
    async fn test_introspection_after_migration() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let migrator = SqliteMigrator::new(db.executor());

        assert_eq!(migrator.current_database(), "main");
        assert!(migrator.has_table(&MEDICATIONS).await.unwrap());
        assert!(migrator.has_table(&REMINDERS).await.unwrap());

        // Logical field names resolve to their columns.
        assert!(migrator.has_column(&REMINDERS, "MedicationID").await.unwrap());
        assert!(migrator.has_column(&REMINDERS, "medication_id").await.unwrap());
        assert!(!migrator.has_column(&REMINDERS, "Nope").await.unwrap());

        assert!(migrator
            .has_index(&MEDICATIONS, "idx_medications_deleted_at")
            .await
            .unwrap());
        assert!(!migrator.has_index(&MEDICATIONS, "idx_missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_unsupported_operations_succeed() {
        let db = Database::open(DbConfig::in_memory()).await.unwrap();
        let migrator = SqliteMigrator::new(db.executor());

        assert!(migrator.alter_column(&MEDICATIONS, "Name").await.is_ok());
        assert!(migrator
            .create_constraint(&REMINDERS, "fk_medications_reminders")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_auto_migrate_adds_missing_column_and_index() {
        let db = Database::open(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();

        // An older layout: no description column, no index.
        db.executor()
            .execute(
                "CREATE TABLE medications (id integer PRIMARY KEY AUTOINCREMENT, name text NOT NULL, \
                 dosage text, created_at datetime, updated_at datetime, deleted_at datetime)",
                Vec::new(),
            )
            .await
            .unwrap();
        db.executor()
            .execute(
                "INSERT INTO medications (name, dosage) VALUES ('Old', '5mg')",
                Vec::new(),
            )
            .await
            .unwrap();

        let migrator = SqliteMigrator::new(db.executor());
        migrator.auto_migrate(&[&MEDICATIONS]).await.unwrap();

        assert!(migrator.has_column(&MEDICATIONS, "Description").await.unwrap());
        assert!(migrator
            .has_index(&MEDICATIONS, "idx_medications_deleted_at")
            .await
            .unwrap());

        let count = db
            .executor()
            .query_scalar("SELECT count(*) FROM medications WHERE name = 'Old'", Vec::new())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
