//! # Table Declarations
//!
//! Static description of the persisted layout. The migrator builds and
//! checks tables from these; repositories follow the same column names.
//!
//! ```text
//! medications                         reminders
//! ───────────────────────────         ─────────────────────────────────
//! id          integer PK              id            integer PK
//! created_at  datetime                created_at    datetime
//! updated_at  datetime                updated_at    datetime
//! deleted_at  datetime (indexed)      deleted_at    datetime (indexed)
//! name        text NOT NULL           medication_id integer NOT NULL ──► medications.id
//! dosage      text                    time          text NOT NULL
//! description text                    days          text
//!                                     is_active     numeric DEFAULT 1
//! ```

use crate::dialect::{Dialect, FieldKind, SqliteDialect};

/// One column of a table.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    /// Logical field name, as the record type names it (`MedicationID`).
    pub name: &'static str,
    /// Column name in the store (`medication_id`).
    pub column: &'static str,
    pub kind: FieldKind,
    pub primary_key: bool,
    pub not_null: bool,
    /// SQL literal used as the column default.
    pub default: Option<&'static str>,
    /// `(table, column)` this field points at.
    pub references: Option<(&'static str, &'static str)>,
}

impl FieldDef {
    const fn new(name: &'static str, column: &'static str, kind: FieldKind) -> Self {
        FieldDef {
            name,
            column,
            kind,
            primary_key: false,
            not_null: false,
            default: None,
            references: None,
        }
    }

    const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    const fn default(mut self, literal: &'static str) -> Self {
        self.default = Some(literal);
        self
    }

    const fn references(mut self, table: &'static str, column: &'static str) -> Self {
        self.references = Some((table, column));
        self
    }

    /// Declared column type.
    pub fn sql_type(&self) -> &'static str {
        SqliteDialect.data_type_of(self.kind)
    }
}

/// A secondary index.
#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

/// A table and everything the migrator needs to create it.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
    pub indexes: &'static [IndexDef],
}

impl TableDef {
    /// Finds a field by logical name or column name.
    pub fn lookup_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields
            .iter()
            .find(|f| f.name == name || f.column == name)
    }

    /// Name of the foreign key carried by `field`: `fk_<parent>_<child>`.
    pub fn foreign_key_name(&self, field: &FieldDef) -> String {
        match field.references {
            Some((parent, _)) => format!("fk_{}_{}", parent, self.name),
            None => format!("fk_{}_{}", self.name, field.column),
        }
    }
}

const TIMESTAMP_FIELDS: [FieldDef; 3] = [
    FieldDef::new("CreatedAt", "created_at", FieldKind::Time),
    FieldDef::new("UpdatedAt", "updated_at", FieldKind::Time),
    FieldDef::new("DeletedAt", "deleted_at", FieldKind::Time),
];

pub const MEDICATIONS: TableDef = TableDef {
    name: "medications",
    fields: &[
        FieldDef::new("ID", "id", FieldKind::Uint).primary_key(),
        TIMESTAMP_FIELDS[0],
        TIMESTAMP_FIELDS[1],
        TIMESTAMP_FIELDS[2],
        FieldDef::new("Name", "name", FieldKind::String).not_null(),
        FieldDef::new("Dosage", "dosage", FieldKind::String),
        FieldDef::new("Description", "description", FieldKind::String),
    ],
    indexes: &[IndexDef {
        name: "idx_medications_deleted_at",
        columns: &["deleted_at"],
        unique: false,
    }],
};

pub const REMINDERS: TableDef = TableDef {
    name: "reminders",
    fields: &[
        FieldDef::new("ID", "id", FieldKind::Uint).primary_key(),
        TIMESTAMP_FIELDS[0],
        TIMESTAMP_FIELDS[1],
        TIMESTAMP_FIELDS[2],
        FieldDef::new("MedicationID", "medication_id", FieldKind::Uint)
            .not_null()
            .references("medications", "id"),
        FieldDef::new("Time", "time", FieldKind::String).not_null(),
        FieldDef::new("Days", "days", FieldKind::String),
        FieldDef::new("IsActive", "is_active", FieldKind::Bool).default("1"),
    ],
    indexes: &[IndexDef {
        name: "idx_reminders_deleted_at",
        columns: &["deleted_at"],
        unique: false,
    }],
};

/// Every table, parents first.
pub const ALL_TABLES: [&TableDef; 2] = [&MEDICATIONS, &REMINDERS];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_logical_or_column_name() {
        assert_eq!(
            REMINDERS.lookup_field("MedicationID").map(|f| f.column),
            Some("medication_id")
        );
        assert_eq!(
            REMINDERS.lookup_field("medication_id").map(|f| f.name),
            Some("MedicationID")
        );
        assert!(REMINDERS.lookup_field("Missing").is_none());
    }

    #[test]
    fn test_foreign_key_name() {
        let field = REMINDERS.lookup_field("MedicationID").unwrap();
        assert_eq!(REMINDERS.foreign_key_name(field), "fk_medications_reminders");
    }
}
