//! # Schema Builder Module
//!
//! This module provides a fluent DDL builder (`Blueprint`) and its per-dialect
//! compiler (`SchemaGrammar`), mirroring the role [`crate::grammar::Grammar`]
//! plays for DML: dialect differences in column types, identifier quoting,
//! and constraint syntax live in one place instead of being inlined at call
//! sites. `Database::create_table::<T>()` remains the macro-driven fast path
//! for models; `Schema` is the hand-written path for tables and alterations
//! that don't correspond to a `#[derive(Model)]` struct, or that need
//! column/index operations the derive macro doesn't express (dropping a
//! column, renaming one, adding an index after the fact).
//!
//! ## Features
//!
//! - **Fluent column DSL**: `Blueprint::string`, `::integer`, `::foreign_id`,
//!   `::timestamps`, etc., each returning a `&mut ColumnDefinition` for
//!   further fluent modifiers (`.nullable()`, `.unique()`, `.default_value()`).
//! - **Per-dialect DDL**: `MySqlSchemaGrammar` / `PostgresSchemaGrammar` /
//!   `SqliteSchemaGrammar` compile a `Blueprint` into one or more SQL
//!   statements.
//! - **Introspection**: `has_table`, `has_column`, `column_listing` query
//!   each dialect's catalog.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bottle_orm::schema::Schema;
//!
//! Schema::create(&mut db, "posts", |table| {
//!     table.uuid("id").primary();
//!     table.foreign_id("user_id").constrained("users", "id").on_delete("CASCADE");
//!     table.string("title", Some(200));
//!     table.text("body");
//!     table.timestamps();
//! })
//! .await?;
//! ```

use std::sync::atomic::{AtomicU32, Ordering};

use heck::ToSnakeCase;

use crate::database::{Connection, Drivers};
use crate::Error;

// ============================================================================
// Default String Length
// ============================================================================

static DEFAULT_STRING_LENGTH: AtomicU32 = AtomicU32::new(255);

/// Sets the default `VARCHAR` length used by [`Blueprint::string`] calls that
/// don't specify one explicitly. Process-wide, matching the teacher's habit
/// of a single global default (useful for working around older MySQL's
/// 767-byte index key length limit by lowering it once at startup).
pub fn set_default_string_length(length: u32) {
    DEFAULT_STRING_LENGTH.store(length, Ordering::Relaxed);
}

fn default_string_length() -> u32 {
    DEFAULT_STRING_LENGTH.load(Ordering::Relaxed)
}

// ============================================================================
// Column Types
// ============================================================================

/// The type family of a column, dialect-independent; [`SchemaGrammar::column_type_sql`]
/// maps each variant to the concrete SQL type for its driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Increments,
    BigIncrements,
    Integer,
    BigInteger,
    SmallInteger,
    String(u32),
    Text,
    Boolean,
    Double,
    Float,
    Decimal(u8, u8),
    Uuid,
    Json,
    Date,
    Time,
    DateTime,
    Timestamp,
    Binary,
}

// ============================================================================
// Column Definition
// ============================================================================

/// One column of a [`Blueprint`], with the fluent modifiers Laravel-style
/// schema builders expose.
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub name: String,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub default: Option<String>,
    pub unsigned: bool,
    pub unique: bool,
    pub primary: bool,
    pub index: bool,
    pub comment: Option<String>,
    pub after: Option<String>,
    pub first: bool,
    pub change: bool,
    pub foreign: Option<ForeignKeyRef>,
}

/// A foreign key reference attached to a column via `foreign_id(...).constrained(...)`.
#[derive(Debug, Clone)]
pub struct ForeignKeyRef {
    pub ref_table: String,
    pub ref_column: String,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

impl ColumnDefinition {
    fn new(name: impl Into<String>, col_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            col_type,
            nullable: false,
            default: None,
            unsigned: false,
            unique: false,
            primary: false,
            index: false,
            comment: None,
            after: None,
            first: false,
            change: false,
            foreign: None,
        }
    }

    /// Marks the column as nullable.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Sets a literal SQL default expression.
    pub fn default_value(&mut self, expr: impl Into<String>) -> &mut Self {
        self.default = Some(expr.into());
        self
    }

    /// Marks the column `UNSIGNED` (MySQL/MariaDB only; ignored elsewhere).
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    /// Adds a `UNIQUE` constraint to the column.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Marks the column the table's primary key.
    pub fn primary(&mut self) -> &mut Self {
        self.primary = true;
        self
    }

    /// Requests an index on the column.
    pub fn index(&mut self) -> &mut Self {
        self.index = true;
        self
    }

    /// Sets a column comment (MySQL/PostgreSQL; ignored by SQLite).
    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.comment = Some(text.into());
        self
    }

    /// Positions the column after `other` on `ALTER TABLE ... ADD COLUMN` (MySQL only).
    pub fn after(&mut self, other: impl Into<String>) -> &mut Self {
        self.after = Some(other.into());
        self
    }

    /// Marks an add-column operation for alteration instead (`ALTER COLUMN` /
    /// `MODIFY COLUMN`). Rejected by SQLite — see [`SchemaGrammar::compile_change`].
    pub fn change(&mut self) -> &mut Self {
        self.change = true;
        self
    }

    /// Attaches a foreign key constraint referencing `ref_table.ref_column`.
    pub fn constrained(&mut self, ref_table: impl Into<String>, ref_column: impl Into<String>) -> &mut Self {
        self.foreign = Some(ForeignKeyRef {
            ref_table: ref_table.into(),
            ref_column: ref_column.into(),
            on_delete: None,
            on_update: None,
        });
        self
    }

    /// Sets the referential action for `ON DELETE` (requires [`ColumnDefinition::constrained`] first).
    pub fn on_delete(&mut self, action: impl Into<String>) -> &mut Self {
        if let Some(fk) = &mut self.foreign {
            fk.on_delete = Some(action.into());
        }
        self
    }

    /// Sets the referential action for `ON UPDATE` (requires [`ColumnDefinition::constrained`] first).
    pub fn on_update(&mut self, action: impl Into<String>) -> &mut Self {
        if let Some(fk) = &mut self.foreign {
            fk.on_update = Some(action.into());
        }
        self
    }
}

// ============================================================================
// Blueprint
// ============================================================================

/// A table's pending DDL, built up via the column helpers and compiled by a
/// [`SchemaGrammar`] into one or more SQL statements.
///
/// Invariant: a `Blueprint` is either "creating" (produced by
/// [`Schema::create`]) or "altering" (produced by [`Schema::table`]); the two
/// compile to different statement shapes (`CREATE TABLE` vs. a sequence of
/// `ALTER TABLE` statements).
#[derive(Debug)]
pub struct Blueprint {
    pub table: String,
    pub columns: Vec<ColumnDefinition>,
    pub drop_columns: Vec<String>,
    pub rename_columns: Vec<(String, String)>,
    pub indexes: Vec<IndexCommand>,
    pub creating: bool,
}

/// A standalone index command (for indexes added independently of a column
/// definition's `.index()`/`.unique()` modifiers, e.g. composite indexes).
#[derive(Debug, Clone)]
pub struct IndexCommand {
    pub columns: Vec<String>,
    pub name: String,
    pub unique: bool,
}

impl Blueprint {
    fn new(table: impl Into<String>, creating: bool) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            drop_columns: Vec::new(),
            rename_columns: Vec::new(),
            indexes: Vec::new(),
            creating,
        }
    }

    fn push(&mut self, def: ColumnDefinition) -> &mut ColumnDefinition {
        self.columns.push(def);
        self.columns.last_mut().expect("just pushed")
    }

    /// Adds an auto-incrementing `INTEGER PRIMARY KEY` column named `id`.
    pub fn id(&mut self) -> &mut ColumnDefinition {
        let mut def = ColumnDefinition::new("id", ColumnType::BigIncrements);
        def.primary = true;
        self.columns.push(def);
        self.columns.last_mut().expect("just pushed")
    }

    /// Adds a `VARCHAR(length)` column, defaulting to [`set_default_string_length`]'s value.
    pub fn string(&mut self, name: impl Into<String>, length: Option<u32>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::String(length.unwrap_or_else(default_string_length))))
    }

    /// Adds a `TEXT` column.
    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Text))
    }

    /// Adds an `INTEGER` column.
    pub fn integer(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Integer))
    }

    /// Adds a `BIGINT` column.
    pub fn big_integer(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::BigInteger))
    }

    /// Adds a `SMALLINT` column.
    pub fn small_integer(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::SmallInteger))
    }

    /// Adds a `BOOLEAN` column.
    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Boolean))
    }

    /// Adds a double-precision floating point column.
    pub fn double(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Double))
    }

    /// Adds a single-precision floating point column.
    pub fn float(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Float))
    }

    /// Adds a fixed-point `DECIMAL(precision, scale)` column.
    pub fn decimal(&mut self, name: impl Into<String>, precision: u8, scale: u8) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Decimal(precision, scale)))
    }

    /// Adds a `UUID` column (text-backed on SQLite/MySQL).
    pub fn uuid(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Uuid))
    }

    /// Adds a `JSON`/`JSONB` column.
    pub fn json(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Json))
    }

    /// Adds a `DATE` column.
    pub fn date(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Date))
    }

    /// Adds a `TIME` column.
    pub fn time(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Time))
    }

    /// Adds a timezone-naive `DATETIME`/`TIMESTAMP` column.
    pub fn datetime(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::DateTime))
    }

    /// Adds a timezone-aware `TIMESTAMPTZ` column.
    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Timestamp))
    }

    /// Adds a binary/blob column.
    pub fn binary(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        self.push(ColumnDefinition::new(name, ColumnType::Binary))
    }

    /// Adds `created_at`/`updated_at` nullable timestamp columns, the
    /// conventional pair Eloquent-style models expect.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    /// Adds a nullable `deleted_at` timestamp column for soft deletes.
    pub fn soft_deletes(&mut self) {
        self.timestamp("deleted_at").nullable();
    }

    /// Adds a foreign-key-shaped `{name}_id` column (unsigned big integer),
    /// to be paired with `.constrained(table, column)`.
    pub fn foreign_id(&mut self, name: impl Into<String>) -> &mut ColumnDefinition {
        let def = self.push(ColumnDefinition::new(name, ColumnType::BigInteger));
        def.unsigned = true;
        def
    }

    /// Marks an existing column for removal (alteration blueprints only).
    pub fn drop_column(&mut self, name: impl Into<String>) {
        self.drop_columns.push(name.into());
    }

    /// Marks an existing column for renaming (alteration blueprints only).
    pub fn rename_column(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.rename_columns.push((from.into(), to.into()));
    }

    /// Adds a standalone (possibly composite) index.
    pub fn index(&mut self, columns: &[&str]) {
        let name = format!("idx_{}_{}", self.table, columns.join("_"));
        self.indexes.push(IndexCommand { columns: columns.iter().map(|c| c.to_string()).collect(), name, unique: false });
    }

    /// Adds a standalone (possibly composite) unique index.
    pub fn unique(&mut self, columns: &[&str]) {
        let name = format!("uniq_{}_{}", self.table, columns.join("_"));
        self.indexes.push(IndexCommand { columns: columns.iter().map(|c| c.to_string()).collect(), name, unique: true });
    }
}

// ============================================================================
// SchemaGrammar Trait
// ============================================================================

/// Compiles a [`Blueprint`] into the SQL statements that create it, alter it,
/// or introspect it, for one dialect.
///
/// Mirrors [`crate::grammar::Grammar`]'s role for DML: the column-type
/// vocabulary, quoting, and constraint syntax differences between MySQL,
/// PostgreSQL, and SQLite all live behind this trait instead of inline
/// `match self.driver` branches in `Blueprint` itself.
pub trait SchemaGrammar {
    /// Quotes an identifier (table or column name) for this dialect.
    fn quote_ident(&self, ident: &str) -> String;

    /// Maps a [`ColumnType`] to this dialect's concrete SQL type.
    fn column_type_sql(&self, col_type: &ColumnType, unsigned: bool) -> String;

    /// Whether this dialect supports `ALTER TABLE ... ALTER/MODIFY COLUMN`
    /// (SQLite does not; altering a column there requires a table rebuild,
    /// which this schema builder does not attempt).
    fn supports_column_change(&self) -> bool;

    /// Compiles one column definition's fragment for `CREATE TABLE`.
    fn compile_column(&self, col: &ColumnDefinition) -> String {
        let mut sql = format!("{} {}", self.quote_ident(&col.name.to_snake_case()), self.column_type_sql(&col.col_type, col.unsigned));
        if col.primary {
            sql.push_str(" PRIMARY KEY");
        }
        if !col.nullable && !col.primary {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &col.default {
            sql.push_str(&format!(" DEFAULT {default}"));
        }
        if col.unique {
            sql.push_str(" UNIQUE");
        }
        sql
    }

    /// Compiles the `CREATE TABLE` statement plus any follow-on index/foreign
    /// key statements a `Blueprint` built with [`Blueprint::creating`] requires.
    fn compile_create(&self, bp: &Blueprint) -> Vec<String> {
        let mut column_defs: Vec<String> = bp.columns.iter().map(|c| self.compile_column(c)).collect();

        for col in &bp.columns {
            if let Some(fk) = &col.foreign {
                column_defs.push(self.compile_foreign_key(&col.name, fk));
            }
        }

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote_ident(&bp.table.to_snake_case()),
            column_defs.join(", ")
        )];

        for col in &bp.columns {
            if col.index || col.unique {
                statements.push(self.compile_index(&bp.table, std::slice::from_ref(&col.name), col.unique));
            }
        }
        for idx in &bp.indexes {
            let cols: Vec<&str> = idx.columns.iter().map(String::as_str).collect();
            statements.push(self.compile_index(&bp.table, &cols, idx.unique));
        }

        statements
    }

    /// Compiles one `FOREIGN KEY (...) REFERENCES ...` fragment.
    fn compile_foreign_key(&self, column: &str, fk: &ForeignKeyRef) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_ident(&column.to_snake_case()),
            self.quote_ident(&fk.ref_table.to_snake_case()),
            self.quote_ident(&fk.ref_column.to_snake_case()),
        );
        if let Some(action) = &fk.on_delete {
            sql.push_str(&format!(" ON DELETE {action}"));
        }
        if let Some(action) = &fk.on_update {
            sql.push_str(&format!(" ON UPDATE {action}"));
        }
        sql
    }

    /// Compiles a `CREATE [UNIQUE] INDEX` statement over `columns`.
    fn compile_index(&self, table: &str, columns: &[String], unique: bool) -> String {
        let kind = if unique { "UNIQUE INDEX" } else { "INDEX" };
        let name = format!("idx_{}_{}", table.to_snake_case(), columns.join("_"));
        let cols: Vec<String> = columns.iter().map(|c| self.quote_ident(&c.to_snake_case())).collect();
        format!(
            "CREATE {} IF NOT EXISTS {} ON {} ({})",
            kind,
            self.quote_ident(&name),
            self.quote_ident(&table.to_snake_case()),
            cols.join(", ")
        )
    }

    /// Compiles the `ALTER TABLE ... ADD COLUMN` statements for columns added
    /// to an existing table (a `Blueprint` built with [`Schema::table`] whose
    /// columns are not marked `.change()`).
    fn compile_add(&self, bp: &Blueprint) -> Vec<String> {
        bp.columns
            .iter()
            .filter(|c| !c.change)
            .map(|c| {
                let mut sql =
                    format!("ALTER TABLE {} ADD COLUMN {}", self.quote_ident(&bp.table.to_snake_case()), self.compile_column(c));
                if let Some(after) = &c.after {
                    sql.push_str(&format!(" AFTER {}", self.quote_ident(&after.to_snake_case())));
                }
                sql
            })
            .collect()
    }

    /// Compiles `ALTER COLUMN`/`MODIFY COLUMN` statements for columns marked
    /// `.change()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFeature`] when [`SchemaGrammar::supports_column_change`]
    /// is `false` (SQLite).
    fn compile_change(&self, bp: &Blueprint) -> Result<Vec<String>, Error> {
        let changed: Vec<&ColumnDefinition> = bp.columns.iter().filter(|c| c.change).collect();
        if changed.is_empty() {
            return Ok(Vec::new());
        }
        if !self.supports_column_change() {
            return Err(Error::unsupported_feature(
                "SQLite does not support altering an existing column in place; rebuild the table instead",
            ));
        }
        Ok(changed.iter().map(|c| self.compile_change_one(&bp.table, c)).collect())
    }

    /// Compiles a single column alteration statement. Dialect-specific
    /// because MySQL uses `MODIFY COLUMN` while PostgreSQL uses
    /// `ALTER COLUMN ... TYPE`.
    fn compile_change_one(&self, table: &str, col: &ColumnDefinition) -> String;

    /// Compiles `ALTER TABLE ... DROP COLUMN` statements.
    fn compile_drop_columns(&self, bp: &Blueprint) -> Vec<String> {
        bp.drop_columns
            .iter()
            .map(|name| {
                format!(
                    "ALTER TABLE {} DROP COLUMN {}",
                    self.quote_ident(&bp.table.to_snake_case()),
                    self.quote_ident(&name.to_snake_case())
                )
            })
            .collect()
    }

    /// Compiles `ALTER TABLE ... RENAME COLUMN` statements.
    fn compile_rename_columns(&self, bp: &Blueprint) -> Vec<String> {
        bp.rename_columns
            .iter()
            .map(|(from, to)| {
                format!(
                    "ALTER TABLE {} RENAME COLUMN {} TO {}",
                    self.quote_ident(&bp.table.to_snake_case()),
                    self.quote_ident(&from.to_snake_case()),
                    self.quote_ident(&to.to_snake_case())
                )
            })
            .collect()
    }

    /// Compiles a `DROP TABLE IF EXISTS` statement.
    fn compile_drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.quote_ident(&table.to_snake_case()))
    }

    /// Compiles the query used by [`Schema::has_table`] for this dialect.
    fn compile_has_table(&self, table: &str) -> (String, Vec<String>);

    /// Compiles the query used by [`Schema::column_listing`] for this dialect.
    fn compile_column_listing(&self, table: &str) -> (String, Vec<String>);
}

// ============================================================================
// MySQL Schema Grammar
// ============================================================================

pub struct MySqlSchemaGrammar;

impl SchemaGrammar for MySqlSchemaGrammar {
    fn quote_ident(&self, ident: &str) -> String {
        format!("`{ident}`")
    }

    fn column_type_sql(&self, col_type: &ColumnType, unsigned: bool) -> String {
        let base = match col_type {
            ColumnType::Increments => "INTEGER AUTO_INCREMENT".to_string(),
            ColumnType::BigIncrements => "BIGINT AUTO_INCREMENT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::String(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Decimal(p, s) => format!("DECIMAL({p},{s})"),
            ColumnType::Uuid => "CHAR(36)".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
        };
        if unsigned && matches!(col_type, ColumnType::Integer | ColumnType::BigInteger | ColumnType::SmallInteger) {
            format!("{base} UNSIGNED")
        } else {
            base
        }
    }

    fn supports_column_change(&self) -> bool {
        true
    }

    fn compile_change_one(&self, table: &str, col: &ColumnDefinition) -> String {
        format!(
            "ALTER TABLE {} MODIFY COLUMN {}",
            self.quote_ident(&table.to_snake_case()),
            self.compile_column(col)
        )
    }

    fn compile_has_table(&self, table: &str) -> (String, Vec<String>) {
        (
            "SELECT count(*) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?".to_string(),
            vec![table.to_snake_case()],
        )
    }

    fn compile_column_listing(&self, table: &str) -> (String, Vec<String>) {
        (
            "SELECT column_name AS column_name FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ?"
                .to_string(),
            vec![table.to_snake_case()],
        )
    }
}

// ============================================================================
// PostgreSQL Schema Grammar
// ============================================================================

pub struct PostgresSchemaGrammar;

impl SchemaGrammar for PostgresSchemaGrammar {
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }

    fn column_type_sql(&self, col_type: &ColumnType, _unsigned: bool) -> String {
        match col_type {
            ColumnType::Increments => "SERIAL".to_string(),
            ColumnType::BigIncrements => "BIGSERIAL".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::String(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Decimal(p, s) => format!("DECIMAL({p},{s})"),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Json => "JSONB".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "TIMESTAMP".to_string(),
            ColumnType::Timestamp => "TIMESTAMPTZ".to_string(),
            ColumnType::Binary => "BYTEA".to_string(),
        }
    }

    fn supports_column_change(&self) -> bool {
        true
    }

    fn compile_change_one(&self, table: &str, col: &ColumnDefinition) -> String {
        let ident = self.quote_ident(&col.name.to_snake_case());
        let type_sql = self.column_type_sql(&col.col_type, col.unsigned);
        let mut stmts = vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.quote_ident(&table.to_snake_case()),
            ident,
            type_sql
        )];
        if col.nullable {
            stmts.push(format!("ALTER TABLE {} ALTER COLUMN {} DROP NOT NULL", self.quote_ident(&table.to_snake_case()), ident));
        } else {
            stmts.push(format!("ALTER TABLE {} ALTER COLUMN {} SET NOT NULL", self.quote_ident(&table.to_snake_case()), ident));
        }
        stmts.join("; ")
    }

    fn compile_has_table(&self, table: &str) -> (String, Vec<String>) {
        (
            "SELECT count(*) FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = $1"
                .to_string(),
            vec![table.to_snake_case()],
        )
    }

    fn compile_column_listing(&self, table: &str) -> (String, Vec<String>) {
        (
            "SELECT column_name AS column_name FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1"
                .to_string(),
            vec![table.to_snake_case()],
        )
    }
}

// ============================================================================
// SQLite Schema Grammar
// ============================================================================

pub struct SqliteSchemaGrammar;

impl SchemaGrammar for SqliteSchemaGrammar {
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{ident}\"")
    }

    fn column_type_sql(&self, col_type: &ColumnType, _unsigned: bool) -> String {
        match col_type {
            ColumnType::Increments | ColumnType::BigIncrements => "INTEGER".to_string(),
            ColumnType::Integer | ColumnType::BigInteger | ColumnType::SmallInteger => "INTEGER".to_string(),
            ColumnType::String(len) => format!("VARCHAR({len})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Double | ColumnType::Float => "REAL".to_string(),
            ColumnType::Decimal(p, s) => format!("DECIMAL({p},{s})"),
            ColumnType::Uuid => "TEXT".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
        }
    }

    fn supports_column_change(&self) -> bool {
        false
    }

    fn compile_change_one(&self, _table: &str, col: &ColumnDefinition) -> String {
        // Unreachable: compile_change errors out for SQLite before calling this.
        unreachable!("SQLite column change for '{}' should have been rejected already", col.name)
    }

    fn compile_has_table(&self, table: &str) -> (String, Vec<String>) {
        ("SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?".to_string(), vec![table.to_snake_case()])
    }

    fn compile_column_listing(&self, table: &str) -> (String, Vec<String>) {
        // SQLite's PRAGMA statements can't be parameter-bound; the table name
        // is interpolated directly after being snake_cased (never user input
        // from untrusted sources — model/table names come from Rust source).
        (format!("SELECT name AS column_name FROM pragma_table_info('{}')", table.to_snake_case()), Vec::new())
    }
}

/// Returns the [`SchemaGrammar`] implementation for a driver.
pub fn schema_grammar_for(driver: Drivers) -> Box<dyn SchemaGrammar> {
    match driver {
        Drivers::MySQL => Box::new(MySqlSchemaGrammar),
        Drivers::Postgres => Box::new(PostgresSchemaGrammar),
        Drivers::SQLite => Box::new(SqliteSchemaGrammar),
    }
}

// ============================================================================
// Schema Facade
// ============================================================================

/// Entry point for DDL operations: table creation, alteration, dropping, and
/// introspection, driven by a [`Blueprint`] closure and executed against any
/// [`Connection`] (a `Database` or a `Transaction`).
pub struct Schema;

impl Schema {
    /// Builds and executes a `CREATE TABLE` (plus any index/foreign-key
    /// follow-on statements) for `table`, as described by `build`.
    pub async fn create<C, F>(conn: &mut C, table: &str, build: F) -> Result<(), Error>
    where
        C: Connection + Send,
        F: FnOnce(&mut Blueprint),
    {
        let mut bp = Blueprint::new(table, true);
        build(&mut bp);
        let grammar = schema_grammar_for(conn.driver());
        for stmt in grammar.compile_create(&bp) {
            sqlx::query(&stmt).execute(conn.executor()).await?;
        }
        Ok(())
    }

    /// Builds and executes the `ALTER TABLE` statements needed to apply the
    /// additions/changes/drops/renames described by `build` to an existing
    /// `table`.
    pub async fn table<C, F>(conn: &mut C, table: &str, build: F) -> Result<(), Error>
    where
        C: Connection + Send,
        F: FnOnce(&mut Blueprint),
    {
        let mut bp = Blueprint::new(table, false);
        build(&mut bp);
        let grammar = schema_grammar_for(conn.driver());

        for stmt in grammar.compile_add(&bp) {
            sqlx::query(&stmt).execute(conn.executor()).await?;
        }
        for stmt in grammar.compile_change(&bp)? {
            sqlx::query(&stmt).execute(conn.executor()).await?;
        }
        for stmt in grammar.compile_rename_columns(&bp) {
            sqlx::query(&stmt).execute(conn.executor()).await?;
        }
        for stmt in grammar.compile_drop_columns(&bp) {
            sqlx::query(&stmt).execute(conn.executor()).await?;
        }
        for idx in &bp.indexes {
            let cols: Vec<String> = idx.columns.clone();
            let stmt = grammar.compile_index(&bp.table, &cols, idx.unique);
            sqlx::query(&stmt).execute(conn.executor()).await?;
        }
        Ok(())
    }

    /// Drops `table` if it exists.
    pub async fn drop<C: Connection + Send>(conn: &mut C, table: &str) -> Result<(), Error> {
        let grammar = schema_grammar_for(conn.driver());
        sqlx::query(&grammar.compile_drop_table(table)).execute(conn.executor()).await?;
        Ok(())
    }

    /// Reports whether `table` exists.
    pub async fn has_table<C: Connection + Send>(conn: &mut C, table: &str) -> Result<bool, Error> {
        let grammar = schema_grammar_for(conn.driver());
        let (sql, binds) = grammar.compile_has_table(table);
        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for b in binds {
            query = query.bind(b);
        }
        let count: i64 = query.fetch_one(conn.executor()).await?;
        Ok(count > 0)
    }

    /// Reports whether `table` has a column named `column`.
    pub async fn has_column<C: Connection + Send>(conn: &mut C, table: &str, column: &str) -> Result<bool, Error> {
        let columns = Self::column_listing(conn, table).await?;
        Ok(columns.iter().any(|c| c.eq_ignore_ascii_case(&column.to_snake_case())))
    }

    /// Lists the column names of `table`.
    pub async fn column_listing<C: Connection + Send>(conn: &mut C, table: &str) -> Result<Vec<String>, Error> {
        let grammar = schema_grammar_for(conn.driver());
        let (sql, binds) = grammar.compile_column_listing(table);
        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for b in binds {
            query = query.bind(b);
        }
        Ok(query.fetch_all(conn.executor()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_schema_build_with_foreign_id_constrained_cascade() {
        let mut bp = Blueprint::new("posts", true);
        bp.id();
        bp.foreign_id("user_id").constrained("users", "id").on_delete("CASCADE");
        bp.string("title", None);
        bp.timestamps();

        let grammar = SqliteSchemaGrammar;
        let stmts = grammar.compile_create(&bp);
        assert!(stmts[0].starts_with("CREATE TABLE IF NOT EXISTS \"posts\""));
        assert!(stmts[0].contains("FOREIGN KEY (\"user_id\") REFERENCES \"users\" (\"id\") ON DELETE CASCADE"));
        assert!(stmts[0].contains("\"title\" VARCHAR(255)"));
    }

    #[test]
    fn sqlite_rejects_column_change() {
        let mut bp = Blueprint::new("posts", false);
        bp.string("title", Some(300)).change();
        let grammar = SqliteSchemaGrammar;
        assert!(grammar.compile_change(&bp).is_err());
    }

    #[test]
    fn mysql_modifies_column_in_place() {
        let mut bp = Blueprint::new("posts", false);
        bp.string("title", Some(300)).change();
        let grammar = MySqlSchemaGrammar;
        let stmts = grammar.compile_change(&bp).unwrap();
        assert_eq!(stmts.len(), 1);
        assert!(stmts[0].contains("MODIFY COLUMN"));
    }

    #[test]
    fn default_string_length_is_process_wide() {
        set_default_string_length(100);
        let mut bp = Blueprint::new("t", true);
        bp.string("name", None);
        assert_eq!(bp.columns[0].col_type, ColumnType::String(100));
        set_default_string_length(255);
    }
}
