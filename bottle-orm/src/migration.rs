//! # Migration Module
//!
//! This module provides schema migration management functionality for Bottle ORM.
//! It handles the registration and execution of database schema changes, including
//! table creation and foreign key constraint assignment, and tracks which migrations
//! have already run in a repository table so that `run`/`rollback`/`refresh`/`fresh`
//! behave the way a migration runner is expected to across repeated invocations.
//!
//! ## Overview
//!
//! Each registered model becomes one named migration (named after its table) whose
//! `up()` still follows the two-phase approach the table-creation/foreign-key split
//! has always used:
//!
//! 1. **Table Creation Phase**: Creates all pending tables with their columns,
//!    indexes, and constraints (except foreign keys)
//! 2. **Foreign Key Phase**: Assigns foreign key constraints after all pending
//!    tables exist
//!
//! This ensures that foreign keys can reference tables that haven't been created yet,
//! even when two registered models reference each other. Wrapped around that strategy
//! is a small repository that records `(migration, batch)` rows so that a second `run()`
//! is a no-op, `rollback()` can undo exactly the most recent batch, and `status()` can
//! report what has and hasn't been applied.
//!
//! ## Features
//!
//! - **Automatic Ordering**: Handles dependencies between tables automatically
//! - **Idempotent Operations**: A migration already present in the repository is skipped
//! - **Batch Tracking**: Every `run()` groups newly-applied migrations into one batch
//!   number (or one batch per migration with `run_step()`), so `rollback()` can undo
//!   exactly what a given run applied
//! - **Type Safety**: Leverages Rust's type system for compile-time validation
//! - **Async Execution**: Non-blocking migration execution
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bottle_orm::{Database, Model};
//! use uuid::Uuid;
//!
//! #[derive(Model)]
//! struct User {
//!     #[orm(primary_key)]
//!     id: Uuid,
//!     username: String,
//! }
//!
//! #[derive(Model)]
//! struct Post {
//!     #[orm(primary_key)]
//!     id: Uuid,
//!     #[orm(foreign_key = "User::id")]
//!     user_id: Uuid,
//!     title: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/mydb").await?;
//!
//!     // Register and run migrations
//!     let applied = db.migrator()
//!         .register::<User>()
//!         .register::<Post>()
//!         .run()
//!         .await?;
//!     println!("applied: {:?}", applied);
//!
//!     // Running again is a no-op
//!     assert!(db.migrator().register::<User>().register::<Post>().run().await?.is_empty());
//!
//!     Ok(())
//! }
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use futures::future::BoxFuture;
use heck::ToSnakeCase;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    database::{Connection, Database},
    errors::Error,
    grammar::{grammar_for, Grammar},
    model::Model,
};

// ============================================================================
// Type Aliases
// ============================================================================

/// Type alias for migration tasks (e.g., Create Table, Add Foreign Key, Drop Table).
///
/// Migration tasks are async closures that take a `Database` instance and return
/// a boxed future that resolves to a Result. This allows for flexible, composable
/// migration operations.
///
/// # Type Definition
///
/// ```rust,ignore
/// type MigrationTask = Box<
///     dyn Fn(Database) -> BoxFuture<'static, Result<(), sqlx::Error>> + Send + Sync
/// >;
/// ```
///
/// # Example
///
/// ```rust,ignore
/// let task: MigrationTask = Box::new(|db: Database| {
///     Box::pin(async move {
///         db.create_table::<User>().await?;
///         Ok(())
///     })
/// });
/// ```
pub type MigrationTask = Box<dyn Fn(Database) -> BoxFuture<'static, Result<(), sqlx::Error>> + Send + Sync>;

// ============================================================================
// Registered Migration Entry
// ============================================================================

/// One registered migration: a name plus its up-phase tasks and its down task.
///
/// `register::<T>()` is currently the only constructor, so `name` is always a
/// model's table name, `create`/`foreign_keys` are the two up-phase tasks the
/// `Migrator` always ran, and `drop` removes the table so `rollback`/`fresh`
/// have something symmetrical to run.
struct MigrationEntry {
    name: String,
    create: MigrationTask,
    foreign_keys: MigrationTask,
    drop: MigrationTask,
}

// ============================================================================
// Migration Repository
// ============================================================================

/// The default name of the table the repository uses to record applied migrations.
pub const DEFAULT_MIGRATIONS_TABLE: &str = "migrations";

/// A small DAO over the migration repository table.
///
/// Mirrors the repository object a migration runner keeps alongside it: a
/// table of `(id, migration, batch)` rows recording which migrations have run
/// and in which batch, so `Migrator::run`/`rollback`/`status` can reason about
/// "already applied" without re-deriving it from the schema itself.
pub struct Repository<'a> {
    db: &'a Database,
    table: String,
}

impl<'a> Repository<'a> {
    /// Creates a repository bound to `db`'s default connection, using `table`
    /// (normally [`DEFAULT_MIGRATIONS_TABLE`]) as the bookkeeping table name.
    pub fn new(db: &'a Database, table: impl Into<String>) -> Self {
        Self { db, table: table.into() }
    }

    fn quoted_table(&self) -> String {
        grammar_for(self.db.driver()).quote_ident(&self.table)
    }

    /// Creates the repository table if it does not already exist.
    pub async fn create_repository(&self) -> Result<(), Error> {
        use crate::database::Drivers;

        let table = self.quoted_table();
        let ddl = match self.db.driver() {
            Drivers::Postgres => {
                format!("CREATE TABLE IF NOT EXISTS {table} (id SERIAL PRIMARY KEY, migration TEXT NOT NULL, batch INTEGER NOT NULL)")
            }
            Drivers::MySQL => {
                format!("CREATE TABLE IF NOT EXISTS {table} (id INT AUTO_INCREMENT PRIMARY KEY, migration VARCHAR(255) NOT NULL, batch INT NOT NULL)")
            }
            Drivers::SQLite => {
                format!("CREATE TABLE IF NOT EXISTS {table} (id INTEGER PRIMARY KEY AUTOINCREMENT, migration TEXT NOT NULL, batch INTEGER NOT NULL)")
            }
        };
        log::info!("{ddl}");
        self.db.raw(&ddl).execute().await?;
        Ok(())
    }

    /// Drops the repository table entirely.
    pub async fn delete_repository(&self) -> Result<(), Error> {
        let table = self.quoted_table();
        let ddl = format!("DROP TABLE IF EXISTS {table}");
        log::info!("{ddl}");
        self.db.raw(&ddl).execute().await?;
        Ok(())
    }

    /// Returns whether the repository table currently exists.
    pub async fn repository_exists(&self) -> Result<bool, Error> {
        use crate::database::Drivers;

        let count: i64 = match self.db.driver() {
            Drivers::Postgres => {
                self.db
                    .raw("SELECT count(*) FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = $1")
                    .bind(self.table.clone())
                    .fetch_scalar()
                    .await?
            }
            Drivers::MySQL => {
                self.db
                    .raw("SELECT count(*) FROM information_schema.tables WHERE table_schema = DATABASE() AND table_name = ?")
                    .bind(self.table.clone())
                    .fetch_scalar()
                    .await?
            }
            Drivers::SQLite => {
                self.db
                    .raw("SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
                    .bind(self.table.clone())
                    .fetch_scalar()
                    .await?
            }
        };
        Ok(count > 0)
    }

    /// Returns every migration name that has run, in the order it was logged.
    pub async fn get_ran(&self) -> Result<Vec<String>, Error> {
        let table = self.quoted_table();
        let sql = format!("SELECT migration FROM {table} ORDER BY id ASC");
        let rows: Vec<(String,)> = self.db.raw(&sql).fetch_all().await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Returns every migration name recorded under `batch`, in logged order.
    pub async fn get_migrations_by_batch(&self, batch: i64) -> Result<Vec<String>, Error> {
        let table = self.quoted_table();
        let placeholder = grammar_for(self.db.driver()).placeholder(&mut 1);
        let sql = format!("SELECT migration FROM {table} WHERE batch = {placeholder} ORDER BY id ASC");
        let rows: Vec<(String,)> = self.db.raw(&sql).bind(batch).fetch_all().await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Returns the highest batch number recorded, or 0 if the repository is empty.
    pub async fn get_last_batch_number(&self) -> Result<i64, Error> {
        let table = self.quoted_table();
        let sql = format!("SELECT MAX(batch) FROM {table}");
        let max: Option<i64> = self.db.raw(&sql).fetch_scalar_optional().await?;
        Ok(max.unwrap_or(0))
    }

    /// Records that `name` ran as part of `batch`.
    pub async fn log(&self, name: &str, batch: i64) -> Result<(), Error> {
        let table = self.quoted_table();
        let grammar = grammar_for(self.db.driver());
        let mut counter = 1;
        let p1 = grammar.placeholder(&mut counter);
        let p2 = grammar.placeholder(&mut counter);
        let sql = format!("INSERT INTO {table} (migration, batch) VALUES ({p1}, {p2})");
        self.db.raw(&sql).bind(name.to_string()).bind(batch).execute().await?;
        Ok(())
    }

    /// Removes `name`'s entry from the repository.
    pub async fn delete(&self, name: &str) -> Result<(), Error> {
        let table = self.quoted_table();
        let placeholder = grammar_for(self.db.driver()).placeholder(&mut 1);
        let sql = format!("DELETE FROM {table} WHERE migration = {placeholder}");
        self.db.raw(&sql).bind(name.to_string()).execute().await?;
        Ok(())
    }
}

// ============================================================================
// Migrator Struct
// ============================================================================

/// Schema migration manager.
///
/// The `Migrator` is responsible for managing and executing database schema migrations.
/// Each registered model contributes a named [`MigrationEntry`] whose `up()` still runs
/// in the two phases (table creation, then foreign keys) the teacher's original runner
/// used, while the [`Repository`] records which migrations have already applied so that
/// `run`, `rollback`, `refresh`, `fresh`, and `status` all behave consistently across
/// repeated invocations.
///
/// # Lifecycle
///
/// 1. Create migrator via `Database::migrator()`
/// 2. Register models via `register::<T>()`
/// 3. Execute pending migrations via `run()` (or `run_step()` for one batch per migration)
/// 4. Inspect or undo with `status()`/`rollback()`/`rollback_step()`/`refresh()`/`fresh()`
///
/// # Example
///
/// ```rust,ignore
/// use bottle_orm::{Database, Model};
///
/// #[derive(Model)]
/// struct User {
///     #[orm(primary_key)]
///     id: i32,
///     username: String,
/// }
///
/// #[derive(Model)]
/// struct Post {
///     #[orm(primary_key)]
///     id: i32,
///     #[orm(foreign_key = "User::id")]
///     user_id: i32,
///     title: String,
/// }
///
/// let db = Database::connect("sqlite::memory:").await?;
///
/// let applied = db.migrator()
///     .register::<User>()
///     .register::<Post>()
///     .run()
///     .await?;
/// ```
pub struct Migrator<'a> {
    /// Reference to the database connection.
    db: &'a Database,

    /// Registered migrations, in registration order.
    migrations: Vec<MigrationEntry>,

    /// Name of the repository table used to track applied migrations.
    repository_table: String,
}

// ============================================================================
// Migrator Implementation
// ============================================================================

impl<'a> Migrator<'a> {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Creates a new Migrator instance associated with a Database.
    ///
    /// This constructor initializes an empty migration list and defaults the
    /// repository table name to [`DEFAULT_MIGRATIONS_TABLE`]. Typically called
    /// via `Database::migrator()` rather than directly.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// // Usually called via database method
    /// let migrator = db.migrator();
    ///
    /// // Direct construction (rarely needed)
    /// let migrator = Migrator::new(&db);
    /// ```
    pub fn new(db: &'a Database) -> Self {
        Self { db, migrations: Vec::new(), repository_table: DEFAULT_MIGRATIONS_TABLE.to_string() }
    }

    /// Overrides the repository table name (default [`DEFAULT_MIGRATIONS_TABLE`]).
    ///
    /// Useful when an application runs more than one independent set of
    /// migrations against the same database and needs separate bookkeeping
    /// tables for each.
    pub fn repository_table(mut self, name: impl Into<String>) -> Self {
        self.repository_table = name.into();
        self
    }

    /// Returns the [`Repository`] this migrator logs applied migrations to.
    pub fn repository(&self) -> Repository<'a> {
        Repository::new(self.db, self.repository_table.clone())
    }

    // ========================================================================
    // Model Registration
    // ========================================================================

    /// Registers a Model for migration.
    ///
    /// This queues a migration named after the model's table, whose `up()`
    /// creates the table with columns, indexes, and inline constraints, and
    /// separately assigns foreign keys once every pending table in the same
    /// run exists. Its `down()` drops the table.
    ///
    /// Multiple models can be registered by chaining calls to this method.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// db.migrator()
    ///     .register::<User>()      // Creates 'user' table first
    ///     .register::<Post>()      // Creates 'post' table
    ///     .register::<Comment>()   // Creates 'comment' table
    ///     .run()                   // Executes all pending migrations
    ///     .await?;
    /// ```
    pub fn register<T>(mut self) -> Self
    where
        T: Model + 'static + Send + Sync,
    {
        let name = T::table_name().to_snake_case();

        let create = Box::new(|db: Database| -> BoxFuture<'static, Result<(), sqlx::Error>> {
            Box::pin(async move {
                db.create_table::<T>().await?;
                Ok(())
            })
        });

        let foreign_keys = Box::new(|db: Database| -> BoxFuture<'static, Result<(), sqlx::Error>> {
            Box::pin(async move {
                db.assign_foreign_keys::<T>().await?;
                Ok(())
            })
        });

        let table_name = name.clone();
        let drop = Box::new(move |db: Database| -> BoxFuture<'static, Result<(), sqlx::Error>> {
            let table_name = table_name.clone();
            Box::pin(async move {
                let quoted = grammar_for(db.driver()).quote_ident(&table_name);
                sqlx::query(&format!("DROP TABLE IF EXISTS {quoted}")).execute(&db.pool).await?;
                Ok(())
            })
        });

        self.migrations.push(MigrationEntry { name, create, foreign_keys, drop });
        self
    }

    // ========================================================================
    // Migration Execution
    // ========================================================================

    /// Runs every pending migration (not already present in the repository),
    /// grouping them into a single new batch.
    ///
    /// Already-applied migrations are skipped, so running this twice in a row
    /// is a no-op the second time. Internally this still runs the two-phase
    /// strategy — every pending table is created first, then every pending
    /// foreign key is assigned — before logging each migration to the
    /// repository under the same new batch number.
    ///
    /// # Returns
    ///
    /// The names of the migrations that were actually applied by this call
    /// (empty if every registered migration had already run).
    pub async fn run(&self) -> Result<Vec<String>, Error> {
        self.run_grouped(false).await
    }

    /// Like [`Migrator::run`], but logs each newly-applied migration under
    /// its own incrementing batch number instead of grouping them into one.
    ///
    /// Table creation and foreign-key assignment still happen for every
    /// pending migration before any of them are logged, preserving
    /// cross-table foreign key ordering; only the batch bookkeeping differs.
    pub async fn run_step(&self) -> Result<Vec<String>, Error> {
        self.run_grouped(true).await
    }

    async fn run_grouped(&self, one_batch_per_migration: bool) -> Result<Vec<String>, Error> {
        let repository = self.repository();
        if !repository.repository_exists().await? {
            repository.create_repository().await?;
        }

        let ran = repository.get_ran().await?;
        let pending: Vec<&MigrationEntry> = self.migrations.iter().filter(|m| !ran.contains(&m.name)).collect();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        for entry in &pending {
            log::info!("migrating: {}", entry.name);
            (entry.create)(self.db.clone()).await?;
        }
        for entry in &pending {
            (entry.foreign_keys)(self.db.clone()).await?;
        }

        let mut batch = repository.get_last_batch_number().await? + 1;
        let mut applied = Vec::with_capacity(pending.len());
        for entry in &pending {
            repository.log(&entry.name, batch).await?;
            log::info!("migrated:  {} (batch {batch})", entry.name);
            applied.push(entry.name.clone());
            if one_batch_per_migration {
                batch += 1;
            }
        }

        Ok(applied)
    }

    /// Rolls back every migration recorded in the most recent batch.
    ///
    /// Runs each migration's `down()` in reverse registration order and
    /// removes its repository entry. Returns an empty vector if the
    /// repository is empty.
    pub async fn rollback(&self) -> Result<Vec<String>, Error> {
        self.rollback_step(1).await
    }

    /// Rolls back every migration recorded across the last `steps` batches.
    ///
    /// With `steps = 1` this is equivalent to [`Migrator::rollback`]. Runs
    /// `down()` for each affected migration in reverse registration order,
    /// most-recently-applied first, and removes its repository entry.
    pub async fn rollback_step(&self, steps: u32) -> Result<Vec<String>, Error> {
        let repository = self.repository();
        if !repository.repository_exists().await? {
            return Ok(Vec::new());
        }

        let last_batch = repository.get_last_batch_number().await?;
        if last_batch == 0 || steps == 0 {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let lowest = (last_batch - steps as i64 + 1).max(1);
        for batch in (lowest..=last_batch).rev() {
            let mut in_batch = repository.get_migrations_by_batch(batch).await?;
            in_batch.reverse();
            names.extend(in_batch);
        }

        for name in &names {
            if let Some(entry) = self.migrations.iter().find(|m| &m.name == name) {
                log::info!("rolling back: {name}");
                (entry.drop)(self.db.clone()).await?;
            }
            repository.delete(name).await?;
            log::info!("rolled back: {name}");
        }

        Ok(names)
    }

    /// Rolls back every applied migration, then runs every registered one again.
    pub async fn refresh(&self) -> Result<Vec<String>, Error> {
        let repository = self.repository();
        if repository.repository_exists().await? {
            let last_batch = repository.get_last_batch_number().await?;
            if last_batch > 0 {
                self.rollback_step(last_batch as u32).await?;
            }
        }
        self.run().await
    }

    /// Drops every registered migration's table unconditionally, resets the
    /// repository, then runs every registered migration again.
    ///
    /// Unlike [`Migrator::refresh`], this does not rely on `down()` matching
    /// the schema state (useful when the schema has drifted from what the
    /// repository thinks is applied); it simply drops each known table.
    pub async fn fresh(&self) -> Result<Vec<String>, Error> {
        for entry in self.migrations.iter().rev() {
            (entry.drop)(self.db.clone()).await?;
        }
        self.repository().delete_repository().await?;
        self.run().await
    }

    /// Returns an ordered report of every registered migration: whether it
    /// has run, its name, and the batch it ran under (`None` if it hasn't).
    pub async fn status(&self) -> Result<Vec<(bool, String, Option<i64>)>, Error> {
        let repository = self.repository();
        let ran: std::collections::HashMap<String, i64> = if repository.repository_exists().await? {
            let table = repository.quoted_table();
            let sql = format!("SELECT migration, batch FROM {table} ORDER BY id ASC");
            let rows: Vec<(String, i64)> = self.db.raw(&sql).fetch_all().await?;
            rows.into_iter().collect()
        } else {
            std::collections::HashMap::new()
        };

        Ok(self
            .migrations
            .iter()
            .map(|entry| match ran.get(&entry.name) {
                Some(batch) => (true, entry.name.clone(), Some(*batch)),
                None => (false, entry.name.clone(), None),
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnInfo;
    use std::collections::HashMap;

    struct MigTestUser {
        id: i32,
        username: String,
    }

    impl Model for MigTestUser {
        fn table_name() -> &'static str {
            "MigTestUser"
        }

        fn columns() -> Vec<ColumnInfo> {
            vec![
                ColumnInfo {
                    name: "id",
                    sql_type: "INTEGER",
                    is_primary_key: true,
                    is_nullable: false,
                    create_time: false,
                    update_time: false,
                    unique: false,
                    index: false,
                    foreign_table: None,
                    foreign_key: None,
                    omit: false,
                    soft_delete: false,
                },
                ColumnInfo {
                    name: "username",
                    sql_type: "TEXT",
                    is_primary_key: false,
                    is_nullable: false,
                    create_time: false,
                    update_time: false,
                    unique: false,
                    index: false,
                    foreign_table: None,
                    foreign_key: None,
                    omit: false,
                    soft_delete: false,
                },
            ]
        }

        fn active_columns() -> Vec<&'static str> {
            vec!["id", "username"]
        }

        fn to_map(&self) -> HashMap<String, String> {
            let mut map = HashMap::new();
            map.insert("id".to_string(), self.id.to_string());
            map.insert("username".to_string(), self.username.clone());
            map
        }
    }

    struct MigTestPost {
        id: i32,
        mig_test_user_id: i32,
        title: String,
    }

    impl Model for MigTestPost {
        fn table_name() -> &'static str {
            "MigTestPost"
        }

        fn columns() -> Vec<ColumnInfo> {
            vec![
                ColumnInfo {
                    name: "id",
                    sql_type: "INTEGER",
                    is_primary_key: true,
                    is_nullable: false,
                    create_time: false,
                    update_time: false,
                    unique: false,
                    index: false,
                    foreign_table: None,
                    foreign_key: None,
                    omit: false,
                    soft_delete: false,
                },
                ColumnInfo {
                    name: "mig_test_user_id",
                    sql_type: "INTEGER",
                    is_primary_key: false,
                    is_nullable: false,
                    create_time: false,
                    update_time: false,
                    unique: false,
                    index: false,
                    foreign_table: Some("MigTestUser"),
                    foreign_key: Some("id"),
                    omit: false,
                    soft_delete: false,
                },
                ColumnInfo {
                    name: "title",
                    sql_type: "TEXT",
                    is_primary_key: false,
                    is_nullable: false,
                    create_time: false,
                    update_time: false,
                    unique: false,
                    index: false,
                    foreign_table: None,
                    foreign_key: None,
                    omit: false,
                    soft_delete: false,
                },
            ]
        }

        fn active_columns() -> Vec<&'static str> {
            vec!["id", "mig_test_user_id", "title"]
        }

        fn to_map(&self) -> HashMap<String, String> {
            let mut map = HashMap::new();
            map.insert("id".to_string(), self.id.to_string());
            map.insert("mig_test_user_id".to_string(), self.mig_test_user_id.to_string());
            map.insert("title".to_string(), self.title.clone());
            map
        }
    }

    #[tokio::test]
    async fn run_is_idempotent_and_status_reports_batches() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        let status_before = db.migrator().register::<MigTestUser>().register::<MigTestPost>().status().await.unwrap();
        assert!(status_before.iter().all(|(ran, _, batch)| !ran && batch.is_none()));

        let applied = db.migrator().register::<MigTestUser>().register::<MigTestPost>().run().await.unwrap();
        assert_eq!(applied, vec!["mig_test_user".to_string(), "mig_test_post".to_string()]);

        let second_run = db.migrator().register::<MigTestUser>().register::<MigTestPost>().run().await.unwrap();
        assert!(second_run.is_empty());

        let status_after = db.migrator().register::<MigTestUser>().register::<MigTestPost>().status().await.unwrap();
        assert!(status_after.iter().all(|(ran, _, batch)| *ran && batch.unwrap() == 1));
    }

    #[tokio::test]
    async fn rollback_step_undoes_exactly_the_requested_batches() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        db.migrator().register::<MigTestUser>().run().await.unwrap();
        db.migrator().register::<MigTestPost>().run().await.unwrap();

        let status = db.migrator().register::<MigTestUser>().register::<MigTestPost>().status().await.unwrap();
        assert_eq!(status[0].2, Some(1));
        assert_eq!(status[1].2, Some(2));

        let rolled_back =
            db.migrator().register::<MigTestUser>().register::<MigTestPost>().rollback_step(2).await.unwrap();
        assert_eq!(rolled_back, vec!["mig_test_post".to_string(), "mig_test_user".to_string()]);

        let status_after = db.migrator().register::<MigTestUser>().register::<MigTestPost>().status().await.unwrap();
        assert!(status_after.iter().all(|(ran, _, batch)| !ran && batch.is_none()));
    }
}
