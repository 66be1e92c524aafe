//! # Transaction Module
//!
//! This module provides the transaction management functionality for Bottle ORM.
//! It allows executing multiple database operations atomically, ensuring data consistency.
//!
//! ## Features
//!
//! - **Atomic Operations**: Group multiple queries into a single unit of work
//! - **Automatic Rollback**: Transactions are automatically rolled back if dropped without commit
//! - **Driver Agnostic**: Works consistently across PostgreSQL, MySQL, and SQLite
//! - **Fluent API**: Integrated with `QueryBuilder` for seamless usage
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bottle_orm::Database;
//!
//! let mut tx = db.begin().await?;
//!
//! // Operations within transaction
//! tx.model::<User>().insert(&user).await?;
//! tx.model::<Post>().insert(&post).await?;
//!
//! // Commit changes
//! tx.commit().await?;
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use heck::ToSnakeCase;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    database::{Connection, Drivers, RawQuery},
    Error, Model, QueryBuilder,
};

// ============================================================================
// Transaction Struct
// ============================================================================

/// A wrapper around a SQLx transaction that additionally tracks nesting depth.
///
/// Provides a way to execute multiple queries atomically. If any query fails,
/// the transaction can be rolled back. If all succeed, it can be committed.
///
/// Nesting is modeled the way a connection with a transaction state machine
/// would: level 1 is the real `BEGIN` issued by `Database::begin()`; each
/// further [`Transaction::begin_nested`] issues a `SAVEPOINT` named after the
/// new depth, and [`Transaction::rollback_nested`]/[`Transaction::commit_nested`]
/// unwind one level at a time without touching the outer transaction.
///
/// # Type Parameters
///
/// * `'a` - The lifetime of the database connection source
///
/// # Fields
///
/// * `tx` - The underlying SQLx transaction
/// * `driver` - The database driver type (for query syntax handling)
/// * `depth` - Current nesting level; 1 immediately after `begin()`
#[derive(Debug)]
pub struct Transaction<'a> {
    pub(crate) tx: sqlx::Transaction<'a, sqlx::Any>,
    pub(crate) driver: Drivers,
    pub(crate) depth: u32,
}

// ============================================================================
// Connection Implementation
// ============================================================================

/// Implementation of Connection for a Transaction.
///
/// Allows the `QueryBuilder` to use a transaction for executing queries.
/// Supports generic borrow lifetimes to allow multiple operations within
/// the same transaction scope.
impl<'a> Connection for Transaction<'a> {
    type Exec<'c> = &'c mut sqlx::AnyConnection
    where
        Self: 'c;

    fn driver(&self) -> Drivers {
        self.driver
    }

    fn executor<'c>(&'c mut self) -> Self::Exec<'c> {
        &mut *self.tx
    }
}

/// Implementation of Connection for a mutable reference to a Transaction.
///
/// `QueryBuilder` stores its connection by value, so running a query "inside"
/// a transaction the caller still owns means handing the builder `&mut
/// Transaction` rather than the `Transaction` itself.
impl<'a, 'b> Connection for &'b mut Transaction<'a> {
    type Exec<'c>
        = &'c mut sqlx::AnyConnection
    where
        Self: 'c;

    fn driver(&self) -> Drivers {
        self.driver
    }

    fn executor<'c>(&'c mut self) -> Self::Exec<'c> {
        &mut *self.tx
    }
}

// ============================================================================
// Transaction Implementation
// ============================================================================

impl<'a> Transaction<'a> {
    // ========================================================================
    // Query Building
    // ========================================================================

    /// Starts building a query within this transaction.
    ///
    /// This method creates a new `QueryBuilder` that will execute its queries
    /// as part of this transaction.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The Model type to query.
    ///
    /// # Returns
    ///
    /// A new `QueryBuilder` instance bound to this transaction.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let mut tx = db.begin().await?;
    ///
    /// // These operations are part of the transaction
    /// tx.model::<User>().insert(&user).await?;
    /// tx.model::<Post>().insert(&post).await?;
    ///
    /// tx.commit().await?;
    /// ```
    pub fn model<T: Model + Send + Sync + Unpin>(&mut self) -> QueryBuilder<'a, T, &mut Self> {
        // Get active column names from the model
        let active_columns = T::active_columns();
        let mut columns: Vec<String> = Vec::with_capacity(active_columns.capacity());

        // Convert column names to snake_case and strip 'r#' prefix if present
        for col in active_columns {
            columns.push(col.strip_prefix("r#").unwrap_or(col).to_snake_case());
        }

        // Create and return the query builder
        let driver = self.driver;
        QueryBuilder::new(self, driver, T::table_name(), T::columns(), columns)
    }

    /// Creates a raw SQL query builder bound to this transaction.
    ///
    /// Mirrors `Database::raw()`; lets DDL/unparameterizable statements run
    /// inside the same transaction as the model-based operations around them.
    pub fn raw<'s>(&'s mut self, sql: &'s str) -> RawQuery<'s, &'s mut Self> {
        RawQuery::new(self, sql)
    }

    // ========================================================================
    // Transaction Control
    // ========================================================================

    /// Returns the current nesting depth.
    ///
    /// `1` immediately after `Database::begin()`; each `begin_nested()`
    /// increments it, each `rollback_nested()`/`commit_nested()` decrements
    /// it. Reaches `0` only once the transaction has been finally committed
    /// or rolled back via `commit()`/`rollback()`.
    pub fn transaction_level(&self) -> u32 {
        self.depth
    }

    /// Opens a nested transaction.
    ///
    /// At depth 1 this issues `SAVEPOINT trans{new_depth}` (depth becomes
    /// 2, 3, ...); the savepoint name is the new depth, matching the
    /// convention that savepoint names need only be unique within a
    /// connection and the current depth already satisfies that.
    pub async fn begin_nested(&mut self) -> Result<(), Error> {
        self.depth += 1;
        let savepoint = format!("trans{}", self.depth);
        sqlx::query(&format!("SAVEPOINT {savepoint}")).execute(&mut *self.tx).await?;
        Ok(())
    }

    /// Rolls back to the savepoint of the current depth and decrements it.
    ///
    /// Returns `Error::LogicError` at depth 1: rolling back the outermost
    /// transaction is a real `ROLLBACK`, done by consuming `rollback(self)`
    /// instead.
    pub async fn rollback_nested(&mut self) -> Result<(), Error> {
        if self.depth <= 1 {
            return Err(Error::logic_error(
                "rollback_nested() called at transaction level 1; use rollback(self) to roll back the outermost transaction",
            ));
        }
        let savepoint = format!("trans{}", self.depth);
        sqlx::query(&format!("ROLLBACK TO SAVEPOINT {savepoint}")).execute(&mut *self.tx).await?;
        self.depth -= 1;
        Ok(())
    }

    /// Decrements the nesting depth without touching the database.
    ///
    /// A nested commit only ever "commits" in the sense of agreeing to keep
    /// the savepoint's changes; they are not durable until the outermost
    /// `commit()` actually issues `COMMIT`, so no SQL needs to run here.
    /// Returns `Error::LogicError` at depth 1; use `commit(self)` instead.
    pub async fn commit_nested(&mut self) -> Result<(), Error> {
        if self.depth <= 1 {
            return Err(Error::logic_error(
                "commit_nested() called at transaction level 1; use commit(self) to commit the outermost transaction",
            ));
        }
        self.depth -= 1;
        Ok(())
    }

    /// Commits the transaction.
    ///
    /// Persists all changes made during the transaction to the database.
    /// This consumes the `Transaction` instance. Only valid at nesting depth
    /// 1 (i.e. after every nested savepoint has already been resolved via
    /// `commit_nested`/`rollback_nested`).
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Transaction committed successfully
    /// * `Err(Error::LogicError)` - Called while nested savepoints are still open
    /// * `Err(Error::DatabaseError)` - Database error during commit
    pub async fn commit(self) -> Result<(), Error> {
        if self.depth != 1 {
            return Err(Error::logic_error(&format!(
                "commit() called at transaction level {}; resolve nested savepoints first",
                self.depth
            )));
        }
        self.tx.commit().await?;
        Ok(())
    }

    /// Rolls back the transaction.
    ///
    /// Reverts all changes made during the transaction. This happens automatically
    /// if the `Transaction` is dropped without being committed, but this method
    /// allows for explicit rollback. Only valid at nesting depth 1.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Transaction rolled back successfully
    /// * `Err(Error::LogicError)` - Called while nested savepoints are still open
    /// * `Err(Error::DatabaseError)` - Database error during rollback
    pub async fn rollback(self) -> Result<(), Error> {
        if self.depth != 1 {
            return Err(Error::logic_error(&format!(
                "rollback() called at transaction level {}; resolve nested savepoints first",
                self.depth
            )));
        }
        self.tx.rollback().await?;
        Ok(())
    }
}