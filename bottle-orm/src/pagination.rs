//! # Pagination Module
//!
//! This module provides a standard `Pagination` struct that is compatible with
//! web frameworks like `axum`, `actix-web`, and `serde`. It allows for easy
//! extraction of pagination parameters from HTTP requests and application
//! to `QueryBuilder` instances.
//!
//! ## Features
//!
//! - **Serde Compatibility**: derives `Serialize` and `Deserialize`
//! - **Query Integration**: `apply` method to automatically paginate queries
//! - **Defaults**: sane defaults (page 0, limit 10)
//!
//! ## Example with Axum
//!
//! ```rust,ignore
//! use axum::{extract::Query, Json};
//! use bottle_orm::{Database, pagination::Pagination};
//!
//! async fn list_users(
//!     State(db): State<Database>,
//!     Query(pagination): Query<Pagination>
//! ) -> Json<Vec<User>> {
//!     let users = pagination.apply(db.model::<User>())
//!         .scan()
//!         .await
//!         .unwrap();
//!
//!     Json(users)
//! }
//! ```

use crate::{any_struct::FromAnyRow, database::Connection, model::Model, query_builder::QueryBuilder, AnyImpl};
use serde::{Deserialize, Serialize};
use sqlx::Row;

/// A standard pagination structure.
///
/// Can be deserialized from query parameters (e.g., `?page=1&limit=20`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// The page number (0-indexed). Default: 0.
    #[serde(default)]
    pub page: usize,

    /// The number of items per page. Default: 10.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// A wrapper for paginated results.
///
/// Contains the data items and metadata about the pagination state (total, pages, etc.).
/// This struct is `Serialize`d to JSON for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The list of items for the current page.
    pub data: Vec<T>,
    /// The total number of items matching the query.
    pub total: i64,
    /// The current page number (0-indexed).
    pub page: usize,
    /// The number of items per page.
    pub limit: usize,
    /// The total number of pages.
    pub total_pages: i64,
}

fn default_limit() -> usize {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 0, limit: 10 }
    }
}

impl Pagination {
    /// Creates a new Pagination instance.
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Applies the pagination to a `QueryBuilder`.
    ///
    /// This method sets the `limit` and `offset` of the query builder
    /// based on the pagination parameters.
    ///
    /// # Arguments
    ///
    /// * `query` - The `QueryBuilder` to paginate
    ///
    /// # Returns
    ///
    /// The modified `QueryBuilder`
    pub fn apply<'a, T, E>(self, query: QueryBuilder<'a, T, E>) -> QueryBuilder<'a, T, E>
    where
        T: Model + Send + Sync + Unpin,
        E: Connection + Send,
    {
        query.limit(self.limit).offset(self.page * self.limit)
    }

    /// Executes the query and returns a `Paginated<T>` result with metadata.
    ///
    /// This method performs two database queries:
    /// 1. A `COUNT(*)` query to get the total number of records matching the filters.
    /// 2. The actual `SELECT` query with `LIMIT` and `OFFSET` applied.
    ///
    /// # Type Parameters
    ///
    /// * `T` - The Model type.
    /// * `E` - The connection type (Database or Transaction).
    /// * `R` - The result type (usually same as T, but can be a DTO/Projection).
    ///
    /// # Returns
    ///
    /// * `Ok(Paginated<R>)` - The paginated results.
    /// * `Err(sqlx::Error)` - Database error.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let pagination = Pagination::new(0, 10);
    /// let result = pagination.paginate(db.model::<User>()).await?;
    ///
    /// println!("Total users: {}", result.total);
    /// for user in result.data {
    ///     println!("User: {}", user.username);
    /// }
    /// ```
    pub async fn paginate<'a, T, E, R>(self, mut query: QueryBuilder<'a, T, E>) -> Result<Paginated<R>, sqlx::Error>
    where
        T: Model + Send + Sync + Unpin,
        E: Connection + Send,
        R: FromAnyRow + AnyImpl + Send + Unpin,
    {
        // 1. Build and execute a COUNT(*) query sharing this builder's FROM/JOIN/WHERE/
        // GROUP BY/HAVING state, via the same grammar the data query uses.
        let grammar = query.grammar();
        let mut count_sql = String::from("SELECT COUNT(*) FROM ");
        count_sql.push_str(&grammar.quote_ident(&query.table_name.to_snake_case()));
        count_sql.push(' ');
        if !query.joins_clauses.is_empty() {
            count_sql.push_str(&query.joins_clauses.join(" "));
        }

        let mut args = sqlx::any::AnyArguments::default();
        let mut arg_counter = 1;
        count_sql.push_str(&query.compile_where(grammar, &mut args, &mut arg_counter));

        if !query.group_by_clauses.is_empty() {
            count_sql.push_str(&format!(" GROUP BY {}", query.group_by_clauses.join(", ")));
        }
        if !query.having_clauses.is_empty() {
            count_sql.push_str(" HAVING ");
            count_sql.push_str(&grammar.compile_clause_list(&query.having_clauses, &mut args, &mut arg_counter));
        }

        let count_row = sqlx::query_with::<_, _>(&count_sql, args).fetch_one(query.tx.executor()).await?;
        let total: i64 = count_row.try_get(0)?;

        // 2. Apply pagination and execute the data query.
        query.limit = Some(self.limit);
        query.offset = Some(self.page * self.limit);
        let data = query.scan::<R>().await?;

        // 3. Calculate metadata
        let total_pages = (total as f64 / self.limit as f64).ceil() as i64;

        Ok(Paginated { data, total, page: self.page, limit: self.limit, total_pages })
    }
}
