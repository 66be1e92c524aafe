//! # Query Builder Module
//!
//! This module provides a fluent interface for constructing and executing SQL queries.
//! It handles SELECT, INSERT, UPDATE, DELETE, filtering (WHERE/HAVING), pagination
//! (LIMIT/OFFSET), ordering, and soft-delete scoping, with type-safe parameter binding
//! across different database drivers. SQL text generation itself is delegated to the
//! [`crate::grammar`] layer so that dialect differences (placeholder syntax, identifier
//! quoting, operator translation) live in one place instead of being inlined here.
//!
//! ## Features
//!
//! - **Fluent API**: Chainable methods for building complex queries
//! - **Type-Safe Binding**: Automatic parameter binding with support for multiple types
//! - **Multi-Driver Support**: Works with PostgreSQL, MySQL, and SQLite
//! - **UUID Support**: Full support for UUID versions 1-7
//! - **Pagination**: Built-in LIMIT/OFFSET support with helper methods
//! - **Soft deletes**: rows with a `#[orm(soft_delete)]` column are excluded from every
//!   query unless `.with_deleted()` is requested
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use bottle_orm::{Database, Model, Op};
//! use uuid::Uuid;
//!
//! let users: Vec<User> = db.model::<User>()
//!     .filter("age", Op::Gte, 18)
//!     .order("created_at DESC")
//!     .limit(10)
//!     .scan()
//!     .await?;
//! ```

// ============================================================================
// External Crate Imports
// ============================================================================

use futures::future::BoxFuture;
use heck::ToSnakeCase;
use sqlx::{
    Any, AnyRow, Decode, Encode, FromRow, Row, Type,
    any::AnyArguments,
};
use std::marker::PhantomData;

// ============================================================================
// Internal Crate Imports
// ============================================================================

use crate::{
    AnyImpl, Error,
    any_struct::FromAnyRow,
    database::{Connection, Drivers},
    grammar::{BindFn, Bool, DatePart, Grammar, Op, WhereClause, bind_one, grammar_for},
    model::{ColumnInfo, Model},
    temporal::{self, is_temporal_type},
    value_binding::ValueBinder,
};

// ============================================================================
// QueryBuilder Struct
// ============================================================================

/// A fluent Query Builder for constructing SQL queries.
///
/// `QueryBuilder` provides a type-safe, ergonomic interface for building and executing
/// SQL queries across different database backends. It supports filtering, ordering,
/// pagination, and SELECT/INSERT/UPDATE/DELETE operations.
///
/// ## Type Parameter
///
/// * `'a` - Lifetime of the database reference (used for PhantomData)
/// * `T` - The Model type this query operates on
/// * `E` - The connection type (Database or Transaction)
pub struct QueryBuilder<'a, T, E> {
    /// Reference to the database connection pool or transaction
    pub(crate) tx: E,

    /// Database driver type
    pub(crate) driver: Drivers,

    /// Name of the database table (in original case)
    pub(crate) table_name: &'static str,

    /// Metadata information about each column
    pub(crate) columns_info: Vec<ColumnInfo>,

    /// List of column names (in snake_case)
    pub(crate) columns: Vec<String>,

    /// Specific columns to select (empty means SELECT *)
    pub(crate) select_columns: Vec<String>,

    /// Collection of WHERE clause tree nodes
    pub(crate) where_clauses: Vec<WhereClause>,

    /// Collection of ORDER BY clauses
    pub(crate) order_clauses: Vec<String>,

    /// Collection of JOIN clause to filter entry tables
    pub(crate) joins_clauses: Vec<String>,

    /// Maximum number of rows to return (LIMIT)
    pub(crate) limit: Option<usize>,

    /// Number of rows to skip (OFFSET)
    pub(crate) offset: Option<usize>,

    /// Activate debug mode in query
    pub(crate) debug_mode: bool,

    /// Clauses for GROUP BY
    pub(crate) group_by_clauses: Vec<String>,

    /// Clauses for HAVING
    pub(crate) having_clauses: Vec<WhereClause>,

    /// Distinct flag
    pub(crate) is_distinct: bool,

    /// When `true`, the implicit soft-delete scope (`deleted_at IS NULL`) is not applied.
    pub(crate) with_deleted: bool,

    /// PhantomData to bind the generic type T
    pub(crate) _marker: PhantomData<&'a T>,
}

/// A nested group of WHERE clauses, built inside a [`QueryBuilder::where_group`] closure.
///
/// Mirrors the subset of `QueryBuilder`'s filter methods that make sense standalone
/// (without a FROM/SELECT context attached), so a caller can express
/// `WHERE a = 1 AND (b = 2 OR c = 3)` idiomatically.
#[derive(Default)]
pub struct WhereGroupBuilder {
    clauses: Vec<WhereClause>,
}

impl WhereGroupBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter<V>(mut self, col: &str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.clauses.push(WhereClause::Basic { column: col.to_string(), op, bind: bind_one(value), boolean: Bool::And });
        self
    }

    pub fn or_filter<V>(mut self, col: &str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.clauses.push(WhereClause::Basic { column: col.to_string(), op, bind: bind_one(value), boolean: Bool::Or });
        self
    }

    pub fn where_null(mut self, col: &str) -> Self {
        self.clauses.push(WhereClause::Null { column: col.to_string(), negate: false, boolean: Bool::And });
        self
    }
}

// ============================================================================
// QueryBuilder Implementation
// ============================================================================

impl<'a, T, E> QueryBuilder<'a, T, E>
where
    T: Model + Send + Sync + Unpin,
    E: Connection + Send,
{
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Creates a new QueryBuilder instance.
    ///
    /// This constructor is typically called internally via `db.model::<T>()`.
    pub fn new(
        tx: E,
        driver: Drivers,
        table_name: &'static str,
        columns_info: Vec<ColumnInfo>,
        columns: Vec<String>,
    ) -> Self {
        Self {
            tx,
            driver,
            table_name,
            columns_info,
            columns,
            debug_mode: false,
            select_columns: Vec::new(),
            where_clauses: Vec::new(),
            order_clauses: Vec::new(),
            joins_clauses: Vec::new(),
            group_by_clauses: Vec::new(),
            having_clauses: Vec::new(),
            is_distinct: false,
            with_deleted: false,
            limit: None,
            offset: None,
            _marker: PhantomData,
        }
    }

    pub(crate) fn grammar(&self) -> &'static dyn Grammar {
        grammar_for(self.driver)
    }

    /// The column carrying `#[orm(soft_delete)]`, if the model declares one.
    fn soft_delete_column(&self) -> Option<String> {
        self.columns_info
            .iter()
            .find(|c| c.soft_delete)
            .map(|c| c.name.strip_prefix("r#").unwrap_or(c.name).to_snake_case())
    }

    // ========================================================================
    // Query Building Methods
    // ========================================================================

    /// Adds a WHERE clause to the query, combined with `AND`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// query.filter("age", Op::Gte, 18)
    /// ```
    pub fn filter<V>(mut self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_clauses.push(WhereClause::Basic { column: col.to_string(), op, bind: bind_one(value), boolean: Bool::And });
        self
    }

    /// Adds a WHERE clause to the query, combined with `OR`.
    pub fn or_filter<V>(mut self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_clauses.push(WhereClause::Basic { column: col.to_string(), op, bind: bind_one(value), boolean: Bool::Or });
        self
    }

    /// Adds an equality filter to the query. Equivalent to `filter(col, Op::Eq, value)`.
    pub fn equals<V>(self, col: &'static str, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.filter(col, Op::Eq, value)
    }

    /// `column IN (values...)`
    pub fn where_in<V>(mut self, col: &'static str, values: Vec<V>) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        let binds: Vec<BindFn> = values.into_iter().map(bind_one).collect();
        self.where_clauses.push(WhereClause::In { column: col.to_string(), binds, negate: false, boolean: Bool::And });
        self
    }

    /// `column NOT IN (values...)`
    pub fn where_not_in<V>(mut self, col: &'static str, values: Vec<V>) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        let binds: Vec<BindFn> = values.into_iter().map(bind_one).collect();
        self.where_clauses.push(WhereClause::In { column: col.to_string(), binds, negate: true, boolean: Bool::And });
        self
    }

    /// `column IS NULL`
    pub fn where_null(mut self, col: &'static str) -> Self {
        self.where_clauses.push(WhereClause::Null { column: col.to_string(), negate: false, boolean: Bool::And });
        self
    }

    /// `column IS NOT NULL`
    pub fn where_not_null(mut self, col: &'static str) -> Self {
        self.where_clauses.push(WhereClause::Null { column: col.to_string(), negate: true, boolean: Bool::And });
        self
    }

    /// `column BETWEEN low AND high`
    pub fn where_between<V>(mut self, col: &'static str, low: V, high: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_clauses.push(WhereClause::Between {
            column: col.to_string(),
            low: bind_one(low),
            high: bind_one(high),
            negate: false,
            boolean: Bool::And,
        });
        self
    }

    /// Compares two columns against each other, e.g. `first_col = second_col`.
    pub fn where_column(mut self, first: &'static str, op: Op, second: &'static str) -> Self {
        self.where_clauses.push(WhereClause::ColumnCompare {
            first: first.to_string(),
            op,
            second: second.to_string(),
            boolean: Bool::And,
        });
        self
    }

    /// An escape hatch for raw SQL fragments not covered by the structured methods.
    pub fn where_raw(mut self, sql: &str) -> Self {
        self.where_clauses.push(WhereClause::Raw { sql: sql.to_string(), bind: None, boolean: Bool::And });
        self
    }

    fn where_date_part<V>(mut self, part: DatePart, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_clauses.push(WhereClause::DatePart { part, column: col.to_string(), op, bind: bind_one(value), boolean: Bool::And });
        self
    }

    /// Filters by the date portion of a temporal column.
    pub fn where_date<V>(self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_date_part(DatePart::Date, col, op, value)
    }

    /// Filters by the time portion of a temporal column.
    pub fn where_time<V>(self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_date_part(DatePart::Time, col, op, value)
    }

    /// Filters by the day-of-month of a temporal column.
    pub fn where_day<V>(self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_date_part(DatePart::Day, col, op, value)
    }

    /// Filters by the month of a temporal column.
    pub fn where_month<V>(self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_date_part(DatePart::Month, col, op, value)
    }

    /// Filters by the year of a temporal column.
    pub fn where_year<V>(self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.where_date_part(DatePart::Year, col, op, value)
    }

    /// Adds a parenthesized group of OR/AND clauses, e.g.:
    ///
    /// ```rust,ignore
    /// query.where_group(|g| g.filter("a", Op::Eq, 1).or_filter("b", Op::Eq, 2))
    /// ```
    pub fn where_group<F>(mut self, f: F) -> Self
    where
        F: FnOnce(WhereGroupBuilder) -> WhereGroupBuilder,
    {
        let group = f(WhereGroupBuilder::new());
        self.where_clauses.push(WhereClause::Nested { clauses: group.clauses, boolean: Bool::And });
        self
    }

    /// Adds an `EXISTS` correlated subquery clause. Used internally by the relationship
    /// engine's existence checks.
    pub fn where_exists(mut self, subquery: &str) -> Self {
        self.where_clauses.push(WhereClause::Exists { subquery: subquery.to_string(), negate: false, boolean: Bool::And });
        self
    }

    /// Includes soft-deleted rows in this query instead of the default scope that
    /// excludes them. Has no effect on models without a `#[orm(soft_delete)]` column.
    pub fn with_deleted(mut self) -> Self {
        self.with_deleted = true;
        self
    }

    /// Adds an ORDER BY clause to the query.
    pub fn order(mut self, order: &str) -> Self {
        self.order_clauses.push(order.to_string());
        self
    }

    /// Activates debug mode for this query; the generated SQL is logged at `DEBUG` level.
    pub fn debug(mut self) -> Self {
        self.debug_mode = true;
        self
    }

    /// Adds a JOIN clause to the query.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// query.join("posts", "users.id = posts.user_id")
    /// ```
    pub fn join(mut self, table: &str, s_query: &str) -> Self {
        self.joins_clauses.push(format!("JOIN {} ON {}", self.grammar().quote_ident(table), self.parse_join_condition(s_query)));
        self
    }

    fn parse_join_condition(&self, s_query: &str) -> String {
        let trimmed_value = s_query.replace(" ", "");
        let values = trimmed_value.split_once("=");
        if let Some((first, second)) = values {
            format!("{} = {}", self.grammar().quote_qualified(first), self.grammar().quote_qualified(second))
        } else {
            panic!("Failed to parse JOIN, Ex to use: .join(\"table2\", \"table.column = table2.column2\")")
        }
    }

    fn join_generic(mut self, join_type: &str, table: &str, s_query: &str) -> Self {
        let condition = self.parse_join_condition(s_query);
        self.joins_clauses.push(format!("{} JOIN {} ON {}", join_type, self.grammar().quote_ident(table), condition));
        self
    }

    /// Adds a LEFT JOIN clause.
    pub fn left_join(self, table: &str, on: &str) -> Self {
        self.join_generic("LEFT", table, on)
    }

    /// Adds a RIGHT JOIN clause.
    pub fn right_join(self, table: &str, on: &str) -> Self {
        self.join_generic("RIGHT", table, on)
    }

    /// Adds an INNER JOIN clause.
    pub fn inner_join(self, table: &str, on: &str) -> Self {
        self.join_generic("INNER", table, on)
    }

    /// Adds a FULL JOIN clause. Support depends on the underlying engine (SQLite has none).
    pub fn full_join(self, table: &str, on: &str) -> Self {
        self.join_generic("FULL", table, on)
    }

    /// Marks the query to return DISTINCT results.
    pub fn distinct(mut self) -> Self {
        self.is_distinct = true;
        self
    }

    /// Adds a GROUP BY clause to the query.
    pub fn group_by(mut self, columns: &str) -> Self {
        self.group_by_clauses.push(columns.to_string());
        self
    }

    /// Adds a HAVING clause to the query, applied after `GROUP BY`.
    pub fn having<V>(mut self, col: &'static str, op: Op, value: V) -> Self
    where
        V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
    {
        self.having_clauses.push(WhereClause::Basic { column: col.to_string(), op, bind: bind_one(value), boolean: Bool::And });
        self
    }

    /// Returns the COUNT of rows matching the query.
    pub async fn count(mut self) -> Result<i64, sqlx::Error> {
        self.select_columns = vec!["COUNT(*)".to_string()];
        self.scalar::<i64>().await
    }

    /// Returns the SUM of the specified column.
    pub async fn sum<N>(mut self, column: &str) -> Result<N, sqlx::Error>
    where
        N: for<'r> Decode<'r, Any> + Type<Any> + Send + Unpin,
    {
        self.select_columns = vec![format!("SUM({})", column)];
        self.scalar::<N>().await
    }

    /// Returns the AVG of the specified column.
    pub async fn avg<N>(mut self, column: &str) -> Result<N, sqlx::Error>
    where
        N: for<'r> Decode<'r, Any> + Type<Any> + Send + Unpin,
    {
        self.select_columns = vec![format!("AVG({})", column)];
        self.scalar::<N>().await
    }

    /// Returns the MIN of the specified column.
    pub async fn min<N>(mut self, column: &str) -> Result<N, sqlx::Error>
    where
        N: for<'r> Decode<'r, Any> + Type<Any> + Send + Unpin,
    {
        self.select_columns = vec![format!("MIN({})", column)];
        self.scalar::<N>().await
    }

    /// Returns the MAX of the specified column.
    pub async fn max<N>(mut self, column: &str) -> Result<N, sqlx::Error>
    where
        N: for<'r> Decode<'r, Any> + Type<Any> + Send + Unpin,
    {
        self.select_columns = vec![format!("MAX({})", column)];
        self.scalar::<N>().await
    }

    /// Applies pagination with validation and limits.
    ///
    /// 1. Validates that `value` is non-negative
    /// 2. If `value` > `max_value`, uses `default` instead
    /// 3. Calculates offset as: `value * page`
    /// 4. Sets limit to `value`
    pub fn pagination(mut self, max_value: usize, default: usize, page: usize, value: isize) -> Result<Self, Error> {
        if value < 0 {
            return Err(Error::InvalidArgument("value cannot be negative".into()));
        }

        let mut f_value = value as usize;
        if f_value > max_value {
            f_value = default;
        }

        self = self.offset(f_value * page);
        self = self.limit(f_value);

        Ok(self)
    }

    /// Selects specific columns to return. By default, queries use `SELECT *`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select_columns.push(columns.to_string().to_snake_case());
        self
    }

    /// Sets the query offset (pagination).
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the maximum number of records to return.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    // ========================================================================
    // Insert Operation
    // ========================================================================

    /// Inserts a new record into the database based on the model instance.
    ///
    /// Values are serialized to strings via the model's `to_map()`, then bound through
    /// [`ValueBinder`] against each column's declared SQL type.
    pub fn insert<'b>(&'b mut self, model: &'b T) -> BoxFuture<'b, Result<(), sqlx::Error>> {
        Box::pin(async move {
            let data_map = model.to_map();
            if data_map.is_empty() {
                return Ok(());
            }

            let grammar = self.grammar();
            let table_name = self.table_name.to_snake_case();
            let columns_info = T::columns();

            let mut target_columns = Vec::new();
            let mut bindings: Vec<(String, &str)> = Vec::new();

            for (col_name, value) in data_map {
                let col_name_clean = col_name.strip_prefix("r#").unwrap_or(&col_name).to_snake_case();
                target_columns.push(grammar.quote_ident(&col_name_clean));

                let sql_type = columns_info.iter().find(|c| c.name == col_name).map(|c| c.sql_type).unwrap_or("TEXT");
                bindings.push((value, sql_type));
            }

            let mut counter = 1;
            let placeholders: Vec<String> = bindings
                .iter()
                .map(|(_, sql_type)| grammar.cast_placeholder(grammar.placeholder(&mut counter), sql_type))
                .collect();

            let query_str = format!(
                "INSERT INTO {} ({}) VALUES ({})",
                grammar.quote_ident(&table_name),
                target_columns.join(", "),
                placeholders.join(", ")
            );

            if self.debug_mode {
                log::debug!("SQL: {}", query_str);
            }

            let mut args = AnyArguments::default();
            for (val_str, sql_type) in bindings {
                if args.bind_value(&val_str, sql_type, &self.driver).is_err() {
                    let _ = args.add(val_str);
                }
            }

            sqlx::query_with(&query_str, args).execute(self.tx.executor()).await?;
            Ok(())
        })
    }

    // ========================================================================
    // Query Execution Methods
    // ========================================================================

    /// Returns the generated SQL string for debugging purposes (placeholders, not values).
    pub fn to_sql(&self) -> String {
        let grammar = self.grammar();
        let mut query = String::from("SELECT ");

        if self.is_distinct {
            query.push_str("DISTINCT ");
        }

        if self.select_columns.is_empty() {
            query.push('*');
        } else {
            query.push_str(&self.select_columns.join(", "));
        }

        query.push_str(" FROM ");
        query.push_str(&grammar.quote_ident(&self.table_name.to_snake_case()));
        query.push(' ');

        if !self.joins_clauses.is_empty() {
            query.push_str(&self.joins_clauses.join(" "));
        }

        let mut dummy_args = AnyArguments::default();
        let mut dummy_counter = 1;
        query.push_str(&self.compile_where(grammar, &mut dummy_args, &mut dummy_counter));

        if !self.group_by_clauses.is_empty() {
            query.push_str(&format!(" GROUP BY {}", self.group_by_clauses.join(", ")));
        }

        if !self.having_clauses.is_empty() {
            query.push_str(" HAVING ");
            query.push_str(&grammar.compile_clause_list(&self.having_clauses, &mut dummy_args, &mut dummy_counter));
        }

        if !self.order_clauses.is_empty() {
            query.push_str(&format!(" ORDER BY {}", &self.order_clauses.join(", ")));
        }

        query
    }

    /// Renders the `WHERE` clause (including the implicit soft-delete scope).
    pub(crate) fn compile_where(&self, grammar: &dyn Grammar, args: &mut AnyArguments<'_>, counter: &mut usize) -> String {
        let mut sql = String::from(" WHERE 1=1");
        for clause in &self.where_clauses {
            sql.push_str(match clause_boolean(clause) {
                Bool::And => " AND ",
                Bool::Or => " OR ",
            });
            sql.push_str(&grammar.render_clause(clause, args, counter));
        }

        if let Some(col) = self.soft_delete_column() {
            if !self.with_deleted {
                sql.push_str(&format!(" AND {} IS NULL", grammar.quote_ident(&col)));
            }
        }

        sql
    }

    /// Generates the list of column selection SQL arguments for a result type `R`.
    ///
    /// Every column is qualified by its own declaring table and aliased as
    /// `{table}__{column}`, regardless of whether this particular query joins.
    /// `FromAnyRow` implementations look up that alias first and fall back to
    /// the bare column name, so this is what lets a join return a tuple like
    /// `(User, Account)` without the two structs' same-named columns (e.g.
    /// `id`) colliding.
    fn select_args_sql<R: AnyImpl>(&self) -> Vec<String> {
        let grammar = self.grammar();
        let struct_cols = R::columns();

        if !struct_cols.is_empty() {
            let wanted: Vec<_> = struct_cols
                .iter()
                .filter(|c| self.select_columns.is_empty() || self.select_columns.contains(&c.column.to_snake_case()))
                .collect();

            return wanted
                .iter()
                .map(|c| {
                    let col_snake = c.column.to_snake_case();
                    let table_snake = c.table.to_snake_case();
                    let alias = format!("{}__{}", table_snake, col_snake);
                    let qualified = format!("{}.{}", grammar.quote_ident(&table_snake), grammar.quote_ident(&col_snake));

                    let expr = if is_temporal_type(c.sql_type) && matches!(self.driver, Drivers::Postgres) {
                        format!("to_json({}) #>> '{{}}'", qualified)
                    } else {
                        qualified
                    };

                    format!("{} AS {}", expr, grammar.quote_ident(&alias))
                })
                .collect();
        }

        if !self.select_columns.is_empty() {
            return self
                .select_columns
                .iter()
                .map(|c| if c.contains('(') { c.clone() } else { grammar.quote_ident(c) })
                .collect();
        }

        vec!["*".to_string()]
    }

    /// Executes the query and returns a list of results.
    pub async fn scan<R>(mut self) -> Result<Vec<R>, sqlx::Error>
    where
        R: for<'r> FromRow<'r, AnyRow> + AnyImpl + Send + Unpin,
    {
        let grammar = self.grammar();
        let mut query = String::from("SELECT ");

        if self.is_distinct {
            query.push_str("DISTINCT ");
        }

        query.push_str(&self.select_args_sql::<R>().join(", "));
        query.push_str(" FROM ");
        query.push_str(&grammar.quote_ident(&self.table_name.to_snake_case()));
        query.push(' ');
        if !self.joins_clauses.is_empty() {
            query.push_str(&self.joins_clauses.join(" "));
        }

        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        query.push_str(&self.compile_where(grammar, &mut args, &mut arg_counter));

        if !self.group_by_clauses.is_empty() {
            query.push_str(&format!(" GROUP BY {}", self.group_by_clauses.join(", ")));
        }

        if !self.having_clauses.is_empty() {
            query.push_str(" HAVING ");
            query.push_str(&grammar.compile_clause_list(&self.having_clauses, &mut args, &mut arg_counter));
        }

        if !self.order_clauses.is_empty() {
            query.push_str(&format!(" ORDER BY {}", self.order_clauses.join(", ")));
        }

        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {}", grammar.placeholder(&mut arg_counter)));
            let _ = args.add(limit as i64);
        }

        if let Some(offset) = self.offset {
            query.push_str(&format!(" OFFSET {}", grammar.placeholder(&mut arg_counter)));
            let _ = args.add(offset as i64);
        }

        if self.debug_mode {
            log::debug!("SQL: {}", query);
        }

        sqlx::query_as_with::<_, R, _>(&query, args).fetch_all(self.tx.executor()).await
    }

    /// Executes the query and returns only the first result.
    ///
    /// Automatically adds `LIMIT 1` and orders by the primary key (if none was requested)
    /// to ensure consistent, deterministic results.
    pub async fn first<R>(mut self) -> Result<R, sqlx::Error>
    where
        R: for<'r> FromRow<'r, AnyRow> + AnyImpl + Send + Unpin,
    {
        let grammar = self.grammar();
        let mut query = String::from("SELECT ");

        if self.is_distinct {
            query.push_str("DISTINCT ");
        }

        query.push_str(&self.select_args_sql::<R>().join(", "));
        query.push_str(" FROM ");
        query.push_str(&grammar.quote_ident(&self.table_name.to_snake_case()));
        query.push(' ');
        if !self.joins_clauses.is_empty() {
            query.push_str(&self.joins_clauses.join(" "));
        }

        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        query.push_str(&self.compile_where(grammar, &mut args, &mut arg_counter));

        if !self.group_by_clauses.is_empty() {
            query.push_str(&format!(" GROUP BY {}", self.group_by_clauses.join(", ")));
        }

        if !self.having_clauses.is_empty() {
            query.push_str(" HAVING ");
            query.push_str(&grammar.compile_clause_list(&self.having_clauses, &mut args, &mut arg_counter));
        }

        let pk_column = T::columns()
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name.strip_prefix("r#").unwrap_or(c.name).to_snake_case());

        if !self.order_clauses.is_empty() {
            query.push_str(&format!(" ORDER BY {}", self.order_clauses.join(", ")));
        } else if let Some(pk) = pk_column {
            query.push_str(&format!(
                " ORDER BY {}.{} ASC",
                grammar.quote_ident(&self.table_name.to_snake_case()),
                grammar.quote_ident(&pk)
            ));
        }

        query.push_str(" LIMIT 1");

        if self.debug_mode {
            log::debug!("SQL: {}", query);
        }

        sqlx::query_as_with::<_, R, _>(&query, args).fetch_one(self.tx.executor()).await
    }

    /// Executes the query and returns a single scalar value.
    pub async fn scalar<O>(mut self) -> Result<O, sqlx::Error>
    where
        O: for<'r> Decode<'r, Any> + Type<Any> + Send + Unpin,
    {
        let grammar = self.grammar();
        let mut query = String::from("SELECT ");

        if self.is_distinct {
            query.push_str("DISTINCT ");
        }

        if self.select_columns.is_empty() {
            return Err(sqlx::Error::ColumnNotFound("is not possible get data without column".to_string()));
        }

        let mut select_cols = Vec::with_capacity(self.select_columns.capacity());
        for col in &self.select_columns {
            if !self.joins_clauses.is_empty() {
                select_cols.push(grammar.quote_qualified(col));
            } else if col.contains('(') {
                select_cols.push(col.clone());
            } else {
                select_cols.push(grammar.quote_ident(col));
            }
        }

        query.push_str(&select_cols.join(", "));
        query.push_str(" FROM ");
        query.push_str(&grammar.quote_ident(&self.table_name.to_snake_case()));
        query.push(' ');
        if !self.joins_clauses.is_empty() {
            query.push_str(&self.joins_clauses.join(" "));
        }

        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        query.push_str(&self.compile_where(grammar, &mut args, &mut arg_counter));

        if !self.group_by_clauses.is_empty() {
            query.push_str(&format!(" GROUP BY {}", self.group_by_clauses.join(", ")));
        }

        if !self.having_clauses.is_empty() {
            query.push_str(" HAVING ");
            query.push_str(&grammar.compile_clause_list(&self.having_clauses, &mut args, &mut arg_counter));
        }

        if !self.order_clauses.is_empty() {
            query.push_str(&format!(" ORDER BY {}", &self.order_clauses.join(", ")));
        }

        query.push_str(" LIMIT 1");

        if self.debug_mode {
            log::debug!("SQL: {}", query);
        }

        let row = sqlx::query_with::<_, _>(&query, args).fetch_one(self.tx.executor()).await?;
        row.try_get::<O, _>(0)
    }

    /// Updates a single column in the database.
    pub fn update<'b, V>(&'b mut self, col: &str, value: V) -> BoxFuture<'b, Result<u64, sqlx::Error>>
    where
        V: ToString + Send + Sync,
    {
        let mut map = std::collections::HashMap::new();
        map.insert(col.to_string(), value.to_string());
        self.execute_update(map)
    }

    /// Updates all active columns based on the model instance.
    pub fn updates<'b>(&'b mut self, model: &T) -> BoxFuture<'b, Result<u64, sqlx::Error>> {
        self.execute_update(model.to_map())
    }

    /// Updates columns based on a partial model (struct implementing `AnyImpl`).
    pub fn update_partial<'b, P: AnyImpl>(&'b mut self, partial: &P) -> BoxFuture<'b, Result<u64, sqlx::Error>> {
        self.execute_update(partial.to_map())
    }

    /// Internal helper to execute an UPDATE query from a map of values.
    fn execute_update<'b>(
        &'b mut self,
        mut data_map: std::collections::HashMap<String, String>,
    ) -> BoxFuture<'b, Result<u64, sqlx::Error>> {
        Box::pin(async move {
            let grammar = self.grammar();
            let table_name = self.table_name.to_snake_case();
            let mut query = format!("UPDATE {} SET ", grammar.quote_ident(&table_name));

            // Stamp `#[orm(update_time)]` columns with the current time unless the
            // caller already supplied an explicit value for them.
            if let Some(col) = self.columns_info.iter().find(|c| c.update_time) {
                let col_name_clean = col.name.strip_prefix("r#").unwrap_or(col.name).to_snake_case();
                let already_set = data_map.keys().any(|k| {
                    let clean = k.strip_prefix("r#").unwrap_or(k).to_snake_case();
                    clean == col_name_clean
                });
                if !already_set {
                    let now = temporal::format_datetime_for_driver(&chrono::Utc::now(), &self.driver);
                    data_map.insert(col.name.to_string(), now);
                }
            }

            let mut bindings: Vec<(String, &str)> = Vec::new();
            let mut set_clauses = Vec::new();
            let mut arg_counter = 1;

            for (col_name, value) in data_map {
                let col_name_clean = col_name.strip_prefix("r#").unwrap_or(&col_name).to_snake_case();

                let sql_type = self
                    .columns_info
                    .iter()
                    .find(|c| c.name == col_name || c.name == col_name_clean)
                    .map(|c| c.sql_type)
                    .unwrap_or("TEXT");

                let placeholder = grammar.cast_placeholder(grammar.placeholder(&mut arg_counter), sql_type);
                set_clauses.push(format!("{} = {}", grammar.quote_ident(&col_name_clean), placeholder));
                bindings.push((value, sql_type));
            }

            if set_clauses.is_empty() {
                return Ok(0);
            }

            query.push_str(&set_clauses.join(", "));

            let mut args = AnyArguments::default();
            for (val_str, sql_type) in bindings {
                if args.bind_value(&val_str, sql_type, &self.driver).is_err() {
                    let _ = args.add(val_str);
                }
            }

            query.push_str(&self.compile_where(grammar, &mut args, &mut arg_counter));

            if self.debug_mode {
                log::debug!("SQL: {}", query);
            }

            let result = sqlx::query_with(&query, args).execute(self.tx.executor()).await?;
            Ok(result.rows_affected())
        })
    }

    /// Deletes rows matching the current filters.
    ///
    /// If the model declares a `#[orm(soft_delete)]` column, this performs a soft delete
    /// (an `UPDATE` that stamps the column with the current time) instead of an actual
    /// `DELETE`. Use [`QueryBuilder::hard_delete`] to bypass that and remove rows for good.
    pub async fn delete(mut self) -> Result<u64, sqlx::Error> {
        if let Some(col) = self.soft_delete_column() {
            let now = temporal::format_datetime_for_driver(&chrono::Utc::now(), &self.driver);
            return self.execute_update(std::collections::HashMap::from([(col, now)])).await;
        }

        self.execute_hard_delete().await
    }

    /// Permanently deletes rows matching the current filters, ignoring soft-delete
    /// semantics entirely. Combine with `.with_deleted()` to target already soft-deleted
    /// rows.
    pub async fn hard_delete(self) -> Result<u64, sqlx::Error> {
        self.execute_hard_delete().await
    }

    async fn execute_hard_delete(self) -> Result<u64, sqlx::Error> {
        let grammar = self.grammar();
        let mut query = format!("DELETE FROM {}", grammar.quote_ident(&self.table_name.to_snake_case()));

        let mut args = AnyArguments::default();
        let mut arg_counter = 1;
        query.push_str(&self.compile_where(grammar, &mut args, &mut arg_counter));

        if self.debug_mode {
            log::debug!("SQL: {}", query);
        }

        let result = sqlx::query_with(&query, args).execute(self.tx.executor()).await?;
        Ok(result.rows_affected())
    }
}

fn clause_boolean(clause: &WhereClause) -> Bool {
    match clause {
        WhereClause::Basic { boolean, .. }
        | WhereClause::ColumnCompare { boolean, .. }
        | WhereClause::Nested { boolean, .. }
        | WhereClause::In { boolean, .. }
        | WhereClause::Null { boolean, .. }
        | WhereClause::Raw { boolean, .. }
        | WhereClause::Exists { boolean, .. }
        | WhereClause::Between { boolean, .. }
        | WhereClause::BetweenColumns { boolean, .. }
        | WhereClause::DatePart { boolean, .. } => *boolean,
    }
}
