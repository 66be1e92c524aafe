//! # Relationship Engine Module
//!
//! This module implements eager/lazy loading for the four relationship
//! shapes an Eloquent-style active-record layer needs: [`HasOne`], [`HasMany`],
//! [`BelongsTo`], and [`BelongsToMany`] (with its pivot table helpers).
//! `Through` and morphing (`MorphTo`/`MorphMany`) relations are intentionally
//! not implemented — see the module-level Non-goals note below.
//!
//! ## Features
//!
//! - **Lazy load**: fetch a single model's related row(s) on demand.
//! - **Eager load batching**: given a slice of already-loaded parent models,
//!   resolve their related rows with one `WHERE foreign_key IN (...)` query
//!   instead of one query per parent (the N+1 problem every ORM relation
//!   layer exists to avoid).
//! - **Pivot helpers**: `attach`/`detach`/`sync`/`toggle`/`update_existing_pivot`
//!   for `BelongsToMany` relations, operating on a plain pivot table through
//!   [`crate::database::Database::raw`].
//!
//! ## Non-goals
//!
//! `HasManyThrough`, `HasOneThrough`, `MorphTo`, `MorphMany`, and the other
//! polymorphic/through relation variants are out of scope; they require a
//! second level of foreign-key indirection or a type-discriminator column
//! that the rest of this ORM's model layer (one Rust struct, one table) has
//! no representation for.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bottle_orm::relations::{has_many, eager_load_has_many};
//!
//! // Lazy: one user's posts
//! let posts: Vec<Post> = has_many(&db, &user, "user_id").await?;
//!
//! // Eager: every loaded user's posts, batched in one query
//! let by_user = eager_load_has_many::<User, Post>(&db, &users, "id", "user_id").await?;
//! ```

use std::collections::HashMap;

use heck::ToSnakeCase;

use crate::any_struct::AnyImpl;
use crate::database::{Connection, Database};
use crate::grammar::{grammar_for, Op};
use crate::model::Model;
use crate::Error;

/// Returns the dialect-correct placeholder for the `n`th bound parameter
/// (1-indexed), delegating to the same [`crate::grammar::Grammar`] the query
/// builder uses so pivot-table SQL matches the rest of the crate's dialect
/// handling (`?` for MySQL/SQLite, `$n` for PostgreSQL).
fn placeholder(db: &Database, n: usize) -> String {
    let grammar = grammar_for(db.driver());
    let mut counter = 0;
    let mut last = String::new();
    for _ in 0..n {
        last = grammar.placeholder(&mut counter);
    }
    last
}

// ============================================================================
// Key Extraction Helpers
// ============================================================================

/// Reads `key` out of a model's `to_map()` representation.
///
/// `Model::to_map()` keys on the raw Rust field identifier rather than a
/// normalized column name, so `key` must be given as it appears in the
/// struct definition (`"user_id"`, not `"UserId"`).
fn key_value<M: Model>(model: &M, key: &str) -> Result<String, Error> {
    model
        .to_map()
        .get(key)
        .cloned()
        .ok_or_else(|| Error::logic_error(&format!("column '{key}' is not present on this model instance")))
}

fn distinct_keys<M: Model>(parents: &[M], key: &'static str) -> Result<Vec<String>, Error> {
    let mut seen = std::collections::HashSet::new();
    let mut keys = Vec::new();
    for parent in parents {
        let value = key_value(parent, key)?;
        if seen.insert(value.clone()) {
            keys.push(value);
        }
    }
    Ok(keys)
}

// ============================================================================
// HasOne / HasMany
// ============================================================================

/// Loads the single `Related` row whose `foreign_key` column equals `parent`'s
/// primary key (lazy load of a `HasOne` relation).
///
/// Returns `Ok(None)` rather than an error when no related row exists.
pub async fn has_one<Parent, Related>(db: &Database, parent: &Parent, foreign_key: &'static str) -> Result<Option<Related>, Error>
where
    Parent: Model,
    Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
{
    let local_value = key_value(parent, "id")?;
    match db.model::<Related>().filter(foreign_key, Op::Eq, local_value).first::<Related>().await {
        Ok(related) => Ok(Some(related)),
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Loads every `Related` row whose `foreign_key` column equals `parent`'s
/// primary key (lazy load of a `HasMany` relation).
pub async fn has_many<Parent, Related>(db: &Database, parent: &Parent, foreign_key: &'static str) -> Result<Vec<Related>, Error>
where
    Parent: Model,
    Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
{
    let local_value = key_value(parent, "id")?;
    Ok(db.model::<Related>().filter(foreign_key, Op::Eq, local_value).scan::<Related>().await?)
}

/// Eager-loads a `HasOne` relation for every model in `parents` with a single
/// `WHERE foreign_key IN (...)` query, returning a map from each parent's
/// `local_key` value to its related row.
///
/// Parents whose related row wasn't found simply have no entry in the map;
/// callers look the key up with [`HashMap::get`] rather than indexing.
pub async fn eager_load_has_one<Parent, Related>(
    db: &Database,
    parents: &[Parent],
    local_key: &'static str,
    foreign_key: &'static str,
) -> Result<HashMap<String, Related>, Error>
where
    Parent: Model,
    Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
{
    let keys = distinct_keys(parents, local_key)?;
    if keys.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<Related> = db.model::<Related>().where_in(foreign_key, keys).scan::<Related>().await?;

    let fk_field = foreign_key.to_snake_case();
    let mut out = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(value) = row.to_map().get(&fk_field) {
            out.insert(value.clone(), row);
        }
    }
    Ok(out)
}

/// Eager-loads a `HasMany` relation for every model in `parents` with a
/// single `WHERE foreign_key IN (...)` query, returning a map from each
/// parent's `local_key` value to its (possibly empty) list of related rows.
pub async fn eager_load_has_many<Parent, Related>(
    db: &Database,
    parents: &[Parent],
    local_key: &'static str,
    foreign_key: &'static str,
) -> Result<HashMap<String, Vec<Related>>, Error>
where
    Parent: Model,
    Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
{
    let keys = distinct_keys(parents, local_key)?;
    if keys.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<Related> = db.model::<Related>().where_in(foreign_key, keys).scan::<Related>().await?;

    let fk_field = foreign_key.to_snake_case();
    let mut out: HashMap<String, Vec<Related>> = HashMap::new();
    for row in rows {
        if let Some(value) = row.to_map().get(&fk_field) {
            out.entry(value.clone()).or_default().push(row);
        }
    }
    Ok(out)
}

// ============================================================================
// BelongsTo
// ============================================================================

/// Loads the single `Related` row that `child`'s `foreign_key` column points
/// at (lazy load of a `BelongsTo` relation, the inverse of `HasOne`/`HasMany`).
pub async fn belongs_to<Child, Related>(db: &Database, child: &Child, foreign_key: &str) -> Result<Option<Related>, Error>
where
    Child: Model,
    Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
{
    let owner_value = key_value(child, foreign_key)?;
    match db.model::<Related>().filter("id", Op::Eq, owner_value).first::<Related>().await {
        Ok(related) => Ok(Some(related)),
        Err(sqlx::Error::RowNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Eager-loads a `BelongsTo` relation for every model in `children` with a
/// single `WHERE id IN (...)` query, returning a map from each owner's
/// primary-key value to its row.
pub async fn eager_load_belongs_to<Child, Related>(
    db: &Database,
    children: &[Child],
    foreign_key: &'static str,
) -> Result<HashMap<String, Related>, Error>
where
    Child: Model,
    Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
{
    let keys = distinct_keys(children, foreign_key)?;
    if keys.is_empty() {
        return Ok(HashMap::new());
    }
    let rows: Vec<Related> = db.model::<Related>().where_in("id", keys).scan::<Related>().await?;

    let mut out = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(value) = row.to_map().get("id") {
            out.insert(value.clone(), row);
        }
    }
    Ok(out)
}

// ============================================================================
// BelongsToMany / Pivot
// ============================================================================

/// Describes a `BelongsToMany` relation: a pivot table joining two model
/// tables, each referenced by its own foreign key column.
///
/// # Example
///
/// ```rust,ignore
/// let pivot = BelongsToMany {
///     pivot_table: "role_user",
///     foreign_pivot_key: "user_id",
///     related_pivot_key: "role_id",
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BelongsToMany {
    /// The pivot (join) table name.
    pub pivot_table: &'static str,
    /// The pivot column referencing the parent side's primary key.
    pub foreign_pivot_key: &'static str,
    /// The pivot column referencing the related side's primary key.
    pub related_pivot_key: &'static str,
}

impl BelongsToMany {
    /// Creates a new pivot relation description.
    pub fn new(pivot_table: &'static str, foreign_pivot_key: &'static str, related_pivot_key: &'static str) -> Self {
        Self { pivot_table, foreign_pivot_key, related_pivot_key }
    }

    /// Loads every `Related` row attached to `parent` through this pivot
    /// (lazy load of a `BelongsToMany` relation).
    pub async fn load<Parent, Related>(&self, db: &Database, parent: &Parent) -> Result<Vec<Related>, Error>
    where
        Parent: Model,
        Related: Model + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
    {
        let parent_id = key_value(parent, "id")?;
        let related_ids = self.pivot_related_ids(db, &[parent_id]).await?;
        let ids: Vec<String> = related_ids.values().flatten().cloned().collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(db.model::<Related>().where_in("id", ids).scan::<Related>().await?)
    }

    /// Eager-loads this pivot relation for every model in `parents` with two
    /// queries total (one against the pivot table, one against the related
    /// table), regardless of how many parents are given.
    pub async fn eager_load<Parent, Related>(
        &self,
        db: &Database,
        parents: &[Parent],
    ) -> Result<HashMap<String, Vec<Related>>, Error>
    where
        Parent: Model,
        Related: Model + Clone + Send + Sync + Unpin + AnyImpl + for<'r> sqlx::FromRow<'r, sqlx::any::AnyRow>,
    {
        let parent_ids = distinct_keys(parents, "id")?;
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let by_parent = self.pivot_related_ids(db, &parent_ids).await?;

        let all_related_ids: Vec<String> =
            by_parent.values().flatten().cloned().collect::<std::collections::HashSet<_>>().into_iter().collect();
        if all_related_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let related_rows: Vec<Related> = db.model::<Related>().where_in("id", all_related_ids).scan::<Related>().await?;
        let related_by_id: HashMap<String, Related> = related_rows
            .into_iter()
            .filter_map(|row| row.to_map().get("id").cloned().map(|id| (id, row)))
            .collect();

        // A related row attached to more than one parent (a shared role, a
        // shared tag) is cloned once per parent it belongs to.
        let mut out: HashMap<String, Vec<Related>> = HashMap::new();
        for (parent_id, related_ids) in by_parent {
            let mut rows = Vec::new();
            for related_id in related_ids {
                if let Some(row) = related_by_id.get(&related_id) {
                    rows.push(row.clone());
                }
            }
            out.insert(parent_id, rows);
        }
        Ok(out)
    }

    /// Runs the pivot-table query shared by [`BelongsToMany::load`] and
    /// [`BelongsToMany::eager_load`], returning a map from parent id to the
    /// list of related ids attached to it.
    async fn pivot_related_ids(&self, db: &Database, parent_ids: &[String]) -> Result<HashMap<String, Vec<String>>, Error> {
        let placeholders: Vec<String> = (0..parent_ids.len()).map(|i| placeholder(db, i + 1)).collect();
        let sql = format!(
            "SELECT {}, {} FROM {} WHERE {} IN ({})",
            self.foreign_pivot_key,
            self.related_pivot_key,
            self.pivot_table,
            self.foreign_pivot_key,
            placeholders.join(", ")
        );

        let mut query = db.raw(&sql);
        for id in parent_ids {
            query = query.bind(id.clone());
        }
        let rows: Vec<(String, String)> = query.fetch_all().await?;

        let mut out: HashMap<String, Vec<String>> = HashMap::new();
        for (parent_id, related_id) in rows {
            out.entry(parent_id).or_default().push(related_id);
        }
        Ok(out)
    }

    /// Inserts pivot rows attaching `parent_id` to each of `related_ids`,
    /// ignoring ids that are already attached.
    pub async fn attach(&self, db: &Database, parent_id: &str, related_ids: &[String]) -> Result<(), Error> {
        let existing = self.pivot_related_ids(db, std::slice::from_ref(&parent_id.to_string())).await?;
        let already: std::collections::HashSet<&String> =
            existing.get(parent_id).into_iter().flatten().collect();

        for related_id in related_ids {
            if already.contains(related_id) {
                continue;
            }
            let sql = format!(
                "INSERT INTO {} ({}, {}) VALUES ({}, {})",
                self.pivot_table,
                self.foreign_pivot_key,
                self.related_pivot_key,
                placeholder(db, 1),
                placeholder(db, 2)
            );
            db.raw(&sql).bind(parent_id.to_string()).bind(related_id.clone()).execute().await?;
        }
        Ok(())
    }

    /// Removes pivot rows attaching `parent_id` to each of `related_ids`. If
    /// `related_ids` is empty, detaches every related row from `parent_id`.
    pub async fn detach(&self, db: &Database, parent_id: &str, related_ids: &[String]) -> Result<u64, Error> {
        if related_ids.is_empty() {
            let sql = format!("DELETE FROM {} WHERE {} = {}", self.pivot_table, self.foreign_pivot_key, placeholder(db, 1));
            return Ok(db.raw(&sql).bind(parent_id.to_string()).execute().await?);
        }

        let mut affected = 0;
        for related_id in related_ids {
            let sql = format!(
                "DELETE FROM {} WHERE {} = {} AND {} = {}",
                self.pivot_table,
                self.foreign_pivot_key,
                placeholder(db, 1),
                self.related_pivot_key,
                placeholder(db, 2)
            );
            affected += db.raw(&sql).bind(parent_id.to_string()).bind(related_id.clone()).execute().await?;
        }
        Ok(affected)
    }

    /// Makes `related_ids` exactly the set attached to `parent_id`: detaches
    /// anything not in the list, attaches anything missing from it.
    pub async fn sync(&self, db: &Database, parent_id: &str, related_ids: &[String]) -> Result<(), Error> {
        let existing = self.pivot_related_ids(db, std::slice::from_ref(&parent_id.to_string())).await?;
        let current: std::collections::HashSet<String> = existing.get(parent_id).cloned().unwrap_or_default().into_iter().collect();
        let desired: std::collections::HashSet<String> = related_ids.iter().cloned().collect();

        let to_detach: Vec<String> = current.difference(&desired).cloned().collect();
        let to_attach: Vec<String> = desired.difference(&current).cloned().collect();

        if !to_detach.is_empty() {
            self.detach(db, parent_id, &to_detach).await?;
        }
        if !to_attach.is_empty() {
            self.attach(db, parent_id, &to_attach).await?;
        }
        Ok(())
    }

    /// Attaches every id in `related_ids` not currently attached, and
    /// detaches every currently-attached id that is in `related_ids` —
    /// the set-symmetric-difference operation Eloquent calls `toggle`.
    pub async fn toggle(&self, db: &Database, parent_id: &str, related_ids: &[String]) -> Result<(), Error> {
        let existing = self.pivot_related_ids(db, std::slice::from_ref(&parent_id.to_string())).await?;
        let current: std::collections::HashSet<String> = existing.get(parent_id).cloned().unwrap_or_default().into_iter().collect();

        let mut to_attach = Vec::new();
        let mut to_detach = Vec::new();
        for id in related_ids {
            if current.contains(id) {
                to_detach.push(id.clone());
            } else {
                to_attach.push(id.clone());
            }
        }
        if !to_detach.is_empty() {
            self.detach(db, parent_id, &to_detach).await?;
        }
        if !to_attach.is_empty() {
            self.attach(db, parent_id, &to_attach).await?;
        }
        Ok(())
    }

    /// Updates extra pivot columns (beyond the two key columns) on the row
    /// joining `parent_id` and `related_id`, e.g. a pivot `expires_at` timestamp.
    pub async fn update_existing_pivot(
        &self,
        db: &Database,
        parent_id: &str,
        related_id: &str,
        column: &str,
        value: &str,
    ) -> Result<u64, Error> {
        let sql = format!(
            "UPDATE {} SET {} = {} WHERE {} = {} AND {} = {}",
            self.pivot_table,
            column,
            placeholder(db, 1),
            self.foreign_pivot_key,
            placeholder(db, 2),
            self.related_pivot_key,
            placeholder(db, 3),
        );
        Ok(db
            .raw(&sql)
            .bind(value.to_string())
            .bind(parent_id.to_string())
            .bind(related_id.to_string())
            .execute()
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn belongs_to_many_describes_pivot_shape() {
        let pivot = BelongsToMany::new("role_user", "user_id", "role_id");
        assert_eq!(pivot.pivot_table, "role_user");
        assert_eq!(pivot.foreign_pivot_key, "user_id");
        assert_eq!(pivot.related_pivot_key, "role_id");
    }
}
