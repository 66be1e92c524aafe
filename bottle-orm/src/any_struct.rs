//! # Any Structure Support
//!
//! This module defines traits and structures to support mapping arbitrary database rows
//! (specifically `AnyRow`) to Rust structs. It provides metadata about columns
//! to facilitate dynamic query construction and result mapping.
//!
//! ## Features
//!
//! - **Dynamic Mapping**: Supports mapping `AnyRow` to struct fields
//! - **Metadata Reflection**: Provides column names and types at runtime
//! - **Extensible**: Can be implemented for custom types
//!
//! ## Example
//!
//! ```rust,ignore
//! use bottle_orm::{AnyImpl, AnyInfo};
//!
//! struct MyStruct {
//!     id: i32,
//!     name: String,
//! }
//!
//! impl AnyImpl for MyStruct {
//!     fn columns() -> Vec<AnyInfo> {
//!         vec![
//!             AnyInfo { column: "id", sql_type: "INTEGER", table: "my_struct" },
//!             AnyInfo { column: "name", sql_type: "TEXT", table: "my_struct" },
//!         ]
//!     }
//! }
//! ```

// ============================================================================
// AnyInfo Structure
// ============================================================================

/// Contains metadata about a database column.
///
/// This struct is used to describe the schema of a model or query result,
/// providing the necessary information for the query builder to construct
/// valid SQL statements.
#[derive(Debug, Clone)]
pub struct AnyInfo {
    /// The name of the column in the database.
    pub column: &'static str,

    /// The SQL type of the column (e.g., "INTEGER", "TEXT", "UUID").
    pub sql_type: &'static str,

    /// The (snake_case) name of the table this column belongs to.
    ///
    /// Carried per-column rather than once per struct so that a projection
    /// spanning several tables (e.g. a tuple returned from a join) can still
    /// tell each of its columns apart and qualify/alias them correctly.
    pub table: &'static str,
}

// ============================================================================
// AnyImpl Trait
// ============================================================================

/// A trait for types that can be mapped from an `AnyRow` and provide column metadata.
///
/// This trait is the backbone of the ORM's reflection capabilities. It allows the
/// system to know which columns correspond to which fields in a Rust struct.
///
/// This trait is typically implemented automatically via the `#[derive(Model)]` or
/// `#[derive(FromAnyRow)]` macros, but can be implemented manually for custom scenarios.
pub trait AnyImpl {
    /// Returns a vector of `AnyInfo` describing the columns associated with this type.
    fn columns() -> Vec<AnyInfo>;

    /// Serializes this instance into a column-name → string-value map.
    ///
    /// Defaults to an empty map, which is the right answer for scalars, tuples,
    /// and anything else that isn't a column-backed struct; `#[derive(Model)]`
    /// and `#[derive(FromAnyRow)]` override this with a real implementation.
    fn to_map(&self) -> std::collections::HashMap<String, String> {
        std::collections::HashMap::new()
    }
}

// ============================================================================
// FromAnyRow Trait
// ============================================================================

/// A trait for types that can be constructed from a single `AnyRow`.
///
/// Unlike `sqlx::FromRow`, this trait is local to the crate, which lets it be
/// implemented for tuples of model structs (`(User, Account)`) to support
/// hydrating a join query directly into a tuple of its constituent models —
/// something the orphan rules forbid for a foreign trait (`sqlx::FromRow`)
/// applied to a foreign type (`std`'s tuples).
pub trait FromAnyRow: Sized {
    /// Builds `Self` from a row, looking up each column under its
    /// `{table}__{column}` alias first and falling back to the bare column
    /// name (so single-table queries that never alias still work).
    fn from_any_row(row: &sqlx::any::AnyRow) -> Result<Self, sqlx::Error>;
}

// ============================================================================
// Primitive Implementations
// ============================================================================

macro_rules! impl_any_primitive {
    ($($t:ty),*) => {
        $(
            impl AnyImpl for $t {
                fn columns() -> Vec<AnyInfo> {
                    Vec::new()
                }
            }
        )*
    };
}

impl_any_primitive!(
    bool,
    i8, i16, i32, i64, isize,
    u8, u16, u32, u64, usize,
    f32, f64,
    String
);

// ============================================================================
// External Type Implementations
// ============================================================================

impl AnyImpl for uuid::Uuid {
    fn columns() -> Vec<AnyInfo> {
        Vec::new()
    }
}

impl AnyImpl for chrono::NaiveDateTime {
    fn columns() -> Vec<AnyInfo> {
        Vec::new()
    }
}

impl AnyImpl for chrono::NaiveDate {
    fn columns() -> Vec<AnyInfo> {
        Vec::new()
    }
}

impl AnyImpl for chrono::NaiveTime {
    fn columns() -> Vec<AnyInfo> {
        Vec::new()
    }
}

impl AnyImpl for chrono::DateTime<chrono::Utc> {
    fn columns() -> Vec<AnyInfo> {
        Vec::new()
    }
}

// ============================================================================
// Option Implementation
// ============================================================================

impl<T: AnyImpl> AnyImpl for Option<T> {
    fn columns() -> Vec<AnyInfo> {
        T::columns()
    }
}

// ============================================================================
// Tuple Implementations
// ============================================================================

macro_rules! impl_any_tuple {
    ($($T:ident),+) => {
        impl<$($T: AnyImpl),+> AnyImpl for ($($T,)+) {
            fn columns() -> Vec<AnyInfo> {
                let mut cols = Vec::new();
                $(cols.extend($T::columns());)+
                cols
            }
        }
    };
}

impl_any_tuple!(T1);
impl_any_tuple!(T1, T2);
impl_any_tuple!(T1, T2, T3);
impl_any_tuple!(T1, T2, T3, T4);
impl_any_tuple!(T1, T2, T3, T4, T5);
impl_any_tuple!(T1, T2, T3, T4, T5, T6);
impl_any_tuple!(T1, T2, T3, T4, T5, T6, T7);
impl_any_tuple!(T1, T2, T3, T4, T5, T6, T7, T8);

// ============================================================================
// FromAnyRow Tuple Implementations
// ============================================================================
//
// Each component decodes itself from the very same row, relying on its own
// `{table}__{column}` aliasing to find only the columns that belong to it.
// This is what makes `.first::<(User, Account)>()` on a joined query work even
// though both structs may declare a same-named column (e.g. `id`).

macro_rules! impl_from_any_row_tuple {
    ($($T:ident),+) => {
        impl<$($T: FromAnyRow),+> FromAnyRow for ($($T,)+) {
            fn from_any_row(row: &sqlx::any::AnyRow) -> Result<Self, sqlx::Error> {
                Ok(($($T::from_any_row(row)?,)+))
            }
        }
    };
}

impl_from_any_row_tuple!(T1);
impl_from_any_row_tuple!(T1, T2);
impl_from_any_row_tuple!(T1, T2, T3);
impl_from_any_row_tuple!(T1, T2, T3, T4);
impl_from_any_row_tuple!(T1, T2, T3, T4, T5);
impl_from_any_row_tuple!(T1, T2, T3, T4, T5, T6);
impl_from_any_row_tuple!(T1, T2, T3, T4, T5, T6, T7);
impl_from_any_row_tuple!(T1, T2, T3, T4, T5, T6, T7, T8);