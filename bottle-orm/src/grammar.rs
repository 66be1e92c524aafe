//! # SQL Grammar Layer
//!
//! Centralizes everything that differs between the supported dialects (MySQL/MariaDB,
//! PostgreSQL, SQLite): identifier quoting, placeholder syntax, operator translation, and
//! compilation of WHERE/HAVING clause trees into SQL text. Before this module existed, that
//! knowledge was scattered as inline `match self.driver` arms across the query builder; it
//! now lives in one place per dialect, behind the `Grammar` trait.

use sqlx::{Any, Encode, Type, any::AnyArguments};

use crate::database::Drivers;

// ============================================================================
// Operators
// ============================================================================

/// A typed comparison operator usable in a WHERE/HAVING clause.
///
/// Replaces the earlier raw `&'static str` operator strings with a closed set the grammar
/// layer can translate per dialect (e.g. `ILike` becomes `LIKE` outside PostgreSQL).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    ILike,
}

impl Op {
    /// Renders this operator using the given grammar's dialect-specific translation.
    pub fn render(&self, grammar: &dyn Grammar) -> &'static str {
        grammar.op_sql(*self)
    }
}

/// Logical connective joining a clause to the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bool {
    And,
    Or,
}

/// Date-part extraction used by `whereDate`/`whereTime`/`whereDay`/`whereMonth`/`whereYear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePart {
    Date,
    Time,
    Day,
    Month,
    Year,
}

// ============================================================================
// Bind closures
// ============================================================================

/// A closure that binds one or more values into an `AnyArguments` container.
///
/// Kept as a closure (rather than an enum payload) because the value's concrete type must
/// satisfy `Encode<Any> + Type<Any>` and is only known at the call site that built the
/// clause; the clause tree only needs to know *when* to invoke it during compilation.
pub type BindFn = Box<dyn Fn(&mut AnyArguments<'_>) + Send + Sync>;

/// Wraps a single typed value into a `BindFn`.
pub fn bind_one<V>(value: V) -> BindFn
where
    V: 'static + for<'q> Encode<'q, Any> + Type<Any> + Send + Sync + Clone,
{
    Box::new(move |args| {
        let _ = args.add(value.clone());
    })
}

// ============================================================================
// WHERE clause tree
// ============================================================================

/// A single node of a WHERE/HAVING clause tree.
///
/// This is a tagged sum type rather than a free-form string so the grammar layer can render
/// each kind correctly per dialect (placeholder style, identifier quoting, `NOT` placement)
/// without re-parsing SQL text.
pub enum WhereClause {
    /// `column <op> ?`
    Basic { column: String, op: Op, bind: BindFn, boolean: Bool },
    /// `first <op> second` where both sides are columns, not bound values.
    ColumnCompare { first: String, op: Op, second: String, boolean: Bool },
    /// A parenthesized group of clauses, e.g. produced by a closure-based nested filter.
    Nested { clauses: Vec<WhereClause>, boolean: Bool },
    /// `column IN (?, ?, ...)` / `column NOT IN (...)`
    In { column: String, binds: Vec<BindFn>, negate: bool, boolean: Bool },
    /// `column IS NULL` / `column IS NOT NULL`
    Null { column: String, negate: bool, boolean: Bool },
    /// Raw SQL fragment, optionally with a single bound value, escape hatch for anything the
    /// structured variants don't cover.
    Raw { sql: String, bind: Option<BindFn>, boolean: Bool },
    /// `EXISTS (subquery)` / `NOT EXISTS (subquery)`
    Exists { subquery: String, negate: bool, boolean: Bool },
    /// `column BETWEEN low AND high` / `NOT BETWEEN`
    Between { column: String, low: BindFn, high: BindFn, negate: bool, boolean: Bool },
    /// `column BETWEEN other_col AND another_col`
    BetweenColumns { column: String, low_col: String, high_col: String, negate: bool, boolean: Bool },
    /// `DATE(column) <op> ?` and the Time/Day/Month/Year variants.
    DatePart { part: DatePart, column: String, op: Op, bind: BindFn, boolean: Bool },
}

impl WhereClause {
    fn boolean(&self) -> Bool {
        match self {
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
}

// ============================================================================
// Grammar trait
// ============================================================================

/// Dialect-specific SQL rendering.
///
/// One implementor per supported driver (`MySqlGrammar`, `PostgresGrammar`,
/// `SqliteGrammar`). The query builder, schema builder, and migration runner all compile
/// through whichever grammar matches the active `Drivers` value instead of branching on the
/// driver themselves.
pub trait Grammar: Send + Sync {
    fn driver(&self) -> Drivers;

    /// Wraps a bare identifier (table or column name) in the dialect's quoting character.
    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident)
    }

    /// Wraps a possibly-qualified `table.column` reference, quoting each part.
    fn quote_qualified(&self, ident: &str) -> String {
        match ident.split_once('.') {
            Some((table, column)) => format!("{}.{}", self.quote_ident(table), self.quote_ident(column)),
            None => self.quote_ident(ident),
        }
    }

    /// Returns the placeholder for the Nth bound parameter and advances the counter.
    fn placeholder(&self, counter: &mut usize) -> String {
        let p = "?".to_string();
        *counter += 1;
        p
    }

    /// Translates an `Op` into this dialect's operator text.
    fn op_sql(&self, op: Op) -> &'static str {
        match op {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Lte => "<=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            // Only PostgreSQL has native ILIKE; other dialects fall back to LIKE.
            Op::ILike => "LIKE",
        }
    }

    /// Wraps `column` in whatever date-part extraction expression this dialect supports.
    fn date_part_expr(&self, part: DatePart, column: &str) -> String;

    /// Casts a placeholder for a value bound against `sql_type`, if the dialect requires it
    /// (PostgreSQL needs explicit `::UUID`/`::JSONB`/temporal casts; others don't).
    fn cast_placeholder(&self, placeholder: String, _sql_type: &str) -> String {
        placeholder
    }

    /// Renders a single WHERE clause node (without its leading boolean keyword) and binds
    /// its values into `args` in the same left-to-right order they appear in the SQL text.
    fn render_clause(&self, clause: &WhereClause, args: &mut AnyArguments<'_>, counter: &mut usize) -> String {
        match clause {
            WhereClause::Basic { column, op, bind, .. } => {
                let ph = self.placeholder(counter);
                bind(args);
                format!("{} {} {}", self.quote_qualified(column), op.render(self), ph)
            }
            WhereClause::ColumnCompare { first, op, second, .. } => {
                format!("{} {} {}", self.quote_qualified(first), op.render(self), self.quote_qualified(second))
            }
            WhereClause::Nested { clauses, .. } => format!("({})", self.compile_clause_list(clauses, args, counter)),
            WhereClause::In { column, binds, negate, .. } => {
                let placeholders: Vec<String> = binds
                    .iter()
                    .map(|b| {
                        let ph = self.placeholder(counter);
                        b(args);
                        ph
                    })
                    .collect();
                if placeholders.is_empty() {
                    // An empty IN-list can never match; NOT IN on an empty list always matches.
                    if *negate { "1=1".to_string() } else { "1=0".to_string() }
                } else {
                    format!(
                        "{} {} ({})",
                        self.quote_qualified(column),
                        if *negate { "NOT IN" } else { "IN" },
                        placeholders.join(", ")
                    )
                }
            }
            WhereClause::Null { column, negate, .. } => {
                format!("{} IS {}NULL", self.quote_qualified(column), if *negate { "NOT " } else { "" })
            }
            WhereClause::Raw { sql, bind, .. } => {
                if let Some(b) = bind {
                    b(args);
                }
                sql.clone()
            }
            WhereClause::Exists { subquery, negate, .. } => {
                format!("{}EXISTS ({})", if *negate { "NOT " } else { "" }, subquery)
            }
            WhereClause::Between { column, low, high, negate, .. } => {
                let low_ph = self.placeholder(counter);
                low(args);
                let high_ph = self.placeholder(counter);
                high(args);
                format!(
                    "{} {}BETWEEN {} AND {}",
                    self.quote_qualified(column),
                    if *negate { "NOT " } else { "" },
                    low_ph,
                    high_ph
                )
            }
            WhereClause::BetweenColumns { column, low_col, high_col, negate, .. } => {
                format!(
                    "{} {}BETWEEN {} AND {}",
                    self.quote_qualified(column),
                    if *negate { "NOT " } else { "" },
                    self.quote_qualified(low_col),
                    self.quote_qualified(high_col)
                )
            }
            WhereClause::DatePart { part, column, op, bind, .. } => {
                let ph = self.placeholder(counter);
                bind(args);
                format!("{} {} {}", self.date_part_expr(*part, column), op.render(self), ph)
            }
        }
    }

    /// Renders a full list of clauses, each preceded by its `AND`/`OR` keyword except the
    /// first, which is bare (the caller is expected to have already opened the clause with
    /// `WHERE 1=1` or a similar anchor).
    fn compile_clause_list(&self, clauses: &[WhereClause], args: &mut AnyArguments<'_>, counter: &mut usize) -> String {
        let mut out = String::new();
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 || out.is_empty() {
                out.push_str(match clause.boolean() {
                    Bool::And => " AND ",
                    Bool::Or => " OR ",
                });
            }
            out.push_str(&self.render_clause(clause, args, counter));
        }
        out
    }
}

// ============================================================================
// Per-dialect grammars
// ============================================================================

pub struct MySqlGrammar;
pub struct PostgresGrammar;
pub struct SqliteGrammar;

impl Grammar for MySqlGrammar {
    fn driver(&self) -> Drivers {
        Drivers::MySQL
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident)
    }

    fn date_part_expr(&self, part: DatePart, column: &str) -> String {
        let q = self.quote_qualified(column);
        match part {
            DatePart::Date => format!("DATE({})", q),
            DatePart::Time => format!("TIME({})", q),
            DatePart::Day => format!("DAY({})", q),
            DatePart::Month => format!("MONTH({})", q),
            DatePart::Year => format!("YEAR({})", q),
        }
    }
}

impl Grammar for PostgresGrammar {
    fn driver(&self) -> Drivers {
        Drivers::Postgres
    }

    fn placeholder(&self, counter: &mut usize) -> String {
        let p = format!("${}", counter);
        *counter += 1;
        p
    }

    fn op_sql(&self, op: Op) -> &'static str {
        match op {
            Op::ILike => "ILIKE",
            other => {
                // Reuse the default mapping for everything ILIKE doesn't change.
                match other {
                    Op::Eq => "=",
                    Op::Ne => "!=",
                    Op::Lt => "<",
                    Op::Lte => "<=",
                    Op::Gt => ">",
                    Op::Gte => ">=",
                    Op::Like => "LIKE",
                    Op::NotLike => "NOT LIKE",
                    Op::ILike => unreachable!(),
                }
            }
        }
    }

    fn date_part_expr(&self, part: DatePart, column: &str) -> String {
        let q = self.quote_qualified(column);
        match part {
            DatePart::Date => format!("{}::date", q),
            DatePart::Time => format!("{}::time", q),
            DatePart::Day => format!("EXTRACT(DAY FROM {})", q),
            DatePart::Month => format!("EXTRACT(MONTH FROM {})", q),
            DatePart::Year => format!("EXTRACT(YEAR FROM {})", q),
        }
    }

    fn cast_placeholder(&self, placeholder: String, sql_type: &str) -> String {
        if crate::temporal::is_temporal_type(sql_type) {
            return format!("{}{}", placeholder, crate::temporal::get_postgres_type_cast(sql_type));
        }
        match sql_type {
            "UUID" => format!("{}::UUID", placeholder),
            "JSONB" | "jsonb" => format!("{}::JSONB", placeholder),
            _ => placeholder,
        }
    }
}

impl Grammar for SqliteGrammar {
    fn driver(&self) -> Drivers {
        Drivers::SQLite
    }

    fn date_part_expr(&self, part: DatePart, column: &str) -> String {
        let q = self.quote_qualified(column);
        match part {
            DatePart::Date => format!("strftime('%Y-%m-%d', {})", q),
            DatePart::Time => format!("strftime('%H:%M:%S', {})", q),
            DatePart::Day => format!("CAST(strftime('%d', {}) AS INTEGER)", q),
            DatePart::Month => format!("CAST(strftime('%m', {}) AS INTEGER)", q),
            DatePart::Year => format!("CAST(strftime('%Y', {}) AS INTEGER)", q),
        }
    }
}

/// Returns the grammar implementation for the given driver.
pub fn grammar_for(driver: Drivers) -> &'static dyn Grammar {
    static MYSQL: MySqlGrammar = MySqlGrammar;
    static POSTGRES: PostgresGrammar = PostgresGrammar;
    static SQLITE: SqliteGrammar = SqliteGrammar;

    match driver {
        Drivers::MySQL => &MYSQL,
        Drivers::Postgres => &POSTGRES,
        Drivers::SQLite => &SQLITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_quotes_with_backticks() {
        let g = grammar_for(Drivers::MySQL);
        assert_eq!(g.quote_ident("user"), "`user`");
    }

    #[test]
    fn postgres_placeholders_increment() {
        let g = grammar_for(Drivers::Postgres);
        let mut counter = 1;
        assert_eq!(g.placeholder(&mut counter), "$1");
        assert_eq!(g.placeholder(&mut counter), "$2");
    }

    #[test]
    fn ilike_falls_back_to_like_outside_postgres() {
        let g = grammar_for(Drivers::SQLite);
        assert_eq!(g.op_sql(Op::ILike), "LIKE");
        let g = grammar_for(Drivers::Postgres);
        assert_eq!(g.op_sql(Op::ILike), "ILIKE");
    }

    #[test]
    fn empty_in_list_never_matches() {
        let g = grammar_for(Drivers::SQLite);
        let clause = WhereClause::In { column: "id".into(), binds: vec![], negate: false, boolean: Bool::And };
        let mut args = AnyArguments::default();
        let mut counter = 1;
        assert_eq!(g.render_clause(&clause, &mut args, &mut counter), "1=0");
    }
}
