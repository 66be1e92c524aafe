//! # Connection Configuration Module
//!
//! This module defines `ConnectionConfig`, an in-process description of how to
//! reach one named database connection. It mirrors the configuration maps
//! consumed by [`crate::manager::ConnectionManager`], carrying the same
//! options a `Database`-style URL string can express (and a few that can
//! only be set programmatically, like SQLite's `foreign_key_constraints`
//! flag or MySQL's `strict_mode`).
//!
//! ## Features
//!
//! - **Per-driver validation**: each driver rejects options that don't apply
//!   to it (e.g. a `reconnect` flag under MySQL, a `schema` alias under
//!   PostgreSQL).
//! - **Free-form extras**: a `options` map carries driver-specific knobs
//!   (SSL parameters, `qt_timezone`, etc.) that don't warrant a dedicated
//!   field.
//! - **URL round-trip**: `to_url()` produces the connection string the
//!   existing `Database::connect`/`builder().connect()` entry points accept,
//!   so the manager can keep reusing the sqlx `AnyPool` machinery.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bottle_orm::config::ConnectionConfig;
//!
//! let cfg = ConnectionConfig::postgres("localhost", "app")
//!     .username("app")
//!     .password("secret")
//!     .search_path(vec!["app_schema".to_string()])
//!     .validate()?;
//! ```

use std::collections::HashMap;

use crate::database::Drivers;
use crate::Error;

// ============================================================================
// ConnectionConfig
// ============================================================================

/// A single named connection's configuration.
///
/// Constructed via the per-driver constructors ([`ConnectionConfig::mysql`],
/// [`ConnectionConfig::postgres`], [`ConnectionConfig::sqlite`]) and refined
/// with the builder-style setters, then checked with [`ConnectionConfig::validate`]
/// before being handed to [`crate::manager::ConnectionManager`].
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// The driver this configuration targets. Determines which options are
    /// legal and how [`ConnectionConfig::to_url`] formats the connection string.
    pub driver: Drivers,

    /// Hostname or path. For SQLite this is the database file path, or
    /// `:memory:` for an in-memory database.
    pub host: String,

    /// TCP port. Ignored for SQLite.
    pub port: Option<u16>,

    /// Database name. For SQLite, unused (the `host` field carries the path).
    pub database: String,

    /// Username for authentication. Ignored for SQLite.
    pub username: Option<String>,

    /// Password for authentication. Ignored for SQLite.
    pub password: Option<String>,

    /// Character set (MySQL/MariaDB only, e.g. `"utf8mb4"`).
    pub charset: Option<String>,

    /// Collation (MySQL/MariaDB only).
    pub collation: Option<String>,

    /// Table/index name prefix applied by the schema builder and query
    /// builder (Non-goal-adjacent: stored here, enforced by callers).
    pub prefix: Option<String>,

    /// Whether the prefix also applies to index names.
    pub prefix_indexes: bool,

    /// MySQL-only: run in `STRICT_ALL_TABLES` SQL mode.
    pub strict_mode: Option<bool>,

    /// PostgreSQL-only: schema search path, replacing the banned `schema` alias.
    pub search_path: Option<Vec<String>>,

    /// PostgreSQL-only: whether the manager is allowed to drop/recreate the
    /// search path's schema during a `fresh` migration run.
    pub dont_drop: Option<Vec<String>>,

    /// SQLite-only: enforce `PRAGMA foreign_keys = ON`.
    pub foreign_key_constraints: bool,

    /// Conversion policy for timestamps read back without an explicit
    /// timezone (mirrors the teacher's `qt_timezone` knob).
    pub qt_timezone: Option<String>,

    /// Free-form driver-specific options not promoted to a dedicated field
    /// (SSL parameters and similar). Validated for banned keys per driver.
    pub options: HashMap<String, String>,
}

const MYSQL_BANNED_KEYS: &[&str] = &["reconnect"];
const POSTGRES_BANNED_KEYS: &[&str] = &["schema"];

impl ConnectionConfig {
    fn new(driver: Drivers, host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            driver,
            host: host.into(),
            port: None,
            database: database.into(),
            username: None,
            password: None,
            charset: None,
            collation: None,
            prefix: None,
            prefix_indexes: false,
            strict_mode: None,
            search_path: None,
            dont_drop: None,
            foreign_key_constraints: true,
            qt_timezone: None,
            options: HashMap::new(),
        }
    }

    /// Starts a MySQL/MariaDB connection configuration.
    pub fn mysql(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self::new(Drivers::MySQL, host, database)
    }

    /// Starts a PostgreSQL connection configuration.
    pub fn postgres(host: impl Into<String>, database: impl Into<String>) -> Self {
        let mut cfg = Self::new(Drivers::Postgres, host, database);
        cfg.search_path = None;
        cfg
    }

    /// Starts a SQLite connection configuration. `path` may be a file path or
    /// `:memory:`.
    pub fn sqlite(path: impl Into<String>) -> Self {
        let mut cfg = Self::new(Drivers::SQLite, path, "");
        // `return_qdatetime` defaults true: SQLite has no native temporal
        // type, so datetime columns round-trip through the driver as text
        // and must be parsed back into a typed value rather than left as a
        // raw string.
        cfg.options.insert("return_qdatetime".to_string(), "true".to_string());
        cfg
    }

    /// Sets the TCP port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the username.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the character set (MySQL/MariaDB).
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the collation (MySQL/MariaDB).
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the table/index prefix.
    pub fn prefix(mut self, prefix: impl Into<String>, prefix_indexes: bool) -> Self {
        self.prefix = Some(prefix.into());
        self.prefix_indexes = prefix_indexes;
        self
    }

    /// Enables `STRICT_ALL_TABLES` mode (MySQL/MariaDB).
    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = Some(strict);
        self
    }

    /// Sets the PostgreSQL schema search path.
    pub fn search_path(mut self, schemas: Vec<String>) -> Self {
        self.search_path = Some(schemas);
        self
    }

    /// Sets the PostgreSQL schemas a `fresh` migration run must not drop.
    pub fn dont_drop(mut self, schemas: Vec<String>) -> Self {
        self.dont_drop = Some(schemas);
        self
    }

    /// Enables/disables `PRAGMA foreign_keys` (SQLite).
    pub fn foreign_key_constraints(mut self, enabled: bool) -> Self {
        self.foreign_key_constraints = enabled;
        self
    }

    /// Sets the timezone conversion policy for timestamps read back without
    /// an explicit offset.
    pub fn qt_timezone(mut self, policy: impl Into<String>) -> Self {
        self.qt_timezone = Some(policy.into());
        self
    }

    /// Inserts a free-form driver-specific option.
    ///
    /// Rejected at [`ConnectionConfig::validate`] time if the key is banned
    /// for this config's driver.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Validates the configuration against its driver's rules, returning
    /// `self` unchanged on success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationInvalid`] when:
    /// - MySQL/MariaDB carries a banned option (`reconnect`: the library
    ///   owns reconnection and a caller-supplied flag would conflict with it).
    /// - PostgreSQL carries the banned `schema` alias (use `search_path`).
    /// - PostgreSQL's `database` is empty.
    /// - The host is empty for any non-SQLite driver.
    pub fn validate(self) -> Result<Self, Error> {
        match self.driver {
            Drivers::MySQL => {
                for key in MYSQL_BANNED_KEYS {
                    if self.options.contains_key(*key) {
                        return Err(Error::configuration_invalid(&format!(
                            "MySQL connections may not set '{key}': the library owns reconnection"
                        )));
                    }
                }
                if self.host.is_empty() {
                    return Err(Error::configuration_invalid("MySQL connection requires a host"));
                }
            }
            Drivers::Postgres => {
                for key in POSTGRES_BANNED_KEYS {
                    if self.options.contains_key(*key) {
                        return Err(Error::configuration_invalid(&format!(
                            "PostgreSQL connections may not set '{key}': use search_path instead"
                        )));
                    }
                }
                if self.host.is_empty() {
                    return Err(Error::configuration_invalid("PostgreSQL connection requires a host"));
                }
                if self.database.is_empty() {
                    return Err(Error::configuration_invalid("PostgreSQL connection requires a database name"));
                }
            }
            Drivers::SQLite => {
                if self.host.is_empty() {
                    return Err(Error::configuration_invalid("SQLite connection requires a path"));
                }
            }
        }
        Ok(self)
    }

    /// Renders the configuration as the `<scheme>://...` URL string that
    /// [`crate::database::Database::connect`] and
    /// [`crate::database::DatabaseBuilder::connect`] accept.
    pub fn to_url(&self) -> String {
        match self.driver {
            Drivers::SQLite => {
                if self.host == ":memory:" {
                    "sqlite::memory:".to_string()
                } else {
                    format!("sqlite://{}", self.host)
                }
            }
            Drivers::MySQL => {
                let auth = self.auth_fragment();
                let port = self.port.map(|p| format!(":{p}")).unwrap_or_default();
                format!("mysql://{auth}{}{port}/{}", self.host, self.database)
            }
            Drivers::Postgres => {
                let auth = self.auth_fragment();
                let port = self.port.map(|p| format!(":{p}")).unwrap_or_default();
                let mut url = format!("postgres://{auth}{}{port}/{}", self.host, self.database);
                if let Some(paths) = &self.search_path {
                    if !paths.is_empty() {
                        url.push_str(&format!("?options=-csearch_path%3D{}", paths.join(",")));
                    }
                }
                url
            }
        }
    }

    fn auth_fragment(&self) -> String {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!("{user}:{pass}@"),
            (Some(user), None) => format!("{user}@"),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_rejects_reconnect_option() {
        let cfg = ConnectionConfig::mysql("localhost", "app").option("reconnect", "true");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn postgres_rejects_schema_alias() {
        let cfg = ConnectionConfig::postgres("localhost", "app").option("schema", "public");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sqlite_defaults_return_qdatetime() {
        let cfg = ConnectionConfig::sqlite(":memory:");
        assert_eq!(cfg.options.get("return_qdatetime").map(String::as_str), Some("true"));
        assert_eq!(cfg.to_url(), "sqlite::memory:");
    }

    #[test]
    fn postgres_url_includes_search_path() {
        let cfg = ConnectionConfig::postgres("localhost", "app")
            .username("app")
            .search_path(vec!["app_schema".to_string()]);
        assert!(cfg.to_url().contains("search_path"));
    }
}
