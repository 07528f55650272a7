//! The closed registry of supported SQL dialects.
//!
//! Every dialect here has a translator generator (`transpiler`), a grammar
//! (`statement`) and a bind style (`named`). Adding a dialect means adding all three.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{MsqlError, MsqlResult};

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    Postgres,
    Sqlite,
}

/// Native positional placeholder syntax of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindStyle {
    /// `?`
    Question,
    /// `$1`, `$2`, ...
    Dollar,
}

impl BindStyle {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            BindStyle::Question => "?".to_string(),
            BindStyle::Dollar => format!("${}", index),
        }
    }
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite];

    /// Resolve a case-insensitive short name. Unknown names never fall back to a default.
    pub fn from_name(name: &str) -> MsqlResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            _ => Err(MsqlError::UnsupportedDialect(name.to_string())),
        }
    }

    /// Canonical short name.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
        }
    }

    pub fn bind_style(&self) -> BindStyle {
        match self {
            Dialect::MySql | Dialect::Sqlite => BindStyle::Question,
            Dialect::Postgres => BindStyle::Dollar,
        }
    }
}

impl FromStr for Dialect {
    type Err = MsqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_name(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
