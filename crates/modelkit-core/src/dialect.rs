//! Backing-store dialects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, QueryErrorKind};

/// Query semantics of a backing engine.
///
/// Adding a dialect means adding a variant here and a render arm in
/// `modelkit-query`; callers never match on dialect names themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Mysql,
    Sqlite,
    #[serde(rename = "mongodb")]
    MongoDb,
}

/// Coarse grouping that decides how a query is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectFamily {
    /// Parameterized SQL.
    Relational,
    /// Filter documents passed to a `find` call.
    Document,
}

impl Dialect {
    /// Stable identifier, as reported by `Connection::dialect`.
    pub const fn name(self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::MongoDb => "mongodb",
        }
    }

    pub const fn family(self) -> DialectFamily {
        match self {
            Dialect::Postgres | Dialect::Mysql | Dialect::Sqlite => DialectFamily::Relational,
            Dialect::MongoDb => DialectFamily::Document,
        }
    }

    pub const fn is_relational(self) -> bool {
        matches!(self.family(), DialectFamily::Relational)
    }

    /// Bind-parameter placeholder for the 1-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Sqlite => format!("?{index}"),
            Dialect::Mysql | Dialect::MongoDb => "?".to_string(),
        }
    }

    /// Quote an identifier, doubling any embedded quote character.
    pub fn quote_ident(self, ident: &str) -> String {
        match self {
            Dialect::Mysql => format!("`{}`", ident.replace('`', "``")),
            _ => format!("\"{}\"", ident.replace('"', "\"\"")),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "mongodb" | "mongo" => Ok(Dialect::MongoDb),
            other => Err(Error::query(
                QueryErrorKind::Unsupported,
                format!("unknown dialect '{other}'"),
            )),
        }
    }
}
