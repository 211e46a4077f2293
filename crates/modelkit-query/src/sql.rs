//! Relational rendering: predicates become a parameterized `WHERE` clause.

use std::fmt;

use modelkit_core::{Dialect, Value};

use crate::predicate::{Operator, Predicate};

/// A parameterized SQL statement ready for `Adapter::query`.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Render `SELECT * FROM table WHERE ... LIMIT n` for a relational dialect.
pub fn render_select(
    dialect: Dialect,
    table: &str,
    predicates: &[Predicate],
    limit: Option<u64>,
) -> SqlStatement {
    let mut params = Vec::new();
    let mut sql = format!("SELECT * FROM {}", dialect.quote_ident(table));

    let (where_sql, where_params) = render_where(dialect, predicates, 0);
    if !where_sql.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&where_sql);
        params.extend(where_params);
    }

    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    SqlStatement { sql, params }
}

/// Render the conjunction of `predicates`, numbering placeholders after
/// `offset` already-bound parameters.
pub fn render_where(
    dialect: Dialect,
    predicates: &[Predicate],
    offset: usize,
) -> (String, Vec<Value>) {
    let mut params: Vec<Value> = Vec::new();
    let mut clauses = Vec::with_capacity(predicates.len());

    for predicate in predicates {
        let column = dialect.quote_ident(&predicate.column);
        let clause = match (predicate.op, &predicate.value) {
            (Operator::Eq, v) if v.is_null() => format!("{column} IS NULL"),
            (Operator::Ne, v) if v.is_null() => format!("{column} IS NOT NULL"),
            (Operator::In | Operator::NotIn, _) => {
                let values = predicate.list_values();
                if values.is_empty() {
                    // An empty list matches nothing (IN) or everything (NOT IN).
                    if predicate.op == Operator::In {
                        "1 = 0".to_string()
                    } else {
                        "1 = 1".to_string()
                    }
                } else {
                    let placeholders: Vec<String> = values
                        .into_iter()
                        .map(|v| {
                            params.push(v);
                            dialect.placeholder(offset + params.len())
                        })
                        .collect();
                    let list = format!(
                        "{} {} ({})",
                        column,
                        predicate.op.as_sql(),
                        placeholders.join(", ")
                    );
                    if predicate.op == Operator::NotIn {
                        format!("({list} OR {column} IS NULL)")
                    } else {
                        list
                    }
                }
            }
            // Rows with a NULL column count as "not equal", as they do in a
            // document store.
            (Operator::Ne, v) => {
                params.push(v.clone());
                let placeholder = dialect.placeholder(offset + params.len());
                format!("({column} != {placeholder} OR {column} IS NULL)")
            }
            // LIKE compares text; values without a text form match nothing.
            (Operator::Like, v) => match v.to_text() {
                Some(pattern) => {
                    params.push(Value::Text(pattern));
                    format!("{column} LIKE {}", dialect.placeholder(offset + params.len()))
                }
                None => "1 = 0".to_string(),
            },
            (op, v) => {
                params.push(v.clone());
                format!(
                    "{} {} {}",
                    column,
                    op.as_sql(),
                    dialect.placeholder(offset + params.len())
                )
            }
        };
        clauses.push(clause);
    }

    (clauses.join(" AND "), params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds() -> Vec<Predicate> {
        vec![
            Predicate::new("email", Operator::Eq, "a@b.co"),
            Predicate::new("id", Operator::Ne, 5_i64),
        ]
    }

    #[test]
    fn test_select_postgres() {
        let stmt = render_select(Dialect::Postgres, "users", &preds(), Some(1));
        assert_eq!(
            stmt.sql,
            "SELECT * FROM \"users\" WHERE \"email\" = $1 AND (\"id\" != $2 OR \"id\" IS NULL) LIMIT 1"
        );
        assert_eq!(
            stmt.params,
            vec![Value::Text("a@b.co".into()), Value::BigInt(5)]
        );
    }

    #[test]
    fn test_select_mysql() {
        let stmt = render_select(Dialect::Mysql, "users", &preds(), None);
        assert_eq!(
            stmt.sql,
            "SELECT * FROM `users` WHERE `email` = ? AND (`id` != ? OR `id` IS NULL)"
        );
    }

    #[test]
    fn test_select_sqlite_numbered() {
        let stmt = render_select(Dialect::Sqlite, "users", &preds(), Some(10));
        assert!(stmt.sql.contains("\"email\" = ?1"));
        assert!(stmt.sql.contains("(\"id\" != ?2 OR \"id\" IS NULL)"));
        assert!(stmt.sql.ends_with(" LIMIT 10"));
    }

    #[test]
    fn test_select_without_predicates() {
        let stmt = render_select(Dialect::Postgres, "users", &[], None);
        assert_eq!(stmt.sql, "SELECT * FROM \"users\"");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_null_comparisons() {
        let (sql, params) = render_where(
            Dialect::Postgres,
            &[
                Predicate::new("deleted_at", Operator::Eq, Value::Null),
                Predicate::new("name", Operator::Ne, Value::Null),
            ],
            0,
        );
        assert_eq!(sql, "\"deleted_at\" IS NULL AND \"name\" IS NOT NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_in_lists() {
        let (sql, params) = render_where(
            Dialect::Postgres,
            &[
                Predicate::new("status", Operator::Eq, "active"),
                Predicate::new("id", Operator::In, vec![1_i64, 2, 3]),
            ],
            0,
        );
        assert_eq!(sql, "\"status\" = $1 AND \"id\" IN ($2, $3, $4)");
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_empty_in_lists() {
        let empty: Vec<i64> = Vec::new();
        let (sql, _) = render_where(
            Dialect::Postgres,
            &[
                Predicate::new("id", Operator::In, empty.clone()),
                Predicate::new("id", Operator::NotIn, empty),
            ],
            0,
        );
        assert_eq!(sql, "1 = 0 AND 1 = 1");
    }

    #[test]
    fn test_not_equal_keeps_null_rows() {
        let (sql, params) = render_where(
            Dialect::Postgres,
            &[
                Predicate::new("id", Operator::Ne, 7_i64),
                Predicate::new("role", Operator::NotIn, vec!["admin", "owner"]),
            ],
            0,
        );
        assert_eq!(
            sql,
            "(\"id\" != $1 OR \"id\" IS NULL) AND (\"role\" NOT IN ($2, $3) OR \"role\" IS NULL)"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_like_binds_text_form() {
        let (sql, params) = render_where(
            Dialect::Postgres,
            &[Predicate::new("code", Operator::Like, 42_i64)],
            0,
        );
        assert_eq!(sql, "\"code\" LIKE $1");
        assert_eq!(params, vec![Value::Text("42".into())]);

        let (sql, params) = render_where(
            Dialect::Postgres,
            &[Predicate::new("code", Operator::Like, Value::Null)],
            0,
        );
        assert_eq!(sql, "1 = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn test_offset_numbering() {
        let (sql, _) = render_where(
            Dialect::Postgres,
            &[Predicate::new("name", Operator::Like, "A%")],
            3,
        );
        assert_eq!(sql, "\"name\" LIKE $4");
    }
}
