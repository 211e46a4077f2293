//! The dialect-neutral query builder.

use std::fmt;

use asupersync::{Cx, Outcome};
use modelkit_core::{
    Capability, Connection, ConnectionErrorKind, Dialect, DialectFamily, Error, QueryResult, Row,
    Value,
};

use crate::document::{FindStatement, render_find};
use crate::predicate::{Operator, Predicate};
use crate::sql::{SqlStatement, render_select};

/// A rendered query in the form its dialect family expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Sql(SqlStatement),
    Find(FindStatement),
}

impl Statement {
    pub fn as_sql(&self) -> Option<&SqlStatement> {
        match self {
            Statement::Sql(s) => Some(s),
            Statement::Find(_) => None,
        }
    }

    pub fn as_find(&self) -> Option<&FindStatement> {
        match self {
            Statement::Find(f) => Some(f),
            Statement::Sql(_) => None,
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Sql(s) => s.fmt(f),
            Statement::Find(find) => find.fmt(f),
        }
    }
}

/// A select against one table or collection, bound to a connection.
///
/// Predicates accumulate in call order and are joined by AND. The target
/// dialect is not fixed at construction: [`Query::execute`] renders for
/// whatever the connection's adapter reports at that moment.
///
/// # Example
///
/// ```ignore
/// let result = Query::new("users", &conn)
///     .filter_eq("email", "alice@example.com")
///     .filter("age", Operator::Ge, 18)
///     .limit(1)
///     .execute(cx)
///     .await;
/// ```
#[derive(Clone)]
pub struct Query {
    connection: Connection,
    target: String,
    predicates: Vec<Predicate>,
    limit: Option<u64>,
}

impl Query {
    /// Start a query on `target` (a table or collection name).
    pub fn new(target: impl Into<String>, connection: &Connection) -> Self {
        Self {
            connection: connection.clone(),
            target: target.into(),
            predicates: Vec::new(),
            limit: None,
        }
    }

    /// Add a `column op value` condition.
    pub fn filter(mut self, column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate::new(column, op, value));
        self
    }

    pub fn filter_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, Operator::Eq, value)
    }

    pub fn filter_ne(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, Operator::Ne, value)
    }

    /// Add a condition whose operator is given in its textual form (`"="`,
    /// `"<>"`, `"not in"`, ...).
    pub fn filter_op(
        self,
        column: impl Into<String>,
        op: &str,
        value: impl Into<Value>,
    ) -> Result<Self, Error> {
        let op: Operator = op.parse()?;
        Ok(self.filter(column, op, value))
    }

    /// Cap the number of rows or documents returned.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Render for the connection's current dialect.
    pub fn build(&self) -> Result<Statement, Error> {
        match self.connection.dialect() {
            Some(dialect) => Ok(self.render(dialect)),
            None => Err(Error::connection(
                ConnectionErrorKind::NoAdapter,
                "No adapter is attached to this connection",
            )),
        }
    }

    /// Render for a specific dialect.
    pub fn render(&self, dialect: Dialect) -> Statement {
        match dialect.family() {
            DialectFamily::Relational => Statement::Sql(render_select(
                dialect,
                &self.target,
                &self.predicates,
                self.limit,
            )),
            DialectFamily::Document => {
                Statement::Find(render_find(&self.target, &self.predicates, self.limit))
            }
        }
    }

    /// Run the query through the connection's adapter.
    #[tracing::instrument(level = "debug", skip(self, cx), fields(target = %self.target))]
    pub async fn execute(self, cx: &Cx) -> Outcome<QueryResult, Error> {
        let adapter = match self.connection.established_adapter() {
            Ok(adapter) => adapter.clone(),
            Err(e) => return Outcome::Err(e),
        };
        let dialect = adapter.dialect();
        let statement = self.render(dialect);

        tracing::debug!(
            dialect = dialect.name(),
            predicates = self.predicates.len(),
            statement = %statement,
            "Executing query"
        );

        match statement {
            Statement::Sql(stmt) => adapter.query(cx, &stmt.sql, &stmt.params).await,
            Statement::Find(stmt) => {
                if !adapter.supports(Capability::Find) {
                    return Outcome::Err(Error::capability(Capability::Find, dialect.name()));
                }
                adapter
                    .find(cx, &stmt.collection, &stmt.filter, stmt.limit)
                    .await
            }
        }
    }

    /// Run the query with `LIMIT 1` and return the first row, if any.
    pub async fn first(self, cx: &Cx) -> Outcome<Option<Row>, Error> {
        self.limit(1)
            .execute(cx)
            .await
            .map(|result| result.rows.into_iter().next())
    }

    /// Whether at least one row or document matches.
    pub async fn exists(self, cx: &Cx) -> Outcome<bool, Error> {
        self.limit(1)
            .execute(cx)
            .await
            .map(|result| !result.rows.is_empty())
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("target", &self.target)
            .field("predicates", &self.predicates)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
