//! Storage-backed uniqueness.

use std::sync::Arc;

use asupersync::{Cx, Outcome};
use modelkit_core::{Connection, Model, Value};
use modelkit_query::Query;

use crate::result::{ValidationResult, message_or};
use crate::rule::{Rule, RuleFuture};
use crate::source::ConnectionSource;

/// Fails when another record already holds the value.
///
/// The check runs `table WHERE column = value` with `LIMIT 1` through the
/// configured connection, excluding the record being validated:
///
/// - an explicit [`Unique::ignore_id`] is always excluded;
/// - otherwise the model's own identifier (the `id` field, see
///   [`Unique::id_field`]) is excluded when it is set.
///
/// With no connection available the rule fails closed instead of raising,
/// so a missing database shows up as a field error. Adapter failures, and
/// document adapters without `find`, abort validation.
///
/// ```ignore
/// let rule = Unique::new("users", "email")
///     .connection(slot.clone())
///     .and_where("tenant_id", 7);
/// ```
#[derive(Debug, Clone)]
pub struct Unique {
    table: String,
    column: String,
    source: Option<Arc<dyn ConnectionSource>>,
    ignore_id: Option<Value>,
    id_field: String,
    conditions: Vec<(String, Value)>,
    message: Option<String>,
}

impl Unique {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            source: None,
            ignore_id: None,
            id_field: "id".to_string(),
            conditions: Vec::new(),
            message: None,
        }
    }

    /// Where to get the connection from on each check.
    pub fn connection(mut self, source: impl ConnectionSource + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Identifier of a record to leave out of the match.
    pub fn ignore_id(mut self, id: impl Into<Value>) -> Self {
        self.ignore_id = Some(id.into());
        self
    }

    /// Name of the identifier column and model field. Defaults to `id`.
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Restrict the match with an extra equality condition.
    pub fn and_where(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Connection to check against, if one is configured and established.
    fn resolve_connection(&self) -> Option<Connection> {
        self.source
            .as_ref()
            .and_then(|source| source.resolve())
            .filter(Connection::is_connected)
    }

    /// The lookup for `value`, excluding the record being validated.
    pub fn lookup(&self, connection: &Connection, value: &Value, model: &dyn Model) -> Query {
        let mut query = Query::new(&self.table, connection).filter_eq(&self.column, value.clone());

        let excluded = match &self.ignore_id {
            Some(id) => Some(id.clone()),
            None => model
                .get(&self.id_field)
                .filter(|id| !id.is_blank())
                .cloned(),
        };
        if let Some(id) = excluded {
            query = query.filter_ne(&self.id_field, id);
        }

        for (column, value) in &self.conditions {
            query = query.filter_eq(column, value.clone());
        }

        query.limit(1)
    }
}

impl Rule for Unique {
    fn validate<'a>(
        &'a self,
        cx: &'a Cx,
        value: &'a Value,
        field: &'a str,
        model: &'a dyn Model,
    ) -> RuleFuture<'a> {
        Box::pin(async move {
            if value.is_blank() {
                return Outcome::Ok(ValidationResult::pass());
            }

            let Some(connection) = self.resolve_connection() else {
                tracing::warn!(
                    table = %self.table,
                    field,
                    "No database connection for uniqueness check"
                );
                return Outcome::Ok(ValidationResult::fail(format!(
                    "Unable to verify that {field} is unique: no database connection"
                )));
            };

            let taken = match self.lookup(&connection, value, model).exists(cx).await {
                Outcome::Ok(taken) => taken,
                Outcome::Err(e) => return Outcome::Err(e),
                Outcome::Cancelled(r) => return Outcome::Cancelled(r),
                Outcome::Panicked(p) => return Outcome::Panicked(p),
            };

            tracing::debug!(table = %self.table, field, taken, "Uniqueness check");

            Outcome::Ok(ValidationResult::check(!taken, || {
                message_or(self.message.as_ref(), || format!("{field} must be unique"))
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit_core::{Adapter, BoxFuture, Dialect, DynamicModel, Error, QueryResult};
    use modelkit_query::Statement;

    #[derive(Debug)]
    struct Offline(Dialect);

    impl Adapter for Offline {
        fn dialect(&self) -> Dialect {
            self.0
        }

        fn query<'a>(
            &'a self,
            _cx: &'a Cx,
            _command: &'a str,
            _params: &'a [Value],
        ) -> BoxFuture<'a, Outcome<QueryResult, Error>> {
            Box::pin(async { Outcome::Ok(QueryResult::default()) })
        }
    }

    fn sql(query: &Query) -> (String, Vec<Value>) {
        match query.build().unwrap() {
            Statement::Sql(stmt) => (stmt.sql, stmt.params),
            Statement::Find(_) => panic!("expected SQL"),
        }
    }

    #[test]
    fn test_lookup_excludes_model_id() {
        let conn = Connection::new(Offline(Dialect::Postgres));
        let model = DynamicModel::new("users").with("id", 7_i64);
        let rule = Unique::new("users", "email");

        let (text, params) = sql(&rule.lookup(&conn, &Value::from("a@b.co"), &model));
        assert_eq!(
            text,
            "SELECT * FROM \"users\" WHERE \"email\" = $1 AND (\"id\" != $2 OR \"id\" IS NULL) LIMIT 1"
        );
        assert_eq!(params, vec![Value::from("a@b.co"), Value::BigInt(7)]);
    }

    #[test]
    fn test_explicit_ignore_id_wins() {
        let conn = Connection::new(Offline(Dialect::Sqlite));
        let model = DynamicModel::new("users").with("id", 7_i64);
        let rule = Unique::new("users", "email").ignore_id(9_i64);

        let (_, params) = sql(&rule.lookup(&conn, &Value::from("a@b.co"), &model));
        assert_eq!(params[1], Value::BigInt(9));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_blank_model_id_is_not_excluded() {
        let conn = Connection::new(Offline(Dialect::Postgres));
        let model = DynamicModel::new("users").with("id", Value::Null);
        let rule = Unique::new("users", "email").and_where("tenant_id", 3_i64);

        let (text, _) = sql(&rule.lookup(&conn, &Value::from("a@b.co"), &model));
        assert_eq!(
            text,
            "SELECT * FROM \"users\" WHERE \"email\" = $1 AND \"tenant_id\" = $2 LIMIT 1"
        );
    }

    #[test]
    fn test_custom_id_field() {
        let conn = Connection::new(Offline(Dialect::MongoDb));
        let model = DynamicModel::new("users").with("_id", "abc");
        let rule = Unique::new("users", "email").id_field("_id");

        match rule.lookup(&conn, &Value::from("a@b.co"), &model).build().unwrap() {
            Statement::Find(find) => assert_eq!(
                find.filter,
                serde_json::json!({ "email": "a@b.co", "_id": { "$ne": "abc" } })
            ),
            Statement::Sql(_) => panic!("expected find"),
        }
    }
}
