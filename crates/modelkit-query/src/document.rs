//! Document rendering: predicates become a filter document for `find`.

use std::fmt;

use serde_json::{Map, Value as Json, json};

use crate::predicate::{Operator, Predicate};

/// A document-store lookup ready for `Adapter::find`.
#[derive(Debug, Clone, PartialEq)]
pub struct FindStatement {
    pub collection: String,
    pub filter: Json,
    pub limit: Option<u64>,
}

impl fmt::Display for FindStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "find {} {}", self.collection, self.filter)?;
        if let Some(limit) = self.limit {
            write!(f, " limit {limit}")?;
        }
        Ok(())
    }
}

/// Render a `find` against `collection`.
pub fn render_find(collection: &str, predicates: &[Predicate], limit: Option<u64>) -> FindStatement {
    FindStatement {
        collection: collection.to_string(),
        filter: render_filter(predicates),
        limit,
    }
}

/// Build the filter document for a conjunction of predicates.
///
/// Conditions on the same field are merged into one operator document. A
/// condition that cannot be merged is moved under `$and`.
pub fn render_filter(predicates: &[Predicate]) -> Json {
    let mut filter = Map::new();
    let mut overflow: Vec<Json> = Vec::new();

    for predicate in predicates {
        let condition = condition(predicate);
        match filter.get_mut(&predicate.column) {
            None => {
                filter.insert(predicate.column.clone(), condition);
            }
            Some(existing) => {
                if !merge_operators(existing, &condition) {
                    let mut clause = Map::new();
                    clause.insert(predicate.column.clone(), condition);
                    overflow.push(Json::Object(clause));
                }
            }
        }
    }

    if !overflow.is_empty() {
        filter.insert("$and".to_string(), Json::Array(overflow));
    }

    Json::Object(filter)
}

fn condition(predicate: &Predicate) -> Json {
    let value = predicate.value.to_json();
    match predicate.op {
        // A document value would be read as an operator document.
        Operator::Eq if value.is_object() => json!({ "$eq": value }),
        Operator::Eq => value,
        // Values without a text form match nothing, as in SQL.
        Operator::Like => match predicate.value.to_text() {
            Some(pattern) => json!({ "$regex": like_to_regex(&pattern) }),
            None => json!({ "$in": [] }),
        },
        Operator::In | Operator::NotIn => {
            let items: Vec<Json> = predicate.list_values().iter().map(|v| v.to_json()).collect();
            operator_doc(predicate.op, Json::Array(items))
        }
        op => operator_doc(op, value),
    }
}

fn operator_doc(op: Operator, value: Json) -> Json {
    let mut doc = Map::new();
    doc.insert(op.as_document().to_string(), value);
    Json::Object(doc)
}

fn is_operator_doc(value: &Json) -> bool {
    value
        .as_object()
        .is_some_and(|m| !m.is_empty() && m.keys().all(|k| k.starts_with('$')))
}

/// Fold the operators of `incoming` into `existing`. Returns `false`, leaving
/// `existing` untouched, if either side is a plain equality or an operator
/// would be overwritten.
fn merge_operators(existing: &mut Json, incoming: &Json) -> bool {
    if !is_operator_doc(existing) || !is_operator_doc(incoming) {
        return false;
    }
    let (Some(target), Some(source)) = (existing.as_object_mut(), incoming.as_object()) else {
        return false;
    };
    if source.keys().any(|k| target.contains_key(k)) {
        return false;
    }
    for (k, v) in source {
        target.insert(k.clone(), v.clone());
    }
    true
}

/// Translate a SQL `LIKE` pattern into an anchored regular expression.
pub fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    for ch in pattern.chars() {
        match ch {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^'
            | '$' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out.push('$');
    out
}
