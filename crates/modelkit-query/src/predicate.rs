//! The shared predicate language.
//!
//! A query is a conjunction of `(column, operator, value)` triples. There is
//! no disjunction or grouping at this layer.

use std::fmt;
use std::str::FromStr;

use modelkit_core::{Error, QueryErrorKind, Value};

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// SQL `LIKE` pattern with `%` and `_` wildcards.
    Like,
    /// Membership in an array value.
    In,
    NotIn,
}

impl Operator {
    /// SQL spelling of the operator.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// Document-store query operator. Equality has none: it is written as a
    /// bare value unless the value itself is a document.
    pub const fn as_document(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Lt => "$lt",
            Operator::Le => "$lte",
            Operator::Gt => "$gt",
            Operator::Ge => "$gte",
            Operator::Like => "$regex",
            Operator::In => "$in",
            Operator::NotIn => "$nin",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_lowercase().as_str() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "like" => Ok(Operator::Like),
            "in" => Ok(Operator::In),
            "not in" => Ok(Operator::NotIn),
            _ => Err(Error::query(
                QueryErrorKind::Syntax,
                format!("unsupported operator '{s}'"),
            )),
        }
    }
}

/// One `(column, operator, value)` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    /// Values of an `IN`/`NOT IN` predicate; scalars count as a one-element list.
    pub fn list_values(&self) -> Vec<Value> {
        self.value
            .as_array()
            .unwrap_or_else(|| vec![self.value.clone()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("<>".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!("LIKE".parse::<Operator>().unwrap(), Operator::Like);
        assert_eq!("not   in".parse::<Operator>().unwrap(), Operator::NotIn);
        assert!("~=".parse::<Operator>().is_err());
    }

    #[test]
    fn test_list_values() {
        let p = Predicate::new("id", Operator::In, vec![1_i64, 2]);
        assert_eq!(p.list_values().len(), 2);
        let scalar = Predicate::new("id", Operator::In, 1_i64);
        assert_eq!(scalar.list_values(), vec![Value::BigInt(1)]);
    }
}
