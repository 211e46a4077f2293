//! The model contract consumed by validation rules.
//!
//! Attribute declaration, persistence and hydration belong to the host's
//! model layer. Rules only need to read field values by name, which is all
//! [`Model`] asks for. [`DynamicModel`] is a map-backed implementation for
//! records whose shape is only known at runtime.

use std::collections::HashMap;

use crate::row::Row;
use crate::value::Value;

/// Read access to a model's attributes.
pub trait Model: Send + Sync {
    /// Table or collection the model persists to.
    fn table_name(&self) -> &str;

    /// Current value of a field; `None` when the field is absent.
    fn get(&self, field: &str) -> Option<&Value>;

    /// Current value of a field, reading absent fields as `Null`.
    fn value(&self, field: &str) -> &Value {
        self.get(field).unwrap_or(&Value::Null)
    }
}

/// A model whose columns are defined at runtime.
///
/// # Example
///
/// ```
/// use modelkit_core::{DynamicModel, Model, Value};
///
/// let mut user = DynamicModel::new("users");
/// user.set("name", "Alice");
/// user.set("email", "alice@example.com");
///
/// assert_eq!(user.get("name").and_then(Value::as_str), Some("Alice"));
/// assert_eq!(user.value("missing"), &Value::Null);
/// ```
#[derive(Debug, Clone)]
pub struct DynamicModel {
    table_name: String,
    /// Column names in the order they were first set.
    columns: Vec<String>,
    values: HashMap<String, Value>,
}

impl DynamicModel {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            values: HashMap::new(),
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Hydrate a model from a result row.
    pub fn from_row(table_name: impl Into<String>, row: &Row) -> Self {
        let mut model = Self::new(table_name);
        for (column, value) in row.iter() {
            model.set(column, value.clone());
        }
        model
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        if !self.values.contains_key(&column) {
            self.columns.push(column.clone());
        }
        self.values.insert(column, value.into());
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.retain(|c| c != column);
        self.values.remove(column)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Snapshot of the model as a row, in column order.
    pub fn to_row(&self) -> Row {
        Row::from_pairs(
            self.columns
                .iter()
                .map(|c| (c.clone(), self.values.get(c).cloned().unwrap_or(Value::Null))),
        )
    }
}

impl Model for DynamicModel {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}
