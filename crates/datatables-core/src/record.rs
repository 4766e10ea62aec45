//! Named-field access to fetched records
//!
//! Display strategies only ever see a `&dyn Record`, so any row shape a model
//! collaborator produces can be rendered as long as it can answer
//! "what is the value of attribute `name`?".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A record whose attributes can be read by name
///
/// Returns `None` when the record has no such attribute. A present attribute
/// holding SQL `NULL` is `Some(Value::Null)`.
pub trait Record: Send + Sync {
	/// Reads the attribute `name`
	fn get(&self, name: &str) -> Option<Value>;
}

/// An ordered attribute map, the record type produced by the bundled models
///
/// # Examples
///
/// ```
/// use datatables_core::record::{Record, Row};
/// use serde_json::json;
///
/// let row = Row::new().with("name", "Alice").with("age", 30);
/// assert_eq!(row.get("name"), Some(json!("Alice")));
/// assert_eq!(row.get("email"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
	fields: IndexMap<String, Value>,
}

impl Row {
	/// Creates an empty row
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an attribute, builder style
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts or replaces an attribute
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.fields.insert(name.into(), value.into());
	}

	/// Returns the attributes in insertion order
	pub fn fields(&self) -> &IndexMap<String, Value> {
		&self.fields
	}

	/// Number of attributes
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Whether the row has no attributes
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for Row
where
	K: Into<String>,
	V: Into<Value>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			fields: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl Record for Row {
	fn get(&self, name: &str) -> Option<Value> {
		self.fields.get(name).cloned()
	}
}

impl Record for IndexMap<String, Value> {
	fn get(&self, name: &str) -> Option<Value> {
		IndexMap::get(self, name).cloned()
	}
}

impl Record for HashMap<String, Value> {
	fn get(&self, name: &str) -> Option<Value> {
		HashMap::get(self, name).cloned()
	}
}

impl Record for Map<String, Value> {
	fn get(&self, name: &str) -> Option<Value> {
		Map::get(self, name).cloned()
	}
}

/// JSON objects are records; any other JSON value has no attributes.
impl Record for Value {
	fn get(&self, name: &str) -> Option<Value> {
		self.as_object().and_then(|map| map.get(name)).cloned()
	}
}

/// Converts an attribute value into the text placed in a cell.
///
/// `null` becomes the empty string, strings are used as-is, and numbers and
/// booleans use their JSON spelling. Arrays and objects are emitted as JSON.
pub fn cell_text(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		Value::Array(_) | Value::Object(_) => value.to_string(),
	}
}
