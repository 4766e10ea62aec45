//! Table options and their normalized form
//!
//! [`TableOptions`] is what callers write, either with the builder methods or
//! deserialized from JSON/TOML:
//!
//! ```toml
//! model_class = "Person"
//! select = ["id"]
//! columns = ["name", { expression = "age+1", name = "age_next" }]
//! ```
//!
//! [`TableConfig::normalize`] validates it once, per request, into the
//! immutable configuration used for querying and rendering.

use crate::column::{ColumnInput, ColumnSpec};
use crate::error::ConfigurationError;
use crate::model::{Model, ModelRegistry};
use crate::settings::DataTablesSettings;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Reference to the model a table reads from
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum ModelRef {
	/// Resolved through a [`ModelRegistry`]
	Name(String),
	/// Used directly
	Handle(Arc<dyn Model>),
}

impl From<String> for ModelRef {
	fn from(name: String) -> Self {
		Self::Name(name)
	}
}

impl From<&str> for ModelRef {
	fn from(name: &str) -> Self {
		Self::Name(name.to_string())
	}
}

impl From<Arc<dyn Model>> for ModelRef {
	fn from(model: Arc<dyn Model>) -> Self {
		Self::Handle(model)
	}
}

impl fmt::Debug for ModelRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
			Self::Handle(model) => f.debug_tuple("Handle").field(&model.name()).finish(),
		}
	}
}

/// Columns as written: an ordered list, or a map keyed by column index
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColumnsInput {
	/// Index is the position in the list
	List(Vec<ColumnInput>),
	/// Keys must be non-negative integers; gaps become placeholders
	Keyed(IndexMap<String, ColumnInput>),
}

impl Default for ColumnsInput {
	fn default() -> Self {
		Self::List(Vec::new())
	}
}

/// Raw table options
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableOptions {
	/// Model to read from
	#[serde(rename = "model_class", alias = "model")]
	pub model: Option<ModelRef>,
	/// Extra select expressions, placed before the column selects
	pub select: Vec<String>,
	/// Column configuration
	pub columns: ColumnsInput,
}

impl TableOptions {
	/// Creates empty options
	pub fn new() -> Self {
		Self::default()
	}

	/// Reads from the model registered as `name`
	pub fn model(mut self, name: impl Into<String>) -> Self {
		self.model = Some(ModelRef::Name(name.into()));
		self
	}

	/// Reads from `model` directly
	pub fn model_handle(mut self, model: Arc<dyn Model>) -> Self {
		self.model = Some(ModelRef::Handle(model));
		self
	}

	/// Adds a base select expression
	pub fn select(mut self, field: impl Into<String>) -> Self {
		self.select.push(field.into());
		self
	}

	/// Appends a column
	pub fn column(mut self, column: impl Into<ColumnInput>) -> Self {
		let column = column.into();
		match &mut self.columns {
			ColumnsInput::List(columns) => columns.push(column),
			ColumnsInput::Keyed(columns) => {
				let next = columns
					.keys()
					.filter_map(|key| key.parse::<usize>().ok())
					.max()
					.map_or(0, |max| max + 1);
				columns.insert(next.to_string(), column);
			}
		}
		self
	}
}

/// Validated, immutable table configuration
#[derive(Clone)]
pub struct TableConfig {
	model: Arc<dyn Model>,
	select_fields: Vec<String>,
	columns: Vec<ColumnSpec>,
}

impl TableConfig {
	/// Validates `options`
	///
	/// The model reference must resolve. Columns are normalized and then padded
	/// with placeholders or truncated to `declared_columns` (the request's
	/// `iColumns`); without it, the highest configured index decides. Neither
	/// count may exceed `settings.max_columns`: configured indices past it are
	/// an error, a larger declared count is clamped.
	pub fn normalize(
		options: TableOptions,
		registry: &ModelRegistry,
		declared_columns: Option<usize>,
		settings: &DataTablesSettings,
	) -> Result<Self, ConfigurationError> {
		let model = match options.model {
			None => return Err(ConfigurationError::MissingModel),
			Some(ModelRef::Handle(model)) => model,
			Some(ModelRef::Name(name)) => registry
				.resolve(&name)
				.ok_or(ConfigurationError::NoSuchModel(name))?,
		};

		let mut indexed: BTreeMap<usize, ColumnInput> = match options.columns {
			ColumnsInput::List(columns) => columns.into_iter().enumerate().collect(),
			ColumnsInput::Keyed(columns) => columns
				.into_iter()
				.map(|(key, column)| match key.parse::<usize>() {
					Ok(index) => Ok((index, column)),
					Err(_) => Err(ConfigurationError::InvalidColumnKey(key)),
				})
				.collect::<Result<_, _>>()?,
		};

		let max = settings.max_columns;
		let configured = indexed.last_key_value().map_or(0, |(index, _)| index + 1);
		if configured > max {
			return Err(ConfigurationError::TooManyColumns {
				count: configured,
				max,
			});
		}

		let count = match declared_columns {
			Some(declared) if declared > max => {
				tracing::warn!(declared, max, "declared columns above the column limit, clamping");
				max
			}
			Some(declared) => declared,
			None => configured,
		};
		if let Some((&last, _)) = indexed.last_key_value()
			&& last >= count
		{
			tracing::debug!(
				configured = last + 1,
				declared = count,
				"truncating columns to the declared count"
			);
		}

		let columns = (0..count)
			.map(|index| {
				let input = indexed.remove(&index).unwrap_or_default();
				ColumnSpec::normalize(index, input, settings.shorthand)
			})
			.collect();

		Ok(Self {
			model,
			select_fields: options.select,
			columns,
		})
	}

	/// The model rows are read from
	pub fn model(&self) -> &Arc<dyn Model> {
		&self.model
	}

	/// Base select expressions
	pub fn select_fields(&self) -> &[String] {
		&self.select_fields
	}

	/// Columns, in index order
	pub fn columns(&self) -> &[ColumnSpec] {
		&self.columns
	}

	/// The column at `index`, if declared
	pub fn column(&self, index: usize) -> Option<&ColumnSpec> {
		self.columns.get(index)
	}
}

impl fmt::Debug for TableConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TableConfig")
			.field("model", &self.model.name())
			.field("select_fields", &self.select_fields)
			.field("columns", &self.columns)
			.finish()
	}
}
