//! Column configuration and cell rendering
//!
//! Columns arrive in one of three shapes ([`ColumnInput`]): nothing at all, a
//! bare string, or a full [`ColumnOptions`] record. [`ColumnSpec::normalize`]
//! turns every shape into one canonical [`ColumnSpec`] that knows which select
//! item it contributes and how to render its cell.

use crate::error::RenderError;
use crate::html;
use crate::query::SelectItem;
use crate::record::{Record, cell_text};
use crate::settings::{MissingFieldPolicy, ShorthandMode};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Expression selected for placeholder columns (SQL empty-string literal)
pub const PLACEHOLDER_EXPRESSION: &str = "''";

/// Renders a record into the text of one cell
///
/// Implemented for every `Fn(&dyn Record) -> String`, so closures can be used
/// directly as column displays.
pub trait CellRenderer: Send + Sync {
	/// Produces the cell text for `record`
	fn render(&self, record: &dyn Record) -> String;
}

impl<F> CellRenderer for F
where
	F: Fn(&dyn Record) -> String + Send + Sync,
{
	fn render(&self, record: &dyn Record) -> String {
		self(record)
	}
}

/// Display strategy of a column
#[derive(Clone, Default)]
pub enum Display {
	/// Escape the column's attribute, optionally wrapped in a link
	#[default]
	Default,
	/// Caller-supplied renderer; its output is used verbatim
	Custom(Arc<dyn CellRenderer>),
}

impl Display {
	/// Wraps a renderer
	pub fn custom(renderer: impl CellRenderer + 'static) -> Self {
		Self::Custom(Arc::new(renderer))
	}

	/// Whether this is the built-in display
	pub fn is_default(&self) -> bool {
		matches!(self, Self::Default)
	}
}

impl fmt::Debug for Display {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Default => f.write_str("Default"),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

type LinkFn = dyn Fn(&dyn Record) -> String + Send + Sync;

/// Link target of the default display
///
/// Deserializes from a plain string as [`Link::Static`].
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum Link {
	/// Same URL for every row
	Static(String),
	/// URL computed from the record
	Computed(Arc<LinkFn>),
}

impl Link {
	/// Creates a link computed from each record
	pub fn computed<F>(f: F) -> Self
	where
		F: Fn(&dyn Record) -> String + Send + Sync + 'static,
	{
		Self::Computed(Arc::new(f))
	}

	/// Returns the (unescaped) URL for `record`
	pub fn resolve(&self, record: &dyn Record) -> String {
		match self {
			Self::Static(url) => url.clone(),
			Self::Computed(f) => f(record),
		}
	}
}

impl From<String> for Link {
	fn from(url: String) -> Self {
		Self::Static(url)
	}
}

impl From<&str> for Link {
	fn from(url: &str) -> Self {
		Self::Static(url.to_string())
	}
}

impl fmt::Debug for Link {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Static(url) => f.debug_tuple("Static").field(url).finish(),
			Self::Computed(_) => f.write_str("Computed(..)"),
		}
	}
}

/// Full column configuration as written by the caller
///
/// # Examples
///
/// ```
/// use datatables_core::column::ColumnOptions;
///
/// let email = ColumnOptions::field("email").with_link("/people");
/// let age_next = ColumnOptions::expression("age+1", "age_next");
/// # let _ = (email, age_next);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColumnOptions {
	/// Column identifier, also the attribute read by the default display
	pub name: Option<String>,
	/// Model attribute selected for this column
	pub field: Option<String>,
	/// Raw select expression, aliased to `name`
	pub expression: Option<String>,
	/// Display strategy; programmatic only
	#[serde(skip)]
	pub display: Display,
	/// Link wrapped around the default display
	pub link: Option<Link>,
}

impl ColumnOptions {
	/// Empty options (normalize to a placeholder)
	pub fn new() -> Self {
		Self::default()
	}

	/// A column backed by the model attribute `field`
	pub fn field(field: impl Into<String>) -> Self {
		Self::new().with_field(field)
	}

	/// A column computed by `expression` and exposed as `name`
	pub fn expression(expression: impl Into<String>, name: impl Into<String>) -> Self {
		Self::new().with_expression(expression).with_name(name)
	}

	/// A rendered-only column identified by `name`
	pub fn named(name: impl Into<String>) -> Self {
		Self::new().with_name(name)
	}

	/// Sets the column name
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Sets the backing model attribute
	pub fn with_field(mut self, field: impl Into<String>) -> Self {
		self.field = Some(field.into());
		self
	}

	/// Sets the raw select expression
	pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
		self.expression = Some(expression.into());
		self
	}

	/// Replaces the default display with `renderer`
	pub fn with_display(mut self, renderer: impl CellRenderer + 'static) -> Self {
		self.display = Display::custom(renderer);
		self
	}

	/// Wraps the default display in a link to `url`
	pub fn with_link(mut self, url: impl Into<String>) -> Self {
		self.link = Some(Link::Static(url.into()));
		self
	}

	/// Wraps the default display in a link computed per record
	pub fn with_computed_link<F>(mut self, f: F) -> Self
	where
		F: Fn(&dyn Record) -> String + Send + Sync + 'static,
	{
		self.link = Some(Link::computed(f));
		self
	}

	fn is_empty(&self) -> bool {
		self.name.is_none()
			&& self.field.is_none()
			&& self.expression.is_none()
			&& self.display.is_default()
			&& self.link.is_none()
	}
}

/// Any accepted column shape
///
/// Deserializes from `null`, a string, or a map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum ColumnInput {
	/// No configuration: a placeholder column
	#[default]
	Empty,
	/// Bare string, interpreted according to [`ShorthandMode`]
	Shorthand(String),
	/// Full options
	Options(ColumnOptions),
}

impl From<&str> for ColumnInput {
	fn from(value: &str) -> Self {
		Self::Shorthand(value.to_string())
	}
}

impl From<String> for ColumnInput {
	fn from(value: String) -> Self {
		Self::Shorthand(value)
	}
}

impl From<ColumnOptions> for ColumnInput {
	fn from(options: ColumnOptions) -> Self {
		Self::Options(options)
	}
}

impl<T: Into<ColumnInput>> From<Option<T>> for ColumnInput {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Empty, Into::into)
	}
}

/// A normalized column
#[derive(Debug, Clone)]
pub struct ColumnSpec {
	index: usize,
	name: String,
	field: Option<String>,
	expression: Option<String>,
	display: Display,
	link: Option<Link>,
}

impl ColumnSpec {
	/// Normalizes the column at `index`
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::column::{ColumnInput, ColumnSpec};
	/// use datatables_core::settings::ShorthandMode;
	///
	/// let spec = ColumnSpec::normalize(0, "email".into(), ShorthandMode::Field);
	/// assert_eq!(spec.name(), "email");
	/// assert_eq!(spec.field(), Some("email"));
	///
	/// let spec = ColumnSpec::normalize(3, ColumnInput::Empty, ShorthandMode::Field);
	/// assert_eq!(spec.name(), "__col3");
	/// assert_eq!(spec.expression(), Some("''"));
	/// ```
	pub fn normalize(index: usize, input: ColumnInput, shorthand: ShorthandMode) -> Self {
		let options = match input {
			ColumnInput::Empty => return Self::placeholder(index),
			ColumnInput::Shorthand(s) if s.is_empty() => return Self::placeholder(index),
			ColumnInput::Shorthand(s) => match shorthand {
				ShorthandMode::Field => ColumnOptions::field(s),
				ShorthandMode::Name => ColumnOptions::named(s),
			},
			ColumnInput::Options(options) => options,
		};

		let field = non_empty(options.field);
		let expression = non_empty(options.expression);
		let name = non_empty(options.name);
		let options = ColumnOptions {
			name,
			field,
			expression,
			..options
		};
		if options.is_empty() {
			return Self::placeholder(index);
		}

		let name = options
			.name
			.or_else(|| options.field.clone())
			.unwrap_or_else(|| placeholder_name(index));

		Self {
			index,
			name,
			field: options.field,
			expression: options.expression,
			display: options.display,
			link: options.link,
		}
	}

	/// A placeholder column: `__col<index>` selecting the empty string
	pub fn placeholder(index: usize) -> Self {
		Self {
			index,
			name: placeholder_name(index),
			field: None,
			expression: Some(PLACEHOLDER_EXPRESSION.to_string()),
			display: Display::Default,
			link: None,
		}
	}

	/// Position of the column in the table
	pub fn index(&self) -> usize {
		self.index
	}

	/// Column name; also the sort key and the attribute read by the default display
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Backing model attribute, if any
	pub fn field(&self) -> Option<&str> {
		self.field.as_deref()
	}

	/// Raw select expression, if any
	pub fn expression(&self) -> Option<&str> {
		self.expression.as_deref()
	}

	/// Display strategy
	pub fn display(&self) -> &Display {
		&self.display
	}

	/// Link of the default display, if any
	pub fn link(&self) -> Option<&Link> {
		self.link.as_ref()
	}

	/// Whether the column is backed by a real model attribute
	///
	/// Only such columns can be filtered at the query layer.
	pub fn is_field_backed(&self) -> bool {
		self.field.is_some()
	}

	/// The select-list entry this column contributes
	pub fn select_item(&self) -> SelectItem {
		match (&self.field, &self.expression) {
			(Some(field), _) => SelectItem::Field(field.clone()),
			(None, Some(expression)) => SelectItem::Aliased {
				expression: expression.clone(),
				alias: self.name.clone(),
			},
			(None, None) => SelectItem::Aliased {
				expression: PLACEHOLDER_EXPRESSION.to_string(),
				alias: self.name.clone(),
			},
		}
	}

	/// Renders the cell of this column for `record`
	///
	/// The default display reads the `name` attribute. A missing attribute is
	/// an empty cell, or a [`RenderError::MissingField`] under
	/// [`MissingFieldPolicy::Error`]. `null` is always an empty cell.
	pub fn render(
		&self,
		record: &dyn Record,
		policy: MissingFieldPolicy,
	) -> Result<String, RenderError> {
		if let Display::Custom(renderer) = &self.display {
			return Ok(renderer.render(record));
		}

		let text = match record.get(&self.name) {
			Some(value) => cell_text(&value),
			None if policy == MissingFieldPolicy::Error => {
				return Err(RenderError::MissingField {
					index: self.index,
					column: self.name.clone(),
				});
			}
			None => String::new(),
		};

		let escaped = html::escape(&text);
		Ok(match &self.link {
			Some(link) => html::anchor(&link.resolve(record), &escaped),
			None => escaped.into_owned(),
		})
	}
}

fn placeholder_name(index: usize) -> String {
	format!("__col{index}")
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|s| !s.is_empty())
}
