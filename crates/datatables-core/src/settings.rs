//! Engine settings
//!
//! Settings are layered the same way application configuration is: built-in
//! defaults, then a TOML document, then environment variables carrying a
//! prefix (`DATATABLES_SEARCH_MODE=query`, `DATATABLES_STRICT_PARAMS=true`, ...).
//!
//! ```toml
//! shorthand = "field"
//! search_mode = "rendered"
//! missing_field = "empty"
//! max_display_length = 500
//! max_columns = 256
//! strict_params = false
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "DATATABLES_";

/// Default upper bound for the number of table columns
pub const DEFAULT_MAX_COLUMNS: usize = 256;

/// Meaning of a bare string column spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShorthandMode {
	/// `"email"` means `{ field: "email" }`: selected and rendered from `email`
	#[default]
	Field,
	/// `"email"` means `{ name: "email" }`: a rendered-only column that is not
	/// fetched by field
	Name,
}

/// Where the global search term (`sSearch`) is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
	/// Substring match over rendered cell text, after fetching
	#[default]
	Rendered,
	/// `LIKE '%term%'` conditions on field-backed columns, in the query
	Query,
}

/// What the default display does when a record lacks the column attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
	/// Render an empty cell
	#[default]
	Empty,
	/// Fail with [`RenderError::MissingField`](crate::error::RenderError)
	Error,
}

/// Errors raised while loading settings
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	/// Settings file could not be read
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Settings file is not valid TOML for these settings
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// An environment override has an invalid value
	#[error("Invalid setting: {0}")]
	Invalid(#[from] serde_json::Error),
}

/// Engine-wide behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTablesSettings {
	/// Meaning of bare string column specs
	pub shorthand: ShorthandMode,
	/// Where the global search is applied
	pub search_mode: SearchMode,
	/// Behaviour of the default display on missing attributes
	pub missing_field: MissingFieldPolicy,
	/// Upper bound for `iDisplayLength`; `None` leaves it unbounded
	pub max_display_length: Option<u64>,
	/// Upper bound for `iColumns` and for the highest configured column index
	pub max_columns: usize,
	/// Reject malformed or out-of-range parameters instead of coercing them
	pub strict_params: bool,
}

impl Default for DataTablesSettings {
	fn default() -> Self {
		Self {
			shorthand: ShorthandMode::default(),
			search_mode: SearchMode::default(),
			missing_field: MissingFieldPolicy::default(),
			max_display_length: None,
			max_columns: DEFAULT_MAX_COLUMNS,
			strict_params: false,
		}
	}
}

impl DataTablesSettings {
	/// Parses settings from a TOML document; absent keys keep their defaults
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::settings::{DataTablesSettings, SearchMode};
	///
	/// let settings = DataTablesSettings::from_toml_str("search_mode = \"query\"").unwrap();
	/// assert_eq!(settings.search_mode, SearchMode::Query);
	/// assert!(!settings.strict_params);
	/// ```
	pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
		Ok(toml::from_str(source)?)
	}

	/// Reads settings from a TOML file
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
		let source = std::fs::read_to_string(path)?;
		Self::from_toml_str(&source)
	}

	/// Applies overrides from the process environment
	pub fn apply_env(self, prefix: &str) -> Result<Self, SettingsError> {
		self.apply_env_vars(prefix, std::env::vars())
	}

	/// Applies overrides from `(name, value)` pairs
	///
	/// Only names starting with `prefix` are considered. The remainder is
	/// lowercased to form the setting key; unknown keys are ignored.
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::settings::{DataTablesSettings, ENV_PREFIX};
	///
	/// let settings = DataTablesSettings::default()
	///     .apply_env_vars(ENV_PREFIX, [("DATATABLES_MAX_DISPLAY_LENGTH", "100")])
	///     .unwrap();
	/// assert_eq!(settings.max_display_length, Some(100));
	/// ```
	pub fn apply_env_vars<I, K, V>(self, prefix: &str, vars: I) -> Result<Self, SettingsError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut overrides = Map::new();
		for (key, value) in vars {
			let Some(name) = key.as_ref().strip_prefix(prefix) else {
				continue;
			};
			let name = name.to_lowercase();
			let value = parse_env_value(&name, value.as_ref());
			overrides.insert(name, value);
		}

		if overrides.is_empty() {
			return Ok(self);
		}

		let mut merged = serde_json::to_value(&self)?;
		if let Value::Object(map) = &mut merged {
			map.extend(overrides);
		}
		Ok(serde_json::from_value(merged)?)
	}
}

fn parse_env_value(key: &str, raw: &str) -> Value {
	let trimmed = raw.trim();
	if key == "strict_params" {
		return match trimmed.to_lowercase().as_str() {
			"true" | "1" | "yes" | "on" => Value::Bool(true),
			"false" | "0" | "no" | "off" => Value::Bool(false),
			_ => Value::String(trimmed.to_string()),
		};
	}
	if let Ok(num) = trimmed.parse::<u64>() {
		Value::Number(num.into())
	} else {
		Value::String(trimmed.to_lowercase())
	}
}
