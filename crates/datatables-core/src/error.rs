//! Error types for DataTables processing
//!
//! Each processing stage has its own error enum; [`DataTablesError`] aggregates
//! them for the public entry points (`DataTable::new`, `DataTable::output`, ...).

use thiserror::Error;

/// Errors raised while normalizing table options
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigurationError {
	/// No model reference was given at all
	#[error("No model class configured")]
	MissingModel,

	/// The model reference does not resolve to a registered model
	#[error("No such model class '{0}'")]
	NoSuchModel(String),

	/// A keyed column map contained a key that is not a column index
	#[error("Invalid options: column keys need to be numeric (got '{0}')")]
	InvalidColumnKey(String),

	/// Configured column indices reach past the column limit
	#[error("Invalid options: {count} columns configured, at most {max} allowed")]
	TooManyColumns {
		/// Highest configured index plus one
		count: usize,
		/// Active `max_columns` setting
		max: usize,
	},
}

/// Errors raised while parsing DataTables.js request parameters
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RequestError {
	/// A numeric parameter could not be parsed (strict mode only)
	#[error("Invalid request parameter {name}: '{value}' is not an integer")]
	InvalidParameter {
		/// Parameter name, e.g. `iDisplayStart`
		name: String,
		/// Raw value sent by the client
		value: String,
	},

	/// `iColumns` exceeds the column limit (strict mode only)
	#[error("Invalid request parameter iColumns: {declared} exceeds the limit of {max}")]
	TooManyColumns {
		/// Column count sent by the client
		declared: usize,
		/// Active `max_columns` setting
		max: usize,
	},

	/// The raw query string could not be decoded
	#[error("Malformed query string: {0}")]
	MalformedQuery(String),
}

/// Errors raised while rendering a record into a table row
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RenderError {
	/// The record has no attribute for the column being rendered
	#[error("Undefined property '{column}' for column {index}")]
	MissingField {
		/// Column index in the table
		index: usize,
		/// Column name (and attribute name) that could not be read
		column: String,
	},
}

/// Errors reported by a model collaborator
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ModelError {
	/// The query could not be built or was rejected
	#[error("Query error: {0}")]
	Query(String),

	/// The underlying storage backend failed
	#[error("Backend error: {0}")]
	Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

	/// A fetched value could not be converted into a record field
	#[error("Failed to decode column '{column}': {message}")]
	Decode {
		/// Result column name
		column: String,
		/// Decoder message
		message: String,
	},
}

/// Top-level error for DataTables processing
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DataTablesError {
	/// Invalid table options
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),

	/// Invalid request parameters
	#[error(transparent)]
	Request(#[from] RequestError),

	/// A cell could not be rendered
	#[error(transparent)]
	Render(#[from] RenderError),

	/// The model collaborator failed
	#[error("Model error: {0}")]
	Model(#[from] ModelError),

	/// The output could not be serialized
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

/// Result alias for DataTables processing
pub type Result<T> = std::result::Result<T, DataTablesError>;

/// Result alias for model collaborators
pub type ModelResult<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_configuration_error_message() {
		let err = ConfigurationError::NoSuchModel("Person".to_string());
		assert_eq!(err.to_string(), "No such model class 'Person'");
	}

	#[rstest]
	fn test_render_error_names_column() {
		let err = RenderError::MissingField {
			index: 2,
			column: "email".to_string(),
		};
		assert_eq!(err.to_string(), "Undefined property 'email' for column 2");
	}

	#[rstest]
	fn test_wrapping_keeps_variant() {
		let err: DataTablesError = ConfigurationError::MissingModel.into();
		assert!(matches!(
			err,
			DataTablesError::Configuration(ConfigurationError::MissingModel)
		));
		assert_eq!(err.to_string(), "No model class configured");
	}
}
