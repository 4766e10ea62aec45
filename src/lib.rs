//! # DataTables Engine
//!
//! Server-side processing for DataTables.js tables.
//!
//! A table is declared once as [`TableOptions`]: the model to read from, the
//! fields every query selects, and one entry per displayed column. Each
//! request is parsed into [`RequestParams`], planned into [`QueryOptions`] for
//! the model, and answered with an [`Output`] whose JSON form is what the
//! DataTables front-end expects.
//!
//! ## Feature Flags
//!
//! - `database` (default) - [`db::SqlModel`], a model reading one SQL table
//!   through sqlx (SQLite, PostgreSQL, MySQL)
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use datatables::prelude::*;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(people);
//!
//! let options = TableOptions::new()
//!     .model("Person")
//!     .select("id")
//!     .column("name")
//!     .column(ColumnOptions::expression("age+1", "age_next"))
//!     .column(ColumnOptions::field("email").with_link("/people/"));
//!
//! let table = DataTable::from_query_string(options, &registry, query, DataTablesSettings::default())?;
//! let body = table.output_json().await?;
//! ```

#![warn(missing_docs)]

#[cfg(feature = "database")]
pub mod db;

pub use datatables_core::{
	CellRenderer, ColumnInput, ColumnOptions, ColumnSpec, ColumnsInput, ConfigurationError,
	CountOptions, DataTable, DataTablesError, DataTablesSettings, Display, Filter, LikeCondition,
	Link, MissingFieldPolicy, Model, ModelError, ModelRef, ModelRegistry, ModelResult,
	OrderClause, Output, QueryOptions, QueryPlan, Record, RenderError, RequestError,
	RequestParams, ResidualFilter, Result, Row, SearchMode, SelectItem, SettingsError,
	ShorthandMode, SortDirection, SortInstruction, TableConfig, TableOptions, build_query,
};
pub use datatables_core::{
	column, config, error, html, model, output, params, processor, query, record, settings,
};

#[cfg(feature = "database")]
pub use db::{Dialect, SqlModel};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
	pub use datatables_core::prelude::*;

	#[cfg(feature = "database")]
	pub use crate::db::SqlModel;
}
