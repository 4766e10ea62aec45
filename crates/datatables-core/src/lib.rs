//! Server-side processing engine for DataTables.js
//!
//! Turns the legacy DataTables.js request parameters (`sEcho`,
//! `iDisplayStart`, `iSortCol_0`, ...) into query options for a model, renders
//! the fetched records cell by cell, and assembles the JSON body the
//! front-end expects.
//!
//! # Architecture
//!
//! ```mermaid
//! graph LR
//!     A[TableOptions] -->|normalize| B[TableConfig]
//!     R[query string] -->|parse| P[RequestParams]
//!     B --> Q[build_query]
//!     P --> Q
//!     Q --> M[Model::all / Model::count]
//!     M --> C[ColumnSpec::render]
//!     C --> F[ResidualFilter]
//!     F --> O[Output]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use datatables_core::prelude::*;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(people);
//!
//! let options = TableOptions::new()
//!     .model("Person")
//!     .column("name")
//!     .column(ColumnOptions::expression("age+1", "age_next"));
//!
//! let table = DataTable::from_query_string(options, &registry, query, DataTablesSettings::default())?;
//! let body = table.output_json().await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod column;
pub mod config;
pub mod error;
pub mod html;
pub mod model;
pub mod output;
pub mod params;
pub mod processor;
pub mod query;
pub mod record;
pub mod settings;

pub use column::{CellRenderer, ColumnInput, ColumnOptions, ColumnSpec, Display, Link};
pub use config::{ColumnsInput, ModelRef, TableConfig, TableOptions};
pub use error::{
	ConfigurationError, DataTablesError, ModelError, ModelResult, RenderError, RequestError,
	Result,
};
pub use model::{Model, ModelRegistry};
pub use output::Output;
pub use params::{RequestParams, SortDirection, SortInstruction};
pub use processor::DataTable;
pub use query::{
	CountOptions, Filter, LikeCondition, OrderClause, QueryOptions, QueryPlan, ResidualFilter,
	SelectItem, build_query,
};
pub use record::{Record, Row};
pub use settings::{DataTablesSettings, MissingFieldPolicy, SearchMode, SettingsError, ShorthandMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commonly used types
pub mod prelude {
	pub use crate::column::{ColumnInput, ColumnOptions};
	pub use crate::config::TableOptions;
	pub use crate::error::{DataTablesError, Result};
	pub use crate::model::{Model, ModelRegistry};
	pub use crate::output::Output;
	pub use crate::params::RequestParams;
	pub use crate::processor::DataTable;
	pub use crate::record::{Record, Row};
	pub use crate::settings::DataTablesSettings;
}
