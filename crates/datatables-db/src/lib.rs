//! SQL-backed model for the DataTables engine
//!
//! [`SqlModel`] implements [`datatables_core::Model`] for one table reachable
//! through a `sqlx` [`AnyPool`](sqlx::AnyPool). Statements are built with
//! `sea-query` and rendered for the [`Dialect`] inferred from the connection
//! URL; fetched rows decode into [`datatables_core::Row`] records.
//!
//! ```rust,no_run
//! use datatables_core::prelude::*;
//! use datatables_db::SqlModel;
//!
//! # async fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let mut registry = ModelRegistry::new();
//! registry.register(SqlModel::connect("Person", "people", "sqlite://people.db").await?);
//!
//! let options = TableOptions::new().model("Person").column("name").column("email");
//! let table = DataTable::from_query_string(
//!     options,
//!     &registry,
//!     "sEcho=1&iColumns=2&iDisplayStart=0&iDisplayLength=10",
//!     DataTablesSettings::default(),
//! )?;
//! println!("{}", table.output_json().await?);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod dialect;
pub mod model;
pub mod row;

pub use dialect::Dialect;
pub use model::{DbError, SqlModel, install_drivers};
pub use row::decode_row;
