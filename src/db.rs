//! SQL-backed models
//!
//! ```rust,no_run
//! use datatables::db::SqlModel;
//! use datatables::ModelRegistry;
//!
//! # async fn example() -> Result<(), datatables::db::DbError> {
//! let mut registry = ModelRegistry::new();
//! registry.register(SqlModel::connect("Person", "people", "sqlite://people.db").await?);
//! # Ok(())
//! # }
//! ```

pub use datatables_db::*;
