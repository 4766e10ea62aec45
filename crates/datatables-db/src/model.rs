//! Table-backed model executed through sqlx

use crate::dialect::Dialect;
use crate::row::decode_row;
use async_trait::async_trait;
use datatables_core::error::{ModelError, ModelResult};
use datatables_core::model::Model;
use datatables_core::params::SortDirection;
use datatables_core::query::{CountOptions, Filter, QueryOptions, SelectItem};
use datatables_core::record::Record;
use sea_query::{Alias, Condition, Expr, ExprTrait, Order, Query, SelectStatement};
use sqlx::any::AnyPoolOptions;
use sqlx::{AnyPool, Row as _};
use std::sync::{Arc, Once};
use thiserror::Error;

static INIT_DRIVERS: Once = Once::new();

/// Errors raised while setting up a [`SqlModel`]
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DbError {
	/// The URL scheme is not a supported database
	#[error("Unsupported database URL '{0}'")]
	UnsupportedUrl(String),

	/// The pool could not connect
	#[error("Database connection error: {0}")]
	Connection(#[from] sqlx::Error),
}

/// A [`Model`] reading one database table
///
/// Select items, order clauses and filters are rendered with sea-query for the
/// model's dialect.
///
/// # Examples
///
/// ```rust,no_run
/// use datatables_db::SqlModel;
///
/// # async fn example() -> Result<(), datatables_db::DbError> {
/// let people = SqlModel::connect("Person", "people", "sqlite://people.db").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqlModel {
	name: String,
	table: String,
	pool: Arc<AnyPool>,
	dialect: Dialect,
}

impl SqlModel {
	/// Connects a new pool to `url`
	pub async fn connect(
		name: impl Into<String>,
		table: impl Into<String>,
		url: &str,
	) -> Result<Self, DbError> {
		let dialect =
			Dialect::from_url(url).ok_or_else(|| DbError::UnsupportedUrl(url.to_string()))?;
		install_drivers();
		let pool = AnyPoolOptions::new().connect(url).await?;
		Ok(Self::from_pool(name, table, Arc::new(pool), dialect))
	}

	/// Uses an existing pool
	pub fn from_pool(
		name: impl Into<String>,
		table: impl Into<String>,
		pool: Arc<AnyPool>,
		dialect: Dialect,
	) -> Self {
		Self {
			name: name.into(),
			table: table.into(),
			pool,
			dialect,
		}
	}

	/// Table rows are read from
	pub fn table(&self) -> &str {
		&self.table
	}

	/// Dialect statements are rendered for
	pub fn dialect(&self) -> Dialect {
		self.dialect
	}

	/// Builds the statement for [`Model::all`]
	pub fn select_statement(&self, options: &QueryOptions) -> SelectStatement {
		let mut query = Query::select();
		query.from(Alias::new(&self.table));

		if options.select.is_empty() {
			query.expr(Expr::cust("*"));
		}
		for item in &options.select {
			match item {
				SelectItem::Raw(raw) => {
					query.expr(Expr::cust(raw.clone()));
				}
				SelectItem::Field(field) => {
					query.column(Alias::new(field));
				}
				SelectItem::Aliased { expression, alias } => {
					query.expr_as(Expr::cust(expression.clone()), Alias::new(alias));
				}
			}
		}

		if let Some(condition) = options.filter.as_ref().and_then(condition) {
			query.cond_where(condition);
		}

		for clause in &options.order {
			let order = match clause.direction {
				SortDirection::Ascending => Order::Asc,
				SortDirection::Descending => Order::Desc,
			};
			query.order_by_expr(Expr::cust(clause.column.clone()), order);
		}

		match options.limit {
			Some(limit) => {
				query.limit(limit);
			}
			None if options.offset > 0 && self.dialect.offset_requires_limit() => {
				query.limit(i64::MAX as u64);
			}
			None => {}
		}
		if options.offset > 0 {
			query.offset(options.offset);
		}

		query
	}

	/// Builds the statement for [`Model::count`]
	pub fn count_statement(&self, options: &CountOptions) -> SelectStatement {
		let mut query = Query::select();
		query
			.from(Alias::new(&self.table))
			.expr_as(Expr::cust("COUNT(*)"), Alias::new("count"));
		if let Some(condition) = options.filter.as_ref().and_then(condition) {
			query.cond_where(condition);
		}
		query
	}
}

#[async_trait]
impl Model for SqlModel {
	fn name(&self) -> &str {
		&self.name
	}

	async fn all(&self, options: &QueryOptions) -> ModelResult<Vec<Box<dyn Record>>> {
		let sql = self.dialect.render(&self.select_statement(options));
		tracing::debug!(model = %self.name, %sql, "fetching rows");

		let rows = sqlx::query(&sql)
			.fetch_all(&*self.pool)
			.await
			.map_err(|e| ModelError::Backend(Box::new(e)))?;

		rows.iter()
			.map(|row| decode_row(row).map(|record| Box::new(record) as Box<dyn Record>))
			.collect()
	}

	async fn count(&self, options: &CountOptions) -> ModelResult<u64> {
		let sql = self.dialect.render(&self.count_statement(options));
		tracing::debug!(model = %self.name, %sql, "counting rows");

		let row = sqlx::query(&sql)
			.fetch_one(&*self.pool)
			.await
			.map_err(|e| ModelError::Backend(Box::new(e)))?;
		let count: i64 = row.try_get("count").map_err(|e| ModelError::Decode {
			column: "count".to_string(),
			message: e.to_string(),
		})?;

		u64::try_from(count).map_err(|_| ModelError::Decode {
			column: "count".to_string(),
			message: format!("negative count {count}"),
		})
	}
}

/// Installs the sqlx `Any` drivers once per process
pub fn install_drivers() {
	INIT_DRIVERS.call_once(|| {
		sqlx::any::install_default_drivers();
	});
}

fn condition(filter: &Filter) -> Option<Condition> {
	if filter.is_empty() {
		return None;
	}

	let mut all = Condition::all();
	if !filter.any.is_empty() {
		let any = filter.any.iter().fold(Condition::any(), |any, like| {
			any.add(Expr::cust(like.column.clone()).like(like.pattern.clone()))
		});
		all = all.add(any);
	}
	for like in &filter.all {
		all = all.add(Expr::cust(like.column.clone()).like(like.pattern.clone()));
	}
	Some(all)
}
