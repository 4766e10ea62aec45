//! SQL dialect selection

use sea_query::{MysqlQueryBuilder, PostgresQueryBuilder, SelectStatement, SqliteQueryBuilder};
use std::fmt;

/// SQL dialect statements are rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
	/// SQLite
	Sqlite,
	/// PostgreSQL
	Postgres,
	/// MySQL and MariaDB
	MySql,
}

impl Dialect {
	/// Infers the dialect from a connection URL
	///
	/// # Examples
	///
	/// ```
	/// use datatables_db::Dialect;
	///
	/// assert_eq!(Dialect::from_url("sqlite::memory:"), Some(Dialect::Sqlite));
	/// assert_eq!(Dialect::from_url("postgresql://localhost/app"), Some(Dialect::Postgres));
	/// assert_eq!(Dialect::from_url("redis://localhost"), None);
	/// ```
	pub fn from_url(url: &str) -> Option<Self> {
		let scheme = url.split(':').next()?;
		match scheme {
			"sqlite" => Some(Self::Sqlite),
			"postgres" | "postgresql" => Some(Self::Postgres),
			"mysql" | "mariadb" => Some(Self::MySql),
			_ => None,
		}
	}

	/// Whether `OFFSET` is only accepted together with `LIMIT`
	pub fn offset_requires_limit(&self) -> bool {
		matches!(self, Self::Sqlite | Self::MySql)
	}

	/// Renders `statement` as SQL text with inlined values
	pub fn render(&self, statement: &SelectStatement) -> String {
		match self {
			Self::Sqlite => statement.to_string(SqliteQueryBuilder),
			Self::Postgres => statement.to_string(PostgresQueryBuilder),
			Self::MySql => statement.to_string(MysqlQueryBuilder),
		}
	}
}

impl fmt::Display for Dialect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Sqlite => "sqlite",
			Self::Postgres => "postgres",
			Self::MySql => "mysql",
		})
	}
}
