//! Query options derived from a table configuration and one request
//!
//! [`build_query`] is a pure function: the same configuration, request and
//! settings always produce the same [`QueryPlan`]. The plan holds what the
//! model collaborator executes ([`QueryOptions`]) and what it cannot
//! ([`ResidualFilter`], evaluated over rendered cells after the fetch).

use crate::config::TableConfig;
use crate::params::{RequestParams, SortDirection};
use crate::settings::{DataTablesSettings, SearchMode};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One entry of the select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SelectItem {
	/// A base select field, used verbatim
	Raw(String),
	/// A model attribute
	Field(String),
	/// `expression AS alias`
	Aliased {
		/// Raw select expression
		expression: String,
		/// Result column name
		alias: String,
	},
}

impl SelectItem {
	/// Name of the result column this item produces, when it is known
	pub fn output_name(&self) -> Option<&str> {
		match self {
			Self::Raw(_) => None,
			Self::Field(field) => Some(field),
			Self::Aliased { alias, .. } => Some(alias),
		}
	}
}

impl fmt::Display for SelectItem {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Raw(raw) => f.write_str(raw),
			Self::Field(field) => f.write_str(field),
			Self::Aliased { expression, alias } => write!(f, "{expression} AS {alias}"),
		}
	}
}

/// `<column> <ASC|DESC>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderClause {
	/// Column name to sort by
	pub column: String,
	/// Sort direction
	pub direction: SortDirection,
}

impl fmt::Display for OrderClause {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.column, self.direction)
	}
}

/// `column LIKE pattern`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikeCondition {
	/// Attribute the pattern is matched against
	pub column: String,
	/// LIKE pattern, bound as a parameter
	pub pattern: String,
}

impl LikeCondition {
	/// Matches rows whose `column` contains `term`
	pub fn contains(column: impl Into<String>, term: &str) -> Self {
		Self {
			column: column.into(),
			pattern: format!("%{term}%"),
		}
	}
}

/// Query-layer search conditions
///
/// A row matches when at least one `any` condition holds (or `any` is empty)
/// and every `all` condition holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Filter {
	/// Disjunctive group from the global search
	pub any: Vec<LikeCondition>,
	/// Conjunctive per-column searches
	pub all: Vec<LikeCondition>,
}

impl Filter {
	/// Whether no condition is set
	pub fn is_empty(&self) -> bool {
		self.any.is_empty() && self.all.is_empty()
	}

	/// Renders the filter as positional SQL plus its parameters
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::query::{Filter, LikeCondition};
	///
	/// let filter = Filter {
	///     any: vec![LikeCondition::contains("a", "x"), LikeCondition::contains("b", "x")],
	///     all: vec![],
	/// };
	/// let (sql, params) = filter.to_positional();
	/// assert_eq!(sql, "a LIKE ? OR b LIKE ?");
	/// assert_eq!(params, vec!["%x%", "%x%"]);
	/// ```
	pub fn to_positional(&self) -> (String, Vec<String>) {
		let mut parts = Vec::new();
		let mut params = Vec::new();

		if !self.any.is_empty() {
			let group = self
				.any
				.iter()
				.map(|c| format!("{} LIKE ?", c.column))
				.collect::<Vec<_>>()
				.join(" OR ");
			if self.all.is_empty() || self.any.len() == 1 {
				parts.push(group);
			} else {
				parts.push(format!("({group})"));
			}
			params.extend(self.any.iter().map(|c| c.pattern.clone()));
		}
		for condition in &self.all {
			parts.push(format!("{} LIKE ?", condition.column));
			params.push(condition.pattern.clone());
		}

		(parts.join(" AND "), params)
	}
}

/// Options for the "find all" read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryOptions {
	/// Duplicate-free select list, in order
	pub select: Vec<SelectItem>,
	/// Order clauses, in priority order
	pub order: Vec<OrderClause>,
	/// Rows to skip
	pub offset: u64,
	/// Maximum rows to return; `None` returns all
	pub limit: Option<u64>,
	/// Query-layer search conditions
	pub filter: Option<Filter>,
}

impl QueryOptions {
	/// The select list joined with `, `
	pub fn select_clause(&self) -> String {
		join(&self.select)
	}

	/// The order clauses joined with `, `; empty when unsorted
	pub fn order_clause(&self) -> String {
		join(&self.order)
	}

	/// Options for the matching "count" read: same filter, no paging
	pub fn count_options(&self) -> CountOptions {
		CountOptions {
			filter: self.filter.clone(),
		}
	}
}

/// Options for the "count" read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CountOptions {
	/// Query-layer search conditions
	pub filter: Option<Filter>,
}

/// Search terms evaluated over rendered cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidualFilter {
	/// Global term: must occur in at least one cell
	pub global: Option<String>,
	/// Per-column terms: must occur in that column's cell
	pub columns: BTreeMap<usize, String>,
}

impl ResidualFilter {
	/// Whether the filter keeps every row
	pub fn is_empty(&self) -> bool {
		self.global.is_none() && self.columns.is_empty()
	}

	/// Case-sensitive substring test over one rendered row
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::query::ResidualFilter;
	///
	/// let filter = ResidualFilter { global: Some("Ali".into()), ..Default::default() };
	/// assert!(filter.matches(&["Alice".to_string(), "30".to_string()]));
	/// assert!(!filter.matches(&["alice".to_string(), "30".to_string()]));
	/// ```
	pub fn matches(&self, cells: &[String]) -> bool {
		if let Some(term) = &self.global
			&& !cells.iter().any(|cell| cell.contains(term.as_str()))
		{
			return false;
		}
		self.columns.iter().all(|(index, term)| {
			cells
				.get(*index)
				.is_some_and(|cell| cell.contains(term.as_str()))
		})
	}
}

/// Everything needed to serve one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPlan {
	/// Options passed to the model collaborator
	pub query: QueryOptions,
	/// Terms left for the post-fetch pass
	pub residual: ResidualFilter,
}

/// Builds the query plan for one request
pub fn build_query(
	config: &TableConfig,
	params: &RequestParams,
	settings: &DataTablesSettings,
) -> QueryPlan {
	let mut select: IndexMap<String, SelectItem> = IndexMap::new();
	let items = config
		.select_fields()
		.iter()
		.map(|field| SelectItem::Raw(field.clone()))
		.chain(config.columns().iter().map(|column| column.select_item()));
	for item in items {
		select.entry(item.to_string()).or_insert(item);
	}

	let order = params
		.sorting()
		.iter()
		.filter(|instruction| params.is_sortable(instruction.column))
		.filter_map(|instruction| {
			config.column(instruction.column).map(|column| OrderClause {
				column: column.name().to_string(),
				direction: instruction.direction,
			})
		})
		.collect();

	let limit = match (params.display_length(), settings.max_display_length) {
		(Some(length), Some(max)) => Some(length.min(max)),
		(None, Some(max)) => Some(max),
		(length, None) => length,
	};

	let mut filter = Filter::default();
	let mut residual = ResidualFilter::default();
	let query_mode = settings.search_mode == SearchMode::Query;

	let search = params.search();
	if !search.is_empty() {
		if query_mode {
			filter.any = config
				.columns()
				.iter()
				.filter_map(|column| column.field())
				.map(|field| LikeCondition::contains(field, search))
				.collect();
		}
		if filter.any.is_empty() {
			residual.global = Some(search.to_string());
		}
	}

	for (&index, term) in params.column_searches() {
		let Some(column) = config.column(index) else {
			continue;
		};
		match column.field() {
			Some(field) if query_mode => filter.all.push(LikeCondition::contains(field, term)),
			_ => {
				residual.columns.insert(index, term.clone());
			}
		}
	}

	let query = QueryOptions {
		select: select.into_values().collect(),
		order,
		offset: params.display_start(),
		limit,
		filter: (!filter.is_empty()).then_some(filter),
	};

	tracing::debug!(
		select = %query.select_clause(),
		order = %query.order_clause(),
		offset = query.offset,
		limit = ?query.limit,
		filtered = query.filter.is_some(),
		residual = !residual.is_empty(),
		"built query options"
	);

	QueryPlan { query, residual }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
	items
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}
