//! DataTables.js request parameters
//!
//! The client sends every value as text (`bSortable_0=true`, `iDisplayStart=20`).
//! [`RequestParams`] is the single place where that text is parsed; everything
//! downstream works with typed values.

use crate::error::RequestError;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Sort direction of one order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SortDirection {
	/// Ascending order
	Ascending,
	/// Descending order
	#[default]
	Descending,
}

impl SortDirection {
	/// Parses `sSortDir_<n>`
	///
	/// Only a case-insensitive `"asc"` is ascending; anything else, including
	/// a missing value, is descending.
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::params::SortDirection;
	///
	/// assert_eq!(SortDirection::parse(Some("aSc")), SortDirection::Ascending);
	/// assert_eq!(SortDirection::parse(Some("up")), SortDirection::Descending);
	/// assert_eq!(SortDirection::parse(None), SortDirection::Descending);
	/// ```
	pub fn parse(value: Option<&str>) -> Self {
		match value {
			Some(v) if v.eq_ignore_ascii_case("asc") => Self::Ascending,
			_ => Self::Descending,
		}
	}

	/// SQL keyword for this direction
	pub fn as_sql(&self) -> &'static str {
		match self {
			Self::Ascending => "ASC",
			Self::Descending => "DESC",
		}
	}
}

impl fmt::Display for SortDirection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_sql())
	}
}

/// One requested sort: which column, which way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortInstruction {
	/// Column index (`iSortCol_<n>`)
	pub column: usize,
	/// Direction (`sSortDir_<n>`)
	pub direction: SortDirection,
}

/// Typed view of one DataTables.js server-side request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
	echo: String,
	display_start: u64,
	display_length: Option<u64>,
	column_count: Option<usize>,
	sorting: Vec<SortInstruction>,
	sortable: BTreeSet<usize>,
	search: String,
	column_searches: BTreeMap<usize, String>,
}

impl RequestParams {
	/// Parses request parameters from `(name, value)` pairs
	///
	/// When a name repeats, the last value wins. With `strict` set, malformed
	/// integers are rejected; otherwise they are read as 0.
	///
	/// # Examples
	///
	/// ```
	/// use datatables_core::params::RequestParams;
	///
	/// let params = RequestParams::parse(
	///     [("sEcho", "3"), ("iDisplayStart", "20"), ("iDisplayLength", "10")],
	///     false,
	/// ).unwrap();
	/// assert_eq!(params.echo(), "3");
	/// assert_eq!(params.display_start(), 20);
	/// assert_eq!(params.display_length(), Some(10));
	/// ```
	pub fn parse<I, K, V>(pairs: I, strict: bool) -> Result<Self, RequestError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let raw: HashMap<String, String> = pairs
			.into_iter()
			.map(|(k, v)| (k.into(), v.into()))
			.collect();
		RawParams { raw: &raw, strict }.parse()
	}

	/// Parses a URL query string such as `sEcho=1&iDisplayStart=0&...`
	pub fn from_query_string(query: &str, strict: bool) -> Result<Self, RequestError> {
		let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
			.map_err(|e| RequestError::MalformedQuery(e.to_string()))?;
		Self::parse(pairs, strict)
	}

	/// Parses an already collected parameter map
	pub fn from_map(map: &HashMap<String, String>, strict: bool) -> Result<Self, RequestError> {
		RawParams { raw: map, strict }.parse()
	}

	/// Opaque echo token (`sEcho`)
	pub fn echo(&self) -> &str {
		&self.echo
	}

	/// Paging offset (`iDisplayStart`)
	pub fn display_start(&self) -> u64 {
		self.display_start
	}

	/// Page size (`iDisplayLength`); `None` when absent or `-1` ("show all")
	pub fn display_length(&self) -> Option<u64> {
		self.display_length
	}

	/// Declared number of columns (`iColumns`)
	pub fn column_count(&self) -> Option<usize> {
		self.column_count
	}

	/// Declared number of columns, checked against `max`
	///
	/// Above the limit the count is rejected when `strict` is set, otherwise
	/// clamped to `max`.
	pub fn bounded_column_count(
		&self,
		max: usize,
		strict: bool,
	) -> Result<Option<usize>, RequestError> {
		match self.column_count {
			Some(declared) if declared > max => {
				if strict {
					return Err(RequestError::TooManyColumns { declared, max });
				}
				tracing::warn!(declared, max, "iColumns above the column limit, clamping");
				Ok(Some(max))
			}
			count => Ok(count),
		}
	}

	/// Requested sorts, in priority order
	pub fn sorting(&self) -> &[SortInstruction] {
		&self.sorting
	}

	/// Whether the client marked column `index` as sortable (`bSortable_<index>=true`)
	pub fn is_sortable(&self, index: usize) -> bool {
		self.sortable.contains(&index)
	}

	/// Global search term (`sSearch`), possibly empty
	pub fn search(&self) -> &str {
		&self.search
	}

	/// Non-empty per-column search terms (`sSearch_<n>`), keyed by column index
	pub fn column_searches(&self) -> &BTreeMap<usize, String> {
		&self.column_searches
	}
}

struct RawParams<'a> {
	raw: &'a HashMap<String, String>,
	strict: bool,
}

impl RawParams<'_> {
	fn parse(&self) -> Result<RequestParams, RequestError> {
		let echo = self.raw.get("sEcho").cloned().unwrap_or_default();

		let display_start = match self.int("iDisplayStart")? {
			Some(v) if v < 0 => {
				tracing::warn!(value = v, "negative iDisplayStart, using 0");
				0
			}
			Some(v) => v as u64,
			None => 0,
		};

		let display_length = match self.int("iDisplayLength")? {
			Some(v) if v >= 0 => Some(v as u64),
			_ => None,
		};

		let column_count = self
			.int("iColumns")?
			.and_then(|v| usize::try_from(v).ok());

		// The client cannot send more sort instructions than parameters.
		let sorting_cols = self
			.int("iSortingCols")?
			.map_or(0, |v| v.clamp(0, self.raw.len() as i64) as usize);

		let mut sorting = Vec::with_capacity(sorting_cols);
		for i in 0..sorting_cols {
			let name = format!("iSortCol_{i}");
			let column = match self.raw.get(&name).map(|v| v.trim().parse::<i64>()) {
				Some(Ok(v)) if v >= 0 => v as usize,
				Some(Err(_)) if self.strict => {
					return Err(RequestError::InvalidParameter {
						value: self.raw.get(&name).cloned().unwrap_or_default(),
						name,
					});
				}
				_ => {
					tracing::warn!(param = %name, value = ?self.raw.get(&name), "skipping sort instruction without a usable column");
					continue;
				}
			};
			let direction = SortDirection::parse(
				self.raw.get(&format!("sSortDir_{i}")).map(String::as_str),
			);
			sorting.push(SortInstruction { column, direction });
		}

		let mut sortable = BTreeSet::new();
		let mut column_searches = BTreeMap::new();
		for (key, value) in self.raw {
			if let Some(index) = indexed(key, "bSortable_") {
				// All params are strings: only the literal "true" counts.
				if value == "true" {
					sortable.insert(index);
				}
			} else if let Some(index) = indexed(key, "sSearch_")
				&& !value.is_empty()
			{
				column_searches.insert(index, value.clone());
			}
		}

		Ok(RequestParams {
			echo,
			display_start,
			display_length,
			column_count,
			sorting,
			sortable,
			search: self.raw.get("sSearch").cloned().unwrap_or_default(),
			column_searches,
		})
	}

	fn int(&self, name: &str) -> Result<Option<i64>, RequestError> {
		let Some(value) = self.raw.get(name) else {
			return Ok(None);
		};
		match value.trim().parse::<i64>() {
			Ok(v) => Ok(Some(v)),
			Err(_) if self.strict => Err(RequestError::InvalidParameter {
				name: name.to_string(),
				value: value.clone(),
			}),
			Err(_) => {
				tracing::warn!(param = name, value = %value, "malformed integer parameter, using 0");
				Ok(Some(0))
			}
		}
	}
}

fn indexed(key: &str, prefix: &str) -> Option<usize> {
	key.strip_prefix(prefix)?.parse().ok()
}
