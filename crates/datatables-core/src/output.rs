//! DataTables.js response body

use serde::{Deserialize, Serialize};

/// The JSON object DataTables.js expects from a server-side request
///
/// # Examples
///
/// ```
/// use datatables_core::output::Output;
///
/// let output = Output {
///     echo: "5".to_string(),
///     total_records: 1,
///     total_display_records: 1,
///     data: vec![vec!["Alice".to_string(), "31".to_string()]],
/// };
/// assert_eq!(
///     output.to_json().unwrap(),
///     r#"{"sEcho":"5","iTotalRecords":1,"iTotalDisplayRecords":1,"aaData":[["Alice","31"]]}"#
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
	/// Echo token, passed through unchanged
	#[serde(rename = "sEcho")]
	pub echo: String,
	/// Records matching the query-layer filter, before paging
	#[serde(rename = "iTotalRecords")]
	pub total_records: u64,
	/// Records reported as displayable
	#[serde(rename = "iTotalDisplayRecords")]
	pub total_display_records: u64,
	/// Rendered rows, each index-aligned to the columns
	#[serde(rename = "aaData")]
	pub data: Vec<Vec<String>>,
}

impl Output {
	/// Serializes to compact JSON
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}

	/// Serializes to a JSON value
	pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
		serde_json::to_value(self)
	}

	/// Text of the cell at `row`, `column`; empty when out of range
	pub fn cell(&self, row: usize, column: usize) -> &str {
		self.data
			.get(row)
			.and_then(|cells| cells.get(column))
			.map_or("", String::as_str)
	}
}
