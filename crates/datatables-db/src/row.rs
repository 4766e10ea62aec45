//! Conversion of driver rows into records

use datatables_core::error::ModelError;
use datatables_core::record::Row;
use serde_json::Value;
use sqlx::any::AnyRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

/// Decodes every column of `row`, keeping the result column order
///
/// Each value is tried as bool, integer, float, text and bytes in turn; SQL
/// `NULL` becomes `Value::Null`. Bytes that are valid UTF-8 become text.
pub fn decode_row(row: &AnyRow) -> Result<Row, ModelError> {
	let mut decoded = Row::new();
	for column in row.columns() {
		let index = column.ordinal();
		let name = column.name();
		let decode_error = |message: String| ModelError::Decode {
			column: name.to_string(),
			message,
		};

		let is_null = row
			.try_get_raw(index)
			.map_err(|e| decode_error(e.to_string()))?
			.is_null();

		let value = if is_null {
			Value::Null
		} else if let Ok(value) = row.try_get::<bool, _>(index) {
			Value::Bool(value)
		} else if let Ok(value) = row.try_get::<i64, _>(index) {
			Value::from(value)
		} else if let Ok(value) = row.try_get::<i32, _>(index) {
			Value::from(value)
		} else if let Ok(value) = row.try_get::<f64, _>(index) {
			serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
		} else if let Ok(value) = row.try_get::<String, _>(index) {
			Value::String(value)
		} else if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
			match String::from_utf8(value) {
				Ok(text) => Value::String(text),
				Err(e) => Value::from(e.into_bytes()),
			}
		} else {
			return Err(decode_error(format!(
				"unsupported column type {}",
				column.type_info().name()
			)));
		};

		decoded.insert(name, value);
	}
	Ok(decoded)
}
