//! rstest fixtures shared by the workspace tests

use crate::mock::MockModel;
use datatables_core::column::ColumnOptions;
use datatables_core::config::TableOptions;
use datatables_core::model::ModelRegistry;
use datatables_core::record::Row;
use rstest::fixture;
use std::sync::Arc;

/// Name under which [`people_model`] is registered
pub const PERSON: &str = "Person";

/// Rows of the `Person` model
///
/// `age_next` mirrors what `age+1 AS age_next` selects.
#[fixture]
pub fn people() -> Vec<Row> {
	[
		("Alice", 30, "alice@example.com"),
		("Bob", 25, "bob@example.com"),
		("Carol", 41, "carol@example.org"),
	]
	.into_iter()
	.enumerate()
	.map(|(i, (name, age, email))| {
		Row::new()
			.with("id", i as u64 + 1)
			.with("name", name)
			.with("age", age)
			.with("age_next", age + 1)
			.with("email", email)
	})
	.collect()
}

/// A shared mock `Person` model over [`people`]
#[fixture]
pub fn people_model(people: Vec<Row>) -> Arc<MockModel> {
	Arc::new(MockModel::new(PERSON, people))
}

/// A registry holding `model` under [`PERSON`]
pub fn registry_with(model: Arc<MockModel>) -> ModelRegistry {
	let mut registry = ModelRegistry::new();
	registry.register_as(PERSON, model);
	registry
}

/// `name` plus the computed `age+1 AS age_next` column
#[fixture]
pub fn people_options() -> TableOptions {
	TableOptions::new()
		.model(PERSON)
		.column("name")
		.column(ColumnOptions::expression("age+1", "age_next"))
}

/// A first-page request for `columns` columns with echo token `echo`
pub fn first_page(echo: &str, columns: usize) -> Vec<(String, String)> {
	vec![
		("sEcho".to_string(), echo.to_string()),
		("iColumns".to_string(), columns.to_string()),
		("iDisplayStart".to_string(), "0".to_string()),
		("iDisplayLength".to_string(), "10".to_string()),
		("iSortingCols".to_string(), "0".to_string()),
		("sSearch".to_string(), String::new()),
	]
}
