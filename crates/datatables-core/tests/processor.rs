//! End-to-end processing against the call-recording mock model

use datatables_core::column::ColumnOptions;
use datatables_core::config::TableOptions;
use datatables_core::error::{
	ConfigurationError, DataTablesError, ModelError, RenderError, RequestError,
};
use datatables_core::params::RequestParams;
use datatables_core::processor::DataTable;
use datatables_core::record::Row;
use datatables_core::settings::{DataTablesSettings, MissingFieldPolicy, SearchMode};
use datatables_test::fixtures::{people, people_model, people_options};
use datatables_test::{MockCall, MockModel, PERSON, first_page, init_test_logging, registry_with};
use rstest::rstest;
use serde_json::json;
use std::sync::Arc;

fn params(pairs: Vec<(String, String)>) -> RequestParams {
	RequestParams::parse(pairs, false).unwrap()
}

fn with(mut pairs: Vec<(String, String)>, extra: &[(&str, &str)]) -> Vec<(String, String)> {
	for (key, value) in extra {
		pairs.retain(|(k, _)| k != key);
		pairs.push((key.to_string(), value.to_string()));
	}
	pairs
}

#[rstest]
#[tokio::test]
async fn test_end_to_end_person_table(people_model: Arc<MockModel>, people_options: TableOptions) {
	init_test_logging();
	let registry = registry_with(people_model.clone());

	let table = DataTable::new(people_options, &registry, params(first_page("5", 2))).unwrap();
	let output = table.output().await.unwrap();

	assert_eq!(output.echo, "5");
	assert_eq!(output.total_records, 3);
	assert_eq!(output.total_display_records, 3);
	assert_eq!(
		output.data,
		vec![
			vec!["Alice".to_string(), "31".to_string()],
			vec!["Bob".to_string(), "26".to_string()],
			vec!["Carol".to_string(), "42".to_string()],
		]
	);

	let query = people_model.last_query().unwrap();
	assert_eq!(query.select_clause(), "name, age+1 AS age_next");
	assert_eq!(query.order_clause(), "");
	assert_eq!(query.offset, 0);
	assert_eq!(query.limit, Some(10));
}

#[rstest]
#[tokio::test]
async fn test_output_is_computed_once(people_model: Arc<MockModel>, people_options: TableOptions) {
	let registry = registry_with(people_model.clone());
	let table = DataTable::new(people_options, &registry, params(first_page("1", 2))).unwrap();

	let first = table.output_json().await.unwrap();
	let second = table.output_json().await.unwrap();
	assert_eq!(first, second);
	assert_eq!(table.cell(1, 0).await.unwrap(), "Bob");

	let calls = people_model.calls();
	assert_eq!(calls.len(), 2);
	assert!(matches!(calls[0], MockCall::All(_)));
	assert!(matches!(calls[1], MockCall::Count(_)));
}

#[rstest]
#[tokio::test]
async fn test_json_body(people_model: Arc<MockModel>, people_options: TableOptions) {
	let registry = registry_with(people_model);
	let pairs = with(first_page("9", 2), &[("iDisplayLength", "1")]);
	let table = DataTable::new(people_options, &registry, params(pairs)).unwrap();

	let body: serde_json::Value = serde_json::from_str(&table.output_json().await.unwrap()).unwrap();
	assert_eq!(
		body,
		json!({
			"sEcho": "9",
			"iTotalRecords": 3,
			"iTotalDisplayRecords": 3,
			"aaData": [["Alice", "31"]]
		})
	);
}

#[rstest]
#[tokio::test]
async fn test_every_row_has_declared_cell_count(people_model: Arc<MockModel>) {
	let registry = registry_with(people_model);
	let options = TableOptions::new().model(PERSON).column("name").column("email");

	let table = DataTable::new(options, &registry, params(first_page("1", 4))).unwrap();
	let output = table.output().await.unwrap();
	assert!(output.data.iter().all(|row| row.len() == 4));
	assert_eq!(output.data[0], vec!["Alice", "alice@example.com", "", ""]);
}

#[rstest]
#[tokio::test]
async fn test_sorting_respects_sortable_flags(
	people_model: Arc<MockModel>,
	people_options: TableOptions,
) {
	let registry = registry_with(people_model.clone());
	let pairs = with(
		first_page("1", 2),
		&[
			("iSortingCols", "2"),
			("iSortCol_0", "0"),
			("sSortDir_0", "Asc"),
			("iSortCol_1", "1"),
			("sSortDir_1", "asc"),
			("bSortable_0", "true"),
			("bSortable_1", "false"),
		],
	);
	let table = DataTable::new(people_options, &registry, params(pairs)).unwrap();
	table.output().await.unwrap();

	assert_eq!(people_model.last_query().unwrap().order_clause(), "name ASC");
}

#[rstest]
#[tokio::test]
async fn test_post_fetch_search_is_case_sensitive(people_model: Arc<MockModel>) {
	let registry = registry_with(people_model.clone());
	let options = TableOptions::new().model(PERSON).column("name").column("age");
	let pairs = with(first_page("3", 2), &[("sSearch", "ali")]);

	let table = DataTable::new(options, &registry, params(pairs)).unwrap();
	let output = table.output().await.unwrap();

	assert!(output.data.is_empty());
	assert_eq!(output.total_display_records, 3);
	assert!(people_model.last_query().unwrap().filter.is_none());
}

#[rstest]
#[tokio::test]
async fn test_post_fetch_search_keeps_matching_rows() {
	let model = Arc::new(MockModel::new(
		PERSON,
		vec![
			Row::new().with("name", "Alice").with("age", 30),
			Row::new().with("name", "Bob").with("age", 25),
		],
	));
	let registry = registry_with(model);
	let options = TableOptions::new().model(PERSON).column("name").column("age");
	let pairs = with(first_page("3", 2), &[("sSearch", "Ali")]);

	let table = DataTable::new(options, &registry, params(pairs)).unwrap();
	let output = table.output().await.unwrap();

	assert_eq!(output.data, vec![vec!["Alice".to_string(), "30".to_string()]]);
	assert_eq!(output.total_records, 2);
	assert_eq!(output.total_display_records, 2);
}

#[rstest]
#[tokio::test]
async fn test_query_search_mode_filters_in_query(
	people_model: Arc<MockModel>,
	people_options: TableOptions,
) {
	let registry = registry_with(people_model.clone());
	let settings = DataTablesSettings {
		search_mode: SearchMode::Query,
		..Default::default()
	};
	let pairs = with(first_page("1", 2), &[("sSearch", "zzz")]);

	let table = DataTable::with_settings(people_options, &registry, params(pairs), settings).unwrap();
	let output = table.output().await.unwrap();

	// The mock does not interpret filters, so every row comes back unfiltered.
	assert_eq!(output.data.len(), 3);
	let query = people_model.last_query().unwrap();
	let (sql, values) = query.filter.clone().unwrap().to_positional();
	assert_eq!(sql, "name LIKE ?");
	assert_eq!(values, vec!["%zzz%"]);
	assert_eq!(people_model.count_calls(), vec![query.count_options()]);
}

#[rstest]
#[tokio::test]
async fn test_count_drops_paging(people_model: Arc<MockModel>, people_options: TableOptions) {
	let registry = registry_with(people_model.clone());
	let pairs = with(first_page("1", 2), &[("iDisplayStart", "2"), ("iDisplayLength", "1")]);

	let table = DataTable::new(people_options, &registry, params(pairs)).unwrap();
	let output = table.output().await.unwrap();

	assert_eq!(output.data, vec![vec!["Carol".to_string(), "42".to_string()]]);
	assert_eq!(output.total_records, 3);
	let counts = people_model.count_calls();
	assert_eq!(counts.len(), 1);
	assert!(counts[0].filter.is_none());
}

#[rstest]
fn test_unknown_model_aborts_construction(people_options: TableOptions) {
	let registry = registry_with(Arc::new(MockModel::new(PERSON, Vec::new())));
	let options = TableOptions {
		model: Some("Planet".into()),
		..people_options
	};
	let result = DataTable::new(options, &registry, params(first_page("1", 2)));
	assert!(matches!(
		result,
		Err(DataTablesError::Configuration(ConfigurationError::NoSuchModel(name))) if name == "Planet"
	));
}

#[rstest]
fn test_missing_model_aborts_construction(people_model: Arc<MockModel>) {
	let registry = registry_with(people_model.clone());
	let result = DataTable::new(
		TableOptions::new().column("name"),
		&registry,
		params(first_page("1", 1)),
	);
	assert!(matches!(
		result,
		Err(DataTablesError::Configuration(ConfigurationError::MissingModel))
	));
	assert_eq!(people_model.call_count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_strict_missing_field_names_column(people_model: Arc<MockModel>) {
	let registry = registry_with(people_model);
	let settings = DataTablesSettings {
		missing_field: MissingFieldPolicy::Error,
		..Default::default()
	};
	let options = TableOptions::new().model(PERSON).column("name").column("phone");

	let table = DataTable::with_settings(options, &registry, params(first_page("1", 2)), settings)
		.unwrap();
	let err = table.output().await.unwrap_err();
	match err {
		DataTablesError::Render(RenderError::MissingField { index, column }) => {
			assert_eq!(index, 1);
			assert_eq!(column, "phone");
		}
		other => panic!("expected a render error, got {other:?}"),
	}
}

#[rstest]
#[tokio::test]
async fn test_custom_display_and_link(people_model: Arc<MockModel>) {
	let registry = registry_with(people_model);
	let options = TableOptions::new()
		.model(PERSON)
		.column(ColumnOptions::field("name").with_computed_link(|record| {
			format!(
				"/people/{}",
				record.get("id").map(|id| id.to_string()).unwrap_or_default()
			)
		}))
		.column(
			ColumnOptions::named("contact")
				.with_display(|record: &dyn datatables_core::Record| {
					let email = record.get("email").and_then(|v| v.as_str().map(str::to_owned));
					format!("<i>{}</i>", email.unwrap_or_default())
				}),
		);

	let table = DataTable::new(options, &registry, params(first_page("1", 2))).unwrap();
	assert_eq!(table.cell(0, 0).await.unwrap(), "<a href=\"/people/1\">Alice</a>");
	assert_eq!(table.cell(0, 1).await.unwrap(), "<i>alice@example.com</i>");
	assert_eq!(table.cell(9, 9).await.unwrap(), "");
}

#[rstest]
#[tokio::test]
async fn test_model_failure_is_surfaced_once() {
	let model = Arc::new(MockModel::new(PERSON, people()).failing("database is locked"));
	let registry = registry_with(model.clone());
	let table = DataTable::new(
		TableOptions::new().model(PERSON).column("name"),
		&registry,
		params(first_page("1", 1)),
	)
	.unwrap();

	let err = table.output().await.unwrap_err();
	assert!(matches!(err, DataTablesError::Model(ModelError::Backend(_))));
	assert_eq!(err.to_string(), "Model error: Backend error: database is locked");
	assert_eq!(model.call_count(), 1);
}

#[rstest]
#[tokio::test]
async fn test_from_query_string(people_model: Arc<MockModel>, people_options: TableOptions) {
	let registry = registry_with(people_model.clone());
	let table = DataTable::from_query_string(
		people_options,
		&registry,
		"sEcho=12&iColumns=2&iDisplayStart=1&iDisplayLength=-1&iSortingCols=1&iSortCol_0=1&sSortDir_0=desc&bSortable_1=true",
		DataTablesSettings::default(),
	)
	.unwrap();

	let output = table.output().await.unwrap();
	assert_eq!(output.echo, "12");
	assert_eq!(output.data.len(), 2);

	let query = people_model.last_query().unwrap();
	assert_eq!(query.order_clause(), "age_next DESC");
	assert_eq!(query.limit, None);
	assert_eq!(query.offset, 1);
}

#[rstest]
fn test_strict_params_reject_malformed_numbers(people_options: TableOptions) {
	let registry = registry_with(Arc::new(MockModel::new(PERSON, Vec::new())));
	let settings = DataTablesSettings {
		strict_params: true,
		..Default::default()
	};
	let result = DataTable::from_query_string(
		people_options,
		&registry,
		"sEcho=1&iDisplayStart=abc",
		settings,
	);
	assert!(matches!(result, Err(DataTablesError::Request(_))));
}

#[rstest]
fn test_oversized_column_count_is_clamped(people_model: Arc<MockModel>, people_options: TableOptions) {
	let registry = registry_with(people_model);
	let settings = DataTablesSettings {
		max_columns: 4,
		..Default::default()
	};
	let table = DataTable::from_query_string(
		people_options,
		&registry,
		"sEcho=1&iColumns=3000000",
		settings,
	)
	.unwrap();

	assert_eq!(table.config().columns().len(), 4);
	assert_eq!(
		table.query_plan().query.select_clause(),
		"name, age+1 AS age_next, '' AS __col2, '' AS __col3"
	);
}

#[rstest]
fn test_strict_params_reject_oversized_column_count(people_options: TableOptions) {
	let registry = registry_with(Arc::new(MockModel::new(PERSON, Vec::new())));
	let settings = DataTablesSettings {
		strict_params: true,
		..Default::default()
	};
	let result = DataTable::from_query_string(
		people_options,
		&registry,
		"sEcho=1&iColumns=3000000",
		settings,
	);
	assert!(matches!(
		result,
		Err(DataTablesError::Request(RequestError::TooManyColumns { declared: 3000000, .. }))
	));
}
