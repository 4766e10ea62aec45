//! SqlModel against an in-memory SQLite database

use datatables_core::column::ColumnOptions;
use datatables_core::config::TableOptions;
use datatables_core::model::{Model, ModelRegistry};
use datatables_core::params::RequestParams;
use datatables_core::processor::DataTable;
use datatables_core::settings::{DataTablesSettings, SearchMode};
use datatables_db::{DbError, Dialect, SqlModel, decode_row, install_drivers};
use datatables_test::init_test_logging;
use rstest::{fixture, rstest};
use serde_json::json;
use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;
use std::sync::Arc;

const SCHEMA: &[&str] = &[
	"CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL, email TEXT)",
	"INSERT INTO people (name, age, email) VALUES ('Alice', 30, 'alice@example.com')",
	"INSERT INTO people (name, age, email) VALUES ('Bob', 25, 'bob@example.com')",
	"INSERT INTO people (name, age, email) VALUES ('Carol', 41, NULL)",
];

#[fixture]
async fn pool() -> Arc<AnyPool> {
	init_test_logging();
	install_drivers();
	// A single long-lived connection keeps the in-memory database alive.
	let pool = AnyPoolOptions::new()
		.min_connections(1)
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await
		.unwrap();
	for statement in SCHEMA {
		sqlx::query(statement).execute(&pool).await.unwrap();
	}
	Arc::new(pool)
}

fn registry(pool: Arc<AnyPool>) -> ModelRegistry {
	let mut registry = ModelRegistry::new();
	registry.register(SqlModel::from_pool("Person", "people", pool, Dialect::Sqlite));
	registry
}

fn options() -> TableOptions {
	TableOptions::new()
		.model("Person")
		.column("name")
		.column(ColumnOptions::expression("age+1", "age_next"))
		.column("email")
}

fn request(query: &str) -> RequestParams {
	RequestParams::from_query_string(query, true).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_sorted_page(#[future] pool: Arc<AnyPool>) {
	let registry = registry(pool.await);
	let params = request(
		"sEcho=2&iColumns=3&iDisplayStart=0&iDisplayLength=2&iSortingCols=1&iSortCol_0=1&sSortDir_0=desc&bSortable_1=true",
	);

	let table = DataTable::new(options(), &registry, params).unwrap();
	let output = table.output().await.unwrap();

	assert_eq!(output.echo, "2");
	assert_eq!(output.total_records, 3);
	assert_eq!(output.total_display_records, 3);
	assert_eq!(
		output.data,
		vec![
			vec!["Carol", "42", ""],
			vec!["Alice", "31", "alice@example.com"],
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_show_all_with_offset(#[future] pool: Arc<AnyPool>) {
	let registry = registry(pool.await);
	let params = request("sEcho=1&iColumns=3&iDisplayStart=1&iDisplayLength=-1");

	let table = DataTable::new(options(), &registry, params).unwrap();
	let output = table.output().await.unwrap();

	let names: Vec<&str> = output.data.iter().map(|row| row[0].as_str()).collect();
	assert_eq!(names, vec!["Bob", "Carol"]);
}

#[rstest]
#[tokio::test]
async fn test_query_search_filters_rows_and_count(#[future] pool: Arc<AnyPool>) {
	let registry = registry(pool.await);
	let settings = DataTablesSettings {
		search_mode: SearchMode::Query,
		..Default::default()
	};
	let params = request("sEcho=1&iColumns=3&iDisplayStart=0&iDisplayLength=10&sSearch=bob");

	let table = DataTable::with_settings(options(), &registry, params, settings).unwrap();
	let output = table.output().await.unwrap();

	// SQLite LIKE ignores ASCII case.
	assert_eq!(output.data, vec![vec!["Bob", "26", "bob@example.com"]]);
	assert_eq!(output.total_records, 1);
}

#[rstest]
#[tokio::test]
async fn test_rendered_search_is_case_sensitive(#[future] pool: Arc<AnyPool>) {
	let registry = registry(pool.await);
	let params = request("sEcho=1&iColumns=3&iDisplayStart=0&iDisplayLength=10&sSearch=bob");

	let table = DataTable::new(options(), &registry, params).unwrap();
	let output = table.output().await.unwrap();

	assert_eq!(output.data, vec![vec!["Bob", "26", "bob@example.com"]]);
	assert_eq!(output.total_records, 3);
	assert_eq!(output.total_display_records, 3);
}

#[rstest]
#[tokio::test]
async fn test_count_ignores_paging(#[future] pool: Arc<AnyPool>) {
	let model = SqlModel::from_pool("Person", "people", pool.await, Dialect::Sqlite);
	let params = request("iColumns=1&iDisplayStart=2&iDisplayLength=1");
	let table = DataTable::new(
		TableOptions::new()
			.model_handle(Arc::new(model.clone()))
			.column("name"),
		&ModelRegistry::new(),
		params,
	)
	.unwrap();

	let plan = table.query_plan();
	assert_eq!(model.count(&plan.query.count_options()).await.unwrap(), 3);
	assert_eq!(model.all(&plan.query).await.unwrap().len(), 1);
}

#[rstest]
#[tokio::test]
async fn test_decode_row_value_kinds(#[future] pool: Arc<AnyPool>) {
	let pool = pool.await;
	let row = sqlx::query("SELECT 1 AS i, 1.5 AS f, 'x' AS s, NULL AS n, x'ff' AS b")
		.fetch_one(&*pool)
		.await
		.unwrap();

	let decoded = decode_row(&row).unwrap();
	assert_eq!(
		serde_json::to_value(&decoded).unwrap(),
		json!({"i": 1, "f": 1.5, "s": "x", "n": null, "b": [255]})
	);
	let names: Vec<&str> = decoded.fields().keys().map(String::as_str).collect();
	assert_eq!(names, vec!["i", "f", "s", "n", "b"]);
}

#[rstest]
#[tokio::test]
async fn test_missing_table_is_a_model_error(#[future] pool: Arc<AnyPool>) {
	let mut registry = ModelRegistry::new();
	registry.register(SqlModel::from_pool("Ghost", "ghosts", pool.await, Dialect::Sqlite));
	let table = DataTable::new(
		TableOptions::new().model("Ghost").column("name"),
		&registry,
		request("sEcho=1&iColumns=1"),
	)
	.unwrap();

	let err = table.output().await.unwrap_err();
	assert!(err.to_string().starts_with("Model error: Backend error:"));
}

#[rstest]
#[tokio::test]
async fn test_connect_rejects_unknown_scheme() {
	let result = SqlModel::connect("Person", "people", "redis://localhost").await;
	assert!(matches!(result, Err(DbError::UnsupportedUrl(url)) if url == "redis://localhost"));
}
