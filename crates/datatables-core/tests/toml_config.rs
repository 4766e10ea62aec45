//! Tables and settings declared in TOML files

use datatables_core::config::TableOptions;
use datatables_core::params::RequestParams;
use datatables_core::processor::DataTable;
use datatables_core::settings::{DataTablesSettings, ENV_PREFIX, SearchMode, ShorthandMode};
use datatables_test::fixtures::people_model;
use datatables_test::{MockModel, first_page, registry_with};
use rstest::rstest;
use std::io::Write;
use std::sync::Arc;

const TABLE: &str = r#"
model_class = "Person"
select = ["id"]

[columns]
0 = "name"
1 = { expression = "age+1", name = "age_next" }
2 = { field = "email", link = "mailto:team@example.com" }
"#;

#[rstest]
#[tokio::test]
async fn test_table_and_settings_from_files(people_model: Arc<MockModel>) {
	let mut settings_file = tempfile::NamedTempFile::new().unwrap();
	writeln!(settings_file, "search_mode = \"query\"\nmax_display_length = 2").unwrap();
	let settings = DataTablesSettings::from_file(settings_file.path())
		.unwrap()
		.apply_env_vars(ENV_PREFIX, [("DATATABLES_SHORTHAND", "field")])
		.unwrap();
	assert_eq!(settings.search_mode, SearchMode::Query);
	assert_eq!(settings.shorthand, ShorthandMode::Field);

	let options: TableOptions = toml::from_str(TABLE).unwrap();
	let registry = registry_with(people_model.clone());
	let params = RequestParams::parse(first_page("4", 3), settings.strict_params).unwrap();
	let table = DataTable::with_settings(options, &registry, params, settings).unwrap();

	let output = table.output().await.unwrap();
	assert_eq!(output.data.len(), 2);
	assert_eq!(
		output.data[1],
		vec![
			"Bob",
			"26",
			"<a href=\"mailto:team@example.com\">bob@example.com</a>"
		]
	);

	let query = people_model.last_query().unwrap();
	assert_eq!(query.select_clause(), "id, name, age+1 AS age_next, email");
	assert_eq!(query.limit, Some(2));
}
