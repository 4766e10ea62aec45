//! Request-scoped table processor

use crate::config::{TableConfig, TableOptions};
use crate::error::Result;
use crate::model::ModelRegistry;
use crate::output::Output;
use crate::params::RequestParams;
use crate::query::{QueryPlan, build_query};
use crate::settings::DataTablesSettings;
use tokio::sync::OnceCell;

/// Serves one DataTables.js server-side request
///
/// The configuration is validated on construction. The output is computed on
/// the first call to [`output`](Self::output) and memoized, so the model is
/// read at most once for rows and once for the count.
///
/// # Examples
///
/// ```ignore
/// let table = DataTable::from_query_string(
///     TableOptions::new().model("Person").column("name"),
///     &registry,
///     "sEcho=1&iColumns=1&iDisplayStart=0&iDisplayLength=10",
///     DataTablesSettings::default(),
/// )?;
/// let body = table.output_json().await?;
/// ```
#[derive(Debug)]
pub struct DataTable {
	config: TableConfig,
	params: RequestParams,
	settings: DataTablesSettings,
	output: OnceCell<Output>,
}

impl DataTable {
	/// Creates a processor with default settings
	pub fn new(
		options: TableOptions,
		registry: &ModelRegistry,
		params: RequestParams,
	) -> Result<Self> {
		Self::with_settings(options, registry, params, DataTablesSettings::default())
	}

	/// Creates a processor with explicit settings
	pub fn with_settings(
		options: TableOptions,
		registry: &ModelRegistry,
		params: RequestParams,
		settings: DataTablesSettings,
	) -> Result<Self> {
		let declared = params.bounded_column_count(settings.max_columns, settings.strict_params)?;
		let config = TableConfig::normalize(options, registry, declared, &settings)?;
		Ok(Self {
			config,
			params,
			settings,
			output: OnceCell::new(),
		})
	}

	/// Creates a processor from a raw URL query string
	pub fn from_query_string(
		options: TableOptions,
		registry: &ModelRegistry,
		query: &str,
		settings: DataTablesSettings,
	) -> Result<Self> {
		let params = RequestParams::from_query_string(query, settings.strict_params)?;
		Self::with_settings(options, registry, params, settings)
	}

	/// Normalized configuration
	pub fn config(&self) -> &TableConfig {
		&self.config
	}

	/// Parsed request parameters
	pub fn params(&self) -> &RequestParams {
		&self.params
	}

	/// Active settings
	pub fn settings(&self) -> &DataTablesSettings {
		&self.settings
	}

	/// The query plan for this request
	pub fn query_plan(&self) -> QueryPlan {
		build_query(&self.config, &self.params, &self.settings)
	}

	/// Returns the output, computing it on first access
	pub async fn output(&self) -> Result<&Output> {
		self.output.get_or_try_init(|| self.process()).await
	}

	/// Returns the output serialized as JSON
	pub async fn output_json(&self) -> Result<String> {
		Ok(self.output().await?.to_json()?)
	}

	/// Text of one rendered cell; empty when out of range
	pub async fn cell(&self, row: usize, column: usize) -> Result<&str> {
		Ok(self.output().await?.cell(row, column))
	}

	async fn process(&self) -> Result<Output> {
		let plan = self.query_plan();
		let model = self.config.model();

		let records = model.all(&plan.query).await.inspect_err(|e| {
			tracing::error!(model = model.name(), error = %e, "failed to fetch rows");
		})?;
		let total = model
			.count(&plan.query.count_options())
			.await
			.inspect_err(|e| {
				tracing::error!(model = model.name(), error = %e, "failed to count rows");
			})?;

		let policy = self.settings.missing_field;
		let mut data = records
			.iter()
			.map(|record| {
				self.config
					.columns()
					.iter()
					.map(|column| column.render(record.as_ref(), policy))
					.collect::<std::result::Result<Vec<_>, _>>()
			})
			.collect::<std::result::Result<Vec<_>, _>>()?;

		if !plan.residual.is_empty() {
			let fetched = data.len();
			data.retain(|cells| plan.residual.matches(cells));
			tracing::debug!(fetched, kept = data.len(), "applied post-fetch search");
		}

		tracing::debug!(
			model = model.name(),
			rows = data.len(),
			total,
			"rendered table output"
		);

		// The display count is the query-layer count even when the post-fetch
		// search removed rows.
		Ok(Output {
			echo: self.params.echo().to_string(),
			total_records: total,
			total_display_records: total,
			data,
		})
	}
}
