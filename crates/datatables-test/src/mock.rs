//! Call-recording model for processor tests

use async_trait::async_trait;
use datatables_core::error::{ModelError, ModelResult};
use datatables_core::model::Model;
use datatables_core::query::{CountOptions, QueryOptions};
use datatables_core::record::{Record, Row};
use parking_lot::Mutex;

/// One call received by a [`MockModel`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
	/// `all` with the options it received
	All(QueryOptions),
	/// `count` with the options it received
	Count(CountOptions),
}

/// In-memory model that records every call
///
/// `all` returns the stored rows after applying `offset` and `limit`; select,
/// order and filter are recorded but not interpreted. `count` returns the
/// configured total, or the number of stored rows.
///
/// # Examples
///
/// ```
/// use datatables_test::mock::MockModel;
/// use datatables_core::record::Row;
///
/// let model = MockModel::new("Person", vec![Row::new().with("name", "Alice")]);
/// assert_eq!(model.call_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockModel {
	name: String,
	rows: Vec<Row>,
	total: Option<u64>,
	failure: Option<String>,
	calls: Mutex<Vec<MockCall>>,
}

impl MockModel {
	/// Creates a model named `name` holding `rows`
	pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
		Self {
			name: name.into(),
			rows,
			total: None,
			failure: None,
			calls: Mutex::new(Vec::new()),
		}
	}

	/// Overrides the value returned by `count`
	pub fn with_total(mut self, total: u64) -> Self {
		self.total = Some(total);
		self
	}

	/// Makes every call fail with a backend error carrying `message`
	pub fn failing(mut self, message: impl Into<String>) -> Self {
		self.failure = Some(message.into());
		self
	}

	/// All calls received so far, in order
	pub fn calls(&self) -> Vec<MockCall> {
		self.calls.lock().clone()
	}

	/// Number of calls received so far
	pub fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	/// Options of every `all` call
	pub fn all_calls(&self) -> Vec<QueryOptions> {
		self.calls
			.lock()
			.iter()
			.filter_map(|call| match call {
				MockCall::All(options) => Some(options.clone()),
				MockCall::Count(_) => None,
			})
			.collect()
	}

	/// Options of every `count` call
	pub fn count_calls(&self) -> Vec<CountOptions> {
		self.calls
			.lock()
			.iter()
			.filter_map(|call| match call {
				MockCall::Count(options) => Some(options.clone()),
				MockCall::All(_) => None,
			})
			.collect()
	}

	/// Options of the most recent `all` call
	pub fn last_query(&self) -> Option<QueryOptions> {
		self.all_calls().pop()
	}

	fn check_failure(&self) -> ModelResult<()> {
		match &self.failure {
			Some(message) => Err(ModelError::Backend(message.clone().into())),
			None => Ok(()),
		}
	}
}

#[async_trait]
impl Model for MockModel {
	fn name(&self) -> &str {
		&self.name
	}

	async fn all(&self, options: &QueryOptions) -> ModelResult<Vec<Box<dyn Record>>> {
		self.calls.lock().push(MockCall::All(options.clone()));
		self.check_failure()?;

		let offset = usize::try_from(options.offset).unwrap_or(usize::MAX);
		let limit = options
			.limit
			.map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
		Ok(self
			.rows
			.iter()
			.skip(offset)
			.take(limit)
			.map(|row| Box::new(row.clone()) as Box<dyn Record>)
			.collect())
	}

	async fn count(&self, options: &CountOptions) -> ModelResult<u64> {
		self.calls.lock().push(MockCall::Count(options.clone()));
		self.check_failure()?;
		Ok(self.total.unwrap_or(self.rows.len() as u64))
	}
}
