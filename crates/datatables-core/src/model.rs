//! Model collaborator interface and registry

use crate::error::ModelResult;
use crate::query::{CountOptions, QueryOptions};
use crate::record::Record;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A queryable source of records
///
/// Implementations execute the options built for one request. `all` honours
/// select, order, filter, offset and limit; `count` honours the filter only.
#[async_trait]
pub trait Model: Send + Sync {
	/// Name under which the model is registered
	fn name(&self) -> &str;

	/// Returns the records matching `options`
	async fn all(&self, options: &QueryOptions) -> ModelResult<Vec<Box<dyn Record>>>;

	/// Counts the records matching `options`
	async fn count(&self, options: &CountOptions) -> ModelResult<u64>;
}

/// Models addressable by name
///
/// # Examples
///
/// ```ignore
/// let mut registry = ModelRegistry::new();
/// registry.register(people_model);
/// assert!(registry.resolve("Person").is_some());
/// ```
#[derive(Clone, Default)]
pub struct ModelRegistry {
	models: HashMap<String, Arc<dyn Model>>,
}

impl ModelRegistry {
	/// Creates an empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `model` under its own name, replacing any previous entry
	pub fn register<M: Model + 'static>(&mut self, model: M) -> &mut Self {
		let name = model.name().to_string();
		self.models.insert(name, Arc::new(model));
		self
	}

	/// Registers a shared model under `name`
	pub fn register_as(&mut self, name: impl Into<String>, model: Arc<dyn Model>) -> &mut Self {
		self.models.insert(name.into(), model);
		self
	}

	/// Looks up a model by name
	pub fn resolve(&self, name: &str) -> Option<Arc<dyn Model>> {
		self.models.get(name).cloned()
	}

	/// Whether a model is registered under `name`
	pub fn contains(&self, name: &str) -> bool {
		self.models.contains_key(name)
	}

	/// Registered names, sorted
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.models.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl fmt::Debug for ModelRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ModelRegistry")
			.field("models", &self.names())
			.finish()
	}
}
