//! Test support for the DataTables engine
//!
//! - [`mock::MockModel`]: in-memory model that records every call
//! - [`fixtures`]: `Person` rows, model and table options
//! - [`logging::init_test_logging`]: one-time `env_logger` setup

pub mod fixtures;
pub mod logging;
pub mod mock;

pub use fixtures::{PERSON, first_page, registry_with};
pub use logging::init_test_logging;
pub use mock::{MockCall, MockModel};
