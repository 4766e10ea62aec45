//! Test logging
//!
//! `tracing` events are forwarded to `log` (its `log` feature) and printed by
//! `env_logger`, filtered through `RUST_LOG`.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes logging once per test binary
///
/// # Examples
///
/// ```
/// use datatables_test::logging::init_test_logging;
///
/// init_test_logging();
/// init_test_logging();
/// ```
pub fn init_test_logging() {
	INIT.call_once(|| {
		let _ = env_logger::builder().is_test(true).try_init();
	});
}
