//! Test logging and assertion helpers.
//!
//! Available to unit tests and, through the `test-internals` feature, to
//! integration tests. Set `RUST_LOG=ioselect=trace` to see background reader
//! activity interleaved with test phases.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

#[doc(hidden)]
pub use tracing;

static INIT: Once = Once::new();

/// Installs a test-friendly `tracing` subscriber once per process.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ioselect=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Logs the start of a named test phase.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::test_utils::tracing::info!(phase = %$name, "test phase");
    };
}

/// Logs the completion of a named test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        $crate::test_utils::tracing::info!(test = %$name, "test complete");
    };
}

/// Asserts a condition, logging the expected and actual values either way.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $what:expr, $expected:expr, $actual:expr) => {{
        let ok: bool = $cond;
        let expected = &$expected;
        let actual = &$actual;
        $crate::test_utils::tracing::debug!(
            check = %$what,
            expected = ?expected,
            actual = ?actual,
            ok,
            "assert"
        );
        assert!(ok, "{}: expected {:?}, got {:?}", $what, expected, actual);
    }};
}
