//! Shared helpers for the `fedorable` integration tests.

pub mod builders;
pub mod fake_backend;
pub mod recording;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static TRACING: Once = Once::new();

/// Route `tracing` output into the test harness capture.
///
/// Reads the same `FEDORABLE_LOG` directives as the binary, defaulting to
/// `fedorable=debug` so failing tests show the run lifecycle.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("FEDORABLE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("fedorable=debug"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Await `fut`, panicking if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(output) => output,
        Err(_) => panic!("test step did not finish within {TEST_TIMEOUT:?}"),
    }
}
