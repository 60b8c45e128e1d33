#![forbid(unsafe_code)]

//! Optional structured logging.
//!
//! With the `tracing` feature, index claims are logged at `debug`, change
//! notifications at `trace`, and ignored integer divisions by zero at `warn`.
//! Nothing is emitted until the host installs a subscriber;
//! [`init_json`] installs a JSON one filtered by `RUST_LOG`.

/// Install a global JSON subscriber honoring `RUST_LOG` (default `info`).
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "tracing-json")]
pub fn init_json() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
}
