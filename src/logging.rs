//! Logging setup.
//!
//! The crate logs through the [`log`] facade: `info!` for pipeline
//! milestones, `debug!` for learned state, `warn!` when a stage fails.
//! Nothing is printed unless the host installs a logger; these helpers wire
//! up `env_logger` for binaries and tests.
//!
//! ```no_run
//! regression_features::logging::init();
//! log::info!("pipeline ready");
//! ```
//!
//! Set `RUST_LOG=debug` to see what each stage learned during fit.

use env_logger::Env;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Installs `env_logger` as the global logger.
///
/// Calling this more than once is harmless: later calls leave the first
/// logger in place.
pub fn init() {
    let installed = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_timestamp_millis()
        .try_init()
        .is_ok();

    if installed {
        log::debug!("Logging initialized with default filter '{DEFAULT_FILTER}'");
    }
}

/// Installs a test-friendly logger that writes through the test harness
/// capture.
pub fn init_for_tests() {
    let result = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();

    if result.is_err() {
        log::trace!("Test logger already installed");
    }
}
