//! Logger initialisation for processes driven by generated code.
//!
//! The runtime crates only emit through the `log` facade. When the
//! process entry point captures its arguments, [`init`] installs an
//! `env_logger` writing to stderr, filtered by `AURT_LOG` (off when
//! unset). A host that installed its own logger first keeps it.

use aurt_core::config::LOG_ENV;
use aurt_core::RuntimeConfig;

/// Filter used when `AURT_LOG` is unset.
pub const DEFAULT_FILTER: &str = "off";

/// Install the stderr logger, then load [`RuntimeConfig`]. Idempotent.
///
/// The filter is read straight from the environment so the logger exists
/// before the config loads and can report rejected variables.
pub fn init() {
    let filter = std::env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let installed = env_logger::Builder::new()
        .parse_filters(&filter)
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .try_init()
        .is_ok();
    if installed {
        log::debug!("logging initialised with filter {filter:?}");
    }
    RuntimeConfig::global();
}
