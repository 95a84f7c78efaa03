//! Runtime configuration, read once from the environment.
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `AURT_ABORT` | `exit`, `trap` | `exit` |
//! | `AURT_EXIT_CODE` | `1..=255` | `1` |
//! | `AURT_LOG` | `env_logger` filter | `off` |

use std::sync::OnceLock;

use thiserror::Error;

/// Environment variable selecting the abort strategy.
pub const ABORT_ENV: &str = "AURT_ABORT";
/// Environment variable holding the exit status used by [`AbortStrategy::Exit`].
pub const EXIT_CODE_ENV: &str = "AURT_EXIT_CODE";
/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "AURT_LOG";

/// How the fatal path terminates the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortStrategy {
    /// Flush and exit with the given non-zero status.
    Exit {
        /// Process exit status.
        code: i32,
    },
    /// Raise `SIGABRT` via `std::process::abort`, leaving a core dump
    /// where the host allows it.
    Trap,
}

impl Default for AbortStrategy {
    fn default() -> Self {
        Self::Exit {
            code: RuntimeConfig::DEFAULT_EXIT_CODE,
        }
    }
}

/// Errors detected while reading or validating [`RuntimeConfig`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `AURT_ABORT` held something other than `exit` or `trap`.
    #[error("unknown abort strategy {value:?}, expected \"exit\" or \"trap\"")]
    UnknownAbortStrategy {
        /// The rejected value.
        value: String,
    },
    /// `AURT_EXIT_CODE` was not an integer.
    #[error("exit code {value:?} is not an integer")]
    InvalidExitCode {
        /// The rejected value.
        value: String,
    },
    /// The exit code is outside `1..=255`. Hosts keep only the low eight
    /// bits of a status, so anything else can read back as success.
    #[error("exit code {code} is outside 1..=255")]
    ExitCodeOutOfRange {
        /// The rejected code.
        code: i32,
    },
}

/// Process-wide runtime configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Termination strategy for the fatal path.
    pub abort: AbortStrategy,
    /// Log filter handed to the logger, if any.
    pub log_filter: Option<String>,
}

impl RuntimeConfig {
    /// Exit status used when none is configured.
    pub const DEFAULT_EXIT_CODE: i32 = 1;

    /// Valid exit codes for [`AbortStrategy::Exit`].
    pub const EXIT_CODE_RANGE: std::ops::RangeInclusive<i32> = 1..=255;

    /// Build a config from a variable lookup function.
    ///
    /// Unset variables take their defaults. Fails on the first invalid
    /// variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let code = parse_exit_code(lookup(EXIT_CODE_ENV))?;
        let abort = parse_strategy(lookup(ABORT_ENV), code)?;
        let config = Self {
            abort,
            log_filter: lookup(LOG_ENV),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a config field by field, replacing each invalid variable with
    /// its default. Returns the config and every rejected variable.
    pub fn from_lookup_lenient<F>(lookup: F) -> (Self, Vec<ConfigError>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        let code = parse_exit_code(lookup(EXIT_CODE_ENV)).unwrap_or_else(|e| {
            errors.push(e);
            Self::DEFAULT_EXIT_CODE
        });
        let abort = parse_strategy(lookup(ABORT_ENV), code).unwrap_or_else(|e| {
            errors.push(e);
            AbortStrategy::Exit { code }
        });
        let config = Self {
            abort,
            log_filter: lookup(LOG_ENV),
        };
        (config, errors)
    }

    /// Build a config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Check invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let AbortStrategy::Exit { code } = self.abort {
            if !Self::EXIT_CODE_RANGE.contains(&code) {
                return Err(ConfigError::ExitCodeOutOfRange { code });
            }
        }
        Ok(())
    }

    /// The process-wide config, loaded from the environment on first use.
    ///
    /// Each invalid variable falls back to its default with a warning;
    /// valid ones are kept.
    pub fn global() -> &'static RuntimeConfig {
        static CONFIG: OnceLock<RuntimeConfig> = OnceLock::new();
        CONFIG.get_or_init(|| {
            let (config, errors) = Self::from_lookup_lenient(env_lookup);
            for e in &errors {
                log::warn!("ignoring invalid runtime config: {e}");
            }
            log::debug!("runtime config loaded: {config:?}");
            config
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_exit_code(raw: Option<String>) -> Result<i32, ConfigError> {
    let Some(raw) = raw else {
        return Ok(RuntimeConfig::DEFAULT_EXIT_CODE);
    };
    let code = raw
        .trim()
        .parse::<i32>()
        .map_err(|_| ConfigError::InvalidExitCode { value: raw.clone() })?;
    if !RuntimeConfig::EXIT_CODE_RANGE.contains(&code) {
        return Err(ConfigError::ExitCodeOutOfRange { code });
    }
    Ok(code)
}

fn parse_strategy(raw: Option<String>, code: i32) -> Result<AbortStrategy, ConfigError> {
    match raw.as_deref().map(str::trim) {
        None | Some("exit") => Ok(AbortStrategy::Exit { code }),
        Some("trap") => Ok(AbortStrategy::Trap),
        Some(other) => Err(ConfigError::UnknownAbortStrategy {
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.abort, AbortStrategy::Exit { code: 1 });
        assert_eq!(config.log_filter, None);
    }

    #[test]
    fn trap_strategy() {
        let config = RuntimeConfig::from_lookup(lookup(&[(ABORT_ENV, "trap")])).unwrap();
        assert_eq!(config.abort, AbortStrategy::Trap);
    }

    #[test]
    fn custom_exit_code() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            (ABORT_ENV, "exit"),
            (EXIT_CODE_ENV, " 70 "),
        ]))
        .unwrap();
        assert_eq!(config.abort, AbortStrategy::Exit { code: 70 });
    }

    #[test]
    fn exit_codes_that_read_as_success_rejected() {
        for (raw, code) in [("0", 0), ("256", 256), ("512", 512), ("-256", -256)] {
            assert_eq!(
                RuntimeConfig::from_lookup(lookup(&[(EXIT_CODE_ENV, raw)])),
                Err(ConfigError::ExitCodeOutOfRange { code })
            );
        }
        assert!(RuntimeConfig::from_lookup(lookup(&[(EXIT_CODE_ENV, "255")])).is_ok());
    }

    #[test]
    fn validate_checks_hand_built_configs() {
        let config = RuntimeConfig {
            abort: AbortStrategy::Exit { code: 256 },
            log_filter: None,
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ExitCodeOutOfRange { code: 256 })
        );
    }

    #[test]
    fn lenient_load_keeps_valid_fields() {
        let (config, errors) = RuntimeConfig::from_lookup_lenient(lookup(&[
            (EXIT_CODE_ENV, "bogus"),
            (LOG_ENV, "warn"),
        ]));
        assert_eq!(config.abort, AbortStrategy::Exit { code: 1 });
        assert_eq!(config.log_filter.as_deref(), Some("warn"));
        assert_eq!(
            errors,
            vec![ConfigError::InvalidExitCode {
                value: "bogus".into()
            }]
        );
    }

    #[test]
    fn lenient_load_keeps_code_when_strategy_is_bad() {
        let (config, errors) = RuntimeConfig::from_lookup_lenient(lookup(&[
            (EXIT_CODE_ENV, "70"),
            (ABORT_ENV, "explode"),
        ]));
        assert_eq!(config.abort, AbortStrategy::Exit { code: 70 });
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn garbage_values_rejected() {
        assert!(matches!(
            RuntimeConfig::from_lookup(lookup(&[(EXIT_CODE_ENV, "one")])),
            Err(ConfigError::InvalidExitCode { .. })
        ));
        assert!(matches!(
            RuntimeConfig::from_lookup(lookup(&[(ABORT_ENV, "panic")])),
            Err(ConfigError::UnknownAbortStrategy { .. })
        ));
    }

    #[test]
    fn log_filter_passed_through() {
        let config = RuntimeConfig::from_lookup(lookup(&[(LOG_ENV, "aurt=trace")])).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("aurt=trace"));
    }
}
