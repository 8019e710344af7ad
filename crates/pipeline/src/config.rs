//! Pipeline configuration

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use linkage_core::{FailurePolicy, LinkOptions, Salt};
use thiserror::Error;

/// Configuration errors, reported before any bundle is read
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Pipeline configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub salt: Salt,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub link_options: LinkOptions,
    pub workers: usize,
    pub report_path: Option<PathBuf>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("link_options", &self.link_options)
            .field("workers", &self.workers)
            .field("report_path", &self.report_path)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var_os(name))
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let text = |name: &'static str| -> Result<Option<String>, ConfigError> {
            lookup(name)
                .map(|v| {
                    v.into_string().map_err(|_| ConfigError::Invalid {
                        name,
                        reason: "not valid UTF-8".to_string(),
                    })
                })
                .transpose()
        };

        let salt = lookup("HASH_SALT").ok_or(ConfigError::Missing("HASH_SALT"))?;
        let salt = Salt::from_os_string(salt).map_err(|e| ConfigError::Invalid {
            name: "HASH_SALT",
            reason: e.to_string(),
        })?;
        if salt.is_empty() {
            return Err(ConfigError::Invalid {
                name: "HASH_SALT",
                reason: "must not be empty".to_string(),
            });
        }

        let policy = match text("LINK_POLICY")?.as_deref() {
            None | Some("fail-fast") => FailurePolicy::FailFast,
            Some("skip") => FailurePolicy::SkipAndCollect,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LINK_POLICY",
                    reason: format!("expected `fail-fast` or `skip`, got `{}`", other),
                });
            }
        };

        let validate_schema = match text("VALIDATE_SCHEMA")?.as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "VALIDATE_SCHEMA",
                    reason: format!("expected a boolean, got `{}`", other),
                });
            }
        };

        let workers = match text("WORKERS")? {
            None => 4,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "WORKERS",
                        reason: format!("expected a positive integer, got `{}`", raw),
                    });
                }
            },
        };

        Ok(Self {
            salt,
            input_dir: lookup("INPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| "./input".into()),
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| "./output".into()),
            link_options: LinkOptions {
                policy,
                validate_schema,
            },
            workers,
            report_path: lookup("REPORT_PATH").map(PathBuf::from),
        })
    }
}
