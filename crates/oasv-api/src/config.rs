//! # Server Configuration
//!
//! Read from the environment:
//!
//! | Variable        | Meaning                              | Default |
//! |-----------------|--------------------------------------|---------|
//! | `OASV_SPEC`     | path to the OpenAPI document (YAML or JSON) | required |
//! | `PORT`          | listen port                          | `8080`  |
//! | `OASV_VALIDATE` | `false` or `0` disables validation   | `true`  |

use std::path::PathBuf;

use thiserror::Error;

/// Configuration failure at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset.
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    /// A variable is set to something unusable.
    #[error("environment variable {name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// HTTP adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// OpenAPI document to load.
    pub spec_path: PathBuf,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Whether requests are validated at all.
    pub validate: bool,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// `Missing` when `OASV_SPEC` is unset, `Invalid` for an unparsable
    /// `PORT` or `OASV_VALIDATE`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let spec_path = lookup("OASV_SPEC")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::Missing("OASV_SPEC"))?;
        let port = match lookup("PORT") {
            None => 8080,
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
        };
        let validate = match lookup("OASV_VALIDATE").as_deref().map(str::trim) {
            None | Some("true" | "1" | "") => true,
            Some("false" | "0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "OASV_VALIDATE",
                    value: other.to_string(),
                })
            }
        };
        Ok(Self {
            spec_path,
            port,
            validate,
        })
    }
}
