//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod command;
pub mod logging;
pub mod server;
pub mod store;
pub mod stream;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use self::command::CommandConfig;
use self::logging::LoggingConfig;
use self::server::ServerConfig;
use self::store::StoreConfig;
use self::stream::StreamConfig;

use crate::error::AppError;

/// Name of the block every command configuration inherits from.
pub const DEFAULT_COMMAND_BLOCK: &str = "default";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Event stream settings.
    #[serde(default)]
    pub stream: StreamConfig,
    /// Counter store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Command configuration tree: a `default` block plus optional
    /// blocks keyed by command key. Kept untyped so that per-command blocks
    /// can be merged field-by-field over the default. Environment variables
    /// cannot reach these camelCase keys; use a TOML overlay.
    #[serde(default)]
    pub commands: HashMap<String, serde_json::Value>,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `BREAKERBOARD_`. Environment
    /// keys are lowercased on the way in, so they only override the
    /// snake_case sections, never the `commands` tree.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("BREAKERBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints after loading.
    pub fn validate(&self) -> Result<(), AppError> {
        self.stream.validate()
    }
}
