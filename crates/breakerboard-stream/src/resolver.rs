//! Per-command configuration resolution.
//!
//! A command's configuration is the `default` block with the command's own
//! block merged over it field by field. Results are memoized per command
//! key for the lifetime of the resolver; configuration is static once
//! loaded.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, warn};

use breakerboard_core::config::{CommandConfig, DEFAULT_COMMAND_BLOCK};
use breakerboard_core::error::AppError;

/// Resolves and caches [`CommandConfig`] per command key.
#[derive(Debug)]
pub struct ConfigResolver {
    /// The `default` block.
    default_block: Value,
    /// Command-specific blocks, keyed by command key.
    blocks: HashMap<String, Value>,
    /// Memoized results.
    resolved: DashMap<String, Arc<CommandConfig>>,
    /// Typed view of the bare default, used when a merge cannot be read.
    fallback: Arc<CommandConfig>,
}

impl ConfigResolver {
    /// Build a resolver over the command configuration tree.
    ///
    /// Every block is merged and validated up front, so a bad tree is
    /// reported at startup rather than on the first poll that needs it.
    pub fn new(tree: &HashMap<String, Value>) -> Result<Self, AppError> {
        let default_block = tree
            .get(DEFAULT_COMMAND_BLOCK)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        let fallback = Arc::new(CommandConfig::from_value(default_block.clone())?);

        let blocks: HashMap<String, Value> = tree
            .iter()
            .filter(|(key, _)| key.as_str() != DEFAULT_COMMAND_BLOCK)
            .map(|(key, block)| (key.clone(), block.clone()))
            .collect();

        for (key, block) in &blocks {
            let mut merged = default_block.clone();
            merge_values(&mut merged, block);
            CommandConfig::from_value(merged).map_err(|e| {
                AppError::configuration(format!("Command '{key}': {}", e.message))
            })?;
        }

        Ok(Self {
            default_block,
            blocks,
            resolved: DashMap::new(),
            fallback,
        })
    }

    /// Resolve the configuration of `command_key`.
    ///
    /// Unknown command keys get the default configuration.
    pub fn resolve(&self, command_key: &str) -> Arc<CommandConfig> {
        if let Some(config) = self.resolved.get(command_key) {
            return Arc::clone(config.value());
        }

        let mut merged = self.default_block.clone();
        if let Some(block) = self.blocks.get(command_key) {
            merge_values(&mut merged, block);
        }

        let config = match CommandConfig::from_value(merged) {
            Ok(config) => Arc::new(config),
            Err(e) => {
                warn!(command_key, error = %e, "Falling back to default command config");
                Arc::clone(&self.fallback)
            }
        };

        debug!(command_key, "Resolved command config");
        Arc::clone(
            self.resolved
                .entry(command_key.to_string())
                .or_insert(config)
                .value(),
        )
    }
}

/// Merge `overlay` into `base`: nested objects merge key by key, anything
/// else in `overlay` replaces the value in `base`.
pub fn merge_values(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
