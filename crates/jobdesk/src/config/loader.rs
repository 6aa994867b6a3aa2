use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::{Config, CONFIG_VERSION};
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

/// Longest accepted suggestion-list grace delay.
const MAX_BLUR_GRACE_MS: u64 = 5_000;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    if !json_value.is_object() {
        return Err(ConfigError::Validation {
            message: "Config root must be a JSON object".to_string(),
        });
    }

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

/// Checks raw config JSON against the bundled schema. Unknown keys fail
/// here instead of being dropped by serde.
fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let errors: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !errors.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: errors.join("; "),
        });
    }

    Ok(())
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != CONFIG_VERSION {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    let collections = [
        ("jobs", &config.collections.jobs),
        ("customers", &config.collections.customers),
        ("users", &config.collections.users),
    ];
    let mut seen = HashSet::new();
    for (role, name) in collections {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: format!("Collection name for '{}' must not be empty", role),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::Validation {
                message: format!("Collection '{}' is used for more than one purpose", name),
            });
        }
    }

    if config.access.allowed_roles.is_empty() {
        return Err(ConfigError::Validation {
            message: "At least one allowed role is required".to_string(),
        });
    }
    if config
        .access
        .allowed_roles
        .iter()
        .any(|r| r.trim().is_empty())
    {
        return Err(ConfigError::Validation {
            message: "Allowed roles must not be empty strings".to_string(),
        });
    }

    if config.autocomplete.blur_grace_ms > MAX_BLUR_GRACE_MS {
        return Err(ConfigError::Validation {
            message: format!(
                "autocomplete.blur_grace_ms must be at most {} (got {})",
                MAX_BLUR_GRACE_MS, config.autocomplete.blur_grace_ms
            ),
        });
    }

    Ok(())
}
