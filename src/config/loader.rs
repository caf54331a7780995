//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (ACLREGEX__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "aclregex.toml",
    ".aclregex.toml",
    "~/.config/aclregex/config.toml",
    "/etc/aclregex/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // e.g. ACLREGEX__ACL__RULES_FILE, ACLREGEX__IDENTITY__CASE_SENSITIVE
    // Double underscore (__) maps to nested keys (acl.rules_file)
    builder = builder.add_source(
        Environment::with_prefix("ACLREGEX")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("acl.superuser"),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(path) = &config.acl.rules_file
        && path.trim().is_empty()
    {
        return Err(ConfigError::Invalid {
            message: "acl.rules_file must not be empty".to_string(),
        });
    }

    if config.acl.superuser.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Invalid {
            message: "acl.superuser entries must not be empty".to_string(),
        });
    }

    Ok(())
}

/// Resolve the rule file path, preferring an explicit override
pub fn rules_path<'a>(
    config: &'a AppConfig,
    override_path: Option<&'a str>,
) -> Result<&'a str, ConfigError> {
    override_path
        .or(config.acl.rules_file.as_deref())
        .ok_or_else(|| ConfigError::Missing {
            field: "acl.rules_file (or pass --rules)".to_string(),
        })
}
