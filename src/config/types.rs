//! Configuration types for aclregex
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ACL enforcement settings
    pub acl: AclConfig,

    /// Identity store settings
    pub identity: IdentityConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// ACL enforcement configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Whether ACLs are enforced at all; when off everyone gets upload rights
    pub enabled: bool,

    /// Path to the rule file (`acl.auth.php` layout)
    pub rules_file: Option<String>,

    /// Users and `@groups` that always receive admin rights
    #[serde(default)]
    pub superuser: Vec<String>,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            rules_file: None,
            superuser: Vec::new(),
        }
    }
}

/// Identity store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Which backend provides identities
    pub backend: IdentityBackendKind,

    /// Whether user and group names are case-sensitive
    pub case_sensitive: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            backend: IdentityBackendKind::Plain,
            case_sensitive: true,
        }
    }
}

/// Identity backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityBackendKind {
    /// Names taken as given, trimmed
    #[default]
    Plain,
    /// No authentication backend loaded
    None,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
