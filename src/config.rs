//! Configuration resolution for apistub runs.
//!
//! Every option is resolved from several sources. Precedence (highest to
//! lowest):
//! 1. CLI flags
//! 2. Environment variables (`APISTUB_PKG_ROOT`, `APISTUB_FORMAT`,
//!    `APISTUB_INCLUDE_PRIVATE`)
//! 3. Project config (`apistub.json` next to the descriptor file)
//! 4. Defaults
//!
//! Each resolved value remembers where it came from.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use apistub_core::error::ApiStubError;

/// Name of the project config file.
pub const PROJECT_CONFIG_FILE: &str = "apistub.json";

// ============================================================================
// Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The project config file exists but cannot be used.
    #[error("invalid project config {path}: {message}")]
    InvalidProjectConfig { path: String, message: String },

    /// An environment variable holds a value that cannot be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for ApiStubError {
    fn from(err: ConfigError) -> Self {
        ApiStubError::invalid_args(err.to_string())
    }
}

// ============================================================================
// Values
// ============================================================================

/// Output format of a generated document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Full JSON document (tokens + diagnostics).
    #[default]
    Json,
    /// Plain-text rendering of the token stream.
    Text,
}

impl OutputFormat {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "text" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From `apistub.json`.
    ProjectConfig = 1,
    /// From environment variable.
    EnvVar = 2,
    /// From CLI flag (highest precedence).
    CliFlag = 3,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    /// The actual value.
    pub value: T,
    /// Where the value came from.
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    /// Create a new config value with the given source.
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Contents of `apistub.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Root namespace of the package.
    pub pkg_root: Option<String>,
    /// Output format.
    pub format: Option<OutputFormat>,
    /// Keep members with a leading underscore.
    pub include_private: Option<bool>,
}

impl ProjectConfig {
    /// Load `apistub.json` from `dir`, if present.
    pub fn load(dir: &Path) -> Result<Option<Self>, ConfigError> {
        let path = dir.join(PROJECT_CONFIG_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let invalid = |message: String| ConfigError::InvalidProjectConfig {
            path: path.display().to_string(),
            message,
        };
        let json = std::fs::read_to_string(&path).map_err(|e| invalid(e.to_string()))?;
        let config = serde_json::from_str(&json).map_err(|e| invalid(e.to_string()))?;
        Ok(Some(config))
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// --pkg-root flag.
    pub pkg_root: Option<String>,
    /// --format flag.
    pub format: Option<OutputFormat>,
    /// --include-private flag (only `Some(true)` when passed).
    pub include_private: Option<bool>,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolved configuration with precedence information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Root namespace of the package being documented.
    pub pkg_root: ConfigValue<String>,
    /// Output format.
    pub format: ConfigValue<OutputFormat>,
    /// Keep private members.
    pub include_private: ConfigValue<bool>,
}

impl ResolvedConfig {
    /// Resolve configuration from all sources using the process environment.
    pub fn resolve(
        project_dir: Option<&Path>,
        module_name: &str,
        cli_overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();
        Self::resolve_with_env(project_dir, module_name, cli_overrides, &env)
    }

    /// Resolve configuration with an explicit environment lookup.
    pub fn resolve_with_env(
        project_dir: Option<&Path>,
        module_name: &str,
        cli_overrides: &CliOverrides,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = ResolvedConfig::defaults(module_name);

        if let Some(dir) = project_dir {
            if let Some(project) = ProjectConfig::load(dir)? {
                config.apply_project_config(&project);
            }
        }

        config.apply_env_vars(env)?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Default package root is the first segment of the module name.
    fn defaults(module_name: &str) -> Self {
        let root = module_name.split('.').next().unwrap_or_default();
        ResolvedConfig {
            pkg_root: ConfigValue::new(root.to_string(), ConfigSource::Default),
            format: ConfigValue::new(OutputFormat::default(), ConfigSource::Default),
            include_private: ConfigValue::new(false, ConfigSource::Default),
        }
    }

    fn apply_project_config(&mut self, project: &ProjectConfig) {
        if let Some(ref root) = project.pkg_root {
            self.pkg_root = ConfigValue::new(root.clone(), ConfigSource::ProjectConfig);
        }
        if let Some(format) = project.format {
            self.format = ConfigValue::new(format, ConfigSource::ProjectConfig);
        }
        if let Some(include) = project.include_private {
            self.include_private = ConfigValue::new(include, ConfigSource::ProjectConfig);
        }
    }

    fn apply_env_vars(&mut self, env: &dyn Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(root) = env("APISTUB_PKG_ROOT") {
            self.pkg_root = ConfigValue::new(root, ConfigSource::EnvVar);
        }

        if let Some(format) = env("APISTUB_FORMAT") {
            let parsed = match OutputFormat::parse(&format) {
                Some(parsed) => parsed,
                None => {
                    return Err(ConfigError::InvalidValue {
                        key: "APISTUB_FORMAT".to_string(),
                        value: format,
                    });
                }
            };
            self.format = ConfigValue::new(parsed, ConfigSource::EnvVar);
        }

        if let Some(include) = env("APISTUB_INCLUDE_PRIVATE") {
            let parsed = match include.as_str() {
                "1" | "true" => true,
                "0" | "false" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "APISTUB_INCLUDE_PRIVATE".to_string(),
                        value: include,
                    });
                }
            };
            self.include_private = ConfigValue::new(parsed, ConfigSource::EnvVar);
        }
        Ok(())
    }

    fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(ref root) = overrides.pkg_root {
            self.pkg_root = ConfigValue::new(root.clone(), ConfigSource::CliFlag);
        }
        if let Some(format) = overrides.format {
            self.format = ConfigValue::new(format, ConfigSource::CliFlag);
        }
        if let Some(include) = overrides.include_private {
            self.include_private = ConfigValue::new(include, ConfigSource::CliFlag);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
