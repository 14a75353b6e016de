//! Configuration file loader for sequential-publisher
//!
//! This module provides configuration loading, validation, and merging capabilities.

use super::config::*;
use crate::core::error::PublishError;
use regex::Regex;
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Configuration file name
pub const CONFIG_FILENAME: &str = ".publish-config.yaml";

/// Environment variable pattern (${VAR_NAME})
const ENV_VAR_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Delays above this are almost certainly a typo (minutes vs. seconds)
const MAX_REASONABLE_DELAY_SECONDS: u64 = 3600;

/// Configuration load options
#[derive(Debug, Clone)]
pub struct ConfigLoadOptions {
    /// Project path to load config from
    pub project_path: PathBuf,

    /// Explicit config file, replacing the project config lookup
    pub config_file: Option<PathBuf>,

    /// CLI arguments (highest priority)
    pub cli_args: Option<PublishConfig>,

    /// Environment variables
    pub env: HashMap<String, String>,
}

impl ConfigLoadOptions {
    /// Options for `project_path` using the process environment
    pub fn new<P: Into<PathBuf>>(project_path: P) -> Self {
        Self {
            project_path: project_path.into(),
            config_file: None,
            cli_args: None,
            env: env::vars().collect(),
        }
    }
}

/// Configuration validation result
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationResult {
    /// Is configuration valid?
    pub valid: bool,

    /// Validation errors
    pub errors: Vec<ConfigValidationError>,

    /// Validation warnings
    pub warnings: Vec<ConfigValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationError {
    /// Field path (e.g., "task.paths")
    pub field: String,

    /// Error message
    pub message: String,

    /// Expected type/value
    pub expected: Option<String>,

    /// Actual type/value
    pub actual: Option<String>,
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValidationWarning {
    /// Field path
    pub field: String,

    /// Warning message
    pub message: String,

    /// Suggestion
    pub suggestion: Option<String>,
}

/// Configuration file loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from multiple sources with priority
    ///
    /// Priority (high to low):
    /// 1. CLI arguments
    /// 2. Environment variables
    /// 3. Project config (./.publish-config.yaml, or the explicit --config file)
    /// 4. Global config (~/.publish-config.yaml)
    /// 5. Default values
    pub async fn load(options: ConfigLoadOptions) -> Result<PublishConfig, PublishError> {
        let mut configs: Vec<PublishConfig> = Vec::new();

        // 5. Default values (lowest priority)
        configs.push(PublishConfig::default());

        // 4. Global config
        if let Some(global_config) = Self::load_global_config(&options.env).await? {
            configs.push(global_config);
        }

        // 3. Project config
        match &options.config_file {
            Some(config_file) => match Self::load_config_file(config_file).await? {
                Some(config) => configs.push(config),
                None => {
                    return Err(PublishError::ConfigError(format!(
                        "Config file not found: {}",
                        config_file.display()
                    )));
                }
            },
            None => {
                if let Some(project_config) =
                    Self::load_project_config(&options.project_path).await?
                {
                    configs.push(project_config);
                }
            }
        }

        // 2. Environment variables
        if let Some(env_config) = Self::load_env_config(&options.env)? {
            configs.push(env_config);
        }

        // 1. CLI arguments (highest priority)
        if let Some(cli_config) = options.cli_args {
            configs.push(cli_config);
        }

        let merged_config = Self::merge_configs(configs);
        let expanded_config = Self::expand_env_vars(merged_config, &options.env)?;

        tracing::debug!(config = ?expanded_config, "configuration loaded");

        Ok(expanded_config)
    }

    /// Load global configuration from ~/.publish-config.yaml
    async fn load_global_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<PublishConfig>, PublishError> {
        let Some(home_dir) = env.get("HOME") else {
            tracing::debug!("HOME not set, skipping global config");
            return Ok(None);
        };
        let global_config_path = PathBuf::from(home_dir).join(CONFIG_FILENAME);

        Self::load_config_file(&global_config_path).await
    }

    /// Load project configuration from ./.publish-config.yaml
    async fn load_project_config(
        project_path: &Path,
    ) -> Result<Option<PublishConfig>, PublishError> {
        let project_config_path = project_path.join(CONFIG_FILENAME);

        Self::load_config_file(&project_config_path).await
    }

    /// Load configuration from YAML file, following `extends`.
    ///
    /// A missing file is `Ok(None)`; a missing `extends` target is an error.
    async fn load_config_file(file_path: &Path) -> Result<Option<PublishConfig>, PublishError> {
        if !file_path.exists() {
            return Ok(None);
        }

        Self::load_config_chain(file_path.to_path_buf(), Vec::new())
            .await
            .map(Some)
    }

    /// Load one file of an `extends` chain; `visited` holds the canonical
    /// paths of the files that extend it
    fn load_config_chain(
        file_path: PathBuf,
        mut visited: Vec<PathBuf>,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<PublishConfig, PublishError>> + Send>,
    > {
        Box::pin(async move {
            let canonical = fs::canonicalize(&file_path).await.map_err(|e| {
                PublishError::ConfigError(format!(
                    "Failed to read config file {}: {}",
                    file_path.display(),
                    e
                ))
            })?;

            if visited.contains(&canonical) {
                let chain = visited
                    .iter()
                    .chain(std::iter::once(&canonical))
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(PublishError::ConfigError(format!(
                    "Circular extends: {}",
                    chain
                )));
            }

            tracing::debug!(path = %file_path.display(), "reading config file");

            let content = fs::read_to_string(&file_path).await.map_err(|e| {
                PublishError::ConfigError(format!("Failed to read config file: {}", e))
            })?;

            let config: PublishConfig = serde_yaml::from_str(&content).map_err(|e| {
                PublishError::ConfigError(format!(
                    "Failed to parse YAML config {}: {}",
                    file_path.display(),
                    e
                ))
            })?;

            let Some(extends_path) = config.extends.clone() else {
                return Ok(config);
            };

            let base_path = canonical
                .parent()
                .ok_or_else(|| PublishError::ConfigError("Invalid config file path".to_string()))?
                .join(extends_path);

            if !base_path.exists() {
                return Err(PublishError::ConfigError(format!(
                    "Extended config file not found: {} (extended by {})",
                    base_path.display(),
                    file_path.display()
                )));
            }

            visited.push(canonical);
            let base_config = Self::load_config_chain(base_path, visited).await?;

            Ok(Self::merge_configs(vec![base_config, config]))
        })
    }

    /// Load configuration from environment variables
    fn load_env_config(
        env: &HashMap<String, String>,
    ) -> Result<Option<PublishConfig>, PublishError> {
        let mut config = PublishConfig::default();
        let mut has_changes = false;

        // PUBLISH_BASE_PATH -> task.basePath
        if let Some(base_path) = env.get("PUBLISH_BASE_PATH") {
            config.task.base_path = Some(base_path.clone());
            has_changes = true;
        }

        // PUBLISH_DELAY_SECONDS -> task.delaySeconds
        if let Some(delay) = env.get("PUBLISH_DELAY_SECONDS") {
            let seconds = delay.trim().parse::<u64>().map_err(|_| {
                PublishError::ConfigError(format!(
                    "PUBLISH_DELAY_SECONDS must be a non-negative integer, got {:?}",
                    delay
                ))
            })?;
            config.task.delay_seconds = Some(seconds);
            has_changes = true;
        }

        // PUBLISH_COMMAND -> command.program
        if let Some(program) = env.get("PUBLISH_COMMAND") {
            config.command.program = Some(program.clone());
            has_changes = true;
        }

        Ok(if has_changes { Some(config) } else { None })
    }

    /// Merge multiple configurations with priority
    pub fn merge_configs(configs: Vec<PublishConfig>) -> PublishConfig {
        let mut result = PublishConfig::default();

        for config in configs {
            Self::merge_into(&mut result, config);
        }

        result
    }

    /// Merge source config into target
    fn merge_into(target: &mut PublishConfig, source: PublishConfig) {
        if !source.version.is_empty() {
            target.version = source.version;
        }

        if source.extends.is_some() {
            target.extends = source.extends;
        }

        // Task
        let task = source.task;
        if task.base_path.is_some() {
            target.task.base_path = task.base_path;
        }
        if task.paths.is_some() {
            target.task.paths = task.paths;
        }
        if task.delay_seconds.is_some() {
            target.task.delay_seconds = task.delay_seconds;
        }
        if task.delay_after_last.is_some() {
            target.task.delay_after_last = task.delay_after_last;
        }

        // Command
        let command = source.command;
        if command.program.is_some() {
            target.command.program = command.program;
        }
        if command.args.is_some() {
            target.command.args = command.args;
        }
        if command.timeout_seconds.is_some() {
            target.command.timeout_seconds = command.timeout_seconds;
        }
    }

    /// Expand ${VAR_NAME} references in the task paths
    fn expand_env_vars(
        mut config: PublishConfig,
        env: &HashMap<String, String>,
    ) -> Result<PublishConfig, PublishError> {
        let env_var_regex = Regex::new(ENV_VAR_PATTERN)
            .map_err(|e| PublishError::ConfigError(format!("Invalid env pattern: {}", e)))?;

        if let Some(base_path) = &config.task.base_path {
            config.task.base_path = Some(Self::expand_string(base_path, env, &env_var_regex));
        }

        if let Some(paths) = &mut config.task.paths {
            for path in paths.iter_mut() {
                *path = Self::expand_string(path, env, &env_var_regex);
            }
        }

        Ok(config)
    }

    /// Expand environment variables in a single string
    ///
    /// Unknown variables are left in place.
    fn expand_string(input: &str, env: &HashMap<String, String>, env_var_regex: &Regex) -> String {
        let mut result = input.to_string();
        for cap in env_var_regex.captures_iter(input) {
            let var_name = &cap[1];

            if let Some(value) = env.get(var_name) {
                result = result.replace(&format!("${{{}}}", var_name), value);
            } else {
                tracing::warn!(variable = var_name, "environment variable not found");
            }
        }

        result
    }

    /// Validate configuration
    pub fn validate(config: &PublishConfig) -> ConfigValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        // 1. Check version (required)
        if config.version.is_empty() {
            errors.push(ConfigValidationError {
                field: "version".to_string(),
                message: "Version is required".to_string(),
                expected: Some("string (e.g., \"1.0\")".to_string()),
                actual: Some("empty".to_string()),
            });
        } else if config.version != "1.0" {
            warnings.push(ConfigValidationWarning {
                field: "version".to_string(),
                message: format!("Unknown version: {}", config.version),
                suggestion: Some("Currently supported version is \"1.0\" only".to_string()),
            });
        }

        // 2. Validate task
        Self::validate_task(&config.task, &mut errors, &mut warnings);

        // 3. Validate command
        Self::validate_command(&config.command, &mut errors);

        ConfigValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    /// Validate publish order and pacing
    fn validate_task(
        task: &TaskConfig,
        errors: &mut Vec<ConfigValidationError>,
        warnings: &mut Vec<ConfigValidationWarning>,
    ) {
        let paths = task.paths();
        if paths.is_empty() {
            errors.push(ConfigValidationError {
                field: "task.paths".to_string(),
                message: "At least one package directory is required".to_string(),
                expected: Some("non-empty array".to_string()),
                actual: Some("empty array".to_string()),
            });
        }

        for (i, path) in paths.iter().enumerate() {
            if path.is_empty() {
                errors.push(ConfigValidationError {
                    field: format!("task.paths[{}]", i),
                    message: "Path must not be empty".to_string(),
                    expected: Some("relative directory".to_string()),
                    actual: Some("empty".to_string()),
                });
            } else if Path::new(path).is_absolute() {
                errors.push(ConfigValidationError {
                    field: format!("task.paths[{}]", i),
                    message: "Paths are resolved against task.basePath and must be relative"
                        .to_string(),
                    expected: Some("relative directory".to_string()),
                    actual: Some(path.clone()),
                });
            }
        }

        match task.delay_seconds {
            Some(0) => warnings.push(ConfigValidationWarning {
                field: "task.delaySeconds".to_string(),
                message: "No delay between publishes".to_string(),
                suggestion: Some(
                    "Dependents may fail to resolve freshly published packages".to_string(),
                ),
            }),
            Some(seconds) if seconds > MAX_REASONABLE_DELAY_SECONDS => {
                warnings.push(ConfigValidationWarning {
                    field: "task.delaySeconds".to_string(),
                    message: format!("Delay of {} seconds is over an hour", seconds),
                    suggestion: Some("delaySeconds is in seconds, not milliseconds".to_string()),
                })
            }
            _ => {}
        }
    }

    /// Validate publish tool settings
    fn validate_command(command: &CommandConfig, errors: &mut Vec<ConfigValidationError>) {
        if command.program().trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "command.program".to_string(),
                message: "program is required".to_string(),
                expected: Some("executable name (e.g., \"cargo\")".to_string()),
                actual: Some("empty".to_string()),
            });
        }

        if command.timeout_seconds == Some(0) {
            errors.push(ConfigValidationError {
                field: "command.timeoutSeconds".to_string(),
                message: "timeoutSeconds must be greater than zero".to_string(),
                expected: Some("positive integer".to_string()),
                actual: Some("0".to_string()),
            });
        }
    }

    /// Format validation result as human-readable string
    pub fn format_validation_result(result: &ConfigValidationResult) -> String {
        let mut lines = Vec::new();

        if result.valid {
            lines.push("✅ Configuration validation succeeded".to_string());
        } else {
            lines.push("❌ Configuration has errors".to_string());
        }

        if !result.errors.is_empty() {
            lines.push("\n🔴 Errors:".to_string());
            for error in &result.errors {
                lines.push(format!("  - [{}] {}", error.field, error.message));
                if let (Some(expected), Some(actual)) = (&error.expected, &error.actual) {
                    lines.push(format!("    Expected: {}", expected));
                    lines.push(format!("    Actual: {}", actual));
                }
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\n🟡 Warnings:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  - [{}] {}", warning.field, warning.message));
                if let Some(suggestion) = &warning.suggestion {
                    lines.push(format!("    Suggestion: {}", suggestion));
                }
            }
        }

        lines.join("\n")
    }
}
