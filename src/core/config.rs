//! Configuration structures and types for sequential-publisher
//!
//! This module provides type-safe configuration management with serde support.
//! Every field is optional so that configuration layers can be merged; the
//! accessor methods fall back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Publish order used when no configuration overrides it
pub const DEFAULT_PATHS: &[&str] = &["engine", "macro", ".", "gen/build"];

/// Delay between publishes, giving the registry index time to catch up
pub const DEFAULT_DELAY_SECONDS: u64 = 30;

/// Default publish tool
pub const DEFAULT_PROGRAM: &str = "cargo";

/// Default publish tool arguments
pub const DEFAULT_ARGS: &[&str] = &["publish"];

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublishConfig {
    /// Schema version (required)
    pub version: String,

    /// Extend from base configuration file (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Publish order and pacing
    #[serde(default)]
    pub task: TaskConfig,

    /// External publish tool
    #[serde(default)]
    pub command: CommandConfig,
}

/// Publish order and pacing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TaskConfig {
    /// Directory the relative paths are resolved against (default: ".")
    #[serde(skip_serializing_if = "Option::is_none", rename = "basePath")]
    pub base_path: Option<String>,

    /// Package directories, in publish order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,

    /// Seconds to wait after each publish
    #[serde(skip_serializing_if = "Option::is_none", rename = "delaySeconds")]
    pub delay_seconds: Option<u64>,

    /// Also wait after the final publish (default: false)
    #[serde(skip_serializing_if = "Option::is_none", rename = "delayAfterLast")]
    pub delay_after_last: Option<bool>,
}

/// External publish tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CommandConfig {
    /// Executable name (default: "cargo")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,

    /// Arguments passed to the executable (default: ["publish"])
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    /// Per-package timeout in seconds (default: none)
    #[serde(skip_serializing_if = "Option::is_none", rename = "timeoutSeconds")]
    pub timeout_seconds: Option<u64>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            extends: None,
            task: TaskConfig::default(),
            command: CommandConfig::default(),
        }
    }
}

impl PublishConfig {
    /// Configuration with every default spelled out, as written by `init`
    pub fn explicit_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            extends: None,
            task: TaskConfig {
                base_path: Some(".".to_string()),
                paths: Some(DEFAULT_PATHS.iter().map(|p| p.to_string()).collect()),
                delay_seconds: Some(DEFAULT_DELAY_SECONDS),
                delay_after_last: Some(false),
            },
            command: CommandConfig {
                program: Some(DEFAULT_PROGRAM.to_string()),
                args: Some(DEFAULT_ARGS.iter().map(|a| a.to_string()).collect()),
                timeout_seconds: None,
            },
        }
    }
}

impl TaskConfig {
    pub fn base_path(&self) -> &str {
        self.base_path.as_deref().unwrap_or(".")
    }

    pub fn paths(&self) -> Vec<String> {
        match &self.paths {
            Some(paths) => paths.clone(),
            None => DEFAULT_PATHS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_seconds.unwrap_or(DEFAULT_DELAY_SECONDS))
    }

    pub fn delay_after_last(&self) -> bool {
        self.delay_after_last.unwrap_or(false)
    }
}

impl CommandConfig {
    pub fn program(&self) -> &str {
        self.program.as_deref().unwrap_or(DEFAULT_PROGRAM)
    }

    pub fn args(&self) -> Vec<String> {
        match &self.args {
            Some(args) => args.clone(),
            None => DEFAULT_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}
