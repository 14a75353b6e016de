//! SafeCommandExecutor: allow-listed execution of the external publish tool
//!
//! # Security Features
//!
//! - **Allow-list validation**: Only known publish tools can execute
//! - **Injection prevention**: Uses `tokio::process::Command`, never a shell
//! - **Argument safety**: Arguments passed as Vec, never interpolated into shell strings
//! - **Working directory validation**: Validates existence before execution
//! - **Timeout control**: Hanging publishes are killed after the configured duration
//!
//! The tool's stdout and stderr are inherited, so its own output reaches the
//! user unchanged. With [`SafeCommandExecutor::set_stdout_to_stderr`] the
//! tool's stdout is sent to stderr instead, keeping stdout for a report.
//!
//! # Example
//!
//! ```rust,no_run
//! use sequential_publisher::SafeCommandExecutor;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), sequential_publisher::CommandError> {
//! let mut executor = SafeCommandExecutor::new("cargo", vec!["publish".to_string()])?;
//! executor.set_timeout(Duration::from_secs(600));
//!
//! let status = executor.execute(std::path::Path::new("engine")).await?;
//! println!("exit code: {:?}", status.code());
//! # Ok(())
//! # }
//! ```

use crate::core::config::CommandConfig;
use crate::core::error::PublishError;
use crate::core::traits::{ExecutionOutcome, PublishExecutor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Allowed commands for security.
///
/// Only these publish tools can be executed via SafeCommandExecutor.
pub const ALLOWED_COMMANDS: &[&str] = &[
    "cargo", "npm", "pnpm", "yarn", "twine", "python", "gem", "mvn", "gradle", "dotnet",
];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed list
    #[error("Command '{0}' is not in the allowed list")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command execution failed (e.g., binary not found, permission denied)
    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    /// Command exceeded the timeout duration
    #[error("Command timeout after {0:?}")]
    Timeout(Duration),
}

/// Safe command executor with security controls
#[derive(Debug, Clone)]
pub struct SafeCommandExecutor {
    program: String,
    args: Vec<String>,
    display_name: String,
    /// Optional timeout for command execution
    timeout: Option<Duration>,
    stdout_to_stderr: bool,
}

impl SafeCommandExecutor {
    /// Create an executor for `program args...`, checked against [`ALLOWED_COMMANDS`].
    ///
    /// # Errors
    ///
    /// Returns `CommandError::CommandNotAllowed` if the program is not allowed.
    pub fn new<S: Into<String>>(program: S, args: Vec<String>) -> Result<Self, CommandError> {
        Self::with_allowed_commands(program, args, ALLOWED_COMMANDS)
    }

    /// Create an executor checked against a caller-supplied allow-list.
    pub fn with_allowed_commands<S: Into<String>>(
        program: S,
        args: Vec<String>,
        allowed: &[&str],
    ) -> Result<Self, CommandError> {
        let program = program.into();

        // A full path is allowed when its file name is
        let command_name = Path::new(&program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        if !allowed.contains(&command_name) {
            return Err(CommandError::CommandNotAllowed(program));
        }

        let display_name = std::iter::once(program.as_str())
            .chain(args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");

        Ok(Self {
            program,
            args,
            display_name,
            timeout: None,
            stdout_to_stderr: false,
        })
    }

    /// Create an executor from the `command` section of the configuration
    pub fn from_config(config: &CommandConfig) -> Result<Self, CommandError> {
        let mut executor = Self::new(config.program(), config.args())?;
        if let Some(timeout) = config.timeout() {
            executor.set_timeout(timeout);
        }
        Ok(executor)
    }

    /// Set command execution timeout.
    ///
    /// Commands exceeding this duration will be killed.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Send the tool's stdout to this process's stderr
    pub fn set_stdout_to_stderr(&mut self, enabled: bool) {
        self.stdout_to_stderr = enabled;
    }

    /// Run the command in `working_dir` and wait for it to finish.
    ///
    /// # Errors
    ///
    /// - `CommandError::InvalidWorkingDirectory` - `working_dir` is not a directory
    /// - `CommandError::ExecutionFailed` - Binary not found or execution error
    /// - `CommandError::Timeout` - The command was killed after the timeout
    pub async fn execute(&self, working_dir: &Path) -> Result<ExitStatus, CommandError> {
        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(
                working_dir.to_path_buf(),
            ));
        }

        // Windows-specific: npm, yarn, etc. are .cmd files, not .exe
        #[cfg(target_os = "windows")]
        let command_name = if matches!(self.program.as_str(), "npm" | "yarn" | "pnpm") {
            format!("{}.cmd", self.program)
        } else {
            self.program.clone()
        };

        #[cfg(not(target_os = "windows"))]
        let command_name = self.program.clone();

        tracing::debug!(
            command = %self.display_name,
            dir = %working_dir.display(),
            "spawning publish command"
        );

        let mut command = Command::new(&command_name);
        command
            .args(&self.args)
            .current_dir(working_dir)
            .kill_on_drop(true);
        if self.stdout_to_stderr {
            command.stdout(Stdio::from(std::io::stderr()));
        }

        let mut child = command
            .spawn()
            .map_err(|e| CommandError::ExecutionFailed(format!("{}: {}", command_name, e)))?;

        let status = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    if let Err(e) = child.kill().await {
                        tracing::warn!(error = %e, "failed to kill timed out command");
                    }
                    return Err(CommandError::Timeout(timeout));
                }
            },
            None => child.wait().await,
        }
        .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        Ok(status)
    }
}

#[async_trait]
impl PublishExecutor for SafeCommandExecutor {
    fn name(&self) -> &str {
        &self.display_name
    }

    async fn publish(&self, dir: &Path) -> Result<ExecutionOutcome, PublishError> {
        match self.execute(dir).await {
            Ok(status) => Ok(ExecutionOutcome {
                exit_code: status.code(),
            }),
            Err(CommandError::InvalidWorkingDirectory(path)) => {
                Err(PublishError::DirectoryNotFound { path })
            }
            Err(CommandError::Timeout(timeout)) => Err(PublishError::TimeoutError {
                path: dir.to_path_buf(),
                timeout,
            }),
            Err(e) => Err(PublishError::CommandError {
                path: dir.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_allowed_command_cargo() {
        let executor = SafeCommandExecutor::new("cargo", args(&["publish"])).unwrap();
        assert_eq!(executor.name(), "cargo publish");
        assert!(executor.timeout().is_none());
    }

    #[test]
    fn test_allowed_command_full_path() {
        assert!(SafeCommandExecutor::new("/usr/local/bin/cargo", args(&["publish"])).is_ok());
    }

    #[test]
    fn test_rejected_command_rm() {
        let result = SafeCommandExecutor::new("rm", args(&["-rf", "/"]));
        assert!(
            matches!(result, Err(CommandError::CommandNotAllowed(_))),
            "rm should be rejected as not in the allowed list"
        );
    }

    #[test]
    fn test_rejected_command_shell() {
        let result = SafeCommandExecutor::new("sh", args(&["-c", "cargo publish"]));
        assert!(matches!(result, Err(CommandError::CommandNotAllowed(_))));
    }

    #[test]
    fn test_from_config_applies_timeout() {
        let config = CommandConfig {
            program: Some("npm".to_string()),
            args: Some(args(&["publish"])),
            timeout_seconds: Some(90),
        };

        let executor = SafeCommandExecutor::from_config(&config).unwrap();
        assert_eq!(executor.name(), "npm publish");
        assert_eq!(executor.timeout(), Some(Duration::from_secs(90)));
    }

    #[tokio::test]
    async fn test_invalid_working_directory() {
        let executor = SafeCommandExecutor::new("cargo", args(&["--version"])).unwrap();
        let result = executor
            .execute(Path::new("/nonexistent/directory/that/does/not/exist"))
            .await;
        assert!(matches!(
            result,
            Err(CommandError::InvalidWorkingDirectory(_))
        ));
    }

    #[tokio::test]
    async fn test_publish_maps_missing_directory() {
        let executor = SafeCommandExecutor::new("cargo", args(&["--version"])).unwrap();
        let result = executor.publish(Path::new("/nonexistent/dir")).await;
        assert!(matches!(result, Err(PublishError::DirectoryNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_reported() {
        let dir = TempDir::new().unwrap();
        let executor =
            SafeCommandExecutor::with_allowed_commands("sh", args(&["-c", "exit 3"]), &["sh"])
                .unwrap();

        let outcome = executor.publish(dir.path()).await.unwrap();
        assert_eq!(outcome.exit_code, Some(3));
        assert!(!outcome.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_in_working_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        let executor = SafeCommandExecutor::with_allowed_commands(
            "sh",
            args(&["-c", "test -f Cargo.toml"]),
            &["sh"],
        )
        .unwrap();

        let outcome = executor.publish(dir.path()).await.unwrap();
        assert!(outcome.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_to_stderr_still_reports_status() {
        let dir = TempDir::new().unwrap();
        let mut executor = SafeCommandExecutor::with_allowed_commands(
            "sh",
            args(&["-c", "echo published; exit 0"]),
            &["sh"],
        )
        .unwrap();
        executor.set_stdout_to_stderr(true);

        let outcome = executor.publish(dir.path()).await.unwrap();
        assert!(outcome.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_with_timeout() {
        let dir = TempDir::new().unwrap();
        let mut executor =
            SafeCommandExecutor::with_allowed_commands("sleep", args(&["5"]), &["sleep"]).unwrap();
        executor.set_timeout(Duration::from_millis(100));

        let result = executor.publish(dir.path()).await;
        assert!(
            matches!(result, Err(PublishError::TimeoutError { .. })),
            "Long-running command should time out"
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let dir = TempDir::new().unwrap();
        let executor = SafeCommandExecutor::with_allowed_commands(
            "definitely-not-a-real-publish-tool",
            Vec::new(),
            &["definitely-not-a-real-publish-tool"],
        )
        .unwrap();

        let result = executor.publish(dir.path()).await;
        assert!(matches!(result, Err(PublishError::CommandError { .. })));
    }
}
