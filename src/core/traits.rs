//! Core traits and types for package publishing
//!
//! This module defines the seam between the publisher and the external
//! publish tool, so that tests can substitute a stub for the real process.

use crate::core::error::PublishError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Result of one publish tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Exit code of the tool (`None` when it was terminated by a signal)
    pub exit_code: Option<i32>,
}

impl ExecutionOutcome {
    pub fn success() -> Self {
        Self { exit_code: Some(0) }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability to publish the package located in a directory
///
/// Implementations run the publish tool with `dir` as its working directory.
/// A non-zero exit is reported through [`ExecutionOutcome`]; `Err` is
/// reserved for failures to run the tool at all.
///
/// # Examples
///
/// ```no_run
/// # use sequential_publisher::core::{ExecutionOutcome, PublishError, PublishExecutor};
/// # use async_trait::async_trait;
/// # use std::path::Path;
/// struct AlwaysSucceeds;
///
/// #[async_trait]
/// impl PublishExecutor for AlwaysSucceeds {
///     fn name(&self) -> &str {
///         "always-succeeds"
///     }
///
///     async fn publish(&self, _dir: &Path) -> Result<ExecutionOutcome, PublishError> {
///         Ok(ExecutionOutcome::success())
///     }
/// }
/// ```
#[async_trait]
pub trait PublishExecutor: Send + Sync {
    /// Human-readable description of the tool (e.g., "cargo publish")
    fn name(&self) -> &str;

    /// Publish the package in `dir`
    async fn publish(&self, dir: &Path) -> Result<ExecutionOutcome, PublishError>;
}
