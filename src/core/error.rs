//! Error handling for sequential publishing
//!
//! This module provides the error taxonomy for a publish run with recovery
//! guidance, using the thiserror crate for ergonomic error handling.
//! Every variant is fatal to the run: nothing is retried or recovered locally.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main error type for publishing operations
#[derive(Error, Debug)]
pub enum PublishError {
    // Task errors
    #[error("[{}] ディレクトリが見つかりません", path.display())]
    DirectoryNotFound { path: PathBuf },

    #[error("公開対象のディレクトリが指定されていません")]
    EmptyTask,

    // Publishing errors
    #[error("[{}] 公開コマンドが失敗しました (終了コード: {})", path.display(), format_exit_code(*exit_code))]
    PublishCommandFailed {
        path: PathBuf,
        exit_code: Option<i32>,
    },

    #[error("[{}] タイムアウトしました ({:?})", path.display(), timeout)]
    TimeoutError { path: PathBuf, timeout: Duration },

    // Command execution errors
    #[error("[{}] コマンド実行エラー: {}", path.display(), message)]
    CommandError { path: PathBuf, message: String },

    // Configuration errors
    #[error("設定エラー: {0}")]
    ConfigError(String),
}

fn format_exit_code(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => code.to_string(),
        None => "シグナルにより終了".to_string(),
    }
}

impl PublishError {
    /// Get the directory associated with this error, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::DirectoryNotFound { path }
            | Self::PublishCommandFailed { path, .. }
            | Self::TimeoutError { path, .. }
            | Self::CommandError { path, .. } => Some(path.as_path()),
            Self::EmptyTask | Self::ConfigError(_) => None,
        }
    }

    /// Process exit code to report for this error.
    ///
    /// A failing publish tool hands its own exit code through; everything
    /// else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::PublishCommandFailed {
                exit_code: Some(code),
                ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::DirectoryNotFound { .. } => vec![
                "task.basePath と task.paths の設定を確認してください",
                "リポジトリのルートから実行しているか確認してください",
            ],
            Self::EmptyTask => {
                vec![".publish-config.yaml の task.paths に公開順を指定してください"]
            }
            Self::PublishCommandFailed { .. } => vec![
                "公開コマンドの出力を確認してください",
                "同じバージョンが既に公開されていないか確認してください",
                "既に公開済みのパッケージは取り消されません",
            ],
            Self::TimeoutError { .. } => vec![
                "ネットワーク環境を確認してください",
                "command.timeoutSeconds で時間を延長できます",
            ],
            Self::CommandError { .. } => vec![
                "公開ツールがインストールされ PATH に含まれているか確認してください",
                "command.program が許可リストに含まれているか確認してください",
            ],
            Self::ConfigError(_) => vec![
                ".publish-config.yaml の構文を確認してください",
                "sequential-publisher init でデフォルト設定を生成できます",
            ],
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::DirectoryNotFound { .. } => "DIRECTORY_NOT_FOUND",
            Self::EmptyTask => "EMPTY_TASK",
            Self::PublishCommandFailed { .. } => "PUBLISH_COMMAND_FAILED",
            Self::TimeoutError { .. } => "TIMEOUT_ERROR",
            Self::CommandError { .. } => "COMMAND_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }
}
