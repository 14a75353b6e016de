//! Sequential Publisher - Publishes interdependent packages in a fixed order
//!
//! Features:
//! - Caller-defined order, never reordered or inferred
//! - Fixed delay between publishes for registry propagation
//! - Stop on first failure; already published packages stay published
//! - Scoped working directory, restored on every exit path
//! - Detailed report for the run, including runs that fail

use crate::core::config::{DEFAULT_DELAY_SECONDS, PublishConfig};
use crate::core::error::PublishError;
use crate::core::task::PublishTask;
use crate::core::traits::PublishExecutor;
use crate::core::workdir::WorkingDirectory;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use uuid::Uuid;

/// Progress goes to stderr instead of stdout when `progress_to_stderr` is set
macro_rules! progress {
    ($options:expr, $($arg:tt)*) => {
        if $options.progress_to_stderr {
            eprintln!($($arg)*);
        } else {
            println!($($arg)*);
        }
    };
}

/// Options for a publish run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    /// Pause after each publish
    pub delay: Duration,

    /// Also pause after the final publish (default: false)
    pub delay_after_last: bool,

    /// Check directories and print the plan without publishing
    pub dry_run: bool,

    /// Write progress and the summary to stderr, leaving stdout free
    pub progress_to_stderr: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(DEFAULT_DELAY_SECONDS),
            delay_after_last: false,
            dry_run: false,
            progress_to_stderr: false,
        }
    }
}

impl PublishOptions {
    pub fn from_config(config: &PublishConfig) -> Self {
        Self {
            delay: config.task.delay(),
            delay_after_last: config.task.delay_after_last(),
            ..Self::default()
        }
    }

    /// Number of pauses a run over `task_len` packages takes
    pub fn delay_count(&self, task_len: usize) -> usize {
        if self.delay.is_zero() || task_len == 0 {
            0
        } else if self.delay_after_last {
            task_len
        } else {
            task_len - 1
        }
    }

    /// Total time spent pausing in a run over `task_len` packages.
    ///
    /// Saturates at `Duration::MAX`.
    pub fn total_delay(&self, task_len: usize) -> Duration {
        u32::try_from(self.delay_count(task_len))
            .ok()
            .and_then(|count| self.delay.checked_mul(count))
            .unwrap_or(Duration::MAX)
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Outcome of publishing one package directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Position in the task, starting at 0
    pub index: usize,
    pub path: PathBuf,
    /// Time spent in the publish tool, in milliseconds
    pub duration_ms: u64,
    pub exit_code: Option<i32>,
}

/// The error that ended a run, as recorded in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportedError {
    pub code: &'static str,
    pub message: String,
}

impl From<&PublishError> for ReportedError {
    fn from(error: &PublishError) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Report of a publish run
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub published: Vec<StepReport>,
    pub failed: Option<StepReport>,
    pub skipped: Vec<PathBuf>,
    /// Time spent pausing between publishes, in milliseconds
    pub total_delay_ms: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ReportedError>,
}

impl PublishReport {
    fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            published: Vec::new(),
            failed: None,
            skipped: Vec::new(),
            total_delay_ms: 0,
            success: false,
            error: None,
        }
    }

    fn finish(&mut self, success: bool) {
        self.success = success;
        self.finished_at = Some(Utc::now());
    }
}

/// Publishes the packages of a [`PublishTask`] one after another
pub struct SequentialPublisher<E> {
    executor: E,
    options: PublishOptions,
}

impl<E: PublishExecutor> SequentialPublisher<E> {
    pub fn new(executor: E, options: PublishOptions) -> Self {
        Self { executor, options }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// Publish every directory of `task`, in order.
    ///
    /// For each directory: enter it, run the publish tool there, return to
    /// the previous directory, then pause. The first failure aborts the run;
    /// later directories are not touched and earlier publishes are not
    /// rolled back. `cwd` is the same on return as on entry.
    ///
    /// # Errors
    ///
    /// - `PublishError::DirectoryNotFound` - a task directory is missing
    /// - `PublishError::PublishCommandFailed` - the tool exited non-zero
    /// - any error the executor reports for a tool that could not run
    pub async fn run(
        &self,
        task: &PublishTask,
        cwd: &mut WorkingDirectory,
    ) -> Result<PublishReport, PublishError> {
        let (report, outcome) = self.run_with_report(task, cwd).await;
        outcome.map(|()| report)
    }

    /// Same as [`run`](Self::run), but the report is returned for failed runs too.
    ///
    /// On failure the report names the failed directory, the directories left
    /// unpublished and the error.
    pub async fn run_with_report(
        &self,
        task: &PublishTask,
        cwd: &mut WorkingDirectory,
    ) -> (PublishReport, Result<(), PublishError>) {
        let mut report = PublishReport::new(self.options.dry_run);

        if task.is_empty() {
            let error = PublishError::EmptyTask;
            report.error = Some(ReportedError::from(&error));
            report.finish(false);
            return (report, Err(error));
        }

        progress!(
            self.options,
            "\n📦 Publishing {} packages with `{}`",
            task.len(),
            self.executor.name()
        );
        progress!(
            self.options,
            "Delay between publishes: {}s{}\n",
            self.options.delay.as_secs(),
            if self.options.delay_after_last {
                " (including after the last package)"
            } else {
                ""
            }
        );
        tracing::info!(
            run_id = %report.run_id,
            packages = task.len(),
            delay_secs = self.options.delay.as_secs(),
            "starting publish run"
        );

        let outcome = if self.options.dry_run {
            self.check_directories(task, cwd, &mut report)
        } else {
            self.publish_all(task, cwd, &mut report).await
        };

        match &outcome {
            Ok(()) => {
                report.finish(true);
                tracing::info!(run_id = %report.run_id, "publish run completed");
            }
            Err(error) => {
                report.error = Some(ReportedError::from(error));
                report.finish(false);
            }
        }
        self.print_summary(&report);

        (report, outcome)
    }

    async fn publish_all(
        &self,
        task: &PublishTask,
        cwd: &mut WorkingDirectory,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        let last = task.len() - 1;
        for (index, dir) in task.iter().enumerate() {
            let started = Instant::now();

            match self.publish_one(index, task.len(), dir, cwd).await {
                Ok(exit_code) => {
                    let step = StepReport {
                        index,
                        path: dir.to_path_buf(),
                        duration_ms: as_millis(started.elapsed()),
                        exit_code,
                    };
                    progress!(
                        self.options,
                        "✅ {}: Published successfully in {}ms",
                        dir.display(),
                        step.duration_ms
                    );
                    report.published.push(step);
                }
                Err(error) => {
                    let exit_code = match &error {
                        PublishError::PublishCommandFailed { exit_code, .. } => *exit_code,
                        _ => None,
                    };
                    progress!(self.options, "❌ {}: Failed - {}", dir.display(), error);
                    tracing::error!(
                        run_id = %report.run_id,
                        index,
                        dir = %dir.display(),
                        code = error.code(),
                        "publish failed, aborting run"
                    );

                    report.failed = Some(StepReport {
                        index,
                        path: dir.to_path_buf(),
                        duration_ms: as_millis(started.elapsed()),
                        exit_code,
                    });
                    report.skipped = task.entries()[index + 1..].to_vec();
                    return Err(error);
                }
            }

            if (index < last || self.options.delay_after_last) && !self.options.delay.is_zero() {
                progress!(
                    self.options,
                    "⏳ Waiting {}s for the registry to catch up...",
                    self.options.delay.as_secs()
                );
                sleep(self.options.delay).await;
                report.total_delay_ms = report
                    .total_delay_ms
                    .saturating_add(as_millis(self.options.delay));
            }
        }

        Ok(())
    }

    /// Publish a single directory, returning the tool's exit code
    async fn publish_one(
        &self,
        index: usize,
        total: usize,
        dir: &Path,
        cwd: &mut WorkingDirectory,
    ) -> Result<Option<i32>, PublishError> {
        let guard = cwd.enter(dir)?;

        progress!(
            self.options,
            "\n🚀 [{}/{}] Publishing {}...",
            index + 1,
            total,
            guard.path().display()
        );
        tracing::debug!(index, dir = %guard.path().display(), "invoking publish tool");

        let outcome = self.executor.publish(guard.path()).await?;
        if !outcome.is_success() {
            return Err(PublishError::PublishCommandFailed {
                path: guard.path().to_path_buf(),
                exit_code: outcome.exit_code,
            });
        }

        Ok(outcome.exit_code)
    }

    /// Dry run: every directory must be enterable, nothing is published
    fn check_directories(
        &self,
        task: &PublishTask,
        cwd: &mut WorkingDirectory,
        report: &mut PublishReport,
    ) -> Result<(), PublishError> {
        for (index, dir) in task.iter().enumerate() {
            let guard = cwd.enter(dir)?;
            progress!(
                self.options,
                "🔍 [{}/{}] Would run `{}` in {}",
                index + 1,
                task.len(),
                self.executor.name(),
                guard.path().display()
            );
            report.skipped.push(dir.to_path_buf());
        }

        let total_delay = self.options.total_delay(task.len());
        progress!(
            self.options,
            "\nEstimated delay: {}s over {} pauses",
            total_delay.as_secs(),
            self.options.delay_count(task.len())
        );

        Ok(())
    }

    /// Print publish run summary
    fn print_summary(&self, report: &PublishReport) {
        let rule = "=".repeat(60);
        progress!(self.options, "\n{}", rule);
        progress!(
            self.options,
            "📊 Publish Summary{}",
            if report.dry_run { " (dry run)" } else { "" }
        );
        progress!(self.options, "{}", rule);

        progress!(self.options, "\n✅ Published: {}", report.published.len());
        for step in &report.published {
            progress!(self.options, "   - {} ({}ms)", step.path.display(), step.duration_ms);
        }

        if let Some(failed) = &report.failed {
            progress!(self.options, "\n❌ Failed: {}", failed.path.display());
            if let Some(code) = failed.exit_code {
                progress!(self.options, "   exit code {}", code);
            }
        }

        if !report.skipped.is_empty() {
            progress!(self.options, "\n⏭️  Not published: {}", report.skipped.len());
            for path in &report.skipped {
                progress!(self.options, "   - {}", path.display());
            }
        }

        progress!(self.options, "\n{}", rule);
        progress!(
            self.options,
            "Overall Status: {}",
            if report.success {
                "✅ SUCCESS"
            } else {
                "❌ FAILED"
            }
        );
        progress!(self.options, "{}\n", rule);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::ExecutionOutcome;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every invocation; fails at `fail_at` (0-based) if set
    struct RecordingExecutor {
        calls: Mutex<Vec<(PathBuf, Instant)>>,
        fail_at: Option<usize>,
        spawn_error_at: Option<usize>,
    }

    impl RecordingExecutor {
        fn succeeding() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_at: None,
                spawn_error_at: None,
            }
        }

        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::succeeding()
            }
        }

        fn calls(&self) -> Vec<(PathBuf, Instant)> {
            self.calls.lock().unwrap().clone()
        }

        fn called_paths(&self) -> Vec<PathBuf> {
            self.calls().into_iter().map(|(path, _)| path).collect()
        }
    }

    #[async_trait]
    impl PublishExecutor for RecordingExecutor {
        fn name(&self) -> &str {
            "stub publish"
        }

        async fn publish(&self, dir: &Path) -> Result<ExecutionOutcome, PublishError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((dir.to_path_buf(), Instant::now()));
                calls.len() - 1
            };

            if self.spawn_error_at == Some(index) {
                return Err(PublishError::CommandError {
                    path: dir.to_path_buf(),
                    message: "tool not found".to_string(),
                });
            }
            if self.fail_at == Some(index) {
                return Ok(ExecutionOutcome::failure(101));
            }
            Ok(ExecutionOutcome::success())
        }
    }

    fn workspace(dirs: &[&str]) -> TempDir {
        let root = TempDir::new().unwrap();
        for dir in dirs {
            std::fs::create_dir_all(root.path().join(dir)).unwrap();
        }
        root
    }

    fn options(delay_secs: u64) -> PublishOptions {
        PublishOptions {
            delay: Duration::from_secs(delay_secs),
            ..PublishOptions::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_publishes_in_order_with_delay() {
        let root = workspace(&["engine", "macro", "gen/build"]);
        let task = PublishTask::new(root.path(), ["engine", "macro", ".", "gen/build"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), options(3));
        let mut cwd = WorkingDirectory::new(root.path());

        let start = Instant::now();
        let report = publisher.run(&task, &mut cwd).await.unwrap();
        let elapsed = start.elapsed();

        assert!(report.success);
        assert_eq!(report.published.len(), 4);
        assert_eq!(publisher.executor().called_paths(), task.entries().to_vec());
        assert_eq!(report.total_delay_ms, 9_000);
        assert!(elapsed >= Duration::from_secs(9));
        assert!(elapsed < Duration::from_secs(12));
        assert_eq!(cwd.current(), root.path());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_each_invocation() {
        let root = workspace(&["a", "b", "c"]);
        let task = PublishTask::new(root.path(), ["a", "b", "c"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), options(5));
        let mut cwd = WorkingDirectory::new(root.path());

        publisher.run(&task, &mut cwd).await.unwrap();

        let calls = publisher.executor().calls();
        for pair in calls.windows(2) {
            assert!(pair[1].1.duration_since(pair[0].1) >= Duration::from_secs(5));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_after_last() {
        let root = workspace(&["engine", "macro", "gen/build"]);
        let task = PublishTask::new(root.path(), ["engine", "macro", ".", "gen/build"]).unwrap();
        let mut opts = options(3);
        opts.delay_after_last = true;
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), opts);
        let mut cwd = WorkingDirectory::new(root.path());

        let start = Instant::now();
        let report = publisher.run(&task, &mut cwd).await.unwrap();

        assert_eq!(report.total_delay_ms, 12_000);
        assert!(start.elapsed() >= Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_stops_run() {
        let root = workspace(&["engine", "macro"]);
        let task = PublishTask::new(root.path(), ["engine", "macro"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::failing_at(1), options(3));
        let mut cwd = WorkingDirectory::new(root.path());

        let result = publisher.run(&task, &mut cwd).await;

        match result {
            Err(PublishError::PublishCommandFailed { path, exit_code }) => {
                assert_eq!(path, root.path().join("macro"));
                assert_eq!(exit_code, Some(101));
            }
            other => panic!("expected PublishCommandFailed, got {:?}", other),
        }
        assert_eq!(publisher.executor().calls().len(), 2);
        assert_eq!(cwd.current(), root.path());
        assert_eq!(cwd.depth(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_at_each_position() {
        let dirs = ["a", "b", "c", "d"];
        let root = workspace(&dirs);
        let task = PublishTask::new(root.path(), dirs).unwrap();

        for k in 0..dirs.len() {
            let publisher = SequentialPublisher::new(RecordingExecutor::failing_at(k), options(1));
            let mut cwd = WorkingDirectory::new(root.path());

            assert!(publisher.run(&task, &mut cwd).await.is_err());
            assert_eq!(
                publisher.executor().called_paths(),
                task.entries()[..=k].to_vec()
            );
            assert_eq!(cwd.current(), root.path());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_directory_before_any_publish() {
        let root = workspace(&[]);
        let task = PublishTask::new(root.path(), ["missing-dir"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), options(3));
        let mut cwd = WorkingDirectory::new(root.path());

        let result = publisher.run(&task, &mut cwd).await;

        assert!(matches!(result, Err(PublishError::DirectoryNotFound { .. })));
        assert!(publisher.executor().calls().is_empty());
        assert_eq!(cwd.current(), root.path());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_directory_mid_run() {
        let root = workspace(&["engine"]);
        let task = PublishTask::new(root.path(), ["engine", "missing", "engine"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), options(0));
        let mut cwd = WorkingDirectory::new(root.path());

        let result = publisher.run(&task, &mut cwd).await;

        assert!(matches!(result, Err(PublishError::DirectoryNotFound { .. })));
        assert_eq!(publisher.executor().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_executor_error_restores_directory() {
        let root = workspace(&["engine", "macro"]);
        let task = PublishTask::new(root.path(), ["engine", "macro"]).unwrap();
        let executor = RecordingExecutor {
            spawn_error_at: Some(0),
            ..RecordingExecutor::succeeding()
        };
        let publisher = SequentialPublisher::new(executor, options(3));
        let mut cwd = WorkingDirectory::new(root.path());

        let result = publisher.run(&task, &mut cwd).await;

        assert!(matches!(result, Err(PublishError::CommandError { .. })));
        assert_eq!(publisher.executor().calls().len(), 1);
        assert_eq!(cwd.current(), root.path());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invokes_once_per_path() {
        let dirs = ["p0", "p1", "p2", "p3", "p4"];
        let root = workspace(&dirs);

        for n in 1..=dirs.len() {
            let task = PublishTask::new(root.path(), &dirs[..n]).unwrap();
            let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), options(0));
            let mut cwd = WorkingDirectory::new(root.path());

            let report = publisher.run(&task, &mut cwd).await.unwrap();

            assert_eq!(publisher.executor().calls().len(), n);
            assert_eq!(report.total_delay_ms, 0);
            assert_eq!(cwd.current(), root.path());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dry_run_publishes_nothing() {
        let root = workspace(&["engine", "macro"]);
        let task = PublishTask::new(root.path(), ["engine", "macro"]).unwrap();
        let mut opts = options(30);
        opts.dry_run = true;
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), opts);
        let mut cwd = WorkingDirectory::new(root.path());

        let start = Instant::now();
        let report = publisher.run(&task, &mut cwd).await.unwrap();

        assert!(report.success);
        assert!(report.dry_run);
        assert_eq!(report.skipped.len(), 2);
        assert!(publisher.executor().calls().is_empty());
        assert!(start.elapsed() < Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_dry_run_reports_missing_directory() {
        let root = workspace(&["engine"]);
        let task = PublishTask::new(root.path(), ["engine", "nope"]).unwrap();
        let mut opts = options(0);
        opts.dry_run = true;
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), opts);
        let mut cwd = WorkingDirectory::new(root.path());

        let result = publisher.run(&task, &mut cwd).await;
        assert!(matches!(result, Err(PublishError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_options_delay_count() {
        let mut opts = options(3);
        assert_eq!(opts.delay_count(4), 3);
        assert_eq!(opts.total_delay(4), Duration::from_secs(9));

        opts.delay_after_last = true;
        assert_eq!(opts.delay_count(4), 4);

        opts.delay = Duration::ZERO;
        assert_eq!(opts.delay_count(4), 0);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = PublishConfig::default();
        config.task.delay_seconds = Some(7);
        config.task.delay_after_last = Some(true);

        let opts = PublishOptions::from_config(&config);
        assert_eq!(opts.delay, Duration::from_secs(7));
        assert!(opts.delay_after_last);
        assert!(!opts.dry_run);
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_serializes() {
        let root = workspace(&["engine"]);
        let task = PublishTask::new(root.path(), ["engine"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), options(0));
        let mut cwd = WorkingDirectory::new(root.path());

        let report = publisher.run(&task, &mut cwd).await.unwrap();
        let json = serde_json::to_string(&report).unwrap();

        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"run_id\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_run_keeps_report() {
        let root = workspace(&["engine", "macro", "gen/build"]);
        let task = PublishTask::new(root.path(), ["engine", "macro", "gen/build"]).unwrap();
        let publisher = SequentialPublisher::new(RecordingExecutor::failing_at(1), options(2));
        let mut cwd = WorkingDirectory::new(root.path());

        let (report, outcome) = publisher.run_with_report(&task, &mut cwd).await;

        assert!(matches!(
            outcome,
            Err(PublishError::PublishCommandFailed { .. })
        ));
        assert!(!report.success);
        assert!(report.finished_at.is_some());
        assert_eq!(report.published.len(), 1);
        assert_eq!(
            report.failed.as_ref().map(|step| step.path.clone()),
            Some(root.path().join("macro"))
        );
        assert_eq!(report.skipped, vec![root.path().join("gen/build")]);
        assert_eq!(report.total_delay_ms, 2_000);

        let error = report.error.as_ref().unwrap();
        assert_eq!(error.code, "PUBLISH_COMMAND_FAILED");

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["error"]["code"], "PUBLISH_COMMAND_FAILED");
        assert_eq!(json["success"], false);
    }

    #[tokio::test]
    async fn test_successful_report_omits_error() {
        let root = workspace(&["engine"]);
        let task = PublishTask::new(root.path(), ["engine"]).unwrap();
        let mut opts = options(0);
        opts.progress_to_stderr = true;
        let publisher = SequentialPublisher::new(RecordingExecutor::succeeding(), opts);
        let mut cwd = WorkingDirectory::new(root.path());

        let (report, outcome) = publisher.run_with_report(&task, &mut cwd).await;

        assert!(outcome.is_ok());
        assert!(report.error.is_none());
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_total_delay_saturates() {
        let mut opts = options(0);
        opts.delay = Duration::from_secs(u64::MAX);

        assert_eq!(opts.delay_count(4), 3);
        assert_eq!(opts.total_delay(4), Duration::MAX);

        opts.delay = Duration::from_secs(1);
        assert_eq!(opts.total_delay(usize::MAX), Duration::MAX);
    }

    #[test]
    fn test_as_millis_saturates() {
        assert_eq!(as_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(as_millis(Duration::MAX), u64::MAX);
    }
}
