//! Publish task: the ordered list of package directories for one run

use crate::core::config::PublishConfig;
use crate::core::error::PublishError;
use std::path::{Path, PathBuf};

/// Ordered package directories, resolved against a base path.
///
/// The order is the publish order. It is never changed after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTask {
    base_path: PathBuf,
    entries: Vec<PathBuf>,
}

impl PublishTask {
    /// Build a task from a base path and relative sub-paths.
    ///
    /// `"."` resolves to the base path itself.
    pub fn new<P, I, S>(base_path: P, relative_paths: I) -> Result<Self, PublishError>
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let base_path = base_path.into();
        let entries: Vec<PathBuf> = relative_paths
            .into_iter()
            .map(|relative| resolve(&base_path, relative.as_ref()))
            .collect();

        if entries.is_empty() {
            return Err(PublishError::EmptyTask);
        }

        Ok(Self { base_path, entries })
    }

    /// Build the task described by `config`, with a relative `basePath`
    /// resolved against `project_path`.
    pub fn from_config(config: &PublishConfig, project_path: &Path) -> Result<Self, PublishError> {
        let base_path = resolve(project_path, Path::new(config.task.base_path()));
        Self::new(base_path, config.task.paths())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }
}

fn resolve(base_path: &Path, relative: &Path) -> PathBuf {
    if relative == Path::new(".") || relative.as_os_str().is_empty() {
        base_path.to_path_buf()
    } else {
        base_path.join(relative)
    }
}
