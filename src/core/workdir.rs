//! Scoped current-directory tracking
//!
//! The publisher never changes the process working directory. Instead it
//! carries a [`WorkingDirectory`] value and enters each package directory
//! through a [`DirectoryGuard`], which puts the previous directory back when
//! it is dropped. Restoration therefore holds on every exit path, including
//! early returns through `?`.

use crate::core::error::PublishError;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Explicit "current directory" owned by one publish run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDirectory {
    current: PathBuf,
    depth: usize,
}

impl WorkingDirectory {
    pub fn new<P: Into<PathBuf>>(initial: P) -> Self {
        Self {
            current: initial.into(),
            depth: 0,
        }
    }

    /// Start from the process working directory
    pub fn from_process() -> Result<Self, PublishError> {
        let cwd = std::env::current_dir().map_err(|e| {
            PublishError::ConfigError(format!("Cannot read current directory: {}", e))
        })?;
        Ok(Self::new(cwd))
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    /// Number of directories currently entered
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter `path`, resolved against the current directory.
    ///
    /// Fails with [`PublishError::DirectoryNotFound`] if the target does not
    /// exist or is not a directory; the current directory is left untouched
    /// in that case.
    pub fn enter<P: AsRef<Path>>(&mut self, path: P) -> Result<DirectoryGuard<'_>, PublishError> {
        let target = self.current.join(path.as_ref());

        if !target.is_dir() {
            return Err(PublishError::DirectoryNotFound { path: target });
        }

        let previous = std::mem::replace(&mut self.current, target);
        self.depth += 1;
        tracing::trace!(dir = %self.current.display(), depth = self.depth, "entered directory");

        Ok(DirectoryGuard {
            owner: self,
            previous: Some(previous),
        })
    }
}

/// Restores the previous directory of a [`WorkingDirectory`] when dropped
#[derive(Debug)]
pub struct DirectoryGuard<'a> {
    owner: &'a mut WorkingDirectory,
    previous: Option<PathBuf>,
}

impl DirectoryGuard<'_> {
    pub fn path(&self) -> &Path {
        &self.owner.current
    }
}

impl Deref for DirectoryGuard<'_> {
    type Target = Path;

    fn deref(&self) -> &Path {
        self.path()
    }
}

impl Drop for DirectoryGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.owner.current = previous;
            self.owner.depth -= 1;
            tracing::trace!(dir = %self.owner.current.display(), "restored directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_enter_and_restore() {
        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("engine")).unwrap();

        let mut cwd = WorkingDirectory::new(root.path());
        {
            let guard = cwd.enter("engine").unwrap();
            assert_eq!(guard.path(), root.path().join("engine"));
        }

        assert_eq!(cwd.current(), root.path());
        assert_eq!(cwd.depth(), 0);
    }

    #[test]
    fn test_enter_missing_directory() {
        let root = TempDir::new().unwrap();
        let mut cwd = WorkingDirectory::new(root.path());

        match cwd.enter("missing-dir") {
            Err(PublishError::DirectoryNotFound { path }) => {
                assert_eq!(path, root.path().join("missing-dir"));
            }
            other => panic!("expected DirectoryNotFound, got {:?}", other),
        }
        assert_eq!(cwd.current(), root.path());
    }

    #[test]
    fn test_enter_file_is_not_a_directory() {
        let root = TempDir::new().unwrap();
        std::fs::write(root.path().join("Cargo.toml"), "").unwrap();
        let mut cwd = WorkingDirectory::new(root.path());

        assert!(matches!(
            cwd.enter("Cargo.toml"),
            Err(PublishError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_restored_on_early_return() {
        fn fails_inside(cwd: &mut WorkingDirectory) -> Result<(), PublishError> {
            let _guard = cwd.enter("engine")?;
            Err(PublishError::EmptyTask)
        }

        let root = TempDir::new().unwrap();
        std::fs::create_dir(root.path().join("engine")).unwrap();
        let mut cwd = WorkingDirectory::new(root.path());

        assert!(fails_inside(&mut cwd).is_err());
        assert_eq!(cwd.current(), root.path());
    }

    #[test]
    fn test_enter_dot_keeps_directory() {
        let root = TempDir::new().unwrap();
        let mut cwd = WorkingDirectory::new(root.path());

        let guard = cwd.enter(".").unwrap();
        assert!(guard.is_dir());
    }
}
