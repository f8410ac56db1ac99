/// Scratch workspaces for compile and run invocations
/// Every invocation gets its own uuid-named directory, removed on drop
use crate::config::types::{Result, ScoringError};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Workspace for a single compile or run invocation
#[derive(Debug)]
pub struct Workspace {
    /// Run-specific workspace directory
    run_dir: PathBuf,
    removed: bool,
}

impl Workspace {
    /// Create new workspace under `base_dir`
    pub fn new(base_dir: &Path) -> Result<Self> {
        let run_id = Uuid::new_v4().to_string();
        let run_dir = base_dir.join(format!("run-{}", run_id));

        fs::create_dir_all(&run_dir).map_err(|e| {
            ScoringError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create workspace directory {}: {}", run_dir.display(), e),
            ))
        })?;
        log::debug!("Created workspace {}", run_dir.display());

        Ok(Self {
            run_dir,
            removed: false,
        })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// Write `content` to `name` inside the workspace
    pub fn create_source_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let source_path = self.run_dir.join(name);

        fs::write(&source_path, content).map_err(|e| {
            ScoringError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write source file {}: {}", source_path.display(), e),
            ))
        })?;

        Ok(source_path)
    }

    /// Path the compiler writes binary `name` to. Nothing is created.
    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.run_dir.join(name)
    }

    /// Remove the run directory and everything in it (idempotent)
    pub fn cleanup(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }

        if self.run_dir.exists() {
            fs::remove_dir_all(&self.run_dir).map_err(|e| {
                ScoringError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to remove workspace {}: {}", self.run_dir.display(), e),
                ))
            })?;
        }

        self.removed = true;
        log::debug!("Removed workspace {}", self.run_dir.display());
        Ok(())
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::warn!("{}", e);
        }
    }
}

/// Hands out workspaces under one base directory
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    base_dir: PathBuf,
}

impl WorkspaceManager {
    /// Create new workspace manager, creating the base directory if needed
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir).map_err(|e| {
            ScoringError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create workspace base directory {}: {}",
                    base_dir.display(),
                    e
                ),
            ))
        })?;

        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create new workspace for a run
    pub fn create_workspace(&self) -> Result<Workspace> {
        Workspace::new(&self.base_dir)
    }

    /// Remove run directories older than `max_age`, e.g. left behind by a
    /// killed host process. Returns how many were removed.
    pub fn cleanup_old_workspaces(&self, max_age: std::time::Duration) -> Result<usize> {
        let mut cleaned = 0;
        let now = std::time::SystemTime::now();

        if !self.base_dir.exists() {
            return Ok(0);
        }

        for entry in fs::read_dir(&self.base_dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            let is_run_dir = path.is_dir()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with("run-"))
                    .unwrap_or(false);
            if !is_run_dir {
                continue;
            }

            let age = match fs::metadata(&path)
                .and_then(|m| m.modified())
                .map(|modified| now.duration_since(modified))
            {
                Ok(Ok(age)) => age,
                Ok(Err(_)) => continue, // Future timestamp, skip
                Err(e) => {
                    log::warn!("Failed to get modified time for {}: {}", path.display(), e);
                    continue;
                }
            };

            if age >= max_age {
                log::info!("Cleaning up stale workspace: {}", path.display());
                match fs::remove_dir_all(&path) {
                    Ok(()) => cleaned += 1,
                    Err(e) => log::warn!("Failed to remove {}: {}", path.display(), e),
                }
            }
        }

        Ok(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_workspace_creation_and_drop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp_dir.path().to_path_buf()).unwrap();

        let workspace = manager.create_workspace().unwrap();
        let run_dir = workspace.run_dir().to_path_buf();
        assert!(run_dir.exists());

        drop(workspace);
        assert!(!run_dir.exists());
    }

    #[test]
    fn test_workspace_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp_dir.path().to_path_buf()).unwrap();

        let mut workspace = manager.create_workspace().unwrap();

        let source = workspace.create_source_file("main.rs", "fn main() {}\n").unwrap();
        assert!(source.exists());
        assert_eq!(source.parent(), Some(workspace.run_dir()));
        assert_eq!(std::fs::read_to_string(&source).unwrap(), "fn main() {}\n");

        let binary = workspace.binary_path("program");
        assert_eq!(binary, workspace.run_dir().join("program"));
        assert!(!binary.exists());

        workspace.cleanup().unwrap();
        assert!(!source.exists());
        // Second cleanup is a no-op
        workspace.cleanup().unwrap();
    }

    #[test]
    fn test_workspaces_never_share_a_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp_dir.path().to_path_buf()).unwrap();

        let a = manager.create_workspace().unwrap();
        let b = manager.create_workspace().unwrap();
        assert_ne!(a.run_dir(), b.run_dir());
        assert!(a.run_dir().starts_with(temp_dir.path()));
        assert!(b.run_dir().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_cleanup_old_workspaces() {
        let temp_dir = tempfile::tempdir().unwrap();
        let manager = WorkspaceManager::new(temp_dir.path().to_path_buf()).unwrap();

        fs::create_dir_all(temp_dir.path().join("run-stale")).unwrap();
        fs::create_dir_all(temp_dir.path().join("unrelated")).unwrap();

        let cleaned = manager.cleanup_old_workspaces(Duration::from_secs(0)).unwrap();
        assert_eq!(cleaned, 1);
        assert!(!temp_dir.path().join("run-stale").exists());
        assert!(temp_dir.path().join("unrelated").exists());
    }
}
