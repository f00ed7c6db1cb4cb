//! Scenario working directories and their cleanup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Root directory that scenario working directories live under
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            Error::Other(format!(
                "Failed to create workspace {}: {}",
                self.root.display(),
                e
            ))
        })
    }

    /// Remove the directory tree at `path`
    ///
    /// Only paths under the workspace root are removed. Returns whether
    /// anything was deleted.
    pub fn cleanup(&self, path: &Path) -> Result<bool> {
        if !path.starts_with(&self.root) || path == self.root {
            return Err(Error::Config(format!(
                "Refusing to remove {} outside workspace {}",
                path.display(),
                self.root.display()
            )));
        }

        if !path.exists() {
            return Ok(false);
        }

        match fs::remove_dir_all(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                // git marks object files read-only
                clear_readonly(path)?;
                fs::remove_dir_all(path)?;
            }
            Err(e) => return Err(Error::Io(e)),
        }

        tracing::debug!(path = %path.display(), "Removed scenario directory");
        Ok(true)
    }
}

#[allow(clippy::permissions_set_readonly_false)]
fn clear_readonly(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_symlink() {
        return Ok(());
    }

    let mut permissions = metadata.permissions();
    if permissions.readonly() {
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }

    if metadata.is_dir() {
        for entry in fs::read_dir(path)? {
            clear_readonly(&entry?.path())?;
        }
    }

    Ok(())
}
