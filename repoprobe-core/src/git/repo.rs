//! Repository handle and read-side queries

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};

use crate::{Error, Result};

/// Name of the only remote the probe pushes to and pulls from
pub const ORIGIN: &str = "origin";

/// Information about a git remote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    /// Name of the remote (e.g., "origin")
    pub name: String,
    /// URL of the remote
    pub url: String,
}

/// A handle on a non-bare repository and its working directory
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the working directory
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open the repository whose working directory is exactly `path`
    ///
    /// Unlike `git` itself this does not search parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !Self::is_git_repo(path) {
            return Err(Error::NotARepository {
                path: path.to_path_buf(),
            });
        }

        let repo = Repository::open(path).map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                Error::NotARepository {
                    path: path.to_path_buf(),
                }
            } else {
                Error::Git(e)
            }
        })?;

        Self::from_repository(repo)
    }

    pub(crate) fn from_repository(repo: Repository) -> Result<Self> {
        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Check if `path` holds version-control metadata
    pub fn is_git_repo(path: impl AsRef<Path>) -> bool {
        path.as_ref().join(".git").exists()
    }

    /// Working directory of the repository
    pub fn working_dir(&self) -> &Path {
        &self.root
    }

    /// Whether the working directory is `path`
    ///
    /// The engine may report a canonicalized form of the path it was given,
    /// so both sides are canonicalized when they differ textually.
    pub fn is_at(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if self.root == path {
            return true;
        }

        match (self.root.canonicalize(), path.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    /// Path of the `.git` directory
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Full message of the commit HEAD points at, byte-for-byte
    pub fn head_message(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(String::from_utf8_lossy(commit.message_raw_bytes()).into_owned())
    }

    /// Get the active branch name
    ///
    /// Returns `None` for a detached HEAD. On a fresh repository with no
    /// commits this is the branch HEAD will create on the first commit.
    pub fn active_branch(&self) -> Result<Option<String>> {
        match self.repo.head() {
            Ok(head) if head.is_branch() => Ok(head.shorthand().map(|s| s.to_string())),
            Ok(_) => Ok(None),
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let head = self.repo.find_reference("HEAD")?;
                let name = head
                    .symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(|s| s.to_string());
                Ok(name)
            }
            Err(e) => Err(Error::Git(e)),
        }
    }

    /// List all remotes
    pub fn list_remotes(&self) -> Result<Vec<RemoteInfo>> {
        let remotes = self.repo.remotes()?;

        let mut result = Vec::new();
        for remote_name in remotes.iter().flatten() {
            if let Ok(remote) = self.repo.find_remote(remote_name) {
                if let Some(url) = remote.url() {
                    result.push(RemoteInfo {
                        name: remote_name.to_string(),
                        url: url.to_string(),
                    });
                }
            }
        }

        Ok(result)
    }

    /// Look up a configured remote by name
    pub fn find_remote(&self, name: &str) -> Result<RemoteInfo> {
        let remote = self.repo.find_remote(name).map_err(|_| Error::MissingRemote {
            name: name.to_string(),
        })?;

        Ok(RemoteInfo {
            name: name.to_string(),
            url: remote.url().unwrap_or_default().to_string(),
        })
    }

    /// Add a remote; fails if one with the same name exists
    pub fn create_remote(&self, name: &str, url: &str) -> Result<RemoteInfo> {
        tracing::info!(name, url, "Creating remote");
        self.repo
            .remote(name, url)
            .map_err(|e| Error::command("remote add", e))?;

        Ok(RemoteInfo {
            name: name.to_string(),
            url: url.to_string(),
        })
    }

    /// Resolve `path` to a path relative to the working directory
    pub(crate) fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        if path.is_relative() {
            return Ok(path.to_path_buf());
        }

        if let Ok(rel) = path.strip_prefix(&self.root) {
            return Ok(rel.to_path_buf());
        }

        // The engine may report a canonicalized working directory
        let root = self.root.canonicalize()?;
        let canonical = path.canonicalize()?;
        canonical
            .strip_prefix(&root)
            .map(Path::to_path_buf)
            .map_err(|_| Error::Command {
                command: "add".to_string(),
                message: format!(
                    "{} is outside repository at {}",
                    path.display(),
                    self.root.display()
                ),
            })
    }

    /// Get access to the underlying git2 repository
    pub fn inner(&self) -> &Repository {
        &self.repo
    }
}
