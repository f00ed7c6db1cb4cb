//! Staging and committing

use std::path::Path;

use git2::{Commit, ErrorCode, Oid};

use super::engine::GitEngine;
use super::repo::GitRepo;
use crate::{Error, Result};

impl GitEngine {
    /// Add `files` to the index
    ///
    /// Paths may be relative to the working directory or absolute paths
    /// inside it.
    pub fn stage<P: AsRef<Path>>(&self, repo: &GitRepo, files: &[P]) -> Result<()> {
        let mut index = repo.inner().index()?;

        for file in files {
            let rel = repo.relative_path(file.as_ref())?;
            tracing::info!(file = %rel.display(), working_dir = %repo.working_dir().display(), "Staging file");
            self.log_command(format_args!("add {}", rel.display()));
            index
                .add_path(&rel)
                .map_err(|e| Error::command("add", e))?;
        }

        index.write()?;
        Ok(())
    }

    /// Record the index as a new commit on HEAD
    ///
    /// The message is stored verbatim; no trailing newline is added.
    pub fn commit(&self, repo: &GitRepo, message: &str) -> Result<Oid> {
        let git = repo.inner();
        self.log_command(format_args!("commit -m {:?}", message));

        let tree_id = git.index()?.write_tree()?;
        let tree = git.find_tree(tree_id)?;
        let signature = self.signature(git)?;

        let parent = match git.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(Error::Git(e)),
        };
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = git
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(|e| Error::command("commit", e))?;

        tracing::info!(commit = %oid, message, "Created commit");
        Ok(oid)
    }
}
