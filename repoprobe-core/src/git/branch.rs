//! Branch creation, checkout and listing

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, ObjectType, Reference};

use super::engine::GitEngine;
use super::repo::{GitRepo, ORIGIN};
use crate::{Error, Result};

impl GitEngine {
    /// Create a branch at HEAD's commit without switching to it
    pub fn create_branch(&self, repo: &GitRepo, name: &str) -> Result<String> {
        let git = repo.inner();
        self.log_command(format_args!("branch {}", name));

        let head = git.head().map_err(|e| {
            if e.code() == ErrorCode::UnbornBranch {
                Error::Command {
                    command: "branch".to_string(),
                    message: format!("cannot create '{}': HEAD has no commits", name),
                }
            } else {
                Error::Git(e)
            }
        })?;
        let commit = head.peel_to_commit()?;

        git.branch(name, &commit, false)
            .map_err(|e| Error::command("branch", e))?;

        tracing::info!(branch = name, commit = %commit.id(), "Created branch");
        Ok(name.to_string())
    }

    /// Check out `name`, creating it from `origin/<name>` when only the
    /// remote-tracking branch exists
    pub fn checkout_branch(&self, repo: &GitRepo, name: &str) -> Result<()> {
        let git = repo.inner();
        self.log_command(format_args!("checkout {}", name));

        let reference = match git.find_branch(name, BranchType::Local) {
            Ok(branch) => branch.into_reference(),
            Err(_) => {
                let tracking = format!("{}/{}", ORIGIN, name);
                let remote = git
                    .find_branch(&tracking, BranchType::Remote)
                    .map_err(|_| Error::BranchNotFound {
                        name: name.to_string(),
                    })?;
                let commit = remote.get().peel_to_commit()?;

                let mut local = git.branch(name, &commit, false)?;
                local.set_upstream(Some(&tracking))?;
                tracing::info!(branch = name, upstream = %tracking, "Created tracking branch");
                local.into_reference()
            }
        };

        self.materialize(repo, &reference)?;
        tracing::info!(branch = name, "Checked out branch");
        Ok(())
    }

    /// Switch to an existing local branch
    pub fn switch_branch(&self, repo: &GitRepo, name: &str) -> Result<()> {
        self.log_command(format_args!("switch {}", name));

        let branch = repo
            .inner()
            .find_branch(name, BranchType::Local)
            .map_err(|_| Error::BranchNotFound {
                name: name.to_string(),
            })?;

        self.materialize(repo, branch.get())?;
        tracing::info!(branch = name, "Switched branch");
        Ok(())
    }

    /// Write the branch's tree into the working directory and point HEAD at it
    fn materialize(&self, repo: &GitRepo, reference: &Reference<'_>) -> Result<()> {
        let git = repo.inner();
        let refname = reference
            .name()
            .ok_or_else(|| Error::Other("Branch name is not valid UTF-8".to_string()))?;
        let target = reference.peel(ObjectType::Commit)?;

        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        git.checkout_tree(&target, Some(&mut checkout))
            .map_err(|e| Error::command("checkout", e))?;
        git.set_head(refname)?;

        Ok(())
    }
}

impl GitRepo {
    /// List all local branches
    pub fn list_local_branches(&self) -> Result<Vec<String>> {
        let mut branches = Vec::new();

        for branch in self.inner().branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name().ok().flatten() {
                branches.push(name.to_string());
            }
        }

        Ok(branches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Transport;
    use crate::test_support::bare_remote;
    use tempfile::TempDir;

    fn cloned(remote: &TempDir, work: &TempDir) -> (GitEngine, GitRepo) {
        let url = bare_remote(remote.path());
        let engine = GitEngine::default();
        let repo = engine
            .clone(&url, work.path().join("clone"), Transport::Https)
            .unwrap();
        (engine, repo)
    }

    #[test]
    fn test_create_branch_keeps_active_branch() {
        let (remote, work) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (engine, repo) = cloned(&remote, &work);

        let before = repo.active_branch().unwrap();
        engine.create_branch(&repo, "feature").unwrap();
        assert_eq!(repo.active_branch().unwrap(), before);
        assert!(repo.list_local_branches().unwrap().contains(&"feature".to_string()));
    }

    #[test]
    fn test_create_existing_branch_fails() {
        let (remote, work) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (engine, repo) = cloned(&remote, &work);

        assert!(engine.create_branch(&repo, "main").is_err());
    }

    #[test]
    fn test_create_branch_on_unborn_head_fails() {
        let dir = TempDir::new().unwrap();
        let engine = GitEngine::default();
        let repo = engine.init(dir.path()).unwrap();

        let err = engine.create_branch(&repo, "feature").unwrap_err();
        assert!(matches!(err, Error::Command { .. }));
    }

    #[test]
    fn test_switch_changes_active_branch() {
        let (remote, work) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (engine, repo) = cloned(&remote, &work);

        engine.create_branch(&repo, "first").unwrap();
        engine.create_branch(&repo, "second").unwrap();

        engine.checkout_branch(&repo, "first").unwrap();
        let before = repo.active_branch().unwrap();
        assert_eq!(before.as_deref(), Some("first"));

        engine.switch_branch(&repo, "second").unwrap();
        let after = repo.active_branch().unwrap();
        assert_eq!(after.as_deref(), Some("second"));
        assert_ne!(before, after);
    }

    #[test]
    fn test_switch_to_missing_branch_fails() {
        let (remote, work) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (engine, repo) = cloned(&remote, &work);

        let err = engine.switch_branch(&repo, "nope").unwrap_err();
        assert!(matches!(err, Error::BranchNotFound { .. }));
        assert!(matches!(
            engine.checkout_branch(&repo, "nope"),
            Err(Error::BranchNotFound { .. })
        ));
    }

    #[test]
    fn test_checkout_creates_tracking_branch() {
        let (remote, work) = (TempDir::new().unwrap(), TempDir::new().unwrap());
        let (engine, repo) = cloned(&remote, &work);

        // Drop the local branch so only origin/main remains
        engine.create_branch(&repo, "scratch").unwrap();
        engine.switch_branch(&repo, "scratch").unwrap();
        repo.inner()
            .find_branch("main", BranchType::Local)
            .unwrap()
            .delete()
            .unwrap();

        engine.checkout_branch(&repo, "main").unwrap();
        assert_eq!(repo.active_branch().unwrap().as_deref(), Some("main"));
        let upstream = repo
            .inner()
            .find_branch("main", BranchType::Local)
            .unwrap()
            .upstream()
            .unwrap();
        assert_eq!(upstream.name().unwrap(), Some("origin/main"));
    }
}
