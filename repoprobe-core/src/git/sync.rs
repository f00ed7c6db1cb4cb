//! Push and pull against the "origin" remote

use git2::build::CheckoutBuilder;
use git2::{FetchOptions, Oid, PushOptions, ResetType};

use super::engine::GitEngine;
use super::repo::{GitRepo, ORIGIN};
use crate::{Error, Result};

/// How a pull integrated the remote revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// Nothing to integrate
    UpToDate,
    /// The branch was moved to the fetched commit
    FastForward(Oid),
    /// A merge commit was created
    Merged(Oid),
}

impl GitEngine {
    /// Push the active branch to origin
    pub fn push(&self, repo: &GitRepo) -> Result<()> {
        let git = repo.inner();
        let mut remote = git.find_remote(ORIGIN).map_err(|_| Error::MissingRemote {
            name: ORIGIN.to_string(),
        })?;
        let branch = active_branch_or_fail(repo, "push")?;

        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        tracing::info!(remote = ORIGIN, %branch, "Pushing to remote");
        self.log_command(format_args!("push {} {}", ORIGIN, branch));

        let mut rejection: Option<(String, String)> = None;
        {
            let mut callbacks = self.remote_callbacks();
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejection = Some((refname.to_string(), message.to_string()));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote
                .push(&[refspec.as_str()], Some(&mut options))
                .map_err(|e| Error::command("push", e))?;
        }

        if let Some((refname, message)) = rejection {
            return Err(Error::PushRejected { refname, message });
        }

        tracing::info!(remote = ORIGIN, %branch, "Pushed changes");
        Ok(())
    }

    /// Fetch the active branch from origin and integrate it
    ///
    /// Conflicting changes are discarded by resetting to HEAD, leaving a clean
    /// working directory, and [`Error::MergeConflict`] is returned.
    pub fn pull(&self, repo: &GitRepo) -> Result<PullOutcome> {
        let git = repo.inner();
        let mut remote = git.find_remote(ORIGIN).map_err(|_| Error::MissingRemote {
            name: ORIGIN.to_string(),
        })?;
        let branch = active_branch_or_fail(repo, "pull")?;

        tracing::info!(remote = ORIGIN, %branch, "Pulling from remote");
        self.log_command(format_args!("pull {} {}", ORIGIN, branch));

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.remote_callbacks());
        remote
            .fetch(&[branch.as_str()], Some(&mut fetch_options), None)
            .map_err(|e| Error::command("pull", e))?;

        let fetch_head = git
            .find_reference("FETCH_HEAD")
            .map_err(|e| Error::command("pull", e))?;
        let fetched = git.reference_to_annotated_commit(&fetch_head)?;
        let (analysis, _) = git.merge_analysis(&[&fetched])?;

        if analysis.is_up_to_date() {
            tracing::info!(%branch, "Already up to date");
            return Ok(PullOutcome::UpToDate);
        }

        let refname = format!("refs/heads/{}", branch);

        if analysis.is_unborn() {
            git.reference(&refname, fetched.id(), true, "pull: initial")?;
            git.set_head(&refname)?;
            git.checkout_head(Some(CheckoutBuilder::default().force()))?;
            return Ok(PullOutcome::FastForward(fetched.id()));
        }

        if analysis.is_fast_forward() {
            let mut reference = git.find_reference(&refname)?;
            reference.set_target(
                fetched.id(),
                &format!("pull: fast-forward to {}", fetched.id()),
            )?;
            git.set_head(&refname)?;
            git.checkout_head(Some(CheckoutBuilder::default().force()))?;
            tracing::info!(%branch, commit = %fetched.id(), "Fast-forwarded");
            return Ok(PullOutcome::FastForward(fetched.id()));
        }

        git.merge(&[&fetched], None, None)?;

        let mut index = git.index()?;
        if index.has_conflicts() {
            let head = git.head()?.peel_to_commit()?;
            git.reset(head.as_object(), ResetType::Hard, None)?;
            git.cleanup_state()?;
            return Err(Error::MergeConflict {
                message: format!("Pulling {} from {} produced conflicts", branch, ORIGIN),
            });
        }

        let tree = git.find_tree(index.write_tree()?)?;
        let signature = self.signature(git)?;
        let ours = git.head()?.peel_to_commit()?;
        let theirs = git.find_commit(fetched.id())?;
        let message = format!(
            "Merge branch '{}' of {}",
            branch,
            remote.url().unwrap_or(ORIGIN)
        );

        let oid = git.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &message,
            &tree,
            &[&ours, &theirs],
        )?;
        git.cleanup_state()?;

        tracing::info!(%branch, commit = %oid, "Merged remote changes");
        Ok(PullOutcome::Merged(oid))
    }
}

fn active_branch_or_fail(repo: &GitRepo, command: &str) -> Result<String> {
    repo.active_branch()?.ok_or_else(|| Error::Command {
        command: command.to_string(),
        message: "HEAD is detached".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Transport;
    use crate::test_support::{bare_remote, branch_tip};
    use std::path::Path;
    use tempfile::TempDir;

    fn commit_file(engine: &GitEngine, repo: &GitRepo, name: &str, contents: &str) -> Oid {
        std::fs::write(repo.working_dir().join(name), contents).unwrap();
        engine.stage(repo, &[name]).unwrap();
        engine.commit(repo, &format!("add {}", name)).unwrap()
    }

    fn clone_to(engine: &GitEngine, url: &str, dir: &Path) -> GitRepo {
        engine.clone(url, dir, Transport::Https).unwrap()
    }

    #[test]
    fn test_push_updates_remote() {
        let remote = TempDir::new().unwrap();
        let url = bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        let engine = GitEngine::default();

        let repo = clone_to(&engine, &url, &work.path().join("a"));
        let oid = commit_file(&engine, &repo, "new.txt", "hello\n");
        engine.push(&repo).unwrap();

        assert_eq!(branch_tip(remote.path(), "main"), oid);
    }

    #[test]
    fn test_push_without_origin() {
        let dir = TempDir::new().unwrap();
        let engine = GitEngine::default();
        let repo = engine.init(dir.path()).unwrap();

        let err = engine.push(&repo).unwrap_err();
        assert!(matches!(err, Error::MissingRemote { ref name } if name == "origin"));
    }

    #[test]
    fn test_pull_without_origin() {
        let dir = TempDir::new().unwrap();
        let engine = GitEngine::default();
        let repo = engine.init(dir.path()).unwrap();

        let err = engine.pull(&repo).unwrap_err();
        assert!(matches!(err, Error::MissingRemote { .. }));
    }

    #[test]
    fn test_pull_up_to_date() {
        let remote = TempDir::new().unwrap();
        let url = bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        let engine = GitEngine::default();

        let repo = clone_to(&engine, &url, &work.path().join("a"));
        assert_eq!(engine.pull(&repo).unwrap(), PullOutcome::UpToDate);
    }

    #[test]
    fn test_pull_fast_forward() {
        let remote = TempDir::new().unwrap();
        let url = bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        let engine = GitEngine::default();

        let reader = clone_to(&engine, &url, &work.path().join("reader"));
        let writer = clone_to(&engine, &url, &work.path().join("writer"));
        let oid = commit_file(&engine, &writer, "from-writer.txt", "w\n");
        engine.push(&writer).unwrap();

        assert_eq!(engine.pull(&reader).unwrap(), PullOutcome::FastForward(oid));
        assert!(reader.working_dir().join("from-writer.txt").exists());
        assert_eq!(reader.inner().head().unwrap().target(), Some(oid));
    }

    #[test]
    fn test_pull_merges_diverged_history() {
        let remote = TempDir::new().unwrap();
        let url = bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        let engine = GitEngine::default();

        let reader = clone_to(&engine, &url, &work.path().join("reader"));
        let writer = clone_to(&engine, &url, &work.path().join("writer"));
        commit_file(&engine, &writer, "theirs.txt", "t\n");
        engine.push(&writer).unwrap();
        commit_file(&engine, &reader, "ours.txt", "o\n");

        match engine.pull(&reader).unwrap() {
            PullOutcome::Merged(oid) => {
                let commit = reader.inner().find_commit(oid).unwrap();
                assert_eq!(commit.parent_count(), 2);
            }
            other => panic!("expected merge, got {:?}", other),
        }
        assert!(reader.working_dir().join("theirs.txt").exists());
        assert!(reader.working_dir().join("ours.txt").exists());
    }

    #[test]
    fn test_pull_conflict_is_reported() {
        let remote = TempDir::new().unwrap();
        let url = bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        let engine = GitEngine::default();

        let reader = clone_to(&engine, &url, &work.path().join("reader"));
        let writer = clone_to(&engine, &url, &work.path().join("writer"));
        commit_file(&engine, &writer, "README.md", "theirs\n");
        engine.push(&writer).unwrap();
        commit_file(&engine, &reader, "README.md", "ours\n");

        let err = engine.pull(&reader).unwrap_err();
        assert!(matches!(err, Error::MergeConflict { .. }));

        // the merge attempt leaves nothing behind
        let git = reader.inner();
        assert_eq!(git.state(), git2::RepositoryState::Clean);
        assert!(!git.index().unwrap().has_conflicts());
        assert_eq!(
            std::fs::read_to_string(reader.working_dir().join("README.md")).unwrap(),
            "ours\n"
        );
    }

    #[test]
    fn test_push_non_fast_forward_fails() {
        let remote = TempDir::new().unwrap();
        let url = bare_remote(remote.path());
        let work = TempDir::new().unwrap();
        let engine = GitEngine::default();

        let first = clone_to(&engine, &url, &work.path().join("first"));
        let second = clone_to(&engine, &url, &work.path().join("second"));
        commit_file(&engine, &first, "one.txt", "1\n");
        engine.push(&first).unwrap();
        commit_file(&engine, &second, "two.txt", "2\n");

        let err = engine.push(&second).unwrap_err();
        assert!(matches!(
            err,
            Error::Command { .. } | Error::PushRejected { .. }
        ));
    }
}
