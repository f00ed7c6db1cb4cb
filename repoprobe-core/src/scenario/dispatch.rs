//! Scenario dispatch

use std::path::Path;

use rand::Rng;
use serde::Serialize;

use super::fallback::{find_rule, Recovery, Step};
use super::Scenario;
use crate::content;
use crate::fixtures::ScenarioParams;
use crate::git::{GitEngine, GitRepo, Transport, ORIGIN};
use crate::{Error, Result};

/// Suffix length for the random commit message in the push scenario
const PUSH_MSG_LEN: usize = 10;

/// Name length of generated throwaway files
const FILE_NAME_LEN: usize = 10;

/// A fallback that fired during a scenario
#[derive(Debug, Clone, Serialize)]
pub struct FiredFallback {
    pub step: Step,
    pub recovery: Recovery,
    pub error: String,
}

/// What a successful scenario did
#[derive(Debug, Clone, Default, Serialize)]
pub struct Outcome {
    /// Fallbacks taken, in order
    pub fallbacks: Vec<FiredFallback>,
}

/// Run `scenario` with fresh randomness
pub fn dispatch(engine: &GitEngine, scenario: Scenario, params: &ScenarioParams) -> Result<Outcome> {
    dispatch_with_rng(engine, scenario, params, &mut rand::rng())
}

/// Run `scenario`, drawing generated file names and messages from `rng`
///
/// Post-condition failures are returned as [`Error::Assertion`].
pub fn dispatch_with_rng<R: Rng + ?Sized>(
    engine: &GitEngine,
    scenario: Scenario,
    params: &ScenarioParams,
    rng: &mut R,
) -> Result<Outcome> {
    let mut outcome = Outcome::default();
    dispatch_recording(engine, scenario, params, rng, &mut outcome)?;
    Ok(outcome)
}

/// Run `scenario`, recording fired fallbacks into `outcome`
///
/// Fallbacks taken before a failure stay in `outcome` when an error is
/// returned.
pub fn dispatch_recording<R: Rng + ?Sized>(
    engine: &GitEngine,
    scenario: Scenario,
    params: &ScenarioParams,
    rng: &mut R,
    outcome: &mut Outcome,
) -> Result<()> {
    tracing::info!(%scenario, path = %params.repo_path.display(), "Running scenario");

    let mut flow = Flow {
        engine,
        scenario,
        params,
        rng,
        outcome,
    };

    match scenario {
        Scenario::RepoInit => flow.repo_init(),
        Scenario::OpenExisting => flow.open_existing(),
        Scenario::CloneHttps => flow.clone(Transport::Https),
        Scenario::CloneSsh => flow.clone(Transport::Ssh),
        Scenario::Commit => flow.commit(),
        Scenario::CreateBranch => flow.create_branch(),
        Scenario::SwitchBranch => flow.switch_branch(),
        Scenario::Pull => flow.pull(),
        Scenario::Push => flow.push(),
    }
}

struct Flow<'a, R: ?Sized> {
    engine: &'a GitEngine,
    scenario: Scenario,
    params: &'a ScenarioParams,
    rng: &'a mut R,
    outcome: &'a mut Outcome,
}

impl<R: Rng + ?Sized> Flow<'_, R> {
    fn path(&self) -> &Path {
        &self.params.repo_path
    }

    fn repo_init(&mut self) -> Result<()> {
        let repo = self.engine.init(self.path())?;
        ensure(repo.is_at(self.path()), || {
            format!(
                "Repo at {} initialization failed, working dir is {}",
                self.path().display(),
                repo.working_dir().display()
            )
        })
    }

    fn open_existing(&mut self) -> Result<()> {
        let path = self.path();
        ensure(path.exists() && GitRepo::is_git_repo(path), || {
            format!(
                "Repo {} does not exist or is not a git repository",
                path.display()
            )
        })?;

        let repo = self.engine.open(path)?;
        ensure(repo.is_at(path), || {
            format!("Failed to open {}", repo.working_dir().display())
        })
    }

    fn clone(&mut self, transport: Transport) -> Result<()> {
        let params = self.params;
        let url = params.remote(self.scenario)?;
        let repo = self.engine.clone(url, self.path(), transport)?;
        ensure(repo.is_at(self.path()), || {
            format!(
                "Clone of {} landed in {}, expected {}",
                url,
                repo.working_dir().display(),
                self.path().display()
            )
        })
    }

    fn commit(&mut self) -> Result<()> {
        let params = self.params;
        let url = params.remote(self.scenario)?;
        let message = params.commit(self.scenario)?;

        let repo = self.engine.clone(url, self.path(), Transport::Https)?;
        self.commit_random_file(&repo, message)?;

        let head = repo.head_message()?;
        ensure(head == message, || {
            format!("Last commit message {:?} differs from {:?}", message, head)
        })
    }

    fn create_branch(&mut self) -> Result<()> {
        let params = self.params;
        let url = params.remote(self.scenario)?;
        let name = params.new_branch(self.scenario)?;

        let repo = self.clone_or_open(url)?;
        let before = repo.active_branch()?;
        self.engine.create_branch(&repo, name)?;
        let after = repo.active_branch()?;

        ensure(after == before, || {
            format!(
                "Creating {} moved the active branch from {:?} to {:?}",
                name, before, after
            )
        })?;
        ensure(after.as_deref() != Some(name), || {
            format!("Branch {} became the active branch", name)
        })?;

        tracing::info!(branch = name, active = ?after, "New branch differs from active branch");
        Ok(())
    }

    fn switch_branch(&mut self) -> Result<()> {
        let params = self.params;
        let url = params.remote(self.scenario)?;
        let first = params.new_branch(self.scenario)?;
        let second = params.second_branch(self.scenario)?;

        let repo = self.engine.clone(url, self.path(), Transport::Https)?;
        self.engine.create_branch(&repo, first)?;
        self.engine.create_branch(&repo, second)?;
        drop(repo);

        let repo = self.engine.open(self.path())?;
        self.engine.checkout_branch(&repo, first)?;
        let after_checkout = repo.active_branch()?;
        self.engine.switch_branch(&repo, second)?;
        let after_switch = repo.active_branch()?;

        for branch in repo.list_local_branches()? {
            tracing::info!(%branch, "Existing branch");
        }

        ensure(after_checkout.as_deref() == Some(first), || {
            format!("Checkout left {:?} active, expected {}", after_checkout, first)
        })?;
        ensure(after_switch.as_deref() == Some(second), || {
            format!("Switch left {:?} active, expected {}", after_switch, second)
        })?;
        ensure(after_checkout != after_switch, || {
            format!("Switching to {} did not change the active branch", second)
        })
    }

    fn pull(&mut self) -> Result<()> {
        let params = self.params;
        let url = params.remote(self.scenario)?;
        let repo = self.clone_or_open(url)?;

        log_remotes(&repo)?;
        match self.engine.pull(&repo) {
            Ok(outcome) => {
                tracing::info!(?outcome, "Pulled from origin");
                Ok(())
            }
            Err(err) => match self.recover(Step::Pull, err)? {
                Recovery::AddOrigin => self.add_origin(&repo, url),
                other => Err(misrouted(Step::Pull, other)),
            },
        }
    }

    fn push(&mut self) -> Result<()> {
        let params = self.params;
        let url = params.remote(self.scenario)?;
        let branch = params.existing_branch(self.scenario)?;

        let repo = self.engine.clone(url, self.path(), Transport::Https)?;
        self.engine.switch_branch(&repo, branch)?;

        let message = content::commit_message(&mut *self.rng, PUSH_MSG_LEN);
        self.commit_random_file(&repo, &message)?;
        self.engine.push(&repo)
    }

    fn commit_random_file(&mut self, repo: &GitRepo, message: &str) -> Result<()> {
        let file = content::write_random_file(&mut *self.rng, repo.working_dir(), FILE_NAME_LEN)?;
        self.engine.stage(repo, &[file])?;
        self.engine.commit(repo, message)?;
        Ok(())
    }

    fn clone_or_open(&mut self, url: &str) -> Result<GitRepo> {
        match self.engine.clone(url, self.path(), Transport::Https) {
            Ok(repo) => Ok(repo),
            Err(err) => match self.recover(Step::Clone, err)? {
                Recovery::OpenExisting => self.engine.open(self.path()),
                other => Err(misrouted(Step::Clone, other)),
            },
        }
    }

    fn add_origin(&mut self, repo: &GitRepo, url: &str) -> Result<()> {
        log_remotes(repo)?;

        match repo.create_remote(ORIGIN, url) {
            Ok(remote) => {
                tracing::info!(name = %remote.name, url = %remote.url, "Created remote");
                Ok(())
            }
            Err(err) => match self.recover(Step::CreateRemote, err)? {
                Recovery::ReuseOriginAndResync => self.resync(repo),
                other => Err(misrouted(Step::CreateRemote, other)),
            },
        }
    }

    /// Pull, then pull and push once more against the existing origin
    fn resync(&mut self, repo: &GitRepo) -> Result<()> {
        let origin = repo.find_remote(ORIGIN)?;
        tracing::info!(name = %origin.name, url = %origin.url, "Reusing existing remote");

        self.engine.pull(repo)?;
        let outcome = self.engine.pull(repo)?;
        tracing::info!(?outcome, "Pulled from origin");
        self.engine.push(repo)
    }

    /// Look the failure up in this scenario's table, or give it back
    fn recover(&mut self, step: Step, err: Error) -> Result<Recovery> {
        let Some(rule) = find_rule(self.scenario.fallbacks(), step, &err) else {
            return Err(err);
        };

        tracing::warn!(
            scenario = %self.scenario,
            ?step,
            recovery = ?rule.then,
            error = %err,
            "Step failed, falling back"
        );
        self.outcome.fallbacks.push(FiredFallback {
            step,
            recovery: rule.then,
            error: err.to_string(),
        });
        Ok(rule.then)
    }
}

fn ensure(condition: bool, message: impl FnOnce() -> String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::Assertion(message()))
    }
}

fn misrouted(step: Step, recovery: Recovery) -> Error {
    Error::Other(format!("Fallback {:?} cannot follow step {:?}", recovery, step))
}

fn log_remotes(repo: &GitRepo) -> Result<()> {
    for remote in repo.list_remotes()? {
        tracing::info!(name = %remote.name, url = %remote.url, "Remote");
    }
    Ok(())
}
