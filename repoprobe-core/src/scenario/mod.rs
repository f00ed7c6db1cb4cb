//! Named end-to-end scenarios
//!
//! Each [`Scenario`] composes facade calls into one lifecycle check with its
//! own post-conditions and its own fallback table.

mod dispatch;
mod fallback;
mod runner;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

pub use dispatch::{dispatch, dispatch_recording, dispatch_with_rng, FiredFallback, Outcome};
pub use fallback::{find_rule, ErrorMatch, FallbackRule, Recovery, Step};
pub use runner::{RunSummary, Runner, ScenarioReport, Status};

/// A named test action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    RepoInit,
    OpenExisting,
    CloneHttps,
    CloneSsh,
    Commit,
    CreateBranch,
    SwitchBranch,
    Pull,
    Push,
}

impl Scenario {
    /// Every scenario, in suite order
    pub const ALL: [Scenario; 9] = [
        Scenario::RepoInit,
        Scenario::OpenExisting,
        Scenario::CloneHttps,
        Scenario::CloneSsh,
        Scenario::Commit,
        Scenario::CreateBranch,
        Scenario::SwitchBranch,
        Scenario::Pull,
        Scenario::Push,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::RepoInit => "repo_init",
            Scenario::OpenExisting => "open_existing",
            Scenario::CloneHttps => "clone_https",
            Scenario::CloneSsh => "clone_ssh",
            Scenario::Commit => "commit",
            Scenario::CreateBranch => "create_branch",
            Scenario::SwitchBranch => "switch_branch",
            Scenario::Pull => "pull",
            Scenario::Push => "push",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Scenario::RepoInit => "Initialize a repository",
            Scenario::OpenExisting => "Open an existing local repository",
            Scenario::CloneHttps => "Clone the remote over HTTPS",
            Scenario::CloneSsh => "Clone the remote over SSH",
            Scenario::Commit => "Stage a random file and commit it",
            Scenario::CreateBranch => "Create a branch without switching to it",
            Scenario::SwitchBranch => "Check out one branch, then switch to another",
            Scenario::Pull => "Pull from origin, adding the remote if missing",
            Scenario::Push => "Commit on an existing branch and push it",
        }
    }

    /// Whether the scenario expects its directory to hold a repository already
    pub fn requires_existing(&self) -> bool {
        matches!(self, Scenario::OpenExisting)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    /// Accepts the scenario name with or without a `test_` prefix
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        let name = name.strip_prefix("test_").unwrap_or(name);

        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == name)
            .ok_or_else(|| Error::Config(format!("Unknown scenario: {}", s)))
    }
}
