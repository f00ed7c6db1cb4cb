//! Scenario parameter bundles

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;

use crate::config::Config;
use crate::content;
use crate::scenario::Scenario;
use crate::{Error, Result};

/// Length of generated commit message suffixes
const COMMIT_MSG_LEN: usize = 10;

/// Length of generated branch names
const BRANCH_NAME_LEN: usize = 20;

/// Directory shared by `repo_init` and `open_existing`
const LOCAL_INIT_DIR: &str = "local-init";

/// Parameters read by one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioParams {
    /// Local working directory
    pub repo_path: PathBuf,
    /// Clone URL of the remote
    pub remote_url: Option<String>,
    /// Message for the commit scenario
    pub commit_msg: Option<String>,
    /// Branch to create (the first branch for switch_branch)
    pub new_branch: Option<String>,
    /// Branch expected to exist already
    pub existing_branch: Option<String>,
    /// Second branch for switch_branch
    pub second_branch: Option<String>,
}

impl ScenarioParams {
    pub fn at(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote_url: None,
            commit_msg: None,
            new_branch: None,
            existing_branch: None,
            second_branch: None,
        }
    }

    pub fn with_remote(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    pub fn with_commit_msg(mut self, msg: impl Into<String>) -> Self {
        self.commit_msg = Some(msg.into());
        self
    }

    pub fn with_new_branch(mut self, name: impl Into<String>) -> Self {
        self.new_branch = Some(name.into());
        self
    }

    pub fn with_existing_branch(mut self, name: impl Into<String>) -> Self {
        self.existing_branch = Some(name.into());
        self
    }

    pub fn with_second_branch(mut self, name: impl Into<String>) -> Self {
        self.second_branch = Some(name.into());
        self
    }

    pub(crate) fn remote(&self, scenario: Scenario) -> Result<&str> {
        required(scenario, "remote_url", self.remote_url.as_deref())
    }

    pub(crate) fn commit(&self, scenario: Scenario) -> Result<&str> {
        required(scenario, "commit_msg", self.commit_msg.as_deref())
    }

    pub(crate) fn new_branch(&self, scenario: Scenario) -> Result<&str> {
        required(scenario, "new_branch", self.new_branch.as_deref())
    }

    pub(crate) fn existing_branch(&self, scenario: Scenario) -> Result<&str> {
        required(scenario, "existing_branch", self.existing_branch.as_deref())
    }

    pub(crate) fn second_branch(&self, scenario: Scenario) -> Result<&str> {
        required(scenario, "second_branch", self.second_branch.as_deref())
    }
}

fn required<'a>(scenario: Scenario, field: &str, value: Option<&'a str>) -> Result<&'a str> {
    value.ok_or_else(|| {
        Error::Config(format!(
            "Scenario {} needs parameter '{}'",
            scenario, field
        ))
    })
}

/// One immutable parameter bundle per scenario
#[derive(Debug, Clone)]
pub struct DataFeed {
    root: PathBuf,
    params: HashMap<Scenario, ScenarioParams>,
}

impl DataFeed {
    /// Build bundles for every scenario under the configured work root
    pub fn new<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Self {
        let root = config.workspace.root.clone();
        let https = config.remote.https_url.as_str();
        let ssh = config.remote.ssh_url.as_str();
        let existing = config.remote.existing_branch.as_str();

        let local_init = root.join(LOCAL_INIT_DIR);
        let dir = |scenario: Scenario| root.join(scenario.name());

        let first_branch = content::random_text(rng, BRANCH_NAME_LEN);
        let mut second_branch = content::random_text(rng, BRANCH_NAME_LEN);
        while second_branch == first_branch {
            second_branch = content::random_text(rng, BRANCH_NAME_LEN);
        }

        let params = HashMap::from([
            (Scenario::RepoInit, ScenarioParams::at(&local_init)),
            (Scenario::OpenExisting, ScenarioParams::at(&local_init)),
            (
                Scenario::CloneHttps,
                ScenarioParams::at(dir(Scenario::CloneHttps)).with_remote(https),
            ),
            (
                Scenario::CloneSsh,
                ScenarioParams::at(dir(Scenario::CloneSsh)).with_remote(ssh),
            ),
            (
                Scenario::Commit,
                ScenarioParams::at(dir(Scenario::Commit))
                    .with_remote(https)
                    .with_commit_msg(content::commit_message(rng, COMMIT_MSG_LEN)),
            ),
            (
                Scenario::CreateBranch,
                ScenarioParams::at(dir(Scenario::CreateBranch))
                    .with_remote(https)
                    .with_new_branch(content::random_text(rng, BRANCH_NAME_LEN)),
            ),
            (
                Scenario::SwitchBranch,
                ScenarioParams::at(dir(Scenario::SwitchBranch))
                    .with_remote(https)
                    .with_new_branch(first_branch)
                    .with_second_branch(second_branch),
            ),
            (
                Scenario::Pull,
                ScenarioParams::at(dir(Scenario::Pull))
                    .with_remote(https)
                    .with_existing_branch(existing),
            ),
            (
                Scenario::Push,
                ScenarioParams::at(dir(Scenario::Push))
                    .with_remote(https)
                    .with_existing_branch(existing),
            ),
        ]);

        Self { root, params }
    }

    /// Root every scenario path lives under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parameters for `scenario`
    pub fn params(&self, scenario: Scenario) -> Option<&ScenarioParams> {
        self.params.get(&scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliOverrides;
    use crate::content::COMMIT_MESSAGE_PREFIX;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn feed() -> DataFeed {
        let config = Config::default().with_cli_overrides(CliOverrides {
            root: Some(PathBuf::from("/probe")),
            ..Default::default()
        });
        DataFeed::new(&config, &mut StdRng::seed_from_u64(9))
    }

    #[test]
    fn test_every_scenario_has_params() {
        let feed = feed();
        for scenario in Scenario::ALL {
            let params = feed.params(scenario).unwrap();
            assert!(params.repo_path.starts_with("/probe"));
        }
    }

    #[test]
    fn test_init_and_open_share_path() {
        let feed = feed();
        assert_eq!(
            feed.params(Scenario::RepoInit).unwrap().repo_path,
            feed.params(Scenario::OpenExisting).unwrap().repo_path
        );
        assert_eq!(
            feed.params(Scenario::Pull).unwrap().repo_path,
            PathBuf::from("/probe/pull")
        );
    }

    #[test]
    fn test_remote_urls_by_transport() {
        let feed = feed();
        let config = Config::default();
        assert_eq!(
            feed.params(Scenario::CloneSsh).unwrap().remote_url.as_deref(),
            Some(config.remote.ssh_url.as_str())
        );
        assert_eq!(
            feed.params(Scenario::Commit).unwrap().remote_url.as_deref(),
            Some(config.remote.https_url.as_str())
        );
        assert!(feed.params(Scenario::RepoInit).unwrap().remote_url.is_none());
    }

    #[test]
    fn test_generated_values() {
        let feed = feed();

        let msg = feed.params(Scenario::Commit).unwrap().commit_msg.clone().unwrap();
        assert_eq!(msg.len(), COMMIT_MESSAGE_PREFIX.len() + COMMIT_MSG_LEN);

        let branch = feed.params(Scenario::CreateBranch).unwrap().new_branch.clone().unwrap();
        assert_eq!(branch.len(), BRANCH_NAME_LEN);

        let switch = feed.params(Scenario::SwitchBranch).unwrap();
        assert_ne!(switch.new_branch, switch.second_branch);
        assert_eq!(
            feed.params(Scenario::Push).unwrap().existing_branch.as_deref(),
            Some("main")
        );
    }

    #[test]
    fn test_missing_param_is_config_error() {
        let params = ScenarioParams::at("/probe/x");
        let err = params.remote(Scenario::CloneHttps).unwrap_err();
        assert!(err.to_string().contains("remote_url"));
    }
}
