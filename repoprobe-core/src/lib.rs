//! Repoprobe Core - Core library for the repoprobe git lifecycle checker
//!
//! This crate drives a version-control engine through named end-to-end
//! scenarios (init, clone, commit, branch, pull, push) against a scratch
//! workspace, with per-scenario fallbacks for known failure modes.

pub mod config;
pub mod content;
pub mod error;
pub mod fixtures;
pub mod git;
pub mod scenario;
pub mod workspace;

#[cfg(test)]
mod test_support;

pub use config::{CliOverrides, Config};
pub use error::{Error, ErrorKind, Result};
pub use fixtures::{DataFeed, ScenarioParams};
pub use git::{EngineOptions, GitEngine, GitRepo, PullOutcome, RemoteInfo, Transport};
pub use scenario::{RunSummary, Runner, Scenario, ScenarioReport, Status};
pub use workspace::Workspace;
