//! Sequencing scenarios with cleanup in between

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::dispatch::{dispatch_recording, FiredFallback, Outcome};
use super::Scenario;
use crate::fixtures::DataFeed;
use crate::git::GitEngine;
use crate::workspace::Workspace;
use crate::Error;

/// Pass/fail result of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
}

/// Record of one scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub status: Status,
    pub path: PathBuf,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub fallbacks: Vec<FiredFallback>,
    pub error: Option<String>,
}

/// Reports for a whole run, in plan order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub reports: Vec<ScenarioReport>,
}

impl RunSummary {
    pub fn passed(&self) -> usize {
        self.count(Status::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(Status::Failed)
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, status: Status) -> usize {
        self.reports.iter().filter(|r| r.status == status).count()
    }
}

/// Runs a plan of scenarios one after another
///
/// A failed scenario is recorded and the run moves on.
#[derive(Debug)]
pub struct Runner<'a> {
    engine: &'a GitEngine,
    feed: &'a DataFeed,
    workspace: Workspace,
    keep: bool,
}

impl<'a> Runner<'a> {
    pub fn new(engine: &'a GitEngine, feed: &'a DataFeed) -> Self {
        Self {
            engine,
            feed,
            workspace: Workspace::new(feed.root()),
            keep: false,
        }
    }

    /// Leave working directories in place before and after each scenario
    pub fn keep(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    pub fn run(&self, plan: &[Scenario]) -> RunSummary {
        let mut summary = RunSummary::default();

        if let Err(e) = self.workspace.prepare() {
            tracing::warn!(error = %e, "Could not prepare workspace");
        }

        for (idx, &scenario) in plan.iter().enumerate() {
            let report = self.run_one(scenario);

            if !self.keep && !self.reused_later(&plan[idx + 1..], &report.path) {
                self.cleanup(&report.path);
            }

            summary.reports.push(report);
        }

        tracing::info!(
            passed = summary.passed(),
            failed = summary.failed(),
            "Run finished"
        );
        summary
    }

    fn run_one(&self, scenario: Scenario) -> ScenarioReport {
        let started_at = Utc::now();
        let start = Instant::now();

        let Some(params) = self.feed.params(scenario) else {
            let err = Error::Config(format!("No parameters for scenario {}", scenario));
            return failed(scenario, PathBuf::new(), started_at, 0, err);
        };

        if !self.keep && !scenario.requires_existing() {
            self.cleanup(&params.repo_path);
        }

        let mut outcome = Outcome::default();
        let result = dispatch_recording(
            self.engine,
            scenario,
            params,
            &mut rand::rng(),
            &mut outcome,
        );
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                tracing::info!(%scenario, duration_ms, "Scenario passed");
                ScenarioReport {
                    scenario,
                    status: Status::Passed,
                    path: params.repo_path.clone(),
                    started_at,
                    duration_ms,
                    fallbacks: outcome.fallbacks,
                    error: None,
                }
            }
            Err(err) => {
                let mut report =
                    failed(scenario, params.repo_path.clone(), started_at, duration_ms, err);
                report.fallbacks = outcome.fallbacks;
                report
            }
        }
    }

    /// Whether a later scenario needs the repository left at `path`
    fn reused_later(&self, rest: &[Scenario], path: &Path) -> bool {
        rest.iter().any(|scenario| {
            scenario.requires_existing()
                && self
                    .feed
                    .params(*scenario)
                    .is_some_and(|params| params.repo_path == path)
        })
    }

    fn cleanup(&self, path: &Path) {
        if path.as_os_str().is_empty() {
            return;
        }
        if let Err(e) = self.workspace.cleanup(path) {
            tracing::warn!(path = %path.display(), error = %e, "Cleanup failed");
        }
    }
}

fn failed(
    scenario: Scenario,
    path: PathBuf,
    started_at: DateTime<Utc>,
    duration_ms: u64,
    err: Error,
) -> ScenarioReport {
    tracing::error!(%scenario, error = %err, "Scenario failed");
    ScenarioReport {
        scenario,
        status: Status::Failed,
        path,
        started_at,
        duration_ms,
        fallbacks: Vec::new(),
        error: Some(err.to_string()),
    }
}
