//! Run command - execute scenarios and report the results

use clap::Args;
use rand::rng;
use repoprobe_core::{Config, DataFeed, GitEngine, RunSummary, Runner, Scenario, Status};

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenarios to run, in order (e.g. clone_https pull)
    pub scenarios: Vec<String>,

    /// Keep working directories instead of deleting them
    #[arg(short, long)]
    pub keep: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Execute the run command
    pub fn execute(&self, verbose: bool, config: &Config) -> anyhow::Result<()> {
        let plan = self.plan(config)?;
        let feed = DataFeed::new(config, &mut rng());
        let engine = GitEngine::new(config.engine.clone().into());

        if verbose {
            tracing::info!(
                scenarios = ?plan.iter().map(Scenario::name).collect::<Vec<_>>(),
                root = %feed.root().display(),
                keep = config.workspace.keep,
                "Starting repoprobe run"
            );
        }

        let summary = Runner::new(&engine, &feed)
            .keep(config.workspace.keep)
            .run(&plan);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary, verbose);
        }

        if !summary.is_success() {
            anyhow::bail!("{} of {} scenario(s) failed", summary.failed(), summary.reports.len());
        }

        Ok(())
    }

    fn plan(&self, config: &Config) -> anyhow::Result<Vec<Scenario>> {
        if !self.scenarios.is_empty() {
            return self
                .scenarios
                .iter()
                .map(|name| name.parse::<Scenario>().map_err(anyhow::Error::from))
                .collect();
        }

        let mut plan = Scenario::ALL.to_vec();
        if config.engine.ssh_identity.is_none() {
            tracing::warn!("No SSH identity configured, skipping clone_ssh");
            plan.retain(|scenario| *scenario != Scenario::CloneSsh);
        }
        Ok(plan)
    }
}

fn print_summary(summary: &RunSummary, verbose: bool) {
    println!("Repoprobe Run");
    println!("=============");
    println!();

    for report in &summary.reports {
        let mark = match report.status {
            Status::Passed => "ok",
            Status::Failed => "FAILED",
        };
        println!(
            "  {:<15} {:<6} {:>6} ms",
            report.scenario.name(),
            mark,
            report.duration_ms
        );

        for fallback in &report.fallbacks {
            println!(
                "      fallback: {:?} after {:?} failed ({})",
                fallback.recovery, fallback.step, fallback.error
            );
        }
        if let Some(error) = &report.error {
            println!("      error: {}", error);
        }
        if verbose {
            println!("      path: {}", report.path.display());
        }
    }

    println!();
    println!(
        "{} passed, {} failed",
        summary.passed(),
        summary.failed()
    );
}
