//! List command - show the available scenarios

use clap::Args;
use repoprobe_core::Scenario;

/// List the available scenarios
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Also show each scenario's fallback rules
    #[arg(short, long)]
    fallbacks: bool,
}

impl ListArgs {
    pub fn execute(&self) {
        for scenario in Scenario::ALL {
            println!("  {:<15} {}", scenario.name(), scenario.description());

            if self.fallbacks {
                for rule in scenario.fallbacks() {
                    println!(
                        "  {:<15}   on {:?} failing with {:?}: {:?}",
                        "", rule.step, rule.on, rule.then
                    );
                }
            }
        }
    }
}
