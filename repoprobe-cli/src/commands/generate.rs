//! Generate command - drive the content generator directly

use std::path::PathBuf;

use clap::{Args, Subcommand};
use rand::rng;
use repoprobe_core::content;

/// Print or write generated content
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(subcommand)]
    pub command: GenerateCommand,
}

#[derive(Subcommand, Debug)]
pub enum GenerateCommand {
    /// Random ASCII letters
    Text {
        /// Number of letters
        #[arg(default_value = "10")]
        length: usize,
    },

    /// A commit message with a random suffix
    CommitMsg {
        /// Number of random letters after the prefix
        #[arg(default_value = "10")]
        length: usize,
    },

    /// A text file of random lines
    File {
        /// Name length, line count and line width
        #[arg(default_value = "10")]
        length: usize,

        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

impl GenerateArgs {
    /// Execute the generate command
    pub fn execute(&self) -> anyhow::Result<()> {
        let mut rng = rng();

        match &self.command {
            GenerateCommand::Text { length } => {
                println!("{}", content::random_text(&mut rng, *length));
            }
            GenerateCommand::CommitMsg { length } => {
                println!("{}", content::commit_message(&mut rng, *length));
            }
            GenerateCommand::File { length, dir } => {
                let path = content::write_random_file(&mut rng, dir, *length)?;
                println!("{}", path.display());
            }
        }

        Ok(())
    }
}
