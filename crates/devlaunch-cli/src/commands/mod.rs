pub mod dev;
pub mod doctor;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "devlaunch",
    version,
    about = "Install dependencies and start the client and server dev processes"
)]
pub struct Cli {
    /// Without a subcommand, checks the runtime, installs missing
    /// dependencies and starts both dev processes.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report runtime, tool and dependency status without starting anything
    Doctor,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        None => dev::run(),
        Some(Commands::Doctor) => doctor::run(),
        Some(Commands::Completions { shell }) => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "devlaunch", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}
