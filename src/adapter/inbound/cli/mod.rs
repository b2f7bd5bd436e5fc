//! CLI module graph and command dispatch.

pub mod command;
pub mod config;
pub mod output;
pub mod run;
pub mod vessels;

use command::{Cli, Commands, ConfigCommand};
use output::OutputConfig;

use crate::error::Result;

/// Dispatch a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(
        OutputConfig {
            json: cli.json,
            quiet: cli.quiet,
        },
        cli.color,
    );

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Vessels(args) => vessels::execute(&args),
        Commands::Config(ConfigCommand::Show(arg)) => config::execute_show(&arg.config),
        Commands::Config(ConfigCommand::Validate(arg)) => config::execute_validate(&arg.config),
    }
}
