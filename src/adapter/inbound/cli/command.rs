//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Live AIS vessel tracking with durable storage
#[derive(Parser, Debug)]
#[command(name = "vesselwatch")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect to the feed and track vessels until interrupted
    Run(RunArgs),

    /// Summarize vessels in the database
    Vessels(VesselsArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subcommands for `vesselwatch config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file without connecting.
    Validate(ConfigPathArg),
}

/// Shared `--config` argument.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for `vesselwatch run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override the database path.
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// Override the log level (e.g. debug, info, warn).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for `vesselwatch vessels`.
#[derive(Parser, Debug)]
pub struct VesselsArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Read this database instead of the configured one.
    #[arg(long)]
    pub database: Option<PathBuf>,

    /// List up to this many vessels, most recently updated first.
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_defaults() {
        let cli = Cli::try_parse_from(["vesselwatch", "run"]).unwrap();
        assert!(!cli.json);
        assert!(!cli.quiet);
        assert_eq!(cli.color, ColorChoice::Auto);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("config.toml"));
        assert!(args.database.is_none());
        assert!(args.log_level.is_none());
        assert!(!args.json_logs);
    }

    #[test]
    fn parse_run_overrides() {
        let cli = Cli::try_parse_from([
            "vesselwatch",
            "run",
            "-c",
            "prod.toml",
            "--database",
            "/var/lib/vessels.db",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("prod.toml"));
        assert_eq!(args.database, Some(PathBuf::from("/var/lib/vessels.db")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["vesselwatch", "vessels", "--json", "--color", "never"])
            .unwrap();
        assert!(cli.json);
        assert_eq!(cli.color, ColorChoice::Never);
        let Commands::Vessels(args) = cli.command else {
            panic!("expected vessels");
        };
        assert_eq!(args.limit, 0);
    }

    #[test]
    fn parse_vessels_limit() {
        let cli = Cli::try_parse_from(["vesselwatch", "vessels", "--limit", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Vessels(VesselsArgs { limit: 5, .. })));
    }

    #[test]
    fn parse_config_subcommands() {
        let cli = Cli::try_parse_from(["vesselwatch", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Show(_))));

        let cli =
            Cli::try_parse_from(["vesselwatch", "config", "validate", "--config", "x.toml"]).unwrap();
        let Commands::Config(ConfigCommand::Validate(arg)) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(arg.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["vesselwatch", "trade"]).is_err());
        assert!(Cli::try_parse_from(["vesselwatch"]).is_err());
    }
}
