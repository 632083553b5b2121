//! TileVault CLI - Command-line interface
//!
//! This binary provides a command-line interface to the TileVault library:
//! populate a region into the offline tile cache, clear it, inspect it and
//! fetch single tiles through it.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tilevault::config::config_file_path;

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::populate::PopulateArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "tilevault")]
#[command(version = tilevault::VERSION)]
#[command(about = "Offline tile cache for slippy maps", long_about = None)]
struct Cli {
    /// Configuration file (default: ~/.tilevault/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print log output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the configured region into the tile cache
    Populate(PopulateArgs),

    /// Delete every cached tile
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Resolve one tile through the cache and save it to a file
    Fetch(FetchArgs),

    /// Show tile cache statistics
    Stats,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if let Commands::Config { command } = cli.command {
        let path = cli.config.unwrap_or_else(config_file_path);
        return commands::config::run(command, &path);
    }

    let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
    match cli.command {
        Commands::Populate(args) => commands::populate::run(&runner, args),
        Commands::Clear { yes } => commands::cache::run_clear(&runner, yes),
        Commands::Fetch(args) => commands::fetch::run(&runner, args),
        Commands::Stats => commands::cache::run_stats(&runner),
        Commands::Config { .. } => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_populate_overrides() {
        let cli = Cli::parse_from([
            "tilevault",
            "populate",
            "--max-zoom",
            "10",
            "--throttle-ms",
            "250",
            "--region",
            "33.7,-112.27,33.2,-111.63",
        ]);
        let Commands::Populate(args) = cli.command else {
            panic!("expected populate");
        };
        assert_eq!(args.max_zoom, Some(10));
        assert_eq!(args.throttle_ms, Some(250));
        assert!(args.region.is_some());
    }

    #[test]
    fn test_parse_global_config_flag() {
        let cli = Cli::parse_from(["tilevault", "stats", "--config", "/tmp/tv.ini"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/tv.ini")));
    }

    #[test]
    fn test_fetch_tile_conflicts_with_position() {
        let result = Cli::try_parse_from([
            "tilevault", "fetch", "--tile", "1,0,0", "--lat", "1", "--lon", "1", "-o", "x.png",
        ]);
        assert!(result.is_err());
    }
}
