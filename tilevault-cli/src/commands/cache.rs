//! Cache management CLI commands.

use console::style;
use dialoguer::Confirm;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Clear the tile cache, removing all cached tiles.
///
/// Asks for confirmation unless `yes` is set.
pub fn run_clear(runner: &CliRunner, yes: bool) -> Result<(), CliError> {
    runner.log_startup("clear");
    let store = &runner.config().store;
    let location = store.directory.join(&store.database_name);

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete every cached tile in {}?", location.display()))
            .default(false)
            .interact()
            .map_err(|e| CliError::Config(format!("Failed to read confirmation: {}", e)))?;
        if !confirmed {
            println!("Cancelled");
            return Ok(());
        }
    }

    let app = runner.start_app()?;
    let before = runner.block_on(app.entry_count())?;
    runner.block_on(app.clear_cache())?;

    println!(
        "{} {} tiles from {}",
        style("Cleared").green(),
        before,
        location.display()
    );
    Ok(())
}

/// Show tile cache statistics.
pub fn run_stats(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("stats");
    let app = runner.start_app()?;
    let count = runner.block_on(app.entry_count())?;
    let store = &runner.config().store;

    println!("Tile cache: {}", store.directory.join(&store.database_name).display());
    println!("  Database: {}", store.database_name);
    println!("  Tiles:    {}", count);
    Ok(())
}
