//! Leaderboard commands: show, clear

use crate::arena::BattleBackend;
use crate::cli::StatsCommand;
use crate::commands::confirm;
use crate::error::Result;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle stats subcommands against the arena server
pub async fn handle_stats(backend: &dyn BattleBackend, command: StatsCommand) -> Result<()> {
    match command {
        StatsCommand::Show => show_stats(backend).await,
        StatsCommand::Clear { yes } => clear_stats(backend, yes).await,
    }
}

async fn show_stats(backend: &dyn BattleBackend) -> Result<()> {
    let stats = backend.stats().await?;

    if stats.leaderboard.is_empty() {
        println!("{}", "No battles yet; the leaderboard is empty.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "Model".bold(),
        "Wins".bold(),
        "Avg Score".bold(),
        "Win Rate".bold()
    ]);

    for entry in &stats.leaderboard {
        table.add_row(prettytable::row![
            entry.model.cyan(),
            entry.wins,
            format!("{:.2}", entry.average_score),
            format!("{:.1}%", entry.win_rate)
        ]);
    }

    println!("\nLeaderboard ({} battles):", stats.total_battles);
    table.printstd();
    println!();
    Ok(())
}

async fn clear_stats(backend: &dyn BattleBackend, yes: bool) -> Result<()> {
    if !yes && !confirm("Clear ALL battles and statistics? This cannot be undone.") {
        println!("Aborted.");
        return Ok(());
    }

    backend.clear_stats().await?;
    println!("{}", "All stats cleared.".green());
    Ok(())
}
