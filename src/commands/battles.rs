//! Battle history commands: list, show, delete

use crate::arena::BattleBackend;
use crate::cli::BattleCommand;
use crate::commands::confirm;
use crate::error::Result;
use crate::notation::normalize;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle battle subcommands against the arena server
pub async fn handle_battles(backend: &dyn BattleBackend, command: BattleCommand) -> Result<()> {
    match command {
        BattleCommand::List => list_battles(backend).await,
        BattleCommand::Show { id } => show_battle(backend, id).await,
        BattleCommand::Delete { id, yes } => delete_battle(backend, id, yes).await,
    }
}

async fn list_battles(backend: &dyn BattleBackend) -> Result<()> {
    let battles = backend.list_battles().await?;

    if battles.is_empty() {
        println!("{}", "No battles recorded yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["ID".bold(), "Prompt".bold(), "When".bold()]);

    for battle in battles {
        table.add_row(prettytable::row![
            battle.id.to_string().cyan(),
            battle.prompt,
            battle.created_at.as_deref().unwrap_or("-")
        ]);
    }

    println!("\nRecent battles:");
    table.printstd();
    println!();
    println!("Use {} for the full record.", "arenachat battles show <ID>".cyan());
    Ok(())
}

async fn show_battle(backend: &dyn BattleBackend, id: i64) -> Result<()> {
    let battle = backend.get_battle(id).await?;

    println!("\n{} {}", "Battle".bold(), battle.id);
    println!("{} {}", "Prompt:".bold(), battle.prompt);
    if let Some(created) = &battle.created_at {
        println!("{} {}", "When:".bold(), created);
    }
    if let Some(tiebreaker) = &battle.tiebreaker_info {
        if tiebreaker.tie_occurred {
            println!(
                "{} broken by {}",
                "Tie".yellow(),
                tiebreaker.method.as_deref().unwrap_or("unknown method")
            );
        }
    }

    for response in &battle.responses {
        let crown = if response.is_winner { " 🏆" } else { "" };
        println!(
            "\n{} {:.2}{}",
            response.display_name().bold(),
            response.average_score,
            crown
        );

        let mut judges: Vec<_> = response.ratings.iter().collect();
        judges.sort_by(|a, b| a.0.cmp(b.0));
        for (judge, rating) in judges {
            match rating.reasoning() {
                Some(reasoning) => {
                    println!("  {} {:.1} - {}", judge.dimmed(), rating.score(), reasoning)
                }
                None => println!("  {} {:.1}", judge.dimmed(), rating.score()),
            }
        }

        println!("\n{}", normalize(&response.text));
    }
    println!();
    Ok(())
}

async fn delete_battle(backend: &dyn BattleBackend, id: i64, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete battle {}? This cannot be undone.", id)) {
        println!("Aborted.");
        return Ok(());
    }

    backend.delete_battle(id).await?;
    println!("{}", format!("Deleted battle {}", id).green());
    Ok(())
}
