//! Local conversation thread commands

use crate::cli::ThreadCommand;
use crate::error::Result;
use crate::session::SessionStore;
use colored::Colorize;
use prettytable::{format, Table};

/// Handle thread subcommands against the local store
pub fn handle_threads(store: &SessionStore, command: ThreadCommand) -> Result<()> {
    match command {
        ThreadCommand::List => list_threads(store),
    }
}

fn list_threads(store: &SessionStore) -> Result<()> {
    let mut state = store.load();
    let active = store.reconcile_active_id(&mut state);

    if state.threads.is_empty() {
        println!("{}", "No conversation threads yet.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row![
        "".bold(),
        "ID".bold(),
        "Title".bold(),
        "Messages".bold(),
        "Last Updated".bold()
    ]);

    for thread in &state.threads {
        let marker = if Some(&thread.id) == active.as_ref() {
            "*".green().to_string()
        } else {
            String::new()
        };
        let title = if thread.title.chars().count() > 40 {
            let short: String = thread.title.chars().take(37).collect();
            format!("{}...", short)
        } else {
            thread.title.clone()
        };

        table.add_row(prettytable::row![
            marker,
            thread.id[..8].cyan(),
            title,
            thread.messages.len(),
            thread.updated_at.format("%Y-%m-%d %H:%M").to_string()
        ]);
    }

    println!("\nConversation threads:");
    table.printstd();
    println!();
    println!(
        "Use {} inside chat to resume one.",
        "/switch <ID>".cyan()
    );
    Ok(())
}
