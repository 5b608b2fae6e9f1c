//! Interactive chat mode
//!
//! A readline-based loop that submits prompts to the battle arena and
//! renders the winning response. Thread management is exposed through
//! slash commands; everything else typed at the prompt becomes a battle.
//!
//! Each submitted turn performs two store mutations through the
//! reconciliation controller: the user message immediately, the assistant
//! reply when the battle completes. Winner text passes through the
//! notation normalizer on its way to the terminal.

use crate::arena::{BattleBackend, BattleRequest, HistoryMessage};
use crate::config::ChatConfig;
use crate::error::{ArenaError, Result};
use crate::notation::normalize;
use crate::session::{ChatMessage, ReconciliationController, Role, TurnUpdate};
use base64::Engine;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::Path;

/// Slash commands understood by the chat prompt
///
/// Commands are prefixed with `/` and are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a new, empty conversation thread
    NewThread,

    /// List all conversation threads
    ListThreads,

    /// Switch the active thread by id (or unambiguous id prefix)
    SwitchThread(String),

    /// Attach an image to the next prompt
    AttachImage(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; treat as a battle prompt
    None,
}

/// Parse a line of input into a special command
///
/// Anything not starting with `/` is a regular prompt. Unknown slash
/// commands fall through as prompts too, so typing `/shrug` never eats
/// the user's input silently.
pub fn parse_special_command(input: &str) -> SpecialCommand {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return SpecialCommand::None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next().map(|s| s.trim().to_string());

    match (command.as_str(), arg) {
        ("/new", _) => SpecialCommand::NewThread,
        ("/threads", _) => SpecialCommand::ListThreads,
        ("/switch", Some(id)) if !id.is_empty() => SpecialCommand::SwitchThread(id),
        ("/image", Some(path)) if !path.is_empty() => SpecialCommand::AttachImage(path),
        ("/help", _) => SpecialCommand::Help,
        ("/quit", _) | ("/exit", _) => SpecialCommand::Exit,
        _ => SpecialCommand::None,
    }
}

/// Read an image file and encode it as a base64 data URI
///
/// The format is sniffed from the file contents, not the extension, so a
/// mislabeled file still gets the right media type.
///
/// # Errors
///
/// Returns `ArenaError::Attachment` when the file cannot be read or is
/// not a recognized image format
pub fn load_image_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| ArenaError::Attachment(format!("Failed to read {}: {}", path.display(), e)))?;

    let format = image::guess_format(&bytes).map_err(|e| {
        ArenaError::Attachment(format!("{} is not a recognized image: {}", path.display(), e))
    })?;

    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!(
        "data:{};base64,{}",
        format.to_mime_type(),
        encoded
    ))
}

/// Submit one prompt as a battle and record both halves of the turn
///
/// Appends the user message, runs the battle with the thread's prior
/// turns as context, and appends the winning reply (or a synthetic error
/// message when the exchange fails). Returns the normalized reply text,
/// or the error text when the exchange failed; either way the thread has
/// already recorded the turn.
pub async fn run_turn(
    controller: &mut ReconciliationController,
    backend: &dyn BattleBackend,
    chat_config: &ChatConfig,
    prompt: &str,
    attachment: Option<String>,
) -> std::result::Result<String, String> {
    // History must reflect the thread before this turn's user message.
    let history = battle_history(controller, chat_config.history_limit);

    let user_message = match &attachment {
        Some(data_uri) => ChatMessage::user_with_attachment(prompt, data_uri.clone()),
        None => ChatMessage::user(prompt),
    };
    controller.apply_turn(TurnUpdate::push(user_message));

    let request = BattleRequest {
        prompt: prompt.to_string(),
        conversation_history: if history.is_empty() {
            None
        } else {
            Some(history)
        },
        image_data: attachment,
    };

    match backend.run_battle(&request).await {
        Ok(record) => {
            let text = record
                .winning_text()
                .unwrap_or("No response received")
                .to_string();
            controller.apply_turn(TurnUpdate::push(ChatMessage::assistant(
                text.clone(),
                Some(record.id),
            )));
            Ok(normalize(&text))
        }
        Err(e) => {
            let id = controller.record_exchange_failure(&e.to_string());
            tracing::warn!("Battle failed for thread {}: {}", id, e);
            Err(e.to_string())
        }
    }
}

/// Prior turns of the active thread in the wire format
fn battle_history(controller: &ReconciliationController, limit: usize) -> Vec<HistoryMessage> {
    controller
        .recent_history(limit)
        .into_iter()
        .map(|m| HistoryMessage {
            role: match m.role {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: m.content,
        })
        .collect()
}

/// Prompt string showing the active thread's title
fn format_prompt(controller: &ReconciliationController) -> String {
    let title = controller
        .active_thread()
        .map(|t| t.title.as_str())
        .unwrap_or("no thread");
    let short: String = title.chars().take(24).collect();
    format!("[{}] >> ", short.cyan())
}

fn print_welcome_banner() {
    println!("{}", "Arena chat".bold());
    println!("Every prompt battles several models; you see the winner.");
    println!("Type {} for commands, {} to leave.\n", "/help".cyan(), "/quit".cyan());
}

fn print_help() {
    println!("Available commands:");
    println!("  {}            start a new conversation thread", "/new".cyan());
    println!("  {}        list conversation threads", "/threads".cyan());
    println!("  {}    switch to a thread by id prefix", "/switch <id>".cyan());
    println!("  {}   attach an image to the next prompt", "/image <path>".cyan());
    println!("  {}           show this help", "/help".cyan());
    println!("  {}           exit chat", "/quit".cyan());
}

fn print_threads(controller: &ReconciliationController) {
    let active = controller.active_thread().map(|t| t.id.clone());
    for thread in &controller.state().threads {
        let marker = if Some(&thread.id) == active.as_ref() {
            "*".green().to_string()
        } else {
            " ".to_string()
        };
        println!(
            "{} {}  {}  ({} messages)",
            marker,
            thread.id.dimmed(),
            thread.title,
            thread.messages.len()
        );
    }
    if controller.state().threads.is_empty() {
        println!("No threads yet.");
    }
}

/// Switch threads by full id or unambiguous prefix
fn switch_thread(controller: &mut ReconciliationController, wanted: &str) {
    let matches: Vec<String> = controller
        .state()
        .threads
        .iter()
        .filter(|t| t.id.starts_with(wanted))
        .map(|t| t.id.clone())
        .collect();

    match matches.as_slice() {
        [id] => {
            let id = id.clone();
            controller.select_thread(&id);
            println!("Switched to {}", controller.active_thread().map(|t| t.title.as_str()).unwrap_or("?"));
        }
        [] => println!("{} No thread matches '{}'", "!".yellow(), wanted),
        _ => println!("{} '{}' is ambiguous ({} matches)", "!".yellow(), wanted, matches.len()),
    }
}

/// Start the interactive chat loop
///
/// Runs until `/quit`, end of input, or Ctrl-C.
pub async fn run_chat(
    mut controller: ReconciliationController,
    backend: &dyn BattleBackend,
    chat_config: &ChatConfig,
) -> Result<()> {
    tracing::info!("Starting interactive chat mode");

    let mut rl = DefaultEditor::new().map_err(|e| ArenaError::Input(e.to_string()))?;
    let mut pending_image: Option<String> = None;

    print_welcome_banner();

    loop {
        let prompt = format_prompt(&controller);
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)
                    .map_err(|e| ArenaError::Input(e.to_string()))?;

                match parse_special_command(trimmed) {
                    SpecialCommand::NewThread => {
                        controller.start_thread();
                        println!("Started a new conversation.\n");
                        continue;
                    }
                    SpecialCommand::ListThreads => {
                        print_threads(&controller);
                        continue;
                    }
                    SpecialCommand::SwitchThread(id) => {
                        switch_thread(&mut controller, &id);
                        continue;
                    }
                    SpecialCommand::AttachImage(path) => {
                        match load_image_data_uri(Path::new(&path)) {
                            Ok(data_uri) => {
                                pending_image = Some(data_uri);
                                println!("Image attached to the next prompt.\n");
                            }
                            Err(e) => println!("{} {}\n", "!".red(), e),
                        }
                        continue;
                    }
                    SpecialCommand::Help => {
                        print_help();
                        continue;
                    }
                    SpecialCommand::Exit => break,
                    SpecialCommand::None => {}
                }

                println!(
                    "{}",
                    "Running battle... querying models and judging replies.".dimmed()
                );

                let attachment = pending_image.take();
                match run_turn(&mut controller, backend, chat_config, trimmed, attachment).await {
                    Ok(reply) => println!("\n{}\n", reply),
                    Err(e) => println!("{} {}\n", "battle failed:".red(), e),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(ArenaError::Input(e.to_string()).into());
            }
        }
    }

    controller.flush()?;
    println!("Goodbye.");
    Ok(())
}
