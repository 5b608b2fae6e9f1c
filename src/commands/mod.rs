//! Command handlers for the CLI
//!
//! These handlers are intentionally small and use the library components:
//! the arena client, the session store, and the notation normalizer.

pub mod battles;
pub mod stats;
pub mod threads;

use std::io::Write;

/// Ask the user to confirm a destructive operation
///
/// Returns true only on an explicit "y"/"yes". Read errors count as a
/// refusal.
pub(crate) fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}
