//! Slash command parsing for the form loop.
//!
//! Anything that does not start with `/` is a prompt.

use console::style;

/// Available slash commands in the form loop.
#[derive(Debug, PartialEq)]
pub enum FormCommand {
    /// Show available commands.
    Help,
    /// Reset the form (prompt, answer, error).
    Clear,
    /// Show the current phase and controls.
    Status,
    /// Leave the form.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<FormCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(FormCommand::Help),
        "/clear" | "/cls" => Some(FormCommand::Clear),
        "/status" | "/s" => Some(FormCommand::Status),
        "/exit" | "/quit" | "/q" => Some(FormCommand::Exit),
        other => Some(FormCommand::Unknown(other.to_string())),
    }
}

/// Help text listing all available commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the prompt, answer and error"),
        ("/status", "Show what the form is doing"),
        ("/exit", "Leave the form"),
    ];

    let mut out = format!("\n  {}\n\n", style("Available commands:").bold());
    for (cmd, desc) in rows {
        out.push_str(&format!("  {:<9}{}\n", style(cmd).cyan(), desc));
    }
    out.push_str(&format!(
        "\n  {}\n",
        style("Any other line is sent as the prompt. Ctrl+D to exit.").dim()
    ));
    out
}
