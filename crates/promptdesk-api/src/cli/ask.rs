//! One-shot `pdesk ask <prompt>`.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use promptdesk_types::session::SubmitOutcome;

use crate::cli::form::renderer::AnswerRenderer;
use crate::state::AppState;

/// Submit `prompt` once and print the result.
///
/// Returns `Ok(false)` when the session ended with an error so the caller
/// can exit non-zero.
pub async fn run(state: &AppState, prompt: &str, json: bool, quiet: bool) -> anyhow::Result<bool> {
    let session = state.new_session();
    session.set_prompt(prompt);

    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    spinner.set_message("Sending...");
    let outcome = session.submit(prompt).await;
    spinner.finish_and_clear();

    let snapshot = session.snapshot();
    tracing::debug!(?outcome, "ask finished");

    if json {
        let body = serde_json::json!({
            "outcome": outcome,
            "session": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(snapshot.last_error.is_none());
    }

    match (&snapshot.last_error, outcome) {
        (Some(err), _) => {
            eprintln!("  {} {}", style("!").red().bold(), err);
            Ok(false)
        }
        (None, SubmitOutcome::Completed { .. }) => {
            let rendered = AnswerRenderer::new().render_final(&snapshot.answer);
            println!("{}", rendered.trim_end());
            Ok(true)
        }
        (None, other) => {
            eprintln!("  {} no answer ({other:?})", style("!").yellow().bold());
            Ok(false)
        }
    }
}
