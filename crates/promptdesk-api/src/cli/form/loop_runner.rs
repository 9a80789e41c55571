//! Main form loop orchestration.
//!
//! Reads lines, turns prompts into `set_prompt` + `submit` on a spawned task
//! so input stays responsive, and runs a watcher that renders every state
//! change through the shared writer.

use std::io::Write;

use console::style;
use rustyline_async::SharedWriter;
use tokio::task::JoinHandle;
use tracing::debug;

use promptdesk_core::session::{RequestSession, SessionView};
use promptdesk_types::session::{ClearOutcome, SubmitOutcome};

use crate::state::AppState;

use super::banner::print_form_banner;
use super::commands::{self, FormCommand};
use super::events::{self, FormEvent};
use super::input::{FormInput, InputEvent};
use super::renderer::AnswerRenderer;

/// Run the interactive form until Ctrl+D or `/exit`.
pub async fn run_form_loop(state: &AppState) -> anyhow::Result<()> {
    let session = state.new_session();
    print_form_banner(&session);

    let prompt = format!("  {} ", style("Prompt >").green().bold());
    let (mut input, writer) =
        FormInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let watcher = spawn_watcher(&session, writer.clone());
    let mut out = writer;

    loop {
        match input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                let _ = writeln!(out, "  {}", style("Press Ctrl+D to exit, /clear to reset.").dim());
            }
            InputEvent::Line(line) => {
                if let Some(cmd) = commands::parse(&line) {
                    match cmd {
                        FormCommand::Help => {
                            let _ = write!(out, "{}", commands::help_text());
                        }
                        FormCommand::Clear => report_clear(&mut out, session.clear()),
                        FormCommand::Status => print_status(&mut out, &session),
                        FormCommand::Exit => break,
                        FormCommand::Unknown(name) => {
                            let _ = writeln!(
                                out,
                                "  {} Unknown command: {}. Type /help for available commands.",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                spawn_submit(&session, line, out.clone());
            }
        }
    }

    session.close();
    watcher.abort();
    println!("\n  {}", style("Form closed.").dim());
    Ok(())
}

/// Submit on a background task so the prompt keeps accepting input.
fn spawn_submit(session: &RequestSession, prompt: String, mut out: SharedWriter) {
    let session = session.clone();
    tokio::spawn(async move {
        let outcome = session.submit_prompt(&prompt).await;
        debug!(?outcome, "form submit finished");
        if let SubmitOutcome::Rejected { phase } = outcome {
            let _ = writeln!(
                out,
                "  {} Not sent: the form is {phase}.",
                style("-").yellow().bold()
            );
        }
    });
}

fn spawn_watcher(session: &RequestSession, mut out: SharedWriter) -> JoinHandle<()> {
    let mut rx = session.subscribe();
    tokio::spawn(async move {
        let renderer = AnswerRenderer::new();
        let mut previous = rx.borrow_and_update().clone();
        while rx.changed().await.is_ok() {
            let current = rx.borrow_and_update().clone();
            for event in events::diff(&previous, &current) {
                let _ = write!(out, "{}", render_event(&renderer, event));
            }
            previous = current;
        }
    })
}

fn render_event(renderer: &AnswerRenderer, event: FormEvent) -> String {
    match event {
        FormEvent::Busy(label) => format!("  {}\n", style(label).dim()),
        FormEvent::Ready => format!("  {}\n", style("Ready.").dim()),
        FormEvent::Answer(answer) => {
            format!("\n{}\n\n", renderer.render_final(&answer).trim_end())
        }
        FormEvent::Error(error) => format!("  {} {}\n", style("!").red().bold(), error),
    }
}

fn report_clear(out: &mut SharedWriter, outcome: ClearOutcome) {
    if let ClearOutcome::CancelledInFlight { request_id } = outcome {
        let _ = writeln!(
            out,
            "  {} Cancelled request {request_id}.",
            style("-").yellow().bold()
        );
    }
}

fn print_status(out: &mut SharedWriter, session: &RequestSession) {
    let view = SessionView::from(&session.snapshot());
    let control = |label: &str, enabled: bool| {
        if enabled {
            format!("{}", style(label).green())
        } else {
            format!("{}", style(label).dim())
        }
    };
    let _ = writeln!(
        out,
        "  {} {}   [{}] [{}]",
        style("Phase:").bold(),
        view.phase,
        control(view.submit_label, view.submit_enabled),
        control(view.clear_label, view.clear_enabled),
    );
    if let Some(error) = &view.error {
        let _ = writeln!(out, "  {} {}", style("Error:").bold(), error);
    }
}
