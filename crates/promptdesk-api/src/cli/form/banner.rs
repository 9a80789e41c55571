//! Welcome banner for the terminal form.

use console::style;

use promptdesk_core::session::RequestSession;

/// Print the banner: provider, model, and any initialization failure.
pub fn print_form_banner(session: &RequestSession) {
    println!();
    println!("  {} {}", "*", style("promptdesk").cyan().bold());
    println!("  {}", style("Ask a generative model anything.").dim());
    println!();

    match (session.provider(), session.initialization_error()) {
        (Some(provider), _) => {
            println!("  {}  {}", style("Provider:").bold(), style(provider.name()).dim());
            println!("  {}     {}", style("Model:").bold(), style(provider.model()).dim());
        }
        (None, Some(err)) => {
            println!("  {} {}", style("!").yellow().bold(), style(err).yellow());
        }
        (None, None) => {}
    }

    println!();
    println!(
        "  {}",
        style("Type a prompt and press Enter. /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
