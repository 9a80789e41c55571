//! CLI command definitions for the `pdesk` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod form;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Ask a generative model a question from the terminal or a browser form.
#[derive(Parser)]
#[command(name = "pdesk", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// Model to use instead of the configured one.
    #[arg(long, global = true, env = "PROMPTDESK_MODEL")]
    pub model: Option<String>,

    /// How long the form stays in "Clearing..." after a clear (milliseconds).
    #[arg(long, global = true)]
    pub settle_delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send one prompt and print the answer.
    Ask {
        /// The prompt, sent exactly as given.
        prompt: String,
    },

    /// Interactive terminal form.
    Form,

    /// Serve the HTML form and its JSON API.
    Serve {
        /// Port to listen on.
        #[arg(long, short, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_globals() {
        let cli = Cli::try_parse_from([
            "pdesk",
            "ask",
            "  What is 2+2?  ",
            "--json",
            "-vv",
            "--settle-delay-ms",
            "0",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.settle_delay_ms, Some(0));
        match cli.command {
            Commands::Ask { prompt } => assert_eq!(prompt, "  What is 2+2?  "),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["pdesk", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }
}
