//! promptdesk CLI, terminal form and HTTP form entry point.
//!
//! Binary name: `pdesk`
//!
//! Parses CLI arguments, sets up tracing, loads configuration and the
//! completion provider, then dispatches to the selected binding.

mod cli;
mod http;
mod state;

use std::process::ExitCode;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use promptdesk_observe::tracing_setup;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Shell completions don't need tracing or app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "pdesk", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    tracing_setup::init_tracing(tracing_setup::default_filter(cli.verbose, cli.quiet), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(cli.model.clone(), cli.settle_delay_ms).await;

    let code = match cli.command {
        Commands::Ask { prompt } => {
            let ok = cli::ask::run(&state, &prompt, cli.json, cli.quiet).await?;
            if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }

        Commands::Form => {
            cli::form::loop_runner::run_form_loop(&state).await?;
            ExitCode::SUCCESS
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} promptdesk listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            if let Err(err) = state.sessions.provider() {
                println!("  {} {}", console::style("!").yellow().bold(), err);
            }
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
            ExitCode::SUCCESS
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    };

    tracing_setup::shutdown_tracing();
    Ok(code)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
