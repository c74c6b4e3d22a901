use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use roster::cli::Cli;

/// Log level comes from `ROSTER_LOG` (e.g. `ROSTER_LOG=roster=debug`).
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROSTER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
