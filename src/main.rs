//! `cyberdrill` — red vs. blue cyber range simulation engine

use clap::Parser;

use cyberdrill::cli::args::Cli;
use cyberdrill::cli::commands;
use cyberdrill::error::ExitCode;
use cyberdrill::observability::{describe_metrics, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format.into(), cli.verbose, cli.color);
    }
    describe_metrics();

    // Ctrl+C exits with the conventional interrupted code.
    tokio::spawn(async {
        let _ = tokio::signal::ctrl_c().await;
        eprintln!("\ninterrupted");
        std::process::exit(ExitCode::INTERRUPTED);
    });

    match commands::dispatch(cli).await {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
