//! sapateiro: acompanhamento de pedidos de uma oficina de calçados pelo terminal.

mod api;
mod board;
mod cli;
mod commands;
mod config;
mod dashboard;
mod error;
mod flow;
mod session;
mod tracker;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use config::SapateiroConfig;
use error::SapateiroError;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &SapateiroConfig, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sapateiro=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match SapateiroConfig::load() {
        Ok(config) => config,
        Err(err) => {
            ui::print_error(&SapateiroError::Config(format!("{err:#}")));
            return ExitCode::FAILURE;
        }
    };
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    init_tracing(&config, cli.verbose);

    match commands::run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            ui::print_error(&err);
            ExitCode::FAILURE
        }
    }
}
