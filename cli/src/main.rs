mod args;
mod logging;
mod run;

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use crate::args::{Args, RunConfig};
use crate::logging::LogWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = RunConfig::from_args(args);
    let writer = LogWriter::new(config.log.clone()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(if config.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    tracing::info!(
        url = %config.redacted_url(),
        shape = ?config.shape,
        transaction = config.transaction,
        "running statement"
    );

    match run::run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "statement failed");
            ExitCode::FAILURE
        }
    }
}
