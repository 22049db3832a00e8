use std::process::ExitCode;

use clap::Parser;

use cursorboard::config::{Cli, ClientConfig, Command, RelayConfig};
use cursorboard::{client, relay};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Command::Relay(args) => match RelayConfig::try_from(args) {
            Ok(config) => relay::serve(config).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        },
        Command::Join(args) => match ClientConfig::try_from(args) {
            Ok(config) => client::run(config).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            tracing::error!(error = %message, "cursorboard failed");
            ExitCode::FAILURE
        }
    }
}
