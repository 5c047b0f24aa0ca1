//! Custom RPC registry CLI
//!
//! ```sh
//! customrpc init                                      # Generate default customrpc.toml
//! customrpc add --chain-id 1 --rpc-url https://...    # Register an endpoint
//! customrpc list                                      # Show active endpoints
//! ```

use clap::Parser;
use dotenvy::dotenv;

use customrpc::cmd::{self, Cli, rpc};
use customrpc::config::process_env;
use customrpc::telemetry::Telemetry;

#[tokio::main]
#[allow(clippy::print_stderr, clippy::print_stdout)]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    // Config errors are reported by the command itself.
    let log_level = rpc::settings(&cli.config, &process_env)
        .map_or_else(|_| "info".to_owned(), |config| config.log_level().to_owned());
    Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .with_log_level(log_level)
        .register();

    match cmd::run(cli, &process_env).await {
        Ok(message) => println!("{message}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
