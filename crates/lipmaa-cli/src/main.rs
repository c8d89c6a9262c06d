//! Lipmaa command-line binary.
//!
//! # Usage
//!
//! ```bash
//! # Skip target and path of an entry
//! lipmaa link 40
//! lipmaa path 40 --to 2
//!
//! # Build a 100-entry log and verify it from entry 57
//! lipmaa build --count 100 --label alice --output alice.cbor
//! lipmaa verify --input alice.cbor --from 57
//! ```

use std::process::ExitCode;

use clap::Parser;
use lipmaa_cli::{Command, Outcome, SystemClock, run};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Lipmaa log tool
#[derive(Parser, Debug)]
#[command(name = "lipmaa")]
#[command(about = "Build and verify lipmaa-linked append-only logs")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let clock = SystemClock::new();
    let mut stdout = std::io::stdout().lock();

    match run(args.command, &clock, &mut stdout).await {
        Ok(Outcome::Success) => ExitCode::SUCCESS,
        Ok(Outcome::InvalidChain) => ExitCode::from(1),
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::from(2)
        },
    }
}
