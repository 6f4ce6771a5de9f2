//! Hyperdrive training entry point
//!
//! One process trains and reports one model; a sweep controller invokes
//! the binary repeatedly with different flags.

use clap::Parser;
use hyperdrive_train::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hyperdrive_train=info".into()),
        )
        .init();

    let args = Cli::parse();
    cli::run(&args)?;

    Ok(())
}
