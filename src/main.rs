//! qmkflash - unpack a QMK configurator keymap and flash it
//!
//! Reads the archive downloaded from the configurator, copies the keymap
//! into the QMK firmware tree and runs `make <keyboard>:<keymap>:<programmer>`.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qmkflash::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "qmkflash=debug"
    } else {
        "qmkflash=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cli.execute()
}
