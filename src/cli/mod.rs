//! CLI command handlers.
//!
//! The top-level flags unpack and flash a keymap; subcommands inspect and
//! edit the configuration.

pub mod config;
pub mod flash;
pub mod keyboards;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

pub use config::ConfigArgs;
pub use flash::FlashArgs;
pub use keyboards::KeyboardsArgs;

/// Unpack a QMK configurator keymap archive into the firmware tree and flash it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, subcommand_negates_reqs = true)]
pub struct Cli {
    // Without a subcommand the flash flags apply
    #[command(subcommand)]
    pub command: Option<Command>,

    // Unpack-and-flash flags
    #[command(flatten)]
    pub flash: FlashArgs,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured keyboards
    Keyboards(KeyboardsArgs),
    /// Show or edit the configuration
    Config(ConfigArgs),
}

impl Cli {
    /// Runs the selected command.
    pub fn execute(&self) -> Result<()> {
        let config_path = self.config_path()?;
        match &self.command {
            Some(Command::Keyboards(args)) => args.execute(&Config::load_from(&config_path)?),
            Some(Command::Config(args)) => args.execute(&config_path),
            None => self.flash.execute(&Config::load_from(&config_path)?),
        }
    }

    /// The config file this invocation reads and writes.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::config_file_path(),
        }
    }
}
