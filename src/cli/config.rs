//! Configuration management CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::{validate_qmk_path, Config};
use crate::constants::APP_NAME;
use crate::workdir::absolute;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// QMK firmware directory path
    #[arg(long, value_name = "DIR")]
    qmk_path: Option<PathBuf>,

    /// Directory configurator archives are downloaded to
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    config_file: String,
    paths: PathsOutput,
    keyboards: Vec<String>,
}

#[derive(Serialize, Debug)]
struct PathsOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    qmk_firmware: Option<String>,
    work_dir: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self, config_path: &Path) -> Result<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(config_path),
            ConfigCommand::Set(args) => args.execute(config_path),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self, config_path: &Path) -> Result<()> {
        let config = Config::load_from(config_path).context("Failed to load configuration")?;

        if self.json {
            output_json(&config, config_path)?;
        } else {
            output_human_readable(&config, config_path);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self, config_path: &Path) -> Result<()> {
        if self.qmk_path.is_none() && self.work_dir.is_none() {
            anyhow::bail!(
                "At least one configuration option must be specified: --qmk-path or --work-dir"
            );
        }

        let mut config = Config::load_from(config_path).context("Failed to load configuration")?;

        // Stored paths must not depend on where the next command runs
        if let Some(path) = &self.qmk_path {
            let path = absolute(path)?;
            validate_qmk_path(&path)?;
            config.paths.qmk_firmware = Some(path);
        }

        if let Some(path) = &self.work_dir {
            let path = absolute(path)?;
            if !path.is_dir() {
                anyhow::bail!("Work directory does not exist: {}", path.display());
            }
            config.paths.work_dir = path;
        }

        config
            .save_to(config_path)
            .context("Failed to save configuration")?;

        tracing::info!(path = %config_path.display(), "configuration updated");
        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output configuration in JSON format
fn output_json(config: &Config, config_path: &Path) -> Result<()> {
    let output = ConfigOutput {
        config_file: config_path.to_string_lossy().to_string(),
        paths: PathsOutput {
            qmk_firmware: config
                .paths
                .qmk_firmware
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            work_dir: config.paths.work_dir.to_string_lossy().to_string(),
        },
        keyboards: config.keyboards.keys().cloned().collect(),
    };

    let json = serde_json::to_string_pretty(&output)
        .context("Failed to serialize configuration to JSON")?;

    println!("{}", json);
    Ok(())
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config, config_path: &Path) {
    let title = format!("{} Configuration", APP_NAME);
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    println!("  File: {}", config_path.display());
    println!();

    println!("Paths:");
    if let Some(qmk_path) = &config.paths.qmk_firmware {
        println!("  QMK Firmware: {}", qmk_path.display());
    } else {
        println!("  QMK Firmware: (not configured)");
    }
    println!("  Work Directory: {}", config.paths.work_dir.display());
    println!();

    println!("Keyboards:");
    for (name, keyboard) in &config.keyboards {
        println!("  {}: {}", name, keyboard.make_target());
    }
}
