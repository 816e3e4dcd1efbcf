//! Unpack-and-flash command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::Config;
use crate::constants::APP_BINARY_NAME;
use crate::flash::{FlashOptions, FlashPlan};

/// Flags for unpacking and flashing a keymap
#[derive(Debug, Clone, Args)]
pub struct FlashArgs {
    /// Keyboard to flash, as named in the configuration (e.g. nyquist, iris)
    #[arg(short = 'k', long, alias = "kb", value_name = "NAME", required = true)]
    pub keyboard: Option<String>,

    /// Unpack, copy and build; without this only the plan is printed
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// Keymap archive to unpack instead of the configured one
    #[arg(short = 'i', long, value_name = "ZIP")]
    pub input_filename: Option<PathBuf>,

    /// Directory to unpack the archive into instead of the work directory
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// QMK firmware directory for this run
    #[arg(long, value_name = "DIR")]
    pub qmk_path: Option<PathBuf>,

    /// Copy the keymap but do not run make
    #[arg(long)]
    pub no_build: bool,
}

impl FlashArgs {
    /// Per-run overrides for the plan.
    pub fn options(&self) -> FlashOptions {
        FlashOptions {
            input: self.input_filename.clone(),
            output_dir: self.output_dir.clone(),
            qmk_path: self.qmk_path.clone(),
            skip_build: self.no_build,
        }
    }

    /// Execute the unpack-and-flash command
    pub fn execute(&self, config: &Config) -> Result<()> {
        let Some(name) = self.keyboard.as_deref() else {
            anyhow::bail!("No keyboard given. Run `{} --help` for usage", APP_BINARY_NAME);
        };

        let plan = FlashPlan::resolve(config, name, &self.options())?;

        if !self.execute {
            tracing::info!(keyboard = name, "dry run, pass --execute to apply");
            for step in plan.describe() {
                tracing::info!("would {}", step);
            }
            return Ok(());
        }

        tracing::info!(keyboard = name, target = %plan.keyboard.make_target(), "flashing");
        let outcome = plan.execute()?;

        match outcome.build_status {
            None => tracing::info!(
                files = outcome.staged.len(),
                dir = %plan.keymap_dir.display(),
                "keymap staged, build skipped"
            ),
            Some(status) if status.success() => {
                if let Some(firmware) = &outcome.firmware {
                    tracing::info!(firmware = %firmware.display(), "build finished");
                } else {
                    tracing::info!("build finished");
                }
            }
            // make's status is reported, not propagated
            Some(status) => tracing::warn!(%status, "make exited unsuccessfully"),
        }

        Ok(())
    }
}
