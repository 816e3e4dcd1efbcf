//! Keyboard listing command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::config::Config;

/// List configured keyboards
#[derive(Debug, Clone, Args)]
pub struct KeyboardsArgs {
    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON entry for one keyboard
#[derive(Debug, Serialize)]
struct KeyboardEntry<'a> {
    name: &'a str,
    target: String,
    zip_filename: &'a str,
    keymap_dir: &'a str,
}

impl KeyboardsArgs {
    /// Execute the keyboards command
    pub fn execute(&self, config: &Config) -> Result<()> {
        let entries: Vec<KeyboardEntry<'_>> = config
            .keyboards
            .iter()
            .map(|(name, kb)| KeyboardEntry {
                name,
                target: kb.make_target(),
                zip_filename: &kb.zip_filename,
                keymap_dir: &kb.keymap_dir,
            })
            .collect();

        if self.json {
            let json = serde_json::to_string_pretty(&entries)
                .context("Failed to serialize keyboards to JSON")?;
            println!("{}", json);
            return Ok(());
        }

        for entry in &entries {
            println!("{:<12} {}", entry.name, entry.target);
            println!("{:<12} archive: {}", "", entry.zip_filename);
            println!("{:<12} keymap:  {}", "", entry.keymap_dir);
        }

        Ok(())
    }
}
