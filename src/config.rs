//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME};
use crate::keyboard::KeyboardConfig;

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConfig {
    /// QMK firmware directory path (e.g., "/`path/to/qmk_firmware`")
    #[serde(default)]
    pub qmk_firmware: Option<PathBuf>,
    /// Directory the configurator archives are downloaded to
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

/// Default work directory: the user's download folder, or the current directory.
fn default_work_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            qmk_firmware: None,
            work_dir: default_work_dir(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/qmkflash/config.toml`
/// - macOS: `~/Library/Application Support/qmkflash/config.toml`
/// - Windows: `%APPDATA%\qmkflash\config.toml`
///
/// `QMKFLASH_CONFIG_DIR` replaces the directory part.
///
/// # Validation
///
/// - `qmk_firmware` path must exist and contain Makefile, keyboards/ directory
/// - every keyboard record must be complete and use relative paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Keyboard records keyed by the name passed to `--keyboard`
    #[serde(default = "KeyboardConfig::builtins")]
    pub keyboards: BTreeMap<String, KeyboardConfig>,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: PathConfig::default(),
            keyboards: KeyboardConfig::builtins(),
        }
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from `config_path`.
    ///
    /// If the file doesn't exist, returns default configuration. Only the
    /// keyboard records are checked here; the QMK tree is checked where it is
    /// used, so a moved tree can still be replaced with `config set` or a
    /// per-run override.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate_keyboards().context(format!(
            "Invalid configuration in {}",
            config_path.display()
        ))?;

        Ok(config)
    }

    /// Saves configuration using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            fs::create_dir_all(config_dir).context(format!(
                "Failed to create config directory: {}",
                config_dir.display()
            ))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    ///
    /// Checks:
    /// - QMK firmware path exists (if set) and contains required files
    /// - every keyboard record passes [`KeyboardConfig::validate`]
    pub fn validate(&self) -> Result<()> {
        if let Some(qmk_path) = &self.paths.qmk_firmware {
            validate_qmk_path(qmk_path)?;
        }

        self.validate_keyboards()
    }

    /// Checks every keyboard record.
    pub fn validate_keyboards(&self) -> Result<()> {
        for (name, keyboard) in &self.keyboards {
            keyboard
                .validate()
                .context(format!("Keyboard '{}' is invalid", name))?;
        }

        Ok(())
    }

    /// Returns the QMK firmware root or an error explaining how to set it.
    pub fn qmk_firmware(&self) -> Result<&Path> {
        self.paths.qmk_firmware.as_deref().with_context(|| {
            format!(
                "QMK firmware path is not configured. Run `{} config set --qmk-path <DIR>` or pass --qmk-path",
                crate::constants::APP_BINARY_NAME
            )
        })
    }

    /// Looks up a keyboard record by name.
    pub fn keyboard(&self, name: &str) -> Result<&KeyboardConfig> {
        self.keyboards.get(name).with_context(|| {
            let available: Vec<&str> = self.keyboards.keys().map(String::as_str).collect();
            format!(
                "Unknown keyboard '{}'. Available: {}",
                name,
                available.join(", ")
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that a directory looks like a QMK firmware checkout.
pub fn validate_qmk_path(qmk_path: &Path) -> Result<()> {
    if !qmk_path.exists() {
        anyhow::bail!("QMK firmware path does not exist: {}", qmk_path.display());
    }

    let makefile_path = qmk_path.join("Makefile");
    if !makefile_path.exists() {
        anyhow::bail!(
            "QMK firmware path is invalid: Makefile not found at {}",
            makefile_path.display()
        );
    }

    let keyboards_dir = qmk_path.join("keyboards");
    if !keyboards_dir.is_dir() {
        anyhow::bail!(
            "QMK firmware path is invalid: keyboards/ directory not found at {}",
            keyboards_dir.display()
        );
    }

    Ok(())
}
