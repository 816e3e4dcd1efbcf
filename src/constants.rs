//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the keymap file set.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "QMK Flash";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "qmkflash";

/// Directory name under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "qmkflash";

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV: &str = "QMKFLASH_CONFIG_DIR";

/// Files exported by the QMK configurator that get copied into the firmware tree.
pub const KEYMAP_FILES: [&str; 3] = ["keymap.c", "layers.json", "readme.md"];
