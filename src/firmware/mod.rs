//! Firmware compilation and flashing.
//!
//! This module builds the `make` invocation that compiles a keymap inside the
//! QMK tree and hands the image to the programmer named by the make target.

pub mod builder;

pub use builder::{find_firmware_file, BuildCommand};
