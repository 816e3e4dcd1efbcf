//! qmkflash library
//!
//! Unpacks keymap archives exported by the QMK configurator into a local
//! QMK firmware tree and drives `make` to compile and flash them.

// Module declarations
pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod firmware;
pub mod flash;
pub mod keyboard;
pub mod stager;
pub mod workdir;
