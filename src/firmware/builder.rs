//! `make` invocation for compiling and flashing a keymap.
//!
//! The command runs in the foreground with inherited stdio so make and the
//! programmer can talk to the terminal (avrdude waits for a reset).

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::keyboard::KeyboardConfig;

/// A `make -C <root> <keyboard>:<keymap>:<firmware_type>` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildCommand {
    program: String,
    qmk_root: PathBuf,
    keyboard: String,
    keymap: String,
    firmware_type: String,
}

impl BuildCommand {
    /// Creates a build command from its parts.
    pub fn new(
        qmk_root: impl Into<PathBuf>,
        keyboard: impl Into<String>,
        keymap: impl Into<String>,
        firmware_type: impl Into<String>,
    ) -> Self {
        Self {
            program: "make".to_string(),
            qmk_root: qmk_root.into(),
            keyboard: keyboard.into(),
            keymap: keymap.into(),
            firmware_type: firmware_type.into(),
        }
    }

    /// Creates the build command for a keyboard record.
    pub fn for_keyboard(qmk_root: impl Into<PathBuf>, keyboard: &KeyboardConfig) -> Self {
        Self::new(
            qmk_root,
            keyboard.keyboard.as_str(),
            keyboard.keymap.as_str(),
            keyboard.firmware_type.as_str(),
        )
    }

    /// Replaces the `make` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The make target `keyboard:keymap:firmware_type`.
    pub fn target(&self) -> String {
        format!("{}:{}:{}", self.keyboard, self.keymap, self.firmware_type)
    }

    /// Builds the process command without running it.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(&self.qmk_root).arg(self.target());
        cmd
    }

    /// Runs the command to completion and returns its exit status.
    ///
    /// A non-zero status is not treated as an error here; only failing to
    /// start the process is.
    pub fn run(&self) -> Result<ExitStatus> {
        tracing::info!(command = %self, "running build");

        let status = self
            .command()
            .status()
            .context(format!("Failed to execute {} command", self.program))?;

        tracing::debug!(?status, "build finished");
        Ok(status)
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -C {} {}",
            self.program,
            self.qmk_root.display(),
            self.target()
        )
    }
}

/// Finds the compiled firmware image left by a build.
///
/// QMK copies `{keyboard}_{keymap}.{ext}` into the firmware root and keeps the
/// original under `.build/`.
pub fn find_firmware_file(qmk_root: &Path, keyboard: &str, keymap: &str) -> Option<PathBuf> {
    let keyboard_clean = keyboard.replace('/', "_");

    let extensions = ["hex", "uf2", "bin"];
    let dirs = [qmk_root.to_path_buf(), qmk_root.join(".build")];

    for dir in &dirs {
        for ext in &extensions {
            let firmware_path = dir.join(format!("{}_{}.{}", keyboard_clean, keymap, ext));
            if firmware_path.is_file() {
                return Some(firmware_path);
            }
        }
    }

    None
}
