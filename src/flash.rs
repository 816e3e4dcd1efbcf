//! Unpack, stage and build a keymap in one run.
//!
//! A [`FlashPlan`] resolves every path up front from the configuration and
//! command-line overrides. Executing it mirrors the manual workflow: switch
//! into the extraction directory, unzip, copy the keymap into the QMK tree,
//! then switch into the tree and run make.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use crate::archive;
use crate::config::{validate_qmk_path, Config};
use crate::firmware::{find_firmware_file, BuildCommand};
use crate::keyboard::KeyboardConfig;
use crate::stager;
use crate::workdir::{absolute, WorkingDir};

/// Per-run overrides taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashOptions {
    /// Archive to unpack instead of `<work_dir>/<zip_filename>`
    pub input: Option<PathBuf>,
    /// Extraction directory instead of the work directory
    pub output_dir: Option<PathBuf>,
    /// QMK firmware root instead of the configured one
    pub qmk_path: Option<PathBuf>,
    /// Skip make after staging
    pub skip_build: bool,
}

/// Fully resolved paths and command for one keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashPlan {
    /// Name the keyboard was selected by
    pub keyboard_name: String,
    /// Keyboard record
    pub keyboard: KeyboardConfig,
    /// QMK firmware root
    pub qmk_root: PathBuf,
    /// Archive to extract
    pub archive: PathBuf,
    /// Directory the archive is extracted into
    pub extract_dir: PathBuf,
    /// Directory inside the extraction holding the keymap files
    pub source_dir: PathBuf,
    /// Keymap directory inside the QMK tree
    pub keymap_dir: PathBuf,
    /// Build invocation, `None` when the build is skipped
    pub build: Option<BuildCommand>,
}

/// What an executed plan did.
#[derive(Debug)]
pub struct FlashOutcome {
    /// Files extracted from the archive, relative to the extraction directory
    pub extracted: Vec<PathBuf>,
    /// Files written into the QMK tree
    pub staged: Vec<PathBuf>,
    /// Exit status of make, if it ran
    pub build_status: Option<ExitStatus>,
    /// Firmware image found after a successful build
    pub firmware: Option<PathBuf>,
}

impl FlashPlan {
    /// Resolves a plan for the keyboard called `name`.
    ///
    /// Command-line paths are taken relative to the current directory,
    /// configured file names relative to the work directory.
    pub fn resolve(config: &Config, name: &str, options: &FlashOptions) -> Result<Self> {
        let keyboard = config.keyboard(name)?.clone();

        let qmk_root = match &options.qmk_path {
            Some(path) => absolute(path)?,
            None => absolute(config.qmk_firmware()?)?,
        };
        let work_dir = absolute(&config.paths.work_dir)?;

        let archive = match &options.input {
            Some(path) => absolute(path)?,
            None => work_dir.join(&keyboard.zip_filename),
        };
        let extract_dir = match &options.output_dir {
            Some(path) => absolute(path)?,
            None => work_dir,
        };

        let source_dir = extract_dir.join(&keyboard.leaf_dir);
        let keymap_dir = qmk_root.join(&keyboard.keymap_dir);
        let build =
            (!options.skip_build).then(|| BuildCommand::for_keyboard(&qmk_root, &keyboard));

        Ok(Self {
            keyboard_name: name.to_string(),
            keyboard,
            qmk_root,
            archive,
            extract_dir,
            source_dir,
            keymap_dir,
            build,
        })
    }

    /// Human-readable steps, one per line.
    pub fn describe(&self) -> Vec<String> {
        let mut steps = vec![
            format!(
                "extract {} into {}",
                self.archive.display(),
                self.extract_dir.display()
            ),
            format!(
                "copy keymap.c, layers.json, readme.md from {} to {}",
                self.source_dir.display(),
                self.keymap_dir.display()
            ),
        ];
        match &self.build {
            Some(build) => steps.push(format!("run {}", build)),
            None => steps.push("skip build".to_string()),
        }
        steps
    }

    /// Extracts, stages and (unless skipped) builds.
    pub fn execute(&self) -> Result<FlashOutcome> {
        validate_qmk_path(&self.qmk_root)?;

        fs::create_dir_all(&self.extract_dir).context(format!(
            "Failed to create output directory: {}",
            self.extract_dir.display()
        ))?;

        let (extracted, staged) = {
            let _cwd = WorkingDir::enter(&self.extract_dir)?;

            let extracted = archive::extract(&self.archive, Path::new("."))?;
            tracing::info!(
                archive = %self.archive.display(),
                files = extracted.len(),
                "extracted keymap archive"
            );

            let staged = stager::stage_keymap(Path::new(&self.keyboard.leaf_dir), &self.keymap_dir)?;
            (extracted, staged)
        };

        let Some(build) = &self.build else {
            return Ok(FlashOutcome {
                extracted,
                staged,
                build_status: None,
                firmware: None,
            });
        };

        let status = {
            let _cwd = WorkingDir::enter(&self.qmk_root)?;
            build.run()?
        };

        let firmware = if status.success() {
            find_firmware_file(&self.qmk_root, &self.keyboard.keyboard, &self.keyboard.keymap)
        } else {
            None
        };

        Ok(FlashOutcome {
            extracted,
            staged,
            build_status: Some(status),
            firmware,
        })
    }
}
