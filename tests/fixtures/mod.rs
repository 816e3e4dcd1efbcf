//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Path to the qmkflash binary
pub fn qmkflash_bin() -> String {
    std::env::var("CARGO_BIN_EXE_qmkflash").unwrap_or_else(|_| "target/release/qmkflash".to_string())
}

/// Scratch QMK tree, download directory and config directory.
pub struct Workspace {
    pub temp_dir: TempDir,
    pub qmk_root: PathBuf,
    pub work_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl Workspace {
    /// Creates a workspace with a minimal QMK tree and a config pointing at it.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let qmk_root = temp_dir.path().join("qmk_firmware");
        fs::create_dir_all(qmk_root.join("keyboards/keebio/nyquist/keymaps")).unwrap();
        fs::write(qmk_root.join("Makefile"), "").unwrap();

        let work_dir = temp_dir.path().join("keyboard");
        fs::create_dir_all(&work_dir).unwrap();

        let config_dir = temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.toml"),
            format!(
                "[paths]\nqmk_firmware = {:?}\nwork_dir = {:?}\n",
                qmk_root.to_string_lossy(),
                work_dir.to_string_lossy()
            ),
        )
        .unwrap();

        Self {
            temp_dir,
            qmk_root,
            work_dir,
            config_dir,
        }
    }

    /// Command with the config directory isolated to this workspace.
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(qmkflash_bin());
        cmd.env("QMKFLASH_CONFIG_DIR", &self.config_dir);
        cmd.env_remove("RUST_LOG");
        cmd.args(args);
        cmd
    }

    /// Writes the nyquist archive the configurator would produce into the work directory.
    pub fn write_nyquist_archive(&self) -> PathBuf {
        let path = self
            .work_dir
            .join("keymap-keebio-nyquist-rev2-jameslee_nyquist.zip");
        write_zip(
            &path,
            &[
                ("jameslee_nyquist/keymap.c", "// nyquist keymap\n"),
                ("jameslee_nyquist/layers.json", "{\"layers\":[]}"),
                ("jameslee_nyquist/readme.md", "# jameslee_nyquist\n"),
            ],
        );
        path
    }

    /// Keymap directory the nyquist record stages into.
    pub fn nyquist_keymap_dir(&self) -> PathBuf {
        self.qmk_root
            .join("keyboards/keebio/nyquist/keymaps/jameslee_nyquist")
    }
}

/// Writes a zip at `path` containing `entries` as (name, content) pairs.
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }

    zip.finish().unwrap();
}
