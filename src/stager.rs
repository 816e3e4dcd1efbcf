//! Copies extracted keymap files into the QMK firmware tree.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::constants::KEYMAP_FILES;

/// Copies `keymap.c`, `layers.json` and `readme.md` from `source_dir` into `keymap_dir`.
///
/// All three files must exist; a missing one fails with [`io::ErrorKind::NotFound`]
/// before anything is copied. `keymap_dir` is created if needed and existing
/// files in it are overwritten.
///
/// Returns the destination paths in copy order.
pub fn stage_keymap(source_dir: &Path, keymap_dir: &Path) -> Result<Vec<PathBuf>> {
    for name in KEYMAP_FILES {
        let source = source_dir.join(name);
        if !source.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found in {}", name, source_dir.display()),
            ))
            .context("Keymap archive is missing a required file");
        }
    }

    fs::create_dir_all(keymap_dir).context(format!(
        "Failed to create keymap directory: {}",
        keymap_dir.display()
    ))?;

    let mut staged = Vec::with_capacity(KEYMAP_FILES.len());
    for name in KEYMAP_FILES {
        let source = source_dir.join(name);
        let dest = keymap_dir.join(name);
        // fs::copy carries the source mode over, so an earlier copy may be read-only
        if fs::symlink_metadata(&dest).is_ok_and(|m| !m.is_dir()) {
            fs::remove_file(&dest)
                .context(format!("Failed to replace existing file: {}", dest.display()))?;
        }
        fs::copy(&source, &dest).context(format!(
            "Failed to copy {} to {}",
            source.display(),
            dest.display()
        ))?;
        tracing::info!(file = name, dest = %dest.display(), "staged");
        staged.push(dest);
    }

    Ok(staged)
}
