//! Keymap archive extraction.
//!
//! The QMK configurator exports a zip whose single top-level directory holds
//! the keymap sources. Everything in the archive is extracted as-is; existing
//! files at the destination are overwritten.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extracts every entry of `archive_path` into `dest`, creating it if needed.
///
/// Returns the extracted file paths relative to `dest`, in archive order.
/// Entries whose names would land outside `dest` abort the extraction.
pub fn extract(archive_path: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path).context(format!(
        "Failed to open keymap archive: {}",
        archive_path.display()
    ))?;

    let mut archive = ZipArchive::new(file).context(format!(
        "Failed to read keymap archive: {}",
        archive_path.display()
    ))?;

    fs::create_dir_all(dest).context(format!(
        "Failed to create output directory: {}",
        dest.display()
    ))?;

    let mut extracted = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .context(format!("Failed to read archive entry #{}", index))?;

        let Some(relative) = entry.enclosed_name() else {
            anyhow::bail!(
                "Refusing to extract unsafe path from {}: {}",
                archive_path.display(),
                entry.name()
            );
        };
        let relative = relative.to_path_buf();
        let out_path = dest.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).context(format!(
                "Failed to create directory: {}",
                out_path.display()
            ))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).context(format!(
                "Failed to create directory: {}",
                parent.display()
            ))?;
        }

        // A read-only file from an earlier extraction would make create fail
        if fs::symlink_metadata(&out_path).is_ok_and(|m| !m.is_dir()) {
            fs::remove_file(&out_path).context(format!(
                "Failed to replace existing file: {}",
                out_path.display()
            ))?;
        }

        let mut out_file = File::create(&out_path)
            .context(format!("Failed to create file: {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file)
            .context(format!("Failed to extract {}", entry.name()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode)).context(format!(
                "Failed to set permissions on {}",
                out_path.display()
            ))?;
        }

        tracing::debug!(file = %relative.display(), "extracted");
        extracted.push(relative);
    }

    Ok(extracted)
}


#[cfg(test)]
mod tests {
    use super::test_support::write_zip;
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    const ENTRIES: [(&str, &str); 3] = [
        ("jameslee_nyquist/keymap.c", "#include QMK_KEYBOARD_H\n"),
        ("jameslee_nyquist/layers.json", "{\"layers\": []}"),
        ("jameslee_nyquist/readme.md", "# Nyquist\n"),
    ];

    #[test]
    fn test_extract_reproduces_file_set() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("keymap.zip");
        write_zip(&zip_path, &ENTRIES);

        let dest = temp_dir.path().join("out");
        let extracted = extract(&zip_path, &dest).unwrap();

        let expected: BTreeSet<PathBuf> = ENTRIES.iter().map(|(n, _)| PathBuf::from(n)).collect();
        let got: BTreeSet<PathBuf> = extracted.into_iter().collect();
        assert_eq!(got, expected);

        for (name, content) in ENTRIES {
            assert_eq!(fs::read_to_string(dest.join(name)).unwrap(), content);
        }

        // Nothing beyond the archive contents
        let on_disk: Vec<_> = fs::read_dir(dest.join("jameslee_nyquist"))
            .unwrap()
            .collect();
        assert_eq!(on_disk.len(), ENTRIES.len());
    }

    #[test]
    fn test_extract_creates_nested_destination() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("keymap.zip");
        write_zip(&zip_path, &ENTRIES);

        let dest = temp_dir.path().join("a").join("b").join("c");
        extract(&zip_path, &dest).unwrap();
        assert!(dest.join("jameslee_nyquist/keymap.c").is_file());
    }

    #[test]
    fn test_extract_overwrites_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("keymap.zip");
        write_zip(&zip_path, &ENTRIES);

        let dest = temp_dir.path().join("out");
        fs::create_dir_all(dest.join("jameslee_nyquist")).unwrap();
        fs::write(dest.join("jameslee_nyquist/keymap.c"), "stale").unwrap();

        extract(&zip_path, &dest).unwrap();
        assert_eq!(
            fs::read_to_string(dest.join("jameslee_nyquist/keymap.c")).unwrap(),
            "#include QMK_KEYBOARD_H\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_extract_replaces_read_only_files() {
        use super::test_support::write_zip_with_mode;
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("out");

        let first = temp_dir.path().join("first.zip");
        write_zip_with_mode(&first, &[("jameslee_nyquist/keymap.c", "first")], 0o444);
        extract(&first, &dest).unwrap();

        let keymap = dest.join("jameslee_nyquist/keymap.c");
        let mode = fs::metadata(&keymap).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o444);

        let second = temp_dir.path().join("second.zip");
        write_zip_with_mode(&second, &[("jameslee_nyquist/keymap.c", "second")], 0o444);
        extract(&second, &dest).unwrap();

        assert_eq!(fs::read_to_string(&keymap).unwrap(), "second");
    }

    #[test]
    fn test_extract_missing_archive() {
        let temp_dir = TempDir::new().unwrap();
        let err = extract(&temp_dir.path().join("nope.zip"), temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to open keymap archive"));
    }

    #[test]
    fn test_extract_corrupt_archive() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("broken.zip");
        fs::write(&zip_path, b"this is not a zip file").unwrap();

        let err = extract(&zip_path, &temp_dir.path().join("out")).unwrap_err();
        assert!(err.to_string().contains("Failed to read keymap archive"));
    }

    #[test]
    fn test_extract_rejects_parent_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let zip_path = temp_dir.path().join("evil.zip");
        write_zip(&zip_path, &[("../evil.txt", "pwned")]);

        let dest = temp_dir.path().join("out");
        let err = extract(&zip_path, &dest).unwrap_err();
        assert!(err.to_string().contains("unsafe path"));
        assert!(!temp_dir.path().join("evil.txt").exists());
    }
}
