//! Keyboard descriptors.
//!
//! A descriptor ties a configurator archive to the place its keymap lands in
//! the QMK tree and to the make target that builds and flashes it.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

/// One keyboard the tool knows how to unpack and flash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardConfig {
    /// Archive filename as downloaded from the configurator
    pub zip_filename: String,
    /// Keymap directory relative to the QMK firmware root
    pub keymap_dir: String,
    /// Directory inside the extracted archive holding the keymap files
    pub leaf_dir: String,
    /// QMK keyboard path (e.g., "keebio/nyquist/rev2")
    pub keyboard: String,
    /// Keymap name
    pub keymap: String,
    /// Bootloader/programmer target appended to the make target (e.g., "avrdude")
    pub firmware_type: String,
}

impl KeyboardConfig {
    /// Keebio Nyquist rev2.
    pub fn nyquist() -> Self {
        Self {
            zip_filename: "keymap-keebio-nyquist-rev2-jameslee_nyquist.zip".to_string(),
            keymap_dir: "keyboards/keebio/nyquist/keymaps/jameslee_nyquist".to_string(),
            leaf_dir: "jameslee_nyquist".to_string(),
            keyboard: "keebio/nyquist/rev2".to_string(),
            keymap: "jameslee_nyquist".to_string(),
            firmware_type: "avrdude".to_string(),
        }
    }

    /// Keebio Iris rev2.
    pub fn iris() -> Self {
        Self {
            zip_filename: "keymap-keebio-iris-rev2-jameslee_iris.zip".to_string(),
            keymap_dir: "keyboards/keebio/iris/keymaps/jameslee_iris".to_string(),
            leaf_dir: "jameslee_iris".to_string(),
            keyboard: "keebio/iris/rev2".to_string(),
            keymap: "jameslee_iris".to_string(),
            firmware_type: "avrdude".to_string(),
        }
    }

    /// Built-in records, keyed by the name accepted on the command line.
    pub fn builtins() -> BTreeMap<String, Self> {
        BTreeMap::from([
            ("iris".to_string(), Self::iris()),
            ("nyquist".to_string(), Self::nyquist()),
        ])
    }

    /// Returns the make target `keyboard:keymap:firmware_type`.
    pub fn make_target(&self) -> String {
        format!("{}:{}:{}", self.keyboard, self.keymap, self.firmware_type)
    }

    /// Checks that every field is set and the directory fields stay relative.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("zip_filename", &self.zip_filename),
            ("keymap_dir", &self.keymap_dir),
            ("leaf_dir", &self.leaf_dir),
            ("keyboard", &self.keyboard),
            ("keymap", &self.keymap),
            ("firmware_type", &self.firmware_type),
        ];
        for (field, value) in fields {
            if value.trim().is_empty() {
                anyhow::bail!("{} must not be empty", field);
            }
        }

        // make splits the target on ':'
        for (field, value) in [("keymap", &self.keymap), ("firmware_type", &self.firmware_type)] {
            if value.contains(':') {
                anyhow::bail!("{} must not contain ':' (got '{}')", field, value);
            }
        }

        for (field, value) in [("keymap_dir", &self.keymap_dir), ("leaf_dir", &self.leaf_dir)] {
            if !is_contained(Path::new(value)) {
                anyhow::bail!(
                    "{} must be a relative path without '..' (got '{}')",
                    field,
                    value
                );
            }
        }

        Ok(())
    }
}

/// True when joining `path` onto a base directory cannot leave that directory.
pub(crate) fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
