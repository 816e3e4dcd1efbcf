//! Scoped working directory changes.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Switches the process working directory and switches back on drop.
///
/// The previous directory is restored on every exit path, including `?`
/// returns and unwinding.
#[derive(Debug)]
#[must_use = "the previous directory is restored as soon as the guard is dropped"]
pub struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    /// Enters `dir`, expanding a leading `~` to the home directory.
    pub fn enter(dir: impl AsRef<Path>) -> Result<Self> {
        let target = expand_home(dir.as_ref());
        let previous = env::current_dir().context("Failed to read current directory")?;

        env::set_current_dir(&target).context(format!(
            "Failed to change directory to {}",
            target.display()
        ))?;
        tracing::debug!(from = %previous.display(), to = %target.display(), "entered directory");

        Ok(Self { previous })
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.previous) {
            tracing::warn!(
                dir = %self.previous.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}

/// Expands `~` and `~/...` using the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Makes `path` absolute against the current directory after `~` expansion.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let expanded = expand_home(path);
    std::path::absolute(&expanded).context(format!("Failed to resolve path: {}", path.display()))
}

/// Serialises tests that touch the process working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;
    use tempfile::TempDir;

    fn lock() -> std::sync::MutexGuard<'static, ()> {
        CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[test]
    fn test_enter_and_restore() {
        let _lock = lock();
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().canonicalize().unwrap();
        let original = env::current_dir().unwrap();

        {
            let _guard = WorkingDir::enter(&target).unwrap();
            assert_eq!(env::current_dir().unwrap().canonicalize().unwrap(), target);
        }

        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    fn test_restore_after_panic() {
        let _lock = lock();
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().to_path_buf();
        let original = env::current_dir().unwrap();

        let result = panic::catch_unwind(|| {
            let _guard = WorkingDir::enter(&target).unwrap();
            panic!("boom");
        });

        assert!(result.is_err());
        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    fn test_restore_after_error_return() {
        let _lock = lock();
        let temp_dir = TempDir::new().unwrap();
        let original = env::current_dir().unwrap();

        fn failing(dir: &Path) -> Result<()> {
            let _guard = WorkingDir::enter(dir)?;
            anyhow::bail!("stage failed")
        }

        assert!(failing(temp_dir.path()).is_err());
        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    fn test_nested_guards_unwind_in_order() {
        let _lock = lock();
        let outer = TempDir::new().unwrap();
        let inner = outer.path().join("qmk_firmware");
        std::fs::create_dir(&inner).unwrap();
        let original = env::current_dir().unwrap();

        {
            let _outer = WorkingDir::enter(outer.path()).unwrap();
            {
                // Relative to the outer directory
                let _inner = WorkingDir::enter("qmk_firmware").unwrap();
                assert_eq!(
                    env::current_dir().unwrap().canonicalize().unwrap(),
                    inner.canonicalize().unwrap()
                );
            }
            assert_eq!(
                env::current_dir().unwrap().canonicalize().unwrap(),
                outer.path().canonicalize().unwrap()
            );
        }

        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    fn test_enter_missing_directory_leaves_cwd() {
        let _lock = lock();
        let temp_dir = TempDir::new().unwrap();
        let original = env::current_dir().unwrap();

        let err = WorkingDir::enter(temp_dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("Failed to change directory"));
        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    fn test_absolute_uses_current_directory() {
        let _lock = lock();
        let temp_dir = TempDir::new().unwrap();

        let _guard = WorkingDir::enter(temp_dir.path()).unwrap();
        let resolved = absolute(Path::new("qmk_firmware")).unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, env::current_dir().unwrap().join("qmk_firmware"));
        assert_eq!(absolute(Path::new("/opt/qmk")).unwrap(), PathBuf::from("/opt/qmk"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        assert_eq!(expand_home(Path::new("rel")), PathBuf::from("rel"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/Documents")), home.join("Documents"));
            assert_eq!(expand_home(Path::new("~")), home);
        }
    }
}
