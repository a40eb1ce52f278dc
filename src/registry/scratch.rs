//! Scoped temporary paths for host round-trips.
//!
//! The host's export and import calls only speak files; this broker
//! hands out uniquely named paths under the registry's scratch
//! directory, creates the file empty on acquisition, and unlinks it when
//! the scope ends, on every exit path.

use crate::common::Result;
use rand::RngExt;
use std::path::{Path, PathBuf};

/// Scratch directory name under the registry root.
const SCRATCH_DIR: &str = "__$temporary$__";

/// Generate a random RFC4122 v4 GUID as a plain hex string.
fn guid_string() -> String {
    let mut bytes = [0u8; 16];
    let mut rng = rand::rng();
    rng.fill(&mut bytes);
    // RFC4122 v4
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The default scratch directory.
pub fn scratch_dir() -> PathBuf {
    super::default_root().join(SCRATCH_DIR)
}

/// A uniquely named temporary file, removed when dropped.
///
/// # Examples
///
/// ```rust
/// use longan::registry::scratch::TempPath;
///
/// let seen;
/// {
///     let temp = TempPath::with_suffix(".png")?;
///     seen = temp.path().to_path_buf();
///     assert!(seen.exists());
/// }
/// assert!(!seen.exists());
/// # Ok::<(), longan::Error>(())
/// ```
#[derive(Debug)]
pub struct TempPath {
    path: PathBuf,
}

impl TempPath {
    /// Acquire a fresh path in the default scratch directory; the file
    /// is created empty.
    pub fn with_suffix(suffix: &str) -> Result<Self> {
        Self::in_dir(scratch_dir(), suffix)
    }

    /// Acquire a fresh path in an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>, suffix: &str) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{}{suffix}", guid_string()));
        std::fs::write(&path, [])?;
        Ok(Self { path })
    }

    /// The acquired path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempPath {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), %err, "could not remove scratch file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exists_inside_scope_gone_after() {
        let dir = tempfile::tempdir().unwrap();
        let kept;
        {
            let temp = TempPath::in_dir(dir.path(), ".html").unwrap();
            kept = temp.path().to_path_buf();
            assert!(kept.exists());
            assert!(kept.extension().is_some_and(|e| e == "html"));
        }
        assert!(!kept.exists());
    }

    #[test]
    fn test_removed_even_on_unwind() {
        let dir = tempfile::tempdir().unwrap();
        let holder = std::sync::Mutex::new(PathBuf::new());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let temp = TempPath::in_dir(dir.path(), ".png").unwrap();
            *holder.lock().unwrap() = temp.path().to_path_buf();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!holder.lock().unwrap().exists());
    }

    #[test]
    fn test_paths_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let a = TempPath::in_dir(dir.path(), ".bin").unwrap();
        let b = TempPath::in_dir(dir.path(), ".bin").unwrap();
        assert_ne!(a.path(), b.path());
    }
}
