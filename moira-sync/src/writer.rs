//! Filesystem primitives for the dump path.
//!
//! ## `atomic_write`
//!
//! 1. Write the content to `<path>.tmp`.
//! 2. Rename onto the final path (atomic on POSIX).
//! 3. On rename failure, remove the `.tmp` file and leave any existing file
//!    untouched.
//!
//! ## `recreate_dir`
//!
//! Removes and re-creates `{root}/{category}`. Only a real directory at
//! exactly that path is ever removed; a file or symlink there is an error.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Atomically replace `path` with `content`.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<(), SyncError> {
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    atomic_write_with_tmp(path, content, &tmp)
}

fn atomic_write_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), SyncError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;

    if let Err(e) = fs::rename(tmp, path) {
        let _ = fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    tracing::debug!("wrote: {}", path.display());
    Ok(())
}

/// Remove `{root}/{category}` if present, then create it empty.
///
/// `root` is created when missing but must be a directory if it exists.
pub(crate) fn recreate_dir(root: &Path, category: &str) -> Result<PathBuf, SyncError> {
    ensure_dir(root)?;

    let dir = root.join(category);
    match fs::symlink_metadata(&dir) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        }
        Ok(_) => return Err(SyncError::NotADirectory { path: dir }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(io_err(&dir, e)),
    }
    fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    Ok(dir)
}

fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(path).map_err(|e| io_err(path, e))
        }
        Err(e) => Err(io_err(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_file_and_cleans_tmp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("triggers").join("cpu-high.yml");
        atomic_write(&path, "type: trigger\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "type: trigger\n");
        let tmp_path = PathBuf::from(format!("{}.tmp", path.display()));
        assert!(!tmp_path.exists(), ".tmp must be cleaned up");
    }

    #[test]
    fn write_replaces_existing_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tags.yml");
        atomic_write(&path, "v1").unwrap();
        atomic_write(&path, "v2").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "v2");
    }

    #[test]
    fn rename_failure_leaves_original_and_cleans_tmp() {
        let root = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file, whatever the privileges.
        let path = root.path().join("alice.yml");
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("keep"), "original").unwrap();
        let tmp_path = root.path().join("alice.yml.tmp");

        let result = atomic_write_with_tmp(&path, "new content", &tmp_path);

        assert!(matches!(result, Err(SyncError::Io { .. })), "got: {result:?}");
        assert_eq!(fs::read_to_string(path.join("keep")).unwrap(), "original");
        assert!(!tmp_path.exists(), ".tmp should be cleaned up");
    }

    #[test]
    fn recreate_removes_previous_contents() {
        let root = TempDir::new().unwrap();
        let stale = root.path().join("triggers").join("old.yml");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let dir = recreate_dir(root.path(), "triggers").unwrap();
        assert_eq!(dir, root.path().join("triggers"));
        assert!(dir.is_dir());
        assert!(!stale.exists());
    }

    #[test]
    fn recreate_creates_missing_root() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("dump").join("moira");
        let dir = recreate_dir(&nested, "tags").unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn recreate_refuses_file_in_place_of_category() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("users");
        fs::write(&file, "not a dir").unwrap();

        let err = recreate_dir(root.path(), "users").unwrap_err();
        assert!(matches!(err, SyncError::NotADirectory { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), "not a dir");
    }

    #[test]
    fn recreate_refuses_file_as_root() {
        let root = TempDir::new().unwrap();
        let file = root.path().join("dump");
        fs::write(&file, "x").unwrap();
        let err = recreate_dir(&file, "tags").unwrap_err();
        assert!(matches!(err, SyncError::NotADirectory { .. }));
    }

    #[test]
    #[cfg(unix)]
    fn recreate_does_not_follow_symlinks() {
        let root = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let precious = elsewhere.path().join("keep.yml");
        fs::write(&precious, "keep").unwrap();
        std::os::unix::fs::symlink(elsewhere.path(), root.path().join("triggers")).unwrap();

        let err = recreate_dir(root.path(), "triggers").unwrap_err();
        assert!(matches!(err, SyncError::NotADirectory { .. }));
        assert!(precious.exists());
    }
}
