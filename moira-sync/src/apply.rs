//! Apply local documents to the remote system.
//!
//! A single file goes through a pre-flight path check, is parsed, and is
//! handed to the reconciler for its `type`. A directory applies every
//! `*.yml` / `*.yaml` file below it in path order; one file's failure is
//! recorded in its [`FileReport`] and the rest still run.

use std::fs;
use std::path::{Path, PathBuf};

use moira_api::{ApplyOptions, DocumentOutcome, MoiraClient, Transport};
use moira_core::{Document, DocumentError};

use crate::error::{io_err, SyncError};

/// Result of applying one file that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Applied(DocumentOutcome),
    /// The `type` field names nothing this tool manages.
    Unsupported { declared: String },
}

/// Per-file entry of a directory apply.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<FileOutcome, SyncError>,
}

impl FileReport {
    pub fn is_err(&self) -> bool {
        self.result.is_err()
    }
}

/// `path` must exist and be a regular file.
pub fn check_file(path: &Path) -> Result<(), SyncError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(SyncError::NotAFile {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SyncError::FileMissing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(io_err(path, e)),
    }
}

/// `path` must exist and be a directory.
pub fn check_dir(path: &Path) -> Result<(), SyncError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::NotADirectory {
            path: path.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(SyncError::FileMissing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Parse and apply a single local file.
pub fn apply_file<T: Transport>(
    client: &MoiraClient<T>,
    path: &Path,
    options: ApplyOptions,
) -> Result<FileOutcome, SyncError> {
    check_file(path)?;
    let text = fs::read_to_string(path).map_err(|e| io_err(path, e))?;

    let document = match Document::from_yaml(&text) {
        Ok(document) => document,
        Err(DocumentError::UnsupportedType(declared)) => {
            tracing::warn!(path = %path.display(), declared = %declared, "unsupported document type; skipping");
            return Ok(FileOutcome::Unsupported { declared });
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(path = %path.display(), kind = %document.kind(), "applying document");

    let outcome = client.apply_document(&document, options)?;
    Ok(FileOutcome::Applied(outcome))
}

/// Apply every YAML file below `dir`, each in isolation.
///
/// Only a bad `dir` is an error; per-file failures are in the reports.
pub fn apply_dir<T: Transport>(
    client: &MoiraClient<T>,
    dir: &Path,
    options: ApplyOptions,
) -> Result<Vec<FileReport>, SyncError> {
    check_dir(dir)?;
    let files = collect_documents(dir)?;
    tracing::info!(dir = %dir.display(), files = files.len(), "applying directory");

    Ok(files
        .into_iter()
        .map(|path| {
            let result = apply_file(client, &path, options);
            if let Err(e) = &result {
                tracing::warn!(path = %path.display(), error = %e, "apply failed");
            }
            FileReport { path, result }
        })
        .collect())
}

/// `*.yml` / `*.yaml` files below `dir`, recursively, sorted by path.
pub fn collect_documents(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| io_err(&current, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_err(&current, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && is_yaml(&path) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn preflight_distinguishes_missing_and_wrong_kind() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope.yml");
        assert!(matches!(check_file(&missing), Err(SyncError::FileMissing { .. })));
        assert!(matches!(check_file(tmp.path()), Err(SyncError::NotAFile { .. })));

        let file = tmp.path().join("a.yml");
        fs::write(&file, "type: tag\n").unwrap();
        assert!(check_file(&file).is_ok());
        assert!(matches!(check_dir(&file), Err(SyncError::NotADirectory { .. })));
        assert!(check_dir(tmp.path()).is_ok());
    }

    #[test]
    fn collects_yaml_files_recursively_in_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("triggers")).unwrap();
        fs::create_dir_all(root.join("users")).unwrap();
        fs::write(root.join("users/bob.yml"), "").unwrap();
        fs::write(root.join("triggers/cpu.yaml"), "").unwrap();
        fs::write(root.join("triggers/notes.txt"), "").unwrap();
        fs::write(root.join("tags.yml"), "").unwrap();

        let files: Vec<_> = collect_documents(root)
            .unwrap()
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("tags.yml"),
                PathBuf::from("triggers/cpu.yaml"),
                PathBuf::from("users/bob.yml"),
            ]
        );
    }
}
