//! Storage layer for file persistence
//!
//! Resolves the data directory and provides text file I/O with
//! consistent error messages.

use crate::config::app::{DATA_DIR_ENV, NAME};
use crate::error::{FavoritesError, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Get the application data directory path
///
/// `MULTIVERSO_DATA_DIR` takes precedence over the platform config directory.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|p| p.join(NAME))
        .ok_or_else(|| FavoritesError::Config(
            "Could not determine config directory. HOME environment variable may not be set.".to_string()
        ))
}

/// Create a directory if it doesn't exist, with proper error handling
pub fn ensure_dir(path: &Path) -> Result<()> {
    match fs::create_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot create directory {:?}", path)
                }
                _ => format!("Failed to create directory {:?}: {}", path, e),
            };
            Err(FavoritesError::Storage(msg))
        }
    }
}

/// Read a text file
///
/// Returns `None` if the file doesn't exist or is blank.
pub fn read_text(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(FavoritesError::Storage(format!(
                "Permission denied: cannot read {:?}",
                path
            ))),
            _ => Err(FavoritesError::Storage(format!("Failed to read {:?}: {}", path, e))),
        },
    }
}

/// Write a text file, replacing any previous content
///
/// Writes to a sibling temp file and renames it over the target so a reader
/// never observes a half-written value. Creates parent directories.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }

    let tmp = tmp_path(path);
    let result = fs::write(&tmp, content).and_then(|()| fs::rename(&tmp, path));
    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fs::remove_file(&tmp);
            let msg = match e.kind() {
                ErrorKind::PermissionDenied => {
                    format!("Permission denied: cannot write to {:?}", path)
                }
                ErrorKind::ReadOnlyFilesystem => {
                    format!("Cannot write to {:?}: filesystem is read-only", path)
                }
                _ => format!("Failed to write to {:?}: {}", path, e),
            };
            Err(FavoritesError::Storage(msg))
        }
    }
}

/// Delete a file; a missing file is not an error
pub fn delete_at(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FavoritesError::Storage(format!("Failed to delete {:?}: {}", path, e))),
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        temp_dir().join(format!("multiverso_storage_test_{}_{}.json", id, name))
    }

    #[test]
    fn test_write_and_read() {
        let path = temp_path("write_read");
        write_text(&path, "[1,2,3]").unwrap();
        assert_eq!(read_text(&path).unwrap().as_deref(), Some("[1,2,3]"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_write_replaces_content() {
        let path = temp_path("replace");
        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();
        assert_eq!(read_text(&path).unwrap().as_deref(), Some("second"));
        assert!(!tmp_path(&path).exists());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_nonexistent() {
        let path = temp_path("nonexistent");
        assert_eq!(read_text(&path).unwrap(), None);
    }

    #[test]
    fn test_read_blank_file() {
        let path = temp_path("blank");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(read_text(&path).unwrap(), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_creates_parent_dirs() {
        let root = temp_dir().join(format!(
            "multiverso_storage_test_{}",
            TEST_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let path = root.join("nested").join("value.json");

        write_text(&path, "{}").unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_delete() {
        let path = temp_path("delete");
        fs::write(&path, "x").unwrap();
        delete_at(&path).unwrap();
        assert!(!path.exists());
        // Deleting again is fine
        delete_at(&path).unwrap();
    }

    #[test]
    fn test_tmp_path_is_sibling() {
        let path = PathBuf::from("/data/favorites.characters.v1.json");
        assert_eq!(tmp_path(&path), PathBuf::from("/data/favorites.characters.v1.json.tmp"));
    }
}
