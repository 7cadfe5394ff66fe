//! Small file helpers shared by the cart and session stores.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `contents` in one step.
///
/// Writes to a sibling temp file, syncs it, then renames it over the target,
/// so readers see either the old file or the new one, never a partial write.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}

/// Read a file, mapping "not found" to `None`.
pub(crate) fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Delete a file, treating "not found" as success.
pub(crate) fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cart.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(read_optional(&path).unwrap().as_deref(), Some(&b"second"[..]));
        assert!(!dir.path().join("nested").join("cart.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_reads_as_none_and_removes_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert!(read_optional(&path).unwrap().is_none());
        remove_if_exists(&path).unwrap();
    }
}
