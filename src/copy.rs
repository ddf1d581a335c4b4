//! Target directory preparation and versioned copies.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::LinkError;

/// Make sure `dir` exists and is a directory.
///
/// Only the last path component is created; a missing parent is treated like any
/// other creation failure. `file_name` is only used for the error message.
pub fn prepare_target_dir(dir: &Path, file_name: &str) -> Result<(), LinkError> {
    if !dir.exists() {
        if let Err(e) = fs::create_dir(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "failed to create library directory");
        }
    }

    if !dir.is_dir() {
        return Err(LinkError::DirectoryUnavailable {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
        });
    }
    Ok(())
}

/// Copy `src` byte for byte to `dir/file_name`, replacing whatever is there.
///
/// The bytes go to a hidden sibling first and are renamed into place, so a copy
/// that is already mapped into the process keeps its old inode.
///
/// Returns the number of bytes copied.
pub fn copy_versioned(src: &Path, dir: &Path, file_name: &str) -> Result<u64, LinkError> {
    let staging = dir.join(format!(".{file_name}.partial"));
    let dest = dir.join(file_name);

    stage_and_replace(src, &staging, &dest).map_err(|source| {
        // Best effort; the staging file may never have been created.
        let _ = fs::remove_file(&staging);
        LinkError::Copy {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
            source,
        }
    })
}

fn stage_and_replace(src: &Path, staging: &Path, dest: &Path) -> io::Result<u64> {
    let size = fs::copy(src, staging)?;
    fs::rename(staging, dest)?;
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_single_level() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("lib");

        prepare_target_dir(&dir, "libfoo.so.1").unwrap();
        assert!(dir.is_dir());

        // Existing directory is fine
        prepare_target_dir(&dir, "libfoo.so.1").unwrap();
    }

    #[test]
    fn test_prepare_does_not_create_parents() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("missing/lib");

        let err = prepare_target_dir(&dir, "libfoo.so.1").unwrap_err();
        assert!(matches!(err, LinkError::DirectoryUnavailable { .. }));
        assert!(!temp.path().join("missing").exists());
    }

    #[test]
    fn test_prepare_rejects_regular_file() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("lib");
        fs::write(&dir, "not a directory").unwrap();

        let err = prepare_target_dir(&dir, "libfoo.so.1").unwrap_err();
        match err {
            LinkError::DirectoryUnavailable { dir: d, file_name } => {
                assert_eq!(d, dir);
                assert_eq!(file_name, "libfoo.so.1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_copy_is_byte_exact_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("libfoo.so");
        let dir = temp.path().join("lib");
        fs::create_dir(&dir).unwrap();

        let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        fs::write(&src, &bytes).unwrap();
        let copied = copy_versioned(&src, &dir, "libfoo.so.1").unwrap();
        assert_eq!(copied, bytes.len() as u64);
        assert_eq!(fs::read(dir.join("libfoo.so.1")).unwrap(), bytes);

        fs::write(&src, b"XYZ").unwrap();
        copy_versioned(&src, &dir, "libfoo.so.1").unwrap();
        assert_eq!(fs::read(dir.join("libfoo.so.1")).unwrap(), b"XYZ");
        assert!(!dir.join(".libfoo.so.1.partial").exists());
    }

    #[test]
    fn test_copy_missing_source() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("lib");
        fs::create_dir(&dir).unwrap();

        let err = copy_versioned(&temp.path().join("nope.so"), &dir, "libnope.so.3").unwrap_err();
        match err {
            LinkError::Copy {
                file_name, source, ..
            } => {
                assert_eq!(file_name, "libnope.so.3");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dir.join("libnope.so.3").exists());
    }
}
