//! Sequential artifact naming
//!
//! The next recording is numbered by counting the recordings already in the
//! output directory. This assumes a single writer per directory: two
//! processes sharing one directory can pick the same number.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name for recording number `index`
pub fn artifact_name(prefix: &str, index: usize, extension: &str) -> String {
    format!("{prefix}_{index:04}.{extension}")
}

/// Count the entries in `dir` that carry `extension`
pub fn count_artifacts(dir: &Path, extension: &str) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == extension) {
            count += 1;
        }
    }
    Ok(count)
}

/// Path for the next recording in `dir`.
///
/// The index is the number of existing artifacts. If that name is already
/// taken (an earlier file was deleted), the index moves up until it is free.
pub fn next_artifact_path(dir: &Path, prefix: &str, extension: &str) -> io::Result<PathBuf> {
    let mut index = count_artifacts(dir, extension)?;
    loop {
        let candidate = dir.join(artifact_name(prefix, index, extension));
        if !candidate.exists() {
            return Ok(candidate);
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_artifact_name() {
        assert_eq!(artifact_name("recording", 0, "avi"), "recording_0000.avi");
        assert_eq!(artifact_name("recording", 42, "avi"), "recording_0042.avi");
        assert_eq!(artifact_name("recording", 12345, "avi"), "recording_12345.avi");
    }

    #[test]
    fn test_empty_directory_starts_at_zero() {
        let dir = tempdir().unwrap();
        let path = next_artifact_path(dir.path(), "recording", "avi").unwrap();
        assert_eq!(path, dir.path().join("recording_0000.avi"));
    }

    #[test]
    fn test_existing_artifacts_are_counted() {
        let dir = tempdir().unwrap();
        for i in 0..3 {
            fs::write(dir.path().join(artifact_name("recording", i, "avi")), b"").unwrap();
        }
        // Other files do not count
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join("clip.mp4"), b"").unwrap();

        let path = next_artifact_path(dir.path(), "recording", "avi").unwrap();
        assert_eq!(path, dir.path().join("recording_0003.avi"));
    }

    #[test]
    fn test_any_avi_counts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("holiday.avi"), b"").unwrap();

        assert_eq!(count_artifacts(dir.path(), "avi").unwrap(), 1);
        let path = next_artifact_path(dir.path(), "recording", "avi").unwrap();
        assert_eq!(path, dir.path().join("recording_0001.avi"));
    }

    #[test]
    fn test_taken_name_is_skipped() {
        let dir = tempdir().unwrap();
        // recording_0000 was deleted, recording_0001 remains
        fs::write(dir.path().join("recording_0001.avi"), b"").unwrap();

        let path = next_artifact_path(dir.path(), "recording", "avi").unwrap();
        assert_eq!(path, dir.path().join("recording_0002.avi"));
        assert!(dir.path().join("recording_0001.avi").exists());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(next_artifact_path(&dir.path().join("gone"), "recording", "avi").is_err());
    }
}
