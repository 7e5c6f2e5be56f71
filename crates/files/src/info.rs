//! File metadata probing

use crate::read::is_binary_file;
use localsearch_core::error::{Error, Result};
use localsearch_core::models::FileInfo;
use localsearch_core::{is_path_allowed, normalize_path};
use std::path::{Path, PathBuf};

/// Report existence, size, line count, and a binary flag for a path under
/// the allowed roots, without returning content.
///
/// The probe never errors for missing or odd targets: stat failures,
/// non-regular files, and unreadable content all degrade to
/// `{exists: false, size: 0}`. The one failure that does surface is a path
/// outside the allowed roots. Line counts are skipped for binary files.
pub async fn file_info(allowed_roots: &[PathBuf], path: &str) -> Result<FileInfo> {
    if !is_path_allowed(Path::new(path), allowed_roots) {
        return Err(Error::access_denied(
            "path is outside allowed repositories",
        ));
    }

    let Ok(resolved) = normalize_path(Path::new(path)) else {
        return Ok(FileInfo::missing());
    };

    let metadata = match tokio::fs::metadata(&resolved).await {
        Ok(metadata) => metadata,
        Err(_) => return Ok(FileInfo::missing()),
    };

    if !metadata.is_file() {
        return Ok(FileInfo::missing());
    }

    if is_binary_file(&resolved).await {
        return Ok(FileInfo {
            exists: true,
            size: metadata.len(),
            lines: None,
            is_binary: Some(true),
        });
    }

    let bytes = match tokio::fs::read(&resolved).await {
        Ok(bytes) => bytes,
        Err(_) => return Ok(FileInfo::missing()),
    };
    let lines = String::from_utf8_lossy(&bytes).split('\n').count() as u64;

    Ok(FileInfo {
        exists: true,
        size: metadata.len(),
        lines: Some(lines),
        is_binary: Some(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn roots(dir: &TempDir) -> Vec<PathBuf> {
        vec![dir.path().to_path_buf()]
    }

    #[tokio::test]
    async fn missing_files_probe_as_absent_without_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.txt");

        let info = file_info(&roots(&dir), missing.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(info, FileInfo::missing());
    }

    #[tokio::test]
    async fn directories_probe_as_absent() {
        let dir = TempDir::new().unwrap();
        let subdir = dir.path().join("sub");
        std::fs::create_dir(&subdir).unwrap();

        let info = file_info(&roots(&dir), subdir.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(info, FileInfo::missing());
    }

    #[tokio::test]
    async fn text_files_report_size_and_line_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "alpha\nbeta\ngamma").unwrap();

        let info = file_info(&roots(&dir), path.to_str().unwrap())
            .await
            .unwrap();
        assert!(info.exists);
        assert_eq!(info.size, 16);
        assert_eq!(info.lines, Some(3));
        assert_eq!(info.is_binary, Some(false));
    }

    #[tokio::test]
    async fn binary_files_skip_the_line_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, b"\x00\x01\x02\x03").unwrap();

        let info = file_info(&roots(&dir), path.to_str().unwrap())
            .await
            .unwrap();
        assert!(info.exists);
        assert_eq!(info.size, 4);
        assert_eq!(info.lines, None);
        assert_eq!(info.is_binary, Some(true));
    }

    #[tokio::test]
    async fn empty_files_count_one_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let info = file_info(&roots(&dir), path.to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(info.lines, Some(1));
        assert_eq!(info.size, 0);
    }

    #[tokio::test]
    async fn paths_outside_the_roots_are_denied() {
        let dir = TempDir::new().unwrap();
        let err = file_info(&roots(&dir), "/etc/passwd").await.unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
    }
}
