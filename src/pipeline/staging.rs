//! Per-request upload staging.
//!
//! Each upload is written under the staging directory with a
//! collision-resistant name (`{uuid}_{sanitized original name}`) and
//! removed when the guard drops, on success and failure paths alike.
//! A startup sweep clears files orphaned by a previous crash.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Strip path separators and control characters from a client-supplied
/// filename, keeping only the final component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// A staged upload file, removed from disk when dropped.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    original_name: String,
}

impl StagedUpload {
    /// Write the upload bytes to a unique path under `staging_dir`.
    pub fn stage(
        staging_dir: &Path,
        original_name: &str,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(staging_dir)?;

        let sanitized = sanitize_file_name(original_name);
        let path = staging_dir.join(format!("{}_{}", Uuid::new_v4(), sanitized));
        std::fs::write(&path, bytes)?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "Upload staged");
        Ok(Self {
            path,
            original_name: sanitized,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sanitized client-supplied filename (used for extension dispatch
    /// and recorded on persisted reports).
    pub fn original_name(&self) -> &str {
        &self.original_name
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload");
            }
        }
    }
}

/// Remove staging files left behind by a previous crash.
///
/// Safe at startup only: no request is in flight yet.
pub fn sweep_orphans(staging_dir: &Path) {
    let entries = match std::fs::read_dir(staging_dir) {
        Ok(entries) => entries,
        Err(_) => return, // directory does not exist yet
    };

    let mut removed = 0usize;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() && std::fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }

    if removed > 0 {
        tracing::info!(count = removed, dir = %staging_dir.display(), "Removed orphaned staging files");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_file_exists_until_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let staged = StagedUpload::stage(dir.path(), "report.pdf", b"content").unwrap();
            assert!(staged.path().exists());
            assert_eq!(std::fs::read(staged.path()).unwrap(), b"content");
            staged.path().to_path_buf()
        };
        assert!(!path.exists(), "staged file must be removed on drop");
    }

    #[test]
    fn staged_names_are_unique_per_request() {
        let dir = tempfile::tempdir().unwrap();
        let a = StagedUpload::stage(dir.path(), "scan.png", b"a").unwrap();
        let b = StagedUpload::stage(dir.path(), "scan.png", b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn original_name_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::stage(dir.path(), "lab_results.pdf", b"x").unwrap();
        assert_eq!(staged.original_name(), "lab_results.pdf");
    }

    #[test]
    fn sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\x\\scan.png"), "scan.png");
        assert_eq!(sanitize_file_name("plain.pdf"), "plain.pdf");
    }

    #[test]
    fn sanitize_empty_name_falls_back() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name("dir/"), "upload");
    }

    #[test]
    fn sweep_removes_stale_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("stale_upload.png"), b"old").unwrap();
        std::fs::write(dir.path().join("another.pdf"), b"old").unwrap();
        sweep_orphans(dir.path());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn sweep_tolerates_missing_directory() {
        sweep_orphans(Path::new("/nonexistent/medreport-staging"));
    }
}
