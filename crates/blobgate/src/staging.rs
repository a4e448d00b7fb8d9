//! Temp-file staging for in-flight uploads.
//!
//! Each upload request owns exactly one staged file, created under the
//! staging directory with a unique name and deleted on every exit path.
//! Deletion failures are logged and swallowed so a cleanup problem never
//! fails the request, but leaks stay visible to operators.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::warn;

/// On-disk staging area, created once at startup
#[derive(Debug)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub async fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Reserve a unique path for one upload request. Concurrent requests
    /// never share a path.
    pub fn stage(&self) -> StagedFile {
        let token: u128 = rand::thread_rng().gen();
        StagedFile {
            path: self.dir.join(format!("upload-{token:032x}.part")),
            removed: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Guard owning one staged file path.
///
/// The file is deleted when [`remove`](Self::remove) is called or when the
/// guard drops, whichever comes first.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    removed: bool,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the staged file, best-effort
    pub async fn remove(mut self) {
        self.removed = true;
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            log_remove_failure(&self.path, &e);
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        // Backstop for panics and early returns
        if let Err(e) = std::fs::remove_file(&self.path) {
            log_remove_failure(&self.path, &e);
        }
    }
}

fn log_remove_failure(path: &Path, e: &std::io::Error) {
    // The upload may have been staged but never written
    if e.kind() != std::io::ErrorKind::NotFound {
        warn!("failed to remove staged file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let tmp = TempDir::new().unwrap();
        let area = StagingArea::new(tmp.path().join("staging")).await.unwrap();

        let staged = area.stage();
        tokio::fs::write(staged.path(), b"payload").await.unwrap();
        assert_eq!(entries(area.dir()), 1);

        staged.remove().await;
        assert_eq!(entries(tmp.path().join("staging").as_path()), 0);
    }

    #[tokio::test]
    async fn test_drop_is_a_backstop() {
        let tmp = TempDir::new().unwrap();
        let area = StagingArea::new(tmp.path().join("staging")).await.unwrap();

        {
            let staged = area.stage();
            std::fs::write(staged.path(), b"payload").unwrap();
        }
        assert_eq!(entries(area.dir()), 0);
    }

    #[tokio::test]
    async fn test_remove_of_never_written_file_is_quiet() {
        let tmp = TempDir::new().unwrap();
        let area = StagingArea::new(tmp.path()).await.unwrap();

        // No file was created at the path; must not panic or error
        area.stage().remove().await;
    }

    #[tokio::test]
    async fn test_concurrent_stages_get_distinct_paths() {
        let tmp = TempDir::new().unwrap();
        let area = StagingArea::new(tmp.path()).await.unwrap();

        let a = area.stage();
        let b = area.stage();
        assert_ne!(a.path(), b.path());

        a.remove().await;
        b.remove().await;
    }
}
