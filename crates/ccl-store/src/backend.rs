//! Storage backends for CCL artifacts.
//!
//! Writes go through a staging file (`{path}.tmp`) that is fsync'd and then
//! renamed over the final path, so readers only ever see a complete file.
//! Staging and promotion are exposed separately so the emitter can stage both
//! files of a pair before making either visible.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use ccl_core::Result;

/// Storage backend trait for different storage implementations.
///
/// Paths are relative to the backend root, e.g. `ccls/12345.docx`.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write `data` to the staging file for `path`.
    async fn stage(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Atomically move the staged file over `path`.
    async fn promote(&self, path: &str) -> Result<()>;

    /// Remove the staged file for `path`, if any.
    async fn discard(&self, path: &str) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Stage and promote in one step.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        self.stage(path, data).await?;
        self.promote(path).await
    }
}

/// Filesystem storage backend rooted at the public directory.
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }

    fn staging_path(&self, path: &str) -> PathBuf {
        self.base_path.join(format!("{}.tmp", path))
    }

    /// Validate that `subdir` can be created, written, read and cleaned up.
    ///
    /// Run at startup so permission problems surface before the first request.
    pub async fn validate(&self, subdir: &str) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(subdir);
        let test_file = test_dir.join(".health-check");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn stage(&self, path: &str, data: &[u8]) -> Result<()> {
        let temp_path = self.staging_path(path);
        debug!(storage_path = %path, temp_path = %temp_path.display(), size_bytes = data.len(), "ccl_store: stage");

        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                warn!(parent = %parent.display(), error = %e, "ccl_store: create_dir_all failed");
                e
            })?;
        }

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            warn!(temp_path = %temp_path.display(), error = %e, "ccl_store: File::create failed");
            e
        })?;
        file.write_all(data).await.map_err(|e| {
            warn!(error = %e, "ccl_store: write_all failed");
            e
        })?;
        file.sync_all().await?;
        drop(file);

        // 0644 (rw-r--r--): artifacts are served publicly, never executed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    async fn promote(&self, path: &str) -> Result<()> {
        let temp_path = self.staging_path(path);
        let full_path = self.full_path(path);
        fs::rename(&temp_path, &full_path).await.map_err(|e| {
            warn!(from = %temp_path.display(), to = %full_path.display(), error = %e, "ccl_store: rename failed");
            e
        })?;
        Ok(())
    }

    async fn discard(&self, path: &str) -> Result<()> {
        let temp_path = self.staging_path(path);
        if fs::try_exists(&temp_path).await? {
            fs::remove_file(temp_path).await?;
        }
        Ok(())
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.full_path(path)).await?)
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(path)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_directories_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("ccls/1.json", b"{}").await.unwrap();

        assert!(backend.exists("ccls/1.json").await.unwrap());
        assert_eq!(backend.read("ccls/1.json").await.unwrap(), b"{}");
        assert!(!dir.path().join("ccls/1.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_staged_file_is_invisible_until_promoted() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.stage("ccls/2.docx", b"new").await.unwrap();
        assert!(!backend.exists("ccls/2.docx").await.unwrap());

        backend.promote("ccls/2.docx").await.unwrap();
        assert_eq!(backend.read("ccls/2.docx").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_discard_removes_staged_file_only() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("ccls/3.json", b"old").await.unwrap();
        backend.stage("ccls/3.json", b"new").await.unwrap();
        backend.discard("ccls/3.json").await.unwrap();
        backend.discard("ccls/3.json").await.unwrap();

        assert_eq!(backend.read("ccls/3.json").await.unwrap(), b"old");
        assert!(!dir.path().join("ccls/3.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());

        backend.write("ccls/4.json", b"first").await.unwrap();
        backend.write("ccls/4.json", b"second").await.unwrap();
        assert_eq!(backend.read("ccls/4.json").await.unwrap(), b"second");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_files_are_not_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.write("ccls/5.docx", b"PK").await.unwrap();

        let mode = std::fs::metadata(dir.path().join("ccls/5.docx"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FilesystemBackend::new(dir.path());
        backend.validate("ccls").await.unwrap();
        assert!(dir.path().join("ccls").is_dir());
        assert!(!dir.path().join("ccls/.health-check").exists());
    }
}
