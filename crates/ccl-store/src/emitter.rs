//! Document emitter: generation and read path for CCL artifact pairs.
//!
//! ## Commit protocol
//!
//! 1. Take the matter's lock (generation and reads of one matter serialise)
//! 2. Render the document and serialise the snapshot
//! 3. Stage both files; on failure discard both and leave the previous pair
//! 4. Promote the snapshot, then the document
//!
//! A failure in step 4 can still leave one artifact from the previous
//! generation; it is reported as a generation failure.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use ccl_core::defaults::{CCL_SUBDIR, DOCUMENT_EXT, SNAPSHOT_EXT};
use ccl_core::{MergedFieldMap, Result};

use crate::backend::StorageBackend;
use crate::locks::KeyedLocks;
use crate::render::render_docx;

/// Result of the read path for one matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArtifactStatus {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<MergedFieldMap>,
}

/// Writes and reads `{matter_id}.docx` / `{matter_id}.json` pairs.
#[derive(Clone)]
pub struct DocumentEmitter {
    backend: Arc<dyn StorageBackend>,
    locks: KeyedLocks,
}

impl DocumentEmitter {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            locks: KeyedLocks::new(),
        }
    }

    /// Backend-relative path of the generated document.
    pub fn document_path(matter_id: &str) -> String {
        format!("{}/{}.{}", CCL_SUBDIR, matter_id, DOCUMENT_EXT)
    }

    /// Backend-relative path of the merged-field snapshot.
    pub fn snapshot_path(matter_id: &str) -> String {
        format!("{}/{}.{}", CCL_SUBDIR, matter_id, SNAPSHOT_EXT)
    }

    /// Public URL of the generated document, with the identifier percent-encoded.
    pub fn document_url(matter_id: &str) -> String {
        format!(
            "/{}/{}.{}",
            CCL_SUBDIR,
            urlencoding::encode(matter_id),
            DOCUMENT_EXT
        )
    }

    /// Render and persist the artifact pair, replacing any previous one.
    ///
    /// `matter_id` must already be validated. Returns the document URL.
    pub async fn generate(
        &self,
        matter_id: &str,
        fields: &MergedFieldMap,
        letter: &str,
    ) -> Result<String> {
        let start = Instant::now();
        let _guard = self.locks.lock(matter_id).await;

        let document = render_docx(matter_id, fields, letter, Utc::now())?;
        let snapshot = serde_json::to_vec_pretty(fields)?;

        let doc_path = Self::document_path(matter_id);
        let json_path = Self::snapshot_path(matter_id);

        if let Err(e) = self.stage_pair(&doc_path, &document, &json_path, &snapshot).await {
            error!(
                subsystem = "store",
                component = "emitter",
                op = "generate",
                matter_id,
                error = %e,
                "Staging CCL artifacts failed, previous pair kept"
            );
            return Err(e);
        }

        self.backend.promote(&json_path).await?;
        self.backend.promote(&doc_path).await?;

        info!(
            subsystem = "store",
            component = "emitter",
            op = "generate",
            matter_id,
            size_bytes = document.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "CCL generated"
        );
        Ok(Self::document_url(matter_id))
    }

    async fn stage_pair(
        &self,
        doc_path: &str,
        document: &[u8],
        json_path: &str,
        snapshot: &[u8],
    ) -> Result<()> {
        let staged = match self.backend.stage(doc_path, document).await {
            Ok(()) => self.backend.stage(json_path, snapshot).await,
            Err(e) => Err(e),
        };
        if staged.is_err() {
            for path in [doc_path, json_path] {
                if let Err(e) = self.backend.discard(path).await {
                    warn!(storage_path = %path, error = %e, "Failed to discard staged artifact");
                }
            }
        }
        staged
    }

    /// Report whether the document exists and return the snapshot if readable.
    ///
    /// Never fails: storage errors read as "absent" and a corrupt snapshot is
    /// omitted.
    pub async fn read(&self, matter_id: &str) -> ArtifactStatus {
        let _guard = self.locks.lock(matter_id).await;

        let doc_path = Self::document_path(matter_id);
        let exists = self.backend.exists(&doc_path).await.unwrap_or_else(|e| {
            warn!(
                subsystem = "store",
                component = "emitter",
                op = "read",
                matter_id,
                error = %e,
                "Document existence check failed"
            );
            false
        });

        let snapshot = self.read_snapshot(matter_id).await;
        debug!(
            subsystem = "store",
            op = "read",
            matter_id,
            exists,
            has_snapshot = snapshot.is_some(),
            "CCL read"
        );

        ArtifactStatus {
            exists,
            url: exists.then(|| Self::document_url(matter_id)),
            snapshot,
        }
    }

    async fn read_snapshot(&self, matter_id: &str) -> Option<MergedFieldMap> {
        let json_path = Self::snapshot_path(matter_id);
        if !self.backend.exists(&json_path).await.unwrap_or(false) {
            return None;
        }
        let parsed = match self.backend.read(&json_path).await {
            Ok(data) => serde_json::from_slice::<MergedFieldMap>(&data).map_err(Into::into),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(
                    subsystem = "store",
                    component = "emitter",
                    op = "read",
                    matter_id,
                    error = %e,
                    "CCL snapshot unreadable, omitting"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::FilesystemBackend;
    use crate::render::document_text;
    use async_trait::async_trait;
    use ccl_core::Error;

    fn fields(pairs: &[(&str, &str)]) -> MergedFieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn emitter(dir: &tempfile::TempDir) -> DocumentEmitter {
        DocumentEmitter::new(FilesystemBackend::new(dir.path()))
    }

    #[test]
    fn test_paths_and_url() {
        assert_eq!(DocumentEmitter::document_path("123"), "ccls/123.docx");
        assert_eq!(DocumentEmitter::snapshot_path("123"), "ccls/123.json");
        assert_eq!(DocumentEmitter::document_url("123"), "/ccls/123.docx");
    }

    #[test]
    fn test_document_url_encodes_identifier() {
        assert_eq!(DocumentEmitter::document_url("HLX 42"), "/ccls/HLX%2042.docx");
        assert_eq!(DocumentEmitter::document_path("HLX 42"), "ccls/HLX 42.docx");
    }

    #[tokio::test]
    async fn test_generate_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = emitter(&dir);
        let map = fields(&[("insert_clients_name", "Mr John Smith"), ("status", "")]);

        let url = emitter.generate("12345", &map, "Dear Mr John Smith").await.unwrap();
        assert_eq!(url, "/ccls/12345.docx");

        let status = emitter.read("12345").await;
        assert!(status.exists);
        assert_eq!(status.url.as_deref(), Some("/ccls/12345.docx"));
        assert_eq!(status.snapshot, Some(map));

        let doc = std::fs::read(dir.path().join("ccls/12345.docx")).unwrap();
        assert_eq!(&doc[..2], b"PK");
    }

    #[tokio::test]
    async fn test_second_generation_supersedes_first() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = emitter(&dir);

        emitter
            .generate("7", &fields(&[("matter", "first"), ("figure", "100")]), "")
            .await
            .unwrap();
        let second = fields(&[("matter", "second")]);
        emitter.generate("7", &second, "").await.unwrap();

        assert_eq!(emitter.read("7").await.snapshot, Some(second));
    }

    #[tokio::test]
    async fn test_read_missing_matter() {
        let dir = tempfile::tempdir().unwrap();
        let status = emitter(&dir).read("nothing-here").await;
        assert_eq!(status, ArtifactStatus::default());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = emitter(&dir);
        emitter.generate("9", &fields(&[("matter", "x")]), "").await.unwrap();
        std::fs::write(dir.path().join("ccls/9.json"), b"{ truncated").unwrap();

        let status = emitter.read("9").await;
        assert!(status.exists);
        assert!(status.url.is_some());
        assert!(status.snapshot.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_without_document() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ccls")).unwrap();
        std::fs::write(dir.path().join("ccls/4.json"), br#"{"matter":"m"}"#).unwrap();

        let status = emitter(&dir).read("4").await;
        assert!(!status.exists);
        assert!(status.url.is_none());
        assert_eq!(status.snapshot, Some(fields(&[("matter", "m")])));
    }

    #[tokio::test]
    async fn test_status_serialization_skips_absent_fields() {
        let value = serde_json::to_value(ArtifactStatus::default()).unwrap();
        assert_eq!(value, serde_json::json!({ "exists": false }));
    }

    /// Filesystem backend whose snapshot staging always fails.
    struct FailingSnapshotBackend(FilesystemBackend);

    #[async_trait]
    impl StorageBackend for FailingSnapshotBackend {
        async fn stage(&self, path: &str, data: &[u8]) -> Result<()> {
            if path.ends_with(".json") {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.0.stage(path, data).await
        }
        async fn promote(&self, path: &str) -> Result<()> {
            self.0.promote(path).await
        }
        async fn discard(&self, path: &str) -> Result<()> {
            self.0.discard(path).await
        }
        async fn read(&self, path: &str) -> Result<Vec<u8>> {
            self.0.read(path).await
        }
        async fn exists(&self, path: &str) -> Result<bool> {
            self.0.exists(path).await
        }
    }

    #[tokio::test]
    async fn test_staging_failure_keeps_previous_pair() {
        let dir = tempfile::tempdir().unwrap();
        let previous = fields(&[("matter", "previous")]);
        emitter(&dir).generate("5", &previous, "").await.unwrap();
        let previous_doc = std::fs::read(dir.path().join("ccls/5.docx")).unwrap();

        let failing =
            DocumentEmitter::new(FailingSnapshotBackend(FilesystemBackend::new(dir.path())));
        let err = failing
            .generate("5", &fields(&[("matter", "next")]), "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));

        assert!(!dir.path().join("ccls/5.docx.tmp").exists());
        assert_eq!(
            std::fs::read(dir.path().join("ccls/5.docx")).unwrap(),
            previous_doc
        );
        assert_eq!(emitter(&dir).read("5").await.snapshot, Some(previous));
    }

    #[tokio::test]
    async fn test_concurrent_generations_leave_a_consistent_pair() {
        let dir = tempfile::tempdir().unwrap();
        let emitter = emitter(&dir);

        let candidates: Vec<MergedFieldMap> = (0..10)
            .map(|i| fields(&[("matter", &format!("draft-{}", i))]))
            .collect();
        let tasks = candidates.iter().map(|map| {
            let emitter = emitter.clone();
            let map = map.clone();
            async move { emitter.generate("shared", &map, "").await }
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let status = emitter.read("shared").await;
        assert!(status.exists);
        let snapshot = status.snapshot.unwrap();
        assert!(candidates.contains(&snapshot));

        // The document on disk must come from the same generation as the snapshot
        let text = document_text(&std::fs::read(dir.path().join("ccls/shared.docx")).unwrap());
        for candidate in &candidates {
            let line = format!("\"matter\": \"{}\"", candidate["matter"]);
            assert_eq!(text.contains(&line), candidate == &snapshot, "{}", line);
        }
        assert!(!dir.path().join("ccls/shared.json.tmp").exists());
        assert!(!dir.path().join("ccls/shared.docx.tmp").exists());
    }
}
