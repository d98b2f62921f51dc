//! Orchestrates merge, letter rendering and artifact emission for one matter.

use std::sync::Arc;

use tracing::debug;

use ccl_core::{validate_matter_id, Draft, DraftContext, Result};
use ccl_merge::{unresolved_placeholders, LetterTemplate, MergeEngine};
use ccl_store::{ArtifactStatus, DocumentEmitter};

/// Create/update/read operations shared by the CCL handlers.
#[derive(Clone)]
pub struct CclService {
    engine: MergeEngine,
    template: Arc<LetterTemplate>,
    emitter: DocumentEmitter,
}

impl CclService {
    pub fn new(engine: MergeEngine, template: LetterTemplate, emitter: DocumentEmitter) -> Self {
        Self {
            engine,
            template: Arc::new(template),
            emitter,
        }
    }

    /// Merge `draft` for `matter_id` and persist the artifact pair.
    ///
    /// Returns the document URL. Invalid identifiers fail before any lookup
    /// or write is attempted.
    pub async fn generate(&self, matter_id: &str, draft: &Draft) -> Result<String> {
        let matter_id = validate_matter_id(matter_id)?;

        let fields = self.engine.merge(Some(matter_id), draft).await;
        let options = DraftContext::from_draft(draft).generation_options;
        let letter = self.template.render(&fields, &options);

        let unresolved = unresolved_placeholders(&letter);
        if !unresolved.is_empty() {
            debug!(
                subsystem = "api",
                component = "ccl_service",
                matter_id,
                unresolved_count = unresolved.len(),
                unresolved = %unresolved.join(","),
                "Letter rendered with unfilled placeholders"
            );
        }

        self.emitter.generate(matter_id, &fields, &letter).await
    }

    /// Existence, URL and snapshot for `matter_id`.
    pub async fn read(&self, matter_id: &str) -> Result<ArtifactStatus> {
        let matter_id = validate_matter_id(matter_id)?;
        Ok(self.emitter.read(matter_id).await)
    }

    /// Number of staff records available to the merge engine.
    pub fn staff_count(&self) -> usize {
        self.engine.staff().len()
    }
}
