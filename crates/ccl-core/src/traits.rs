//! Trait seams for external collaborators.
//!
//! The merge engine never talks to the matters service directly; it goes
//! through [`MatterSource`] so tests can substitute a fixed record set.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::MatterRecord;

/// Lookup of matter records by identifier.
#[async_trait]
pub trait MatterSource: Send + Sync {
    /// Fetch the matter record for `matter_id`.
    ///
    /// Callers treat any error as "no record"; implementations should still
    /// report failures rather than returning an empty record themselves.
    async fn fetch_matter(&self, matter_id: &str) -> Result<MatterRecord>;
}
