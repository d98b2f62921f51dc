//! In-memory matter source for tests and offline runs.
//!
//! ```rust
//! use ccl_merge::StaticMatterSource;
//! use ccl_core::MatterRecord;
//!
//! let source = StaticMatterSource::new().with_matter(
//!     "12345",
//!     MatterRecord {
//!         display_number: Some("SMITH-0001".into()),
//!         ..Default::default()
//!     },
//! );
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use ccl_core::{Error, MatterRecord, MatterSource, Result};

/// Fixed set of matter records keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct StaticMatterSource {
    matters: HashMap<String, MatterRecord>,
    unavailable: bool,
    calls: Arc<AtomicUsize>,
}

impl StaticMatterSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A source that fails every lookup, as an unreachable service would.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_matter(mut self, matter_id: impl Into<String>, record: MatterRecord) -> Self {
        self.matters.insert(matter_id.into(), record);
        self
    }

    /// Number of lookups made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatterSource for StaticMatterSource {
    async fn fetch_matter(&self, matter_id: &str) -> Result<MatterRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(Error::Request("matters service unavailable".to_string()));
        }
        self.matters
            .get(matter_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("matter {}", matter_id)))
    }
}
