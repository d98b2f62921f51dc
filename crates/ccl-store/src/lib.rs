//! # ccl-store
//!
//! Persistence for client care letters.
//!
//! Each matter owns an artifact pair under the public CCL directory:
//! `{matter_id}.docx` (the generated letter) and `{matter_id}.json` (the
//! merged field snapshot). Both are replaced together on every generation.

pub mod backend;
pub mod emitter;
pub mod locks;
pub mod render;

pub use backend::{FilesystemBackend, StorageBackend};
pub use emitter::{ArtifactStatus, DocumentEmitter};
pub use locks::KeyedLocks;
pub use render::render_docx;
