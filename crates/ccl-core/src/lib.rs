//! # ccl-core
//!
//! Core types, traits, and abstractions for client care letter (CCL)
//! generation.
//!
//! This crate provides the canonical token schema, the data model consumed by
//! the merge engine (drafts, matter records, staff entries), and the trait
//! seams that the merge and storage crates implement.
//!
//! ## Logging
//!
//! All crates log through `tracing` with shared structured field names:
//! `subsystem` (`api`, `merge`, `store`), `component`, `op`, `matter_id`,
//! `duration_ms`, `filled_count`, `staff_count`, `size_bytes`, `error`.
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Request failed, generation could not be persisted |
//! | WARN  | Recoverable issue, fallback applied (empty matter record, dropped snapshot) |
//! | INFO  | Lifecycle events (startup), completed generations |
//! | DEBUG | Decision points, derived values, configuration choices |

pub mod defaults;
pub mod error;
pub mod models;
pub mod resolve;
pub mod schema;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use resolve::{resolve, resolve_value};
pub use schema::{canonical_tokens, default_draft, is_canonical, token_group, TokenGroup};
pub use traits::*;
pub use validation::validate_matter_id;
