//! # ccl-merge
//!
//! Resolves a client care letter draft into a complete merged field map.
//!
//! - [`MergeEngine`]: combines a draft, the matter record and the staff
//!   directory into exactly the canonical token set
//! - [`StaffDirectory`]: process-wide, read-only name → role/email lookup
//! - [`HttpMatterSource`]: best-effort matters service client
//! - [`LetterTemplate`]: `{{token}}` substitution into the engagement letter

pub mod engine;
pub mod matters_client;
pub mod staff;
pub mod static_source;
pub mod template;

pub use engine::{merge_fields, MergeEngine};
pub use matters_client::HttpMatterSource;
pub use staff::StaffDirectory;
pub use static_source::StaticMatterSource;
pub use template::{unresolved_placeholders, LetterTemplate};
