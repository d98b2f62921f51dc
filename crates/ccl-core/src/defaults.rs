//! Centralized default constants for the CCL service.
//!
//! All crates reference these constants instead of defining their own
//! magic values.

// =============================================================================
// SERVER
// =============================================================================

/// Default bind address.
pub const HOST: &str = "0.0.0.0";

/// Default bind port.
pub const PORT: u16 = 8080;

/// Default request body limit (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Default CORS origins when `ALLOWED_ORIGINS` is unset.
pub const ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

// =============================================================================
// STORAGE
// =============================================================================

/// Default public directory root.
pub const PUBLIC_DIR: &str = "public";

/// Subdirectory of the public directory reserved for CCL artifacts.
pub const CCL_SUBDIR: &str = "ccls";

/// Extension of the generated document.
pub const DOCUMENT_EXT: &str = "docx";

/// Extension of the merged-field snapshot.
pub const SNAPSHOT_EXT: &str = "json";

/// Maximum matter identifier length accepted as a file stem.
pub const MATTER_ID_MAX_LEN: usize = 128;

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Path of the matters lookup relative to the matters service base URL.
pub const MATTERS_PATH: &str = "/api/matters";

/// Default staff directory dataset.
pub const STAFF_DIRECTORY_PATH: &str = "data/team.json";
