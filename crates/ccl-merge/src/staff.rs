//! Staff directory loaded from the static team dataset.
//!
//! Loaded once at startup and shared read-only behind an `Arc`. A dataset that
//! cannot be read or parsed yields an empty directory: every lookup then
//! resolves to "not found" and the merge carries on.

use std::collections::HashMap;
use std::path::Path;

use ccl_core::{Result, StaffMember};
use tracing::{info, warn};

/// Case-insensitive full-name index over staff records.
#[derive(Debug, Clone, Default)]
pub struct StaffDirectory {
    members: Vec<StaffMember>,
    by_name: HashMap<String, usize>,
}

impl StaffDirectory {
    /// Build a directory from records. The first record wins on duplicate names.
    pub fn new(members: Vec<StaffMember>) -> Self {
        let mut by_name = HashMap::with_capacity(members.len());
        for (idx, member) in members.iter().enumerate() {
            let key = member.display_name().to_lowercase();
            if !key.is_empty() {
                by_name.entry(key).or_insert(idx);
            }
        }
        Self { members, by_name }
    }

    /// A directory with no entries.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON array of staff records.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let members: Vec<StaffMember> = serde_json::from_slice(data)?;
        Ok(Self::new(members))
    }

    /// Load the dataset at `path`, falling back to an empty directory.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let loaded = match tokio::fs::read(path).await {
            Ok(data) => Self::from_json(&data),
            Err(e) => Err(e.into()),
        };
        match loaded {
            Ok(directory) => {
                info!(
                    subsystem = "merge",
                    component = "staff_directory",
                    path = %path.display(),
                    staff_count = directory.len(),
                    "Staff directory loaded"
                );
                directory
            }
            Err(e) => {
                warn!(
                    subsystem = "merge",
                    component = "staff_directory",
                    path = %path.display(),
                    error = %e,
                    "Staff directory unavailable, lookups will resolve empty"
                );
                Self::empty()
            }
        }
    }

    /// Exact full-name match, ignoring case and surrounding whitespace.
    pub fn lookup(&self, name: &str) -> Option<&StaffMember> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        self.by_name.get(&key).map(|&idx| &self.members[idx])
    }

    /// `"Name <email>"` when the directory has an email for `name`, else `"Name"`.
    pub fn contact(&self, name: &str) -> String {
        let name = name.trim();
        match self.lookup(name).map(StaffMember::email) {
            Some(email) if !email.is_empty() => format!("{} <{}>", name, email),
            _ => name.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DATASET: &str = r#"[
        {"Full Name": "Jane Doe", "First": "Jane", "Last": "Doe", "Email": "jane@x.com", "Role": "Partner"},
        {"Full Name": null, "First": "Sam", "Last": "Lee", "Email": "sam@x.com", "Role": "Associate"},
        {"Full Name": "Pat Kim", "Role": "Paralegal"},
        {"Full Name": "jane doe", "Email": "duplicate@x.com", "Role": "Trainee"}
    ]"#;

    fn directory() -> StaffDirectory {
        StaffDirectory::from_json(DATASET.as_bytes()).unwrap()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dir = directory();
        let member = dir.lookup("JANE DOE").unwrap();
        assert_eq!(member.role(), "Partner");
        assert_eq!(dir.lookup("  jane doe ").unwrap().email(), "jane@x.com");
    }

    #[test]
    fn test_lookup_uses_first_and_last_when_full_name_missing() {
        let dir = directory();
        assert_eq!(dir.lookup("Sam Lee").unwrap().role(), "Associate");
    }

    #[test]
    fn test_lookup_requires_exact_name() {
        let dir = directory();
        assert!(dir.lookup("Jane").is_none());
        assert!(dir.lookup("").is_none());
    }

    #[test]
    fn test_first_record_wins_on_duplicates() {
        let dir = directory();
        assert_eq!(dir.lookup("Jane Doe").unwrap().email(), "jane@x.com");
        assert_eq!(dir.len(), 4);
    }

    #[test]
    fn test_contact_formatting() {
        let dir = directory();
        assert_eq!(dir.contact("Jane Doe"), "Jane Doe <jane@x.com>");
        assert_eq!(dir.contact("Pat Kim"), "Pat Kim");
        assert_eq!(dir.contact("Unknown Person"), "Unknown Person");
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(StaffDirectory::from_json(b"{\"Full Name\": \"x\"}").is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DATASET.as_bytes()).unwrap();

        let dir = StaffDirectory::load(file.path()).await;
        assert_eq!(dir.len(), 4);
    }

    #[tokio::test]
    async fn test_load_missing_file_yields_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = StaffDirectory::load(tmp.path().join("missing.json")).await;
        assert!(dir.is_empty());
        assert!(dir.lookup("Jane Doe").is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_yields_empty_directory() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[{not json").unwrap();

        let dir = StaffDirectory::load(file.path()).await;
        assert!(dir.is_empty());
    }
}
