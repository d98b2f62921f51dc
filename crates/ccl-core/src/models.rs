//! Data model for CCL merging.
//!
//! Drafts arrive as free-form JSON objects. Scalar entries are candidate token
//! values; the nested `client_information`, `matter_details`,
//! `team_assignments`, `opponents` and `generation_options` entries are
//! context the merge engine derives tokens from. Matter records come from the
//! external matters service and staff entries from the static team dataset.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::resolve::{resolve, resolve_value};

/// Client-supplied partial field values, keyed by token or context name.
pub type Draft = serde_json::Map<String, Value>;

/// Fully resolved token → value map. Always holds exactly the canonical tokens.
pub type MergedFieldMap = BTreeMap<String, String>;

// =============================================================================
// PARTIES
// =============================================================================

/// Company details nested under a client or opponent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyDetails {
    pub name: Option<String>,
}

/// A client or opponent entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub prefix: Option<String>,
    #[serde(alias = "firstName")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName")]
    pub last_name: Option<String>,
    /// Free-form full name (opponent records often carry only this).
    pub name: Option<String>,
    #[serde(alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(alias = "companyDetails")]
    pub company_details: Option<CompanyDetails>,
}

impl Party {
    /// Company name from `company_details.name`, then `company_name`.
    pub fn company(&self) -> String {
        let nested = self
            .company_details
            .as_ref()
            .and_then(|c| c.name.as_deref());
        resolve(nested, &resolve(self.company_name.as_deref(), ""))
    }

    /// Client salutation name.
    ///
    /// With a prefix: `"{prefix} {first} {last}"` trimmed. Without one the
    /// company name is used, or `""`.
    pub fn client_name(&self) -> String {
        if !resolve(self.prefix.as_deref(), "").is_empty() {
            let composed = format!(
                "{} {} {}",
                resolve(self.prefix.as_deref(), ""),
                resolve(self.first_name.as_deref(), ""),
                resolve(self.last_name.as_deref(), "")
            );
            return composed.trim().to_string();
        }
        self.company()
    }

    /// Opponent display name: `name`, then first + last, then company.
    pub fn party_name(&self) -> String {
        let explicit = resolve(self.name.as_deref(), "");
        if !explicit.is_empty() {
            return explicit;
        }
        let personal = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .map(|part| resolve(part, ""))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !personal.is_empty() {
            return personal;
        }
        self.company()
    }
}

// =============================================================================
// MATTER CONTEXT
// =============================================================================

/// Staff assigned to a matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamAssignments {
    #[serde(alias = "feeEarner")]
    pub fee_earner: Option<String>,
    #[serde(alias = "originatingSolicitor")]
    pub originating_solicitor: Option<String>,
    #[serde(alias = "supervisingPartner")]
    pub supervising_partner: Option<String>,
}

impl TeamAssignments {
    /// Fee earner, originating solicitor and supervising partner, blanks skipped.
    pub fn names(&self) -> Vec<String> {
        [
            self.fee_earner.as_deref(),
            self.originating_solicitor.as_deref(),
            self.supervising_partner.as_deref(),
        ]
        .into_iter()
        .map(|name| resolve(name, ""))
        .filter(|name| !name.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.names().is_empty()
    }
}

/// Matter references and description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatterDetails {
    #[serde(alias = "matterRef")]
    pub matter_ref: Option<String>,
    #[serde(alias = "instructionRef")]
    pub instruction_ref: Option<String>,
    pub description: Option<String>,
}

impl MatterDetails {
    /// Matter reference, falling back to the instruction reference.
    pub fn reference(&self) -> String {
        resolve(
            self.matter_ref.as_deref(),
            &resolve(self.instruction_ref.as_deref(), ""),
        )
    }
}

/// Matter record as returned by the matters service.
///
/// Read-only here; any field may be missing. Decoding is lenient: each field
/// is read on its own under the naming variants the matters sources use, and
/// an off-type field resolves to its default without discarding the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatterRecord {
    pub client_information: Vec<Party>,
    pub matter_details: MatterDetails,
    pub team_assignments: TeamAssignments,
    pub opponents: Vec<Party>,
    pub description: Option<String>,
    pub display_number: Option<String>,
}

const CLIENT_KEYS: &[&str] = &["client_information", "clientInformation", "ClientInformation"];
const DETAILS_KEYS: &[&str] = &["matter_details", "matterDetails", "MatterDetails"];
const TEAM_KEYS: &[&str] = &["team_assignments", "teamAssignments", "TeamAssignments"];
const OPPONENT_KEYS: &[&str] = &["opponents", "Opponents", "opponent"];
const DESCRIPTION_KEYS: &[&str] = &["description", "Description", "matter_name"];
const DISPLAY_NUMBER_KEYS: &[&str] = &[
    "display_number",
    "displayNumber",
    "DisplayNumber",
    "Display Number",
    "number",
];

impl MatterRecord {
    /// Build a record from an arbitrary JSON body. Non-objects yield the default.
    pub fn from_value(value: &Value) -> Self {
        let Some(body) = value.as_object() else {
            debug!("Matter record is not an object, using empty record");
            return Self::default();
        };

        Self {
            client_information: parse_parties(first_present(body, CLIENT_KEYS), "client_information"),
            matter_details: parse_or_default(first_present(body, DETAILS_KEYS), "matter_details"),
            team_assignments: parse_or_default(first_present(body, TEAM_KEYS), "team_assignments"),
            opponents: parse_parties(first_present(body, OPPONENT_KEYS), "opponents"),
            description: optional_scalar(first_present(body, DESCRIPTION_KEYS)),
            display_number: optional_scalar(first_present(body, DISPLAY_NUMBER_KEYS)),
        }
    }
}

impl<'de> Deserialize<'de> for MatterRecord {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

impl MatterRecord {
    /// Matter description, falling back to the nested matter details.
    pub fn description(&self) -> String {
        resolve(
            self.description.as_deref(),
            &resolve(self.matter_details.description.as_deref(), ""),
        )
    }

    pub fn display_number(&self) -> String {
        resolve(self.display_number.as_deref(), "")
    }
}

// =============================================================================
// GENERATION OPTIONS
// =============================================================================

/// Wording of the "costs you may have to pay another party" section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostsChoice {
    NoCosts,
    #[default]
    RiskCosts,
}

/// Wording of the "our charges" section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargesChoice {
    HourlyRate,
    #[default]
    NoEstimate,
}

/// Wording of the disbursements section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementsChoice {
    Table,
    #[default]
    Estimate,
}

/// Letter section choices made in the drafting UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    #[serde(alias = "costsChoice")]
    pub costs_choice: CostsChoice,
    #[serde(alias = "chargesChoice")]
    pub charges_choice: ChargesChoice,
    #[serde(alias = "disbursementsChoice")]
    pub disbursements_choice: DisbursementsChoice,
    #[serde(alias = "showEstimateExamples")]
    pub show_estimate_examples: bool,
}

// =============================================================================
// DRAFT CONTEXT
// =============================================================================

/// Nested context parsed out of a draft.
///
/// Each entry is parsed on its own; a malformed entry resolves to its default
/// without affecting the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftContext {
    pub client_information: Vec<Party>,
    pub matter_details: MatterDetails,
    pub team_assignments: TeamAssignments,
    pub opponents: Vec<Party>,
    pub generation_options: GenerationOptions,
}

impl DraftContext {
    pub fn from_draft(draft: &Draft) -> Self {
        Self {
            client_information: parse_parties(draft.get("client_information"), "client_information"),
            matter_details: parse_or_default(draft.get("matter_details"), "matter_details"),
            team_assignments: parse_or_default(draft.get("team_assignments"), "team_assignments"),
            opponents: parse_parties(draft.get("opponents"), "opponents"),
            generation_options: parse_or_default(draft.get("generation_options"), "generation_options"),
        }
    }
}

fn first_present<'a>(body: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find(|value| !value.is_null())
}

fn optional_scalar(value: Option<&Value>) -> Option<String> {
    Some(resolve_value(value, "")).filter(|v| !v.is_empty())
}

fn parse_or_default<T>(value: Option<&Value>, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            debug!(entry = key, error = %e, "Ignoring malformed entry");
            T::default()
        }),
    }
}

/// A list of parties, or a single party object; unreadable entries are skipped.
fn parse_parties(value: Option<&Value>, key: &str) -> Vec<Party> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(party) => Some(party),
                Err(e) => {
                    debug!(entry = key, error = %e, "Skipping malformed party");
                    None
                }
            })
            .collect(),
        Some(item @ Value::Object(_)) => parse_parties(Some(&Value::Array(vec![item.clone()])), key),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => {
            debug!(entry = key, "Ignoring non-list party entry");
            Vec::new()
        }
    }
}

// =============================================================================
// STAFF
// =============================================================================

/// One record of the static staff dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaffMember {
    #[serde(rename = "Full Name")]
    pub full_name: Option<String>,
    #[serde(rename = "First")]
    pub first: Option<String>,
    #[serde(rename = "Last")]
    pub last: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "Role")]
    pub role: Option<String>,
}

impl StaffMember {
    /// `Full Name`, or `First Last` when the full name is blank.
    pub fn display_name(&self) -> String {
        let full = resolve(self.full_name.as_deref(), "");
        if !full.is_empty() {
            return full;
        }
        format!(
            "{} {}",
            resolve(self.first.as_deref(), ""),
            resolve(self.last.as_deref(), "")
        )
        .trim()
        .to_string()
    }

    pub fn email(&self) -> String {
        resolve(self.email.as_deref(), "")
    }

    pub fn role(&self) -> String {
        resolve(self.role.as_deref(), "")
    }
}
