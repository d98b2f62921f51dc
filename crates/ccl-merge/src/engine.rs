//! Field merge engine.
//!
//! Resolves a draft into a [`MergedFieldMap`] holding exactly the canonical
//! tokens. Derivation order:
//!
//! 1. Canonical scalar entries of the draft seed the map; a draft `estimate`
//!    answers the disbursements estimate when that token is blank
//! 2. Client name from the first client (draft, else matter record)
//! 3. Heading from the matter description
//! 4. `matter` from the draft's matter reference, overridden by the matter
//!    record's display number
//! 5. Handler from the fee earner, with role and email from the staff directory
//! 6. Staff contact list from the team assignments
//! 7. Handler and client aliases
//! 8. Opposing party, only when the draft left it blank
//! 9. Every remaining canonical token defaults to `""`
//! 10. `display_number` from the matter record
//!
//! A derived value only replaces a draft value when it is non-empty, except
//! that the display number always wins for `matter`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use ccl_core::{
    canonical_tokens, is_canonical, resolve, resolve_value, token_group, Draft, DraftContext,
    MatterRecord, MatterSource, MergedFieldMap, Party, TokenGroup,
};

use crate::staff::StaffDirectory;

const CLIENT_NAME: &str = "insert_clients_name";
const HEADING: &str = "insert_heading_eg_matter_description";
const MATTER: &str = "matter";
const HANDLER_FULL: &str = "name_of_person_handling_matter";
const STATUS: &str = "status";
const EMAIL: &str = "email";
const STAFF_CONTACTS: &str =
    "names_and_contact_details_of_other_members_of_staff_who_can_help_with_queries";
const NAME_OF_HANDLER: &str = "name_of_handler";
const HANDLER: &str = "handler";
const NAME: &str = "name";
const OTHER_PARTY: &str = "identify_the_other_party_eg_your_opponents";
const DISPLAY_NUMBER: &str = "display_number";
const DISBURSEMENTS_ESTIMATE: &str = "simple_disbursements_estimate";
/// Draft key the drafting form uses for the disbursements estimate.
const ESTIMATE_ANSWER: &str = "estimate";

/// Merges drafts against the matters service and staff directory.
#[derive(Clone)]
pub struct MergeEngine {
    matters: Arc<dyn MatterSource>,
    staff: Arc<StaffDirectory>,
}

impl MergeEngine {
    pub fn new(matters: Arc<dyn MatterSource>, staff: Arc<StaffDirectory>) -> Self {
        Self { matters, staff }
    }

    pub fn staff(&self) -> &StaffDirectory {
        &self.staff
    }

    /// Resolve `draft` for `matter_id` into a complete field map.
    ///
    /// Never fails: an unavailable matter record is logged and treated as empty.
    pub async fn merge(&self, matter_id: Option<&str>, draft: &Draft) -> MergedFieldMap {
        let start = Instant::now();
        let record = self.fetch_record(matter_id).await;
        let fields = merge_fields(draft, &record, &self.staff);

        debug!(
            subsystem = "merge",
            op = "merge",
            matter_id = matter_id.unwrap_or(""),
            filled_count = fields.values().filter(|v| !v.is_empty()).count(),
            empty_core = fields
                .iter()
                .filter(|(k, v)| v.is_empty() && token_group(k) == Some(TokenGroup::Core))
                .count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Draft merged"
        );
        fields
    }

    async fn fetch_record(&self, matter_id: Option<&str>) -> MatterRecord {
        let Some(id) = matter_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return MatterRecord::default();
        };
        match self.matters.fetch_matter(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    subsystem = "merge",
                    component = "matters_client",
                    matter_id = id,
                    error = %e,
                    "Matter lookup failed, merging without matter record"
                );
                MatterRecord::default()
            }
        }
    }
}

/// Deterministic merge of a draft with a matter record and staff snapshot.
pub fn merge_fields(
    draft: &Draft,
    record: &MatterRecord,
    staff: &StaffDirectory,
) -> MergedFieldMap {
    let ctx = DraftContext::from_draft(draft);

    let mut fields: MergedFieldMap = draft
        .iter()
        .filter(|(key, _)| is_canonical(key))
        .map(|(key, value)| (key.clone(), resolve_value(Some(value), "")))
        .collect();

    if current(&fields, DISBURSEMENTS_ESTIMATE).is_empty() {
        let answer = resolve_value(draft.get(ESTIMATE_ANSWER), "");
        set_if_present(&mut fields, DISBURSEMENTS_ESTIMATE, &answer);
    }

    let clients = prefer_draft(&ctx.client_information, &record.client_information);
    let client_name = clients.first().map(Party::client_name).unwrap_or_default();
    set_if_present(&mut fields, CLIENT_NAME, &client_name);

    set_if_present(&mut fields, HEADING, &record.description());

    set_if_present(&mut fields, MATTER, &ctx.matter_details.reference());
    set_if_present(&mut fields, MATTER, &record.display_number());

    let team = if ctx.team_assignments.is_empty() {
        &record.team_assignments
    } else {
        &ctx.team_assignments
    };
    set_if_present(
        &mut fields,
        HANDLER_FULL,
        &resolve(team.fee_earner.as_deref(), ""),
    );
    let handler = current(&fields, HANDLER_FULL);

    if let Some(member) = staff.lookup(&handler) {
        set_if_present(&mut fields, STATUS, &member.role());
        set_if_present(&mut fields, EMAIL, &member.email());
    }

    let contacts = team
        .names()
        .iter()
        .map(|name| staff.contact(name))
        .collect::<Vec<_>>()
        .join(", ");
    set_if_present(&mut fields, STAFF_CONTACTS, &contacts);

    set_if_present(&mut fields, NAME_OF_HANDLER, &handler);
    set_if_present(&mut fields, HANDLER, &handler);
    set_if_present(&mut fields, NAME, &client_name);

    if current(&fields, OTHER_PARTY).is_empty() {
        let opponents = prefer_draft(&ctx.opponents, &record.opponents);
        let opponent = opponents.first().map(Party::party_name).unwrap_or_default();
        set_if_present(&mut fields, OTHER_PARTY, &opponent);
    }

    for token in canonical_tokens() {
        fields.entry(token.to_string()).or_default();
    }

    set_if_present(&mut fields, DISPLAY_NUMBER, &record.display_number());

    fields
}

fn prefer_draft<'a>(draft: &'a [Party], record: &'a [Party]) -> &'a [Party] {
    if draft.is_empty() {
        record
    } else {
        draft
    }
}

fn current(fields: &MergedFieldMap, token: &str) -> String {
    resolve(fields.get(token).map(String::as_str), "")
}

fn set_if_present(fields: &mut MergedFieldMap, token: &str, value: &str) {
    if !value.is_empty() {
        fields.insert(token.to_string(), value.to_string());
    }
}
