//! Canonical merge-field token registry.
//!
//! The registry is the single vocabulary of `{{token}}` placeholders a client
//! care letter recognises. It is ordered by definition: core tokens first,
//! then the extended letter tokens, then matter metadata. Every merged field
//! map carries exactly these keys.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, HashSet};

/// Tokens populated from the client, matter and fee earner.
pub const CORE_TOKENS: &[&str] = &[
    "insert_clients_name",
    "insert_heading_eg_matter_description",
    "matter",
    "name_of_person_handling_matter",
    "status",
    "email",
    "name_of_handler",
    "handler",
    "name",
    "insert_current_position_and_scope_of_retainer",
    "next_steps",
    "realistic_timescale",
    "identify_the_other_party_eg_your_opponents",
];

/// Tokens used by the full engagement letter body.
pub const EXTENDED_TOKENS: &[&str] = &[
    "names_and_contact_details_of_other_members_of_staff_who_can_help_with_queries",
    "figure",
    "figure_or_range",
    "next_stage",
    "and_or_intervals_eg_every_three_months",
    "may_will",
    "contact_details_for_marketing_opt_out",
    "link_to_preference_centre",
    "instructions_link",
    "we_cannot_give_an_estimate_of_our_overall_charges_in_this_matter_because_reason_why_estimate_is_not_possible",
    "simple_disbursements_estimate",
    "give_examples_of_what_your_estimate_includes_eg_accountants_report_and_court_fees",
];

/// Matter metadata carried alongside the letter tokens.
pub const METADATA_TOKENS: &[&str] = &["display_number"];

/// Which part of the registry a token was defined in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenGroup {
    Core,
    Extended,
    Metadata,
}

static CANONICAL: Lazy<Vec<&'static str>> = Lazy::new(|| {
    CORE_TOKENS
        .iter()
        .chain(EXTENDED_TOKENS)
        .chain(METADATA_TOKENS)
        .copied()
        .collect()
});

static CANONICAL_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| CANONICAL.iter().copied().collect());

/// Canonical token names in definition order.
pub fn canonical_tokens() -> &'static [&'static str] {
    &CANONICAL
}

/// A fresh token → `""` map for initialising an empty draft.
pub fn default_draft() -> BTreeMap<String, String> {
    CANONICAL
        .iter()
        .map(|token| (token.to_string(), String::new()))
        .collect()
}

/// Whether `token` belongs to the canonical set.
pub fn is_canonical(token: &str) -> bool {
    CANONICAL_SET.contains(token)
}

/// Registry group of a canonical token, `None` for unknown tokens.
pub fn token_group(token: &str) -> Option<TokenGroup> {
    if CORE_TOKENS.contains(&token) {
        Some(TokenGroup::Core)
    } else if EXTENDED_TOKENS.contains(&token) {
        Some(TokenGroup::Extended)
    } else if METADATA_TOKENS.contains(&token) {
        Some(TokenGroup::Metadata)
    } else {
        None
    }
}
