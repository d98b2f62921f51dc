//! Engagement letter templating.
//!
//! Rendering runs in two passes. Section placeholders
//! (`{{costs_section_choice}}`, `{{charges_section_choice}}`,
//! `{{disbursements_section_choice}}`) are first expanded into the wording
//! picked in [`GenerationOptions`]; that wording may itself contain token
//! placeholders. Token placeholders are then replaced by their merged value.
//! Placeholders with no value stay in the text so the drafter can see what is
//! still unfilled.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use ccl_core::{
    ChargesChoice, CostsChoice, DisbursementsChoice, Error, GenerationOptions, MergedFieldMap,
    Result,
};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([a-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid"));

const BUILTIN_TEMPLATE: &str = include_str!("../templates/ccl_default.txt");

const NO_COSTS: &str = "We do not expect that you will have to pay another party's costs. \
This only tends to arise in litigation and is therefore not relevant to your matter.";

const RISK_COSTS: &str = "There is a risk that you may have to pay \
{{identify_the_other_party_eg_your_opponents}} costs in this matter. \
This is explained in section 5, Payment on account of costs.";

const HOURLY_RATE: &str = "Our fees are calculated on the basis of an hourly rate. \
All hourly rates are subject to the addition of VAT.\n\n\
Short letters, emails and routine phone calls are charged at 1/10 of an hour. \
All other work is timed in six minute units and charged at the relevant hourly rate.\n\n\
I estimate the cost of the Initial Scope will be £{{figure}} plus VAT.";

const NO_ESTIMATE: &str = "We cannot give an estimate of our overall charges in this matter \
because {{we_cannot_give_an_estimate_of_our_overall_charges_in_this_matter_because_reason_why_estimate_is_not_possible}}. \
The next stage in your matter is {{next_stage}} and we estimate that our charges up to the \
completion of that stage will be in the region of £{{figure_or_range}}.";

const DISBURSEMENT_TABLE: &str = "Based on the information you have provided, we expect to incur \
the following disbursements:\n\n\
Disbursement | Amount | VAT chargeable\n\
[Describe disbursement] | £[Insert estimated amount] | [Yes OR No]\n\
[Describe disbursement] | £[Insert estimated amount] | [Yes OR No]";

const DISBURSEMENT_ESTIMATE: &str = "We cannot give an exact figure for your disbursements, \
but this is likely to be in the region of £{{simple_disbursements_estimate}} in total including VAT.";

const DISBURSEMENT_ESTIMATE_EXAMPLES: &str = "We cannot give an exact figure for your \
disbursements, but this is likely to be in the region of £{{simple_disbursements_estimate}} for the \
next steps in your matter including {{give_examples_of_what_your_estimate_includes_eg_accountants_report_and_court_fees}}.";

const ESTIMATE_EXAMPLES: &str =
    "give_examples_of_what_your_estimate_includes_eg_accountants_report_and_court_fees";

/// Recognised disbursement examples, in the order they are listed.
const KNOWN_EXAMPLES: &[&str] = &["court fees", "accountants report"];

/// Letter text with `{{token}}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterTemplate {
    text: String,
}

impl Default for LetterTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LetterTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The standard engagement letter shipped with the service.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_TEMPLATE)
    }

    /// Read a template from disk.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read template {}: {}", path.display(), e))
        })?;
        Ok(Self::new(text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render the letter for `fields` using the section wording in `options`.
    pub fn render(&self, fields: &MergedFieldMap, options: &GenerationOptions) -> String {
        let expanded = expand_sections(&self.text, options);
        substitute(&expanded, &with_formatted_examples(fields))
    }
}

fn expand_sections(text: &str, options: &GenerationOptions) -> String {
    let costs = match options.costs_choice {
        CostsChoice::NoCosts => NO_COSTS,
        CostsChoice::RiskCosts => RISK_COSTS,
    };
    let charges = match options.charges_choice {
        ChargesChoice::HourlyRate => HOURLY_RATE,
        ChargesChoice::NoEstimate => NO_ESTIMATE,
    };
    let disbursements = match (options.disbursements_choice, options.show_estimate_examples) {
        (DisbursementsChoice::Table, _) => DISBURSEMENT_TABLE,
        (DisbursementsChoice::Estimate, false) => DISBURSEMENT_ESTIMATE,
        (DisbursementsChoice::Estimate, true) => DISBURSEMENT_ESTIMATE_EXAMPLES,
    };

    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match &caps[1] {
            "costs_section_choice" => costs.to_string(),
            "charges_section_choice" => charges.to_string(),
            "disbursements_section_choice" => disbursements.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

fn with_formatted_examples(fields: &MergedFieldMap) -> MergedFieldMap {
    let mut fields = fields.clone();
    if let Some(raw) = fields.get_mut(ESTIMATE_EXAMPLES) {
        *raw = format_estimate_examples(raw);
    }
    fields
}

/// Normalise the disbursement examples answer into a readable list.
///
/// Known examples found in `raw` are listed as `"a"`, `"a and b"`; any other
/// answer is kept verbatim.
pub fn format_estimate_examples(raw: &str) -> String {
    let selected: Vec<&str> = KNOWN_EXAMPLES
        .iter()
        .copied()
        .filter(|example| raw.contains(example))
        .collect();
    match selected.as_slice() {
        [] => raw.to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

fn substitute(text: &str, fields: &MergedFieldMap) -> String {
    PLACEHOLDER
        .replace_all(text, |caps: &Captures| match fields.get(&caps[1]) {
            Some(value) if !value.trim().is_empty() => value.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Distinct placeholder names still present in `text`, in order of appearance.
pub fn unresolved_placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
