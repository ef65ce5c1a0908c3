//! Placeholder tokens and literal-value detection
//!
//! Templates carry `<field_name>` tokens only. Questions, on the other
//! hand, may embed real values; those are recognised here so the field
//! counts as supplied, but the value itself is never copied anywhere.

use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([A-Za-z][A-Za-z0-9_\-]*)>").expect("valid regex"));

static OCID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bocid1\.[a-z0-9]+\.[a-z0-9-]*\.[a-z0-9-]*\.[a-z0-9]+").expect("valid regex"));

/// One recogniser per field whose value has a fixed shape
static RECOGNISERS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("instance_id", r"\bocid1\.instance\."),
        ("compartment_id", r"\bocid1\.(?:compartment|tenancy)\."),
        ("tenancy_id", r"\bocid1\.tenancy\."),
        ("vcn_id", r"\bocid1\.vcn\."),
        ("subnet_id", r"\bocid1\.subnet\."),
        ("volume_id", r"\bocid1\.volume\."),
        ("image_id", r"\bocid1\.image\."),
        ("availability_domain", r"\b[A-Za-z0-9]{4}:[A-Z0-9-]+-AD-\d\b"),
        ("shape", r"\b(?:VM|BM)\.[A-Za-z0-9]+(?:\.[A-Za-z0-9]+)+"),
        ("cidr_block", r"\b\d{1,3}(?:\.\d{1,3}){3}/\d{1,2}\b"),
        ("display_name", r#"(?i)\b(?:display[ _-]name|rename\s+(?:it\s+)?to)\s+(?:to\s+|as\s+)?["'`][^"'`]+["'`]"#),
        ("action", r"(?i)\b(?:start|stop|reset|softreset|softstop|reboot)\b"),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Free-text fields introduced by a keyword. Group 1 is a quoted value,
/// group 2 a bare token that still has to look like a name.
static NAMED_VALUES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("bucket_name", r#"(?i)\bbucket\s+(?:named|called)\s+(?:["'`]([^"'`\s]+)["'`]|([A-Za-z0-9_.\-]+))"#),
        ("namespace", r#"(?i)\bnamespace\s+(?:named|called|is|=|:)\s*(?:["'`]([^"'`\s]+)["'`]|([A-Za-z0-9_.\-]+))"#),
    ]
    .into_iter()
    .map(|(field, pattern)| (field, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// A bare token counts as a name only if it carries a digit or a separator;
/// plain words ("unknown", "required", "in") do not.
fn is_name_shaped(token: &str) -> bool {
    let token = token.trim_end_matches('.');
    !token.is_empty()
        && token
            .chars()
            .any(|c| c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

/// The placeholder token for a field, e.g. `<instance_id>`
pub fn placeholder(field: &str) -> String {
    format!("<{}>", field)
}

/// Field names of all placeholder tokens in a text, in order of appearance
pub fn placeholders_in(text: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|c| c[1].to_string())
        .collect()
}

/// Whether a single token is a placeholder
pub fn is_placeholder(token: &str) -> bool {
    PLACEHOLDER
        .find(token)
        .is_some_and(|m| m.start() == 0 && m.end() == token.len())
}

/// Whether the text contains a concrete OCI resource identifier
pub fn contains_literal_identifier(text: &str) -> bool {
    OCID.is_match(text)
}

/// Whether the question itself supplies a concrete value for `field`
///
/// Fields without a recogniser are never considered supplied.
pub fn supplied_in(field: &str, question: &str) -> bool {
    if let Some((_, regex)) = NAMED_VALUES.iter().find(|(name, _)| *name == field) {
        return regex.captures_iter(question).any(|c| {
            c.get(1).is_some() || c.get(2).is_some_and(|m| is_name_shaped(m.as_str()))
        });
    }

    RECOGNISERS
        .iter()
        .find(|(name, _)| *name == field)
        .is_some_and(|(_, regex)| regex.is_match(question))
}

/// Whether every required field appears as a placeholder and no literal
/// identifier is present
pub fn is_placeholder_safe(template: &str, required_fields: &[String]) -> bool {
    !contains_literal_identifier(template)
        && required_fields
            .iter()
            .all(|field| template.contains(&placeholder(field)))
}
