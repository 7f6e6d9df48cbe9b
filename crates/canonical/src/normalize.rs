use std::collections::BTreeSet;

use crate::config::{default_config, NormalizeConfig};
use crate::schema::FieldKind;
use crate::value::FieldValue;

const WEBSITE_PREFIXES: [&str; 3] = ["https://", "http://", "www."];

/// Normalize a raw value with the default configuration.
///
/// ```rust
/// use canonical::{normalize, FieldKind, FieldValue};
///
/// let phones = normalize("+91-98765-43210 | nan | 98765 43210", FieldKind::Phone);
/// assert_eq!(phones, FieldValue::StringSet(["9876543210".to_string()].into()));
/// ```
pub fn normalize(raw: &str, kind: FieldKind) -> FieldValue {
    normalize_with_config(raw, kind, default_config())
}

/// Normalize a raw value. Never fails: unusable input yields the empty value
/// for `kind`.
pub fn normalize_with_config(raw: &str, kind: FieldKind, cfg: &NormalizeConfig) -> FieldValue {
    match kind {
        FieldKind::Scalar => normalize_scalar(raw, cfg),
        FieldKind::Phone => collect_set(raw, cfg, |t| normalize_phone(t, cfg)),
        FieldKind::Email => collect_set(raw, cfg, normalize_email),
        FieldKind::Website => collect_set(raw, cfg, normalize_website),
        FieldKind::Set => collect_set(raw, cfg, str::to_string),
    }
}

/// Normalize an optional raw value; a missing column is the empty value.
pub fn normalize_optional(raw: Option<&str>, kind: FieldKind, cfg: &NormalizeConfig) -> FieldValue {
    match raw {
        Some(raw) => normalize_with_config(raw, kind, cfg),
        None => FieldValue::empty_for(kind),
    }
}

/// Remove hyphens and whitespace, then strip the country-code prefix.
pub fn normalize_phone(raw: &str, cfg: &NormalizeConfig) -> String {
    let mut phone: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    let code = cfg.country_code.as_str();
    if !code.is_empty() {
        while let Some(rest) = phone.strip_prefix(code) {
            phone = rest.to_string();
        }
    }
    phone
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Lowercase and drop any leading scheme and `www.` prefixes.
pub fn normalize_website(raw: &str) -> String {
    let mut url = raw.trim().to_lowercase();
    // Repeat so "http://www.x" and "www.https://x" both settle.
    while let Some(rest) = WEBSITE_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(*prefix))
    {
        url = rest.trim_start().to_string();
    }
    url
}

fn normalize_scalar(raw: &str, cfg: &NormalizeConfig) -> FieldValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() || cfg.is_null_token(trimmed) {
        FieldValue::EmptyScalar
    } else {
        FieldValue::Scalar(raw.to_string())
    }
}

fn collect_set<F>(raw: &str, cfg: &NormalizeConfig, canonicalize: F) -> FieldValue
where
    F: Fn(&str) -> String,
{
    let set: BTreeSet<String> = raw
        .split(cfg.delimiter.as_str())
        .map(str::trim)
        .filter(|token| is_present(token, cfg))
        .map(canonicalize)
        .filter(|token| is_present(token, cfg))
        .collect();
    FieldValue::StringSet(set)
}

fn is_present(token: &str, cfg: &NormalizeConfig) -> bool {
    !token.is_empty() && !cfg.is_null_token(token)
}
