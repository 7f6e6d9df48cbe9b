use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::schema::FieldKind;

/// A normalized field value.
///
/// Set-kind fields always normalize to [`FieldValue::StringSet`] (possibly
/// empty); scalar fields normalize to [`FieldValue::Scalar`] or
/// [`FieldValue::EmptyScalar`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    EmptyScalar,
    Scalar(String),
    StringSet(BTreeSet<String>),
}

impl FieldValue {
    /// The neutral value for a field of `kind`.
    pub fn empty_for(kind: FieldKind) -> Self {
        if kind.is_set() {
            FieldValue::StringSet(BTreeSet::new())
        } else {
            FieldValue::EmptyScalar
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::EmptyScalar => true,
            FieldValue::Scalar(s) => s.is_empty(),
            FieldValue::StringSet(set) => set.is_empty(),
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            FieldValue::StringSet(set) => Some(set),
            _ => None,
        }
    }

    /// Scalar text, or `None` for sets. `EmptyScalar` yields `""`.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FieldValue::EmptyScalar => Some(""),
            FieldValue::Scalar(s) => Some(s.as_str()),
            FieldValue::StringSet(_) => None,
        }
    }

    /// True if both values are sets sharing at least one entry.
    pub fn intersects(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::StringSet(a), FieldValue::StringSet(b)) => {
                let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
                small.iter().any(|v| large.contains(v))
            }
            _ => false,
        }
    }

    /// True if both values are non-empty scalars equal after lowercasing.
    pub fn scalar_eq_ignore_case(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Scalar(a), FieldValue::Scalar(b)) => {
                !a.is_empty() && !b.is_empty() && (a == b || a.to_lowercase() == b.to_lowercase())
            }
            _ => false,
        }
    }

    /// Render back into the raw delimited form accepted by the normalizer.
    pub fn render(&self, delimiter: &str) -> String {
        match self {
            FieldValue::EmptyScalar => String::new(),
            FieldValue::Scalar(s) => s.clone(),
            FieldValue::StringSet(set) => set
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(delimiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> FieldValue {
        FieldValue::StringSet(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn empty_for_follows_kind() {
        assert_eq!(FieldValue::empty_for(FieldKind::Phone), set(&[]));
        assert_eq!(FieldValue::empty_for(FieldKind::Scalar), FieldValue::EmptyScalar);
    }

    #[test]
    fn intersects_requires_two_sets() {
        assert!(set(&["a", "b"]).intersects(&set(&["b", "c"])));
        assert!(!set(&["a"]).intersects(&set(&["c"])));
        assert!(!set(&[]).intersects(&set(&[])));
        assert!(!set(&["a"]).intersects(&FieldValue::Scalar("a".into())));
    }

    #[test]
    fn scalar_equality_ignores_case_and_requires_content() {
        let a = FieldValue::Scalar("Mumbai".into());
        let b = FieldValue::Scalar("MUMBAI".into());
        assert!(a.scalar_eq_ignore_case(&b));
        assert!(!FieldValue::Scalar(String::new()).scalar_eq_ignore_case(&FieldValue::Scalar(String::new())));
        assert!(!FieldValue::EmptyScalar.scalar_eq_ignore_case(&FieldValue::EmptyScalar));
        assert!(!a.scalar_eq_ignore_case(&set(&["mumbai"])));
    }

    #[test]
    fn render_joins_sorted_entries() {
        assert_eq!(set(&["b", "a"]).render("|"), "a|b");
        assert_eq!(FieldValue::EmptyScalar.render("|"), "");
        assert_eq!(FieldValue::Scalar("x y".into()).render("|"), "x y");
    }
}
