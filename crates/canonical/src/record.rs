//! Raw and normalized record types.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::NormalizeConfig;
use crate::normalize::normalize_optional;
use crate::schema::Field;
use crate::value::FieldValue;

/// Identity of a record within a matching run: its collection label and row
/// position. Displays as `"<label> <position>"`, e.g. `"Victim 3"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordRef {
    pub collection: Arc<str>,
    pub position: usize,
}

impl RecordRef {
    pub fn new(collection: impl Into<Arc<str>>, position: usize) -> Self {
        Self {
            collection: collection.into(),
            position,
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.collection, self.position)
    }
}

/// A parsed but not yet normalized row: column name to raw string.
///
/// Columns outside the schema are kept but ignored by normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub position: usize,
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new(position: usize) -> Self {
        Self {
            position,
            fields: HashMap::new(),
        }
    }

    /// Builder-style setter keyed by schema field.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.fields.insert(field.name().to_string(), value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(field.name()).map(String::as_str)
    }

    /// Insert an empty string for every schema column the row lacks.
    /// Returns the number of columns added.
    pub fn ensure_all_fields(&mut self) -> usize {
        let mut added = 0;
        for field in Field::ALL {
            if !self.fields.contains_key(field.name()) {
                self.fields.insert(field.name().to_string(), String::new());
                added += 1;
            }
        }
        added
    }
}

/// A record in scored form: every schema field present and canonical.
///
/// Deserializing rejects input that does not carry one value per field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "NormalizedRecordRepr")]
pub struct NormalizedRecord {
    reference: RecordRef,
    values: Vec<FieldValue>,
}

#[derive(Deserialize)]
struct NormalizedRecordRepr {
    reference: RecordRef,
    values: Vec<FieldValue>,
}

impl TryFrom<NormalizedRecordRepr> for NormalizedRecord {
    type Error = String;

    fn try_from(repr: NormalizedRecordRepr) -> Result<Self, Self::Error> {
        if repr.values.len() != Field::COUNT {
            return Err(format!(
                "{} carries {} field values, expected {}",
                repr.reference,
                repr.values.len(),
                Field::COUNT
            ));
        }
        Ok(Self {
            reference: repr.reference,
            values: repr.values,
        })
    }
}

impl NormalizedRecord {
    pub fn reference(&self) -> &RecordRef {
        &self.reference
    }

    pub fn get(&self, field: Field) -> &FieldValue {
        &self.values[field.index()]
    }

    /// Scalar text of a field, `""` for empty values and sets.
    pub fn text(&self, field: Field) -> &str {
        self.get(field).as_scalar().unwrap_or("")
    }

    /// Iterate `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldValue)> + '_ {
        Field::ALL.iter().copied().zip(self.values.iter())
    }
}

/// Normalize one raw row into scored form.
pub fn normalize_record(
    raw: &RawRecord,
    collection: &Arc<str>,
    cfg: &NormalizeConfig,
) -> NormalizedRecord {
    let values = Field::ALL
        .iter()
        .map(|field| normalize_optional(raw.get(*field), field.kind(), cfg))
        .collect();
    NormalizedRecord {
        reference: RecordRef {
            collection: Arc::clone(collection),
            position: raw.position,
        },
        values,
    }
}

/// Normalize a whole collection under one label.
pub fn normalize_collection(
    raws: &[RawRecord],
    label: &str,
    cfg: &NormalizeConfig,
) -> Vec<NormalizedRecord> {
    let collection: Arc<str> = Arc::from(label);
    raws.iter()
        .map(|raw| normalize_record(raw, &collection, cfg))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn record_ref_displays_label_and_position() {
        assert_eq!(RecordRef::new("Victim", 3).to_string(), "Victim 3");
    }

    #[test]
    fn missing_columns_normalize_to_empty_values() {
        let raw = RawRecord::new(0).with(Field::Phones, "+91-98765-43210");
        let rec = normalize_record(&raw, &Arc::from("Victim"), &NormalizeConfig::default());

        let phones: BTreeSet<String> = ["9876543210".to_string()].into();
        assert_eq!(rec.get(Field::Phones), &FieldValue::StringSet(phones));
        assert_eq!(rec.get(Field::Emails), &FieldValue::StringSet(BTreeSet::new()));
        assert_eq!(rec.get(Field::Description), &FieldValue::EmptyScalar);
        assert_eq!(rec.text(Field::Description), "");
        assert_eq!(rec.iter().count(), Field::COUNT);
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let mut raw = RawRecord::new(1);
        raw.fields.insert("extra".into(), "value".into());
        let rec = normalize_record(&raw, &Arc::from("Official"), &NormalizeConfig::default());
        assert!(rec.iter().all(|(_, v)| v.is_empty()));
        assert_eq!(rec.reference().to_string(), "Official 1");
    }

    #[test]
    fn ensure_all_fields_pads_missing_columns() {
        let mut raw = RawRecord::new(0).with(Field::Emails, "a@b.c");
        assert_eq!(raw.ensure_all_fields(), Field::COUNT - 1);
        assert_eq!(raw.get(Field::Emails), Some("a@b.c"));
        assert_eq!(raw.get(Field::Platforms), Some(""));
        assert_eq!(raw.ensure_all_fields(), 0);
    }

    #[test]
    fn collection_shares_label_and_keeps_positions() {
        let raws = vec![RawRecord::new(0), RawRecord::new(1), RawRecord::new(2)];
        let recs = normalize_collection(&raws, "Victim", &NormalizeConfig::default());
        let labels: Vec<String> = recs.iter().map(|r| r.reference().to_string()).collect();
        assert_eq!(labels, vec!["Victim 0", "Victim 1", "Victim 2"]);
    }

    #[test]
    fn deserialize_rejects_wrong_field_count() {
        let short = r#"{"reference":{"collection":"Victim","position":0},"values":[]}"#;
        let err = serde_json::from_str::<NormalizedRecord>(short).unwrap_err();
        assert!(err.to_string().contains("expected"), "{err}");

        let raw = RawRecord::new(4).with(Field::UpiIds, "refund.desk@okaxis");
        let rec = normalize_record(&raw, &Arc::from("Victim"), &NormalizeConfig::default());
        let json = serde_json::to_string(&rec).unwrap();
        let back: NormalizedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
        assert!(!back.get(Field::UpiIds).is_empty());
    }

    #[test]
    fn normalizing_does_not_mutate_input() {
        let raw = RawRecord::new(0).with(Field::Websites, "HTTPS://WWW.X.COM");
        let before = raw.clone();
        let _ = normalize_record(&raw, &Arc::from("Victim"), &NormalizeConfig::default());
        assert_eq!(raw, before);
    }
}
