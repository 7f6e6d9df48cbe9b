//! Candidate blocking on shared strong identifiers.
//!
//! An inverted index from `(field, value)` to record positions. A pair is a
//! candidate only if the two records share some strong identifier, which is
//! exactly the condition for the 0.7 contribution. Pairs whose only evidence
//! is categorical or free text are never proposed.

use canonical::{Field, NormalizedRecord};
use fxhash::FxHashMap;

pub(crate) struct BlockingIndex<'a> {
    postings: FxHashMap<(Field, &'a str), Vec<usize>>,
}

impl<'a> BlockingIndex<'a> {
    pub(crate) fn build(records: &'a [NormalizedRecord]) -> Self {
        let mut postings: FxHashMap<(Field, &'a str), Vec<usize>> = FxHashMap::default();
        for (pos, record) in records.iter().enumerate() {
            for field in Field::STRONG {
                let Some(values) = record.get(field).as_set() else {
                    continue;
                };
                for value in values {
                    postings.entry((field, value.as_str())).or_default().push(pos);
                }
            }
        }
        Self { postings }
    }

    /// Positions in the indexed collection sharing a strong value with
    /// `record`, ascending and deduplicated.
    pub(crate) fn candidates(&self, record: &NormalizedRecord) -> Vec<usize> {
        let mut out = Vec::new();
        for field in Field::STRONG {
            let Some(values) = record.get(field).as_set() else {
                continue;
            };
            for value in values {
                if let Some(list) = self.postings.get(&(field, value.as_str())) {
                    out.extend_from_slice(list);
                }
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.postings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canonical::{normalize_collection, NormalizeConfig, RawRecord};

    #[test]
    fn candidates_share_a_strong_value() {
        let raws = vec![
            RawRecord::new(0).with(Field::Phones, "9999900000"),
            RawRecord::new(1).with(Field::Emails, "a@x.com"),
            RawRecord::new(2)
                .with(Field::Phones, "+91 99999 00000")
                .with(Field::Emails, "A@X.com"),
            RawRecord::new(3).with(Field::Platforms, "Telegram"),
        ];
        let records = normalize_collection(&raws, "Victim", &NormalizeConfig::default());
        let index = BlockingIndex::build(&records);
        assert_eq!(index.len(), 2);
        assert_eq!(index.candidates(&records[2]), vec![0, 1, 2]);
        assert_eq!(index.candidates(&records[0]), vec![0, 2]);
        assert!(index.candidates(&records[3]).is_empty());
    }

    #[test]
    fn same_value_in_different_fields_does_not_block_together() {
        let raws = vec![
            RawRecord::new(0).with(Field::BankAccounts, "12345"),
            RawRecord::new(1).with(Field::UpiIds, "12345"),
        ];
        let records = normalize_collection(&raws, "Victim", &NormalizeConfig::default());
        let index = BlockingIndex::build(&records);
        assert_eq!(index.candidates(&records[0]), vec![0]);
    }
}
