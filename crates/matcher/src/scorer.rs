//! Pairwise scoring of two normalized records.

use canonical::{Field, FieldValue, NormalizedRecord};
use semantic::{sanitize_similarity, SimilarityOracle, TextRef};

use crate::types::{PairScore, ScoreWeights};

/// Score one pair of records.
///
/// Evidence accumulates in field order: strong identifiers, then medium and
/// weak categorical fields, then free-text similarity. The sum is capped at
/// `weights.cap`. Scoring never fails and never mutates its inputs.
pub fn score_pair(
    a: &NormalizedRecord,
    b: &NormalizedRecord,
    oracle: &dyn SimilarityOracle,
    weights: &ScoreWeights,
) -> PairScore {
    let mut total = 0f64;
    let mut reasons = Vec::new();

    for field in Field::STRONG {
        if a.get(field).intersects(b.get(field)) {
            total += weights.strong;
            reasons.push(format!("same {field}"));
        }
    }

    for field in Field::MEDIUM {
        if medium_match(a.get(field), b.get(field)) {
            total += weights.medium;
            reasons.push(format!("same {field}"));
        }
    }

    for field in Field::WEAK {
        if a.get(field).scalar_eq_ignore_case(b.get(field)) {
            total += weights.weak;
            reasons.push(format!("same {field}"));
        }
    }

    for field in Field::FREE_TEXT {
        let (ta, tb) = (a.text(field), b.text(field));
        if ta.trim().is_empty() || tb.trim().is_empty() {
            continue;
        }
        let sim = sanitize_similarity(oracle.similarity(
            &TextRef::new(a.reference(), field, ta),
            &TextRef::new(b.reference(), field, tb),
        ));
        // Oracles answer in f32; compare at that precision so a similarity
        // equal to the cutoff stays on it.
        if sim > weights.text_min_similarity as f32 {
            total += f64::from(sim) * weights.text;
            reasons.push(format!("{field} similarity {sim:.2}"));
        }
    }

    PairScore {
        score: total.min(weights.cap),
        reasons,
    }
}

/// Two sets match on overlap; anything else needs two equal non-empty
/// scalars. A set never equals a scalar.
fn medium_match(a: &FieldValue, b: &FieldValue) -> bool {
    match (a, b) {
        (FieldValue::StringSet(_), FieldValue::StringSet(_)) => a.intersects(b),
        _ => a.scalar_eq_ignore_case(b),
    }
}
