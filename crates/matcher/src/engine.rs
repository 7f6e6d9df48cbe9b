use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;

use canonical::{Field, NormalizedRecord};
use rayon::prelude::*;
use semantic::{SimilarityOracle, TextRef};
use tracing::{debug, info, info_span};

use crate::blocking::BlockingIndex;
use crate::metrics::metrics_recorder;
use crate::scorer::score_pair;
use crate::types::{MatchConfig, MatchError, MatchHit, MatchMode, MatchReport, MatchStats, PairScore};


/// Scores and ranks record pairs against an injected similarity oracle.
pub struct Matcher {
    oracle: Arc<dyn SimilarityOracle>,
    config: MatchConfig,
}

struct RowResult {
    scored: usize,
    hits: Vec<MatchHit>,
}

impl Matcher {
    /// Build a matcher; the config is validated up front.
    pub fn new(oracle: Arc<dyn SimilarityOracle>, config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self { oracle, config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn oracle(&self) -> &Arc<dyn SimilarityOracle> {
        &self.oracle
    }

    /// Score a single pair.
    pub fn score(&self, a: &NormalizedRecord, b: &NormalizedRecord) -> PairScore {
        score_pair(a, b, self.oracle.as_ref(), &self.config.weights)
    }

    /// Every `(i, j)` of `left × right` scoring at least `threshold`,
    /// best first. Ties keep `(i, j)` order.
    pub fn cross_match(
        &self,
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        threshold: f64,
    ) -> Vec<MatchHit> {
        self.cross_match_report(left, right, threshold).hits
    }

    /// Every `i < j` pair within `records` scoring at least `threshold`,
    /// best first. Ties keep `(i, j)` order.
    pub fn within_match(&self, records: &[NormalizedRecord], threshold: f64) -> Vec<MatchHit> {
        self.within_match_report(records, threshold).hits
    }

    pub fn cross_match_report(
        &self,
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        threshold: f64,
    ) -> MatchReport {
        let span = info_span!("matcher.cross_match", left = left.len(), right = right.len());
        let _guard = span.enter();
        let mut texts = free_texts(left);
        texts.extend(free_texts(right));
        self.oracle.prepare(&texts);
        self.enumerate(MatchMode::Cross, left, right, threshold)
    }

    pub fn within_match_report(&self, records: &[NormalizedRecord], threshold: f64) -> MatchReport {
        let span = info_span!("matcher.within_match", records = records.len());
        let _guard = span.enter();
        self.oracle.prepare(&free_texts(records));
        self.enumerate(MatchMode::Within, records, records, threshold)
    }

    fn enumerate(
        &self,
        mode: MatchMode,
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        threshold: f64,
    ) -> MatchReport {
        let start = Instant::now();
        let blocking = self.config.blocking.then(|| BlockingIndex::build(right));

        let row = |i: usize| -> RowResult {
            let first = match mode {
                MatchMode::Cross => 0,
                MatchMode::Within => i + 1,
            };
            match &blocking {
                Some(index) => {
                    // In within mode the index covers `left` itself, so a record
                    // is its own candidate; `first` drops it and all earlier rows.
                    let cols = index.candidates(&left[i]);
                    self.score_row(i, left, right, cols.into_iter().filter(|j| *j >= first), threshold)
                }
                None => self.score_row(i, left, right, first..right.len(), threshold),
            }
        };

        let rows: Vec<RowResult> = if self.config.parallel {
            (0..left.len()).into_par_iter().map(row).collect()
        } else {
            (0..left.len()).map(row).collect()
        };

        let pairs_scored = rows.iter().map(|r| r.scored).sum();
        let mut hits: Vec<MatchHit> = rows.into_iter().flat_map(|r| r.hits).collect();
        // Stable: equal scores stay in enumeration order.
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

        let stats = MatchStats {
            mode,
            candidate_pairs: candidate_pairs(mode, left.len(), right.len()),
            pairs_scored,
            hits: hits.len(),
            elapsed_micros: start.elapsed().as_micros() as u64,
        };

        info!(
            mode = %mode,
            threshold,
            blocking = self.config.blocking,
            parallel = self.config.parallel,
            candidate_pairs = stats.candidate_pairs,
            pairs_scored = stats.pairs_scored,
            hits = stats.hits,
            elapsed_micros = stats.elapsed_micros,
            "match_pass_complete"
        );

        if let Some(recorder) = metrics_recorder() {
            recorder.record_pass(&stats, start.elapsed());
        }

        MatchReport { hits, stats }
    }

    fn score_row(
        &self,
        i: usize,
        left: &[NormalizedRecord],
        right: &[NormalizedRecord],
        cols: impl Iterator<Item = usize>,
        threshold: f64,
    ) -> RowResult {
        let a = &left[i];
        let mut scored = 0;
        let mut hits = Vec::new();
        for j in cols {
            let b = &right[j];
            let pair = self.score(a, b);
            scored += 1;
            if pair.score >= threshold {
                debug!(
                    left = %a.reference(),
                    right = %b.reference(),
                    score = pair.score,
                    "match_retained"
                );
                hits.push(MatchHit {
                    left: a.reference().clone(),
                    right: b.reference().clone(),
                    score: pair.score,
                    reasons: pair.reasons,
                });
            }
        }
        RowResult { scored, hits }
    }
}

fn candidate_pairs(mode: MatchMode, left: usize, right: usize) -> usize {
    match mode {
        MatchMode::Cross => left.saturating_mul(right),
        MatchMode::Within => left.saturating_mul(left.saturating_sub(1)) / 2,
    }
}

/// Non-empty free-text values of every record, for oracle warm-up.
fn free_texts(records: &[NormalizedRecord]) -> Vec<TextRef<'_>> {
    records
        .iter()
        .flat_map(|record| {
            Field::FREE_TEXT.into_iter().filter_map(move |field| {
                let text = record.text(field);
                (!text.trim().is_empty()).then(|| TextRef::new(record.reference(), field, text))
            })
        })
        .collect()
}
