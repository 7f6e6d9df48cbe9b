//! # scamlink matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` decides which pairs of normalized scam reports most likely
//! describe the same actor or incident. It sits on top of `canonical`
//! (normalized records) and `semantic` (the text similarity oracle).
//!
//! Two passes are offered:
//! - **Cross** – every victim report against every official record.
//! - **Within** – every unordered pair of victim reports, never a record with
//!   itself.
//!
//! Both keep pairs scoring at least the caller's threshold and rank them best
//! first. Ties keep enumeration order, so output is reproducible whether rows
//! are scored sequentially or on the rayon pool.
//!
//! ## Scoring
//!
//! Evidence is additive and capped at 1.0 (see [`ScoreWeights`]):
//! - each strong identifier field with a shared value (phones, bank accounts,
//!   UPI ids, emails, websites, social handles, IP addresses, crypto wallets)
//!   adds 0.7;
//! - each matching medium field (institute, locations, platforms, contact
//!   methods) adds 0.3;
//! - each matching weak field (language accent, scam category, payment
//!   method) adds 0.2;
//! - each free-text field whose similarity `s` exceeds 0.3 adds `s * 0.1`.
//!
//! Every contribution leaves a reason such as `"same phones"` or
//! `"description similarity 0.60"`.
//!
//! ## Core Types
//!
//! - [`Matcher`]: owns the oracle and [`MatchConfig`]; runs both passes.
//! - [`MatchHit`]: left/right record, score, reasons. `Display` renders the
//!   report line.
//! - [`MatchReport`] / [`MatchStats`]: hits plus how many pairs were scored.
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use canonical::{normalize_collection, Field, NormalizeConfig, RawRecord};
//! use matcher::{MatchConfig, Matcher};
//! use semantic::constant_oracle;
//!
//! let cfg = NormalizeConfig::default();
//! let victims = normalize_collection(
//!     &[RawRecord::new(0).with(Field::Phones, "+91-98765-43210")],
//!     "Victim",
//!     &cfg,
//! );
//! let official = normalize_collection(
//!     &[RawRecord::new(0).with(Field::Phones, "9876543210")],
//!     "Official",
//!     &cfg,
//! );
//!
//! let matcher = Matcher::new(Arc::new(constant_oracle(0.0)), MatchConfig::default()).unwrap();
//! let hits = matcher.cross_match(&victims, &official, 0.5);
//! assert_eq!(hits[0].to_string(), "Victim 0 <--> Official 0 | Score: 0.70 | Reasons: same phones");
//! ```

mod blocking;
mod engine;
mod metrics;
mod scorer;
mod types;

pub use crate::engine::Matcher;
pub use crate::metrics::{set_match_metrics, MatchMetrics};
pub use crate::scorer::score_pair;
pub use crate::types::{
    MatchConfig, MatchError, MatchHit, MatchMode, MatchReport, MatchStats, PairScore, ScoreWeights,
};
