//! scamlink canonical field layer.
//!
//! This crate turns raw report rows into a fixed, comparable form. Downstream
//! stages (semantic, matcher) rely on it so they never have to ask whether a
//! field is present or what shape it has.
//!
//! ## What we do
//!
//! - Define the fixed report schema ([`Field`], [`FieldClass`], [`FieldKind`])
//! - Split delimited multi-value columns into sets
//! - Canonicalize phones, emails, and websites
//! - Map missing columns, blanks, and `nan` sentinels to empty values
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock calls, no locale dependence. Normalization never fails and
//! is idempotent: normalizing an already-normalized value yields the same value.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use canonical::{normalize_record, Field, FieldValue, NormalizeConfig, RawRecord};
//!
//! let raw = RawRecord::new(0)
//!     .with(Field::Phones, "+91-98765-43210|nan")
//!     .with(Field::Websites, "https://www.Pay-Now.example");
//! let rec = normalize_record(&raw, &Arc::from("Victim"), &NormalizeConfig::default());
//!
//! assert_eq!(rec.get(Field::Phones), &FieldValue::StringSet(["9876543210".to_string()].into()));
//! assert_eq!(rec.get(Field::Websites), &FieldValue::StringSet(["pay-now.example".to_string()].into()));
//! assert_eq!(rec.get(Field::Institute), &FieldValue::EmptyScalar);
//! ```

mod config;
mod error;
mod normalize;
mod record;
mod schema;
mod value;

pub use crate::config::NormalizeConfig;
pub use crate::error::CanonicalError;
pub use crate::normalize::{
    normalize, normalize_email, normalize_optional, normalize_phone, normalize_website,
    normalize_with_config,
};
pub use crate::record::{
    normalize_collection, normalize_record, NormalizedRecord, RawRecord, RecordRef,
};
pub use crate::schema::{Field, FieldClass, FieldKind};
pub use crate::value::FieldValue;
