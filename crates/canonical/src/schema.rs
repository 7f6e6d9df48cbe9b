//! The fixed report schema.
//!
//! Every record in a matching run carries the same 24 fields. Each field has a
//! [`FieldClass`] that decides how the scorer weighs it and a [`FieldKind`]
//! that decides how the normalizer canonicalizes it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much evidence a shared value in this field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldClass {
    /// Bookkeeping columns carried through but never scored.
    Metadata,
    /// Exact identifiers (phone, account, wallet, ...).
    Strong,
    /// Categorical attributes such as locations or platforms.
    Medium,
    /// Low-signal categorical attributes.
    Weak,
    /// Free text compared through the similarity oracle.
    FreeText,
}

/// How a raw value is canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Delimited phone numbers.
    Phone,
    /// Delimited email addresses.
    Email,
    /// Delimited URLs.
    Website,
    /// Delimited values with no per-token transformation.
    Set,
    /// A single value passed through unchanged.
    Scalar,
}

impl FieldKind {
    /// True for kinds that normalize into a set of tokens.
    pub fn is_set(self) -> bool {
        !matches!(self, FieldKind::Scalar)
    }
}

/// A column of the report schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    ReportId,
    ReportDate,
    ReporterType,
    CaseStatus,
    Phones,
    BankAccounts,
    UpiIds,
    Emails,
    Websites,
    SocialHandles,
    IpAddresses,
    CryptoWallets,
    Institute,
    VictimLocation,
    ScammerClaimedLocation,
    Platforms,
    LanguageAccent,
    ScamCategory,
    Description,
    ProfileDetails,
    DocumentsSharedKeywords,
    PaymentMethod,
    ReferrerSource,
    ContactMethods,
}

impl Field {
    /// Number of schema fields.
    pub const COUNT: usize = 24;

    /// All fields in column order.
    pub const ALL: [Field; Field::COUNT] = [
        Field::ReportId,
        Field::ReportDate,
        Field::ReporterType,
        Field::CaseStatus,
        Field::Phones,
        Field::BankAccounts,
        Field::UpiIds,
        Field::Emails,
        Field::Websites,
        Field::SocialHandles,
        Field::IpAddresses,
        Field::CryptoWallets,
        Field::Institute,
        Field::VictimLocation,
        Field::ScammerClaimedLocation,
        Field::Platforms,
        Field::LanguageAccent,
        Field::ScamCategory,
        Field::Description,
        Field::ProfileDetails,
        Field::DocumentsSharedKeywords,
        Field::PaymentMethod,
        Field::ReferrerSource,
        Field::ContactMethods,
    ];

    /// Strong identifier fields, in scoring order.
    pub const STRONG: [Field; 8] = [
        Field::Phones,
        Field::BankAccounts,
        Field::UpiIds,
        Field::Emails,
        Field::Websites,
        Field::SocialHandles,
        Field::IpAddresses,
        Field::CryptoWallets,
    ];

    /// Medium categorical fields, in scoring order.
    pub const MEDIUM: [Field; 5] = [
        Field::Institute,
        Field::VictimLocation,
        Field::ScammerClaimedLocation,
        Field::Platforms,
        Field::ContactMethods,
    ];

    /// Weak categorical fields, in scoring order.
    pub const WEAK: [Field; 3] = [
        Field::LanguageAccent,
        Field::ScamCategory,
        Field::PaymentMethod,
    ];

    /// Free-text fields, in scoring order.
    pub const FREE_TEXT: [Field; 4] = [
        Field::Description,
        Field::ProfileDetails,
        Field::DocumentsSharedKeywords,
        Field::ReferrerSource,
    ];

    /// Column name as it appears in input files and match reasons.
    pub fn name(self) -> &'static str {
        match self {
            Field::ReportId => "report_id",
            Field::ReportDate => "report_date",
            Field::ReporterType => "reporter_type",
            Field::CaseStatus => "case_status",
            Field::Phones => "phones",
            Field::BankAccounts => "bank_accounts",
            Field::UpiIds => "upi_ids",
            Field::Emails => "emails",
            Field::Websites => "websites",
            Field::SocialHandles => "social_handles",
            Field::IpAddresses => "ip_addresses",
            Field::CryptoWallets => "crypto_wallets",
            Field::Institute => "institute",
            Field::VictimLocation => "victim_location",
            Field::ScammerClaimedLocation => "scammer_claimed_location",
            Field::Platforms => "platforms",
            Field::LanguageAccent => "language_accent",
            Field::ScamCategory => "scam_category",
            Field::Description => "description",
            Field::ProfileDetails => "profile_details",
            Field::DocumentsSharedKeywords => "documents_shared_keywords",
            Field::PaymentMethod => "payment_method",
            Field::ReferrerSource => "referrer_source",
            Field::ContactMethods => "contact_methods",
        }
    }

    /// Look a field up by its column name.
    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Position of the field in [`Field::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn class(self) -> FieldClass {
        match self {
            Field::ReportId | Field::ReportDate | Field::ReporterType | Field::CaseStatus => {
                FieldClass::Metadata
            }
            Field::Phones
            | Field::BankAccounts
            | Field::UpiIds
            | Field::Emails
            | Field::Websites
            | Field::SocialHandles
            | Field::IpAddresses
            | Field::CryptoWallets => FieldClass::Strong,
            Field::Institute
            | Field::VictimLocation
            | Field::ScammerClaimedLocation
            | Field::Platforms
            | Field::ContactMethods => FieldClass::Medium,
            Field::LanguageAccent | Field::ScamCategory | Field::PaymentMethod => FieldClass::Weak,
            Field::Description
            | Field::ProfileDetails
            | Field::DocumentsSharedKeywords
            | Field::ReferrerSource => FieldClass::FreeText,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Phones => FieldKind::Phone,
            Field::Emails => FieldKind::Email,
            Field::Websites => FieldKind::Website,
            Field::BankAccounts
            | Field::UpiIds
            | Field::SocialHandles
            | Field::IpAddresses
            | Field::CryptoWallets
            | Field::ContactMethods => FieldKind::Set,
            _ => FieldKind::Scalar,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
