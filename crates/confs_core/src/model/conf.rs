//! Conference domain model.
//!
//! # Responsibility
//! - Define the full persisted row shape (`RawConf`).
//! - Define the redacted shape returned to external callers (`PublicConf`).
//!
//! # Invariants
//! - `id` is assigned by the store; values set by callers are ignored on insert.
//! - `PublicConf` is derived from `RawConf` only and never adds information.
//! - `deleted` is a tombstone flag; reads do not filter on it.

use crate::model::property_bag::PropertyBag;
use serde::{Deserialize, Serialize};

/// Store-assigned conference identifier.
pub type ConfId = i64;

/// Complete persisted conference row, including internal-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConf {
    pub id: ConfId,
    pub title: String,
    /// Reference to the creating user. Immutable after insert.
    pub added_by: i64,
    /// Unix epoch milliseconds.
    pub start_date: i64,
    /// Unix epoch milliseconds.
    pub end_date: i64,
    pub description: String,
    /// Picture reference (URL or storage path).
    pub picture: Option<String>,
    pub country: String,
    pub city: String,
    pub address: String,
    pub category: String,
    pub tickets_available: bool,
    pub discount_program: bool,
    /// Minor currency units.
    pub min_price: i64,
    /// Minor currency units.
    pub max_price: i64,
    pub facebook: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    /// Free-form attributes without a fixed schema.
    pub details: PropertyBag,
    /// Moderation flag. Internal-only.
    pub verified: bool,
    /// Soft delete tombstone. Internal-only.
    pub deleted: bool,
    /// Unix epoch milliseconds, set by the store.
    pub created_at: i64,
    /// Unix epoch milliseconds, refreshed by the store on edit.
    pub updated_at: i64,
}

/// Conference shape exposed to external callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicConf {
    pub id: ConfId,
    pub title: String,
    pub added_by: i64,
    pub start_date: i64,
    pub end_date: i64,
    pub description: String,
    pub picture: Option<String>,
    pub country: String,
    pub city: String,
    pub address: String,
    pub category: String,
    pub tickets_available: bool,
    pub discount_program: bool,
    pub min_price: i64,
    pub max_price: i64,
    pub facebook: Option<String>,
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub details: PropertyBag,
}

impl RawConf {
    /// Creates a draft conference for insertion.
    ///
    /// `id` and timestamps stay zero until the store assigns them.
    pub fn new(title: impl Into<String>, added_by: i64) -> Self {
        Self {
            title: title.into(),
            added_by,
            ..Self::default()
        }
    }

    /// Marks this conference as softly deleted.
    pub fn soft_delete(&mut self) {
        self.deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Projects this row into its public shape.
    pub fn public_fields(&self) -> PublicConf {
        self.clone().into()
    }
}

impl From<RawConf> for PublicConf {
    fn from(raw: RawConf) -> Self {
        Self {
            id: raw.id,
            title: raw.title,
            added_by: raw.added_by,
            start_date: raw.start_date,
            end_date: raw.end_date,
            description: raw.description,
            picture: raw.picture,
            country: raw.country,
            city: raw.city,
            address: raw.address,
            category: raw.category,
            tickets_available: raw.tickets_available,
            discount_program: raw.discount_program,
            min_price: raw.min_price,
            max_price: raw.max_price,
            facebook: raw.facebook,
            youtube: raw.youtube,
            twitter: raw.twitter,
            details: raw.details,
        }
    }
}
