// src/domain/filter.rs

use chrono::{DateTime, Utc};

use crate::domain::countdown::days_remaining;
use crate::domain::listing::Listing;

/// Mutually exclusive total-unit ranges for the units filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitBucket {
    /// 1–10 units
    UpTo10,
    /// 11–25 units
    From11To25,
    /// 26–49 units
    From26To49,
    /// 50 or more units
    From50,
}

impl UnitBucket {
    pub const ALL: [UnitBucket; 4] = [
        UnitBucket::UpTo10,
        UnitBucket::From11To25,
        UnitBucket::From26To49,
        UnitBucket::From50,
    ];

    pub fn contains(self, total_units: i64) -> bool {
        match self {
            UnitBucket::UpTo10 => (1..=10).contains(&total_units),
            UnitBucket::From11To25 => (11..=25).contains(&total_units),
            UnitBucket::From26To49 => (26..=49).contains(&total_units),
            UnitBucket::From50 => total_units >= 50,
        }
    }

    /// Query-string code, also used as the form option value.
    pub fn code(self) -> &'static str {
        match self {
            UnitBucket::UpTo10 => "1-10",
            UnitBucket::From11To25 => "11-25",
            UnitBucket::From26To49 => "26-49",
            UnitBucket::From50 => "50+",
        }
    }

    pub fn parse(code: &str) -> Option<UnitBucket> {
        UnitBucket::ALL.into_iter().find(|b| b.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitBucket::UpTo10 => "1–10 units",
            UnitBucket::From11To25 => "11–25 units",
            UnitBucket::From26To49 => "26–49 units",
            UnitBucket::From50 => "50+ units",
        }
    }
}

/// Immutable filter snapshot, rebuilt from the query string on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    /// Free-text search; inactive when blank after trimming.
    pub query: String,
    /// Selected neighborhoods; empty means "all".
    pub neighborhoods: Vec<String>,
    pub unit_bucket: Option<UnitBucket>,
    /// When set, keep only listings with at least `min_days_left` days
    /// remaining in their notice window.
    pub show_active: bool,
    pub min_days_left: i64,
    /// Strict partition: true shows only flagged records, false only
    /// unflagged ones. Unlike the other clauses this one is always applied.
    pub flagged: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            query: String::new(),
            neighborhoods: Vec::new(),
            unit_bucket: None,
            show_active: false,
            min_days_left: 1,
            flagged: false,
        }
    }
}

/// Keep the listings matching every active clause. Pure and stable: input
/// order (notice-sent descending, established at fetch time) is preserved
/// and the input slice is untouched.
pub fn filter_listings(records: &[Listing], spec: &FilterSpec, now: DateTime<Utc>) -> Vec<Listing> {
    records
        .iter()
        .filter(|l| matches(l, spec, now))
        .cloned()
        .collect()
}

fn matches(listing: &Listing, spec: &FilterSpec, now: DateTime<Utc>) -> bool {
    matches_query(listing, &spec.query)
        && matches_neighborhood(listing, &spec.neighborhoods)
        && matches_units(listing, spec.unit_bucket)
        && matches_active(listing, spec, now)
        && listing.flagged == spec.flagged
}

/// Case-insensitive substring match against the address or the associated
/// email's subject/sender.
fn matches_query(listing: &Listing, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    let hit = |field: Option<&str>| field.is_some_and(|s| s.to_lowercase().contains(&q));
    hit(Some(listing.street_address.as_str()))
        || hit(listing.full_address.as_deref())
        || hit(listing.email_subject.as_deref())
        || hit(listing.email_sender.as_deref())
}

/// Unassigned neighborhoods fail any active neighborhood filter.
fn matches_neighborhood(listing: &Listing, selected: &[String]) -> bool {
    if selected.is_empty() {
        return true;
    }
    listing
        .neighborhood
        .as_ref()
        .is_some_and(|n| selected.iter().any(|s| s == n))
}

/// Unknown unit counts fail any active bucket filter.
fn matches_units(listing: &Listing, bucket: Option<UnitBucket>) -> bool {
    match bucket {
        None => true,
        Some(b) => listing.total_units.is_some_and(|u| b.contains(u)),
    }
}

/// Unknown notice dates are conservatively not "active".
fn matches_active(listing: &Listing, spec: &FilterSpec, now: DateTime<Utc>) -> bool {
    if !spec.show_active {
        return true;
    }
    days_remaining(listing.time_sent_tz, now).is_some_and(|d| d >= spec.min_days_left)
}
