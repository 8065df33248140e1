// src/domain/editor.rs

use std::collections::BTreeMap;

use crate::domain::listing::{parse_separated_number, Listing};

/// Raw editor form values as posted, before validation. Everything is a
/// string: empty means "clear the field".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditForm {
    pub street_address: String,
    pub neighborhood: String,
    pub asking_price: String,
    pub total_units: String,
    pub residential_units: String,
    pub vacant_residential: String,
    pub commercial_units: String,
    pub vacant_commercial: String,
    /// The concurrency token the form was rendered against.
    pub expected_updated_at: String,
}

impl EditForm {
    /// Prefill from a stored listing.
    pub fn from_listing(listing: &Listing) -> EditForm {
        let num = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
        EditForm {
            street_address: listing.street_address.clone(),
            neighborhood: listing.neighborhood.clone().unwrap_or_default(),
            asking_price: num(listing.asking_price),
            total_units: num(listing.total_units),
            residential_units: num(listing.residential_units),
            vacant_residential: num(listing.vacant_residential),
            commercial_units: num(listing.commercial_units),
            vacant_commercial: num(listing.vacant_commercial),
            expected_updated_at: listing.updated_at.clone().unwrap_or_default(),
        }
    }
}

/// Validated field values ready for the store. Only the editable subset of
/// the listing; the store never receives unvalidated input.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingPatch {
    pub street_address: String,
    pub neighborhood: Option<String>,
    pub asking_price: Option<i64>,
    pub total_units: Option<i64>,
    pub residential_units: Option<i64>,
    pub vacant_residential: Option<i64>,
    pub commercial_units: Option<i64>,
    pub vacant_commercial: Option<i64>,
}

/// Field-scoped validation errors, keyed by form field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Validate the posted form. Errors are attached per field and block the
/// save; nothing is silently coerced.
pub fn validate(form: &EditForm) -> Result<ListingPatch, FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.street_address.trim().is_empty() {
        errors.insert("street_address", "Address is required".to_string());
    }

    let mut parse = |field: &'static str, raw: &str| -> Option<i64> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match parse_separated_number(raw) {
            None => {
                errors.insert(field, "Must be a number".to_string());
                None
            }
            Some(n) if n < 0 => {
                errors.insert(field, "Must be positive".to_string());
                None
            }
            Some(n) => Some(n),
        }
    };

    let asking_price = parse("asking_price", &form.asking_price);
    let total_units = parse("total_units", &form.total_units);
    let residential_units = parse("residential_units", &form.residential_units);
    let vacant_residential = parse("vacant_residential", &form.vacant_residential);
    let commercial_units = parse("commercial_units", &form.commercial_units);
    let vacant_commercial = parse("vacant_commercial", &form.vacant_commercial);

    // residential + commercial must fit in total when all three are present
    if let (Some(total), Some(res), Some(com)) = (total_units, residential_units, commercial_units)
    {
        if res + com > total {
            errors.insert(
                "total_units",
                "Total units must be ≥ residential + commercial".to_string(),
            );
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ListingPatch {
        street_address: form.street_address.trim().to_string(),
        neighborhood: Some(form.neighborhood.trim().to_string()).filter(|s| !s.is_empty()),
        asking_price,
        total_units,
        residential_units,
        vacant_residential,
        commercial_units,
        vacant_commercial,
    })
}

// ---------------------------------------------------------------------------
// Edit workflow state machine
// ---------------------------------------------------------------------------

/// Outcome of the store write, as reported by the listing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The record changed underneath the form: the concurrency token did not
    /// match. Requires an explicit reload, never a blind retry.
    Conflict,
    Error,
}

/// Edit workflow:
/// Viewing -> Editing -> Validating -> Saving -> Saved -> Viewing,
/// with Saving branching to Conflict or Failed, both of which return to
/// Editing (Conflict only after an acknowledged reload).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Viewing,
    Editing,
    Validating,
    Saving,
    Saved,
    Conflict,
    Failed,
}

impl EditPhase {
    pub fn field_changed(self) -> EditPhase {
        match self {
            EditPhase::Viewing | EditPhase::Editing | EditPhase::Saved | EditPhase::Failed => {
                EditPhase::Editing
            }
            other => other,
        }
    }

    pub fn save_requested(self) -> EditPhase {
        match self {
            EditPhase::Editing => EditPhase::Validating,
            other => other,
        }
    }

    pub fn validated(self, ok: bool) -> EditPhase {
        match (self, ok) {
            (EditPhase::Validating, true) => EditPhase::Saving,
            (EditPhase::Validating, false) => EditPhase::Editing,
            (other, _) => other,
        }
    }

    pub fn store_result(self, outcome: SaveOutcome) -> EditPhase {
        match (self, outcome) {
            (EditPhase::Saving, SaveOutcome::Saved) => EditPhase::Saved,
            (EditPhase::Saving, SaveOutcome::Conflict) => EditPhase::Conflict,
            (EditPhase::Saving, SaveOutcome::Error) => EditPhase::Failed,
            (other, _) => other,
        }
    }

    /// The Saved banner auto-reverts to Viewing; a generic failure returns
    /// to the form. A conflict stays put until the user reloads.
    pub fn acknowledged(self) -> EditPhase {
        match self {
            EditPhase::Saved => EditPhase::Viewing,
            EditPhase::Failed => EditPhase::Editing,
            other => other,
        }
    }

    pub fn reloaded(self) -> EditPhase {
        EditPhase::Viewing
    }
}
