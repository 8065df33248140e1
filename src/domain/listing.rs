// src/domain/listing.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric value meaning "not provided" in upstream payloads. Converted to
/// None at this boundary; it must never reach arithmetic or formatting.
pub const UNSET_SENTINEL: i64 = -1;

/// The flat listing view-model used by filtering and rendering.
/// This acts as an anti-corruption layer between the raw stored shapes
/// and everything downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub street_address: String,
    pub full_address: Option<String>,
    /// None is a valid, displayed state ("unassigned").
    pub neighborhood: Option<String>,
    /// None means "not mappable".
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub total_units: Option<i64>,
    pub residential_units: Option<i64>,
    pub vacant_residential: Option<i64>,
    pub commercial_units: Option<i64>,
    pub vacant_commercial: Option<i64>,
    pub asking_price: Option<i64>,
    /// When the originating COPA notice was sent. Drives the countdown.
    pub time_sent_tz: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub is_vacant_lot: bool,
    /// Optimistic-concurrency token assigned by the store; None until stored.
    pub updated_at: Option<String>,
    /// Latest associated email, joined in by the store for search.
    pub email_subject: Option<String>,
    pub email_sender: Option<String>,
}

impl Listing {
    /// Display label for the address line.
    pub fn address_label(&self) -> &str {
        if !self.street_address.is_empty() {
            &self.street_address
        } else {
            self.full_address.as_deref().unwrap_or("Address not available")
        }
    }
}

// ---------------------------------------------------------------------------
// Raw shapes
// ---------------------------------------------------------------------------

/// A numeric field as it appears in the wild: a JSON number, a string that
/// may carry "$"/thousands separators, or the -1 "not provided" sentinel.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Integer reading with sentinel handling. "-1" and unparseable text
    /// both collapse to None.
    pub fn as_count(&self) -> Option<i64> {
        let n = match self {
            RawNumber::Int(n) => Some(*n),
            RawNumber::Float(f) => Some(f.round() as i64),
            RawNumber::Text(s) => parse_separated_number(s),
        }?;
        if n == UNSET_SENTINEL {
            None
        } else {
            Some(n)
        }
    }

    /// Fractional reading for rate fields ("1.2", "1.2%").
    pub fn as_rate(&self) -> Option<f64> {
        let r = match self {
            RawNumber::Int(n) => Some(*n as f64),
            RawNumber::Float(f) => Some(*f),
            RawNumber::Text(s) => {
                let cleaned: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '%' | '$' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok()
            }
        }?;
        if r == UNSET_SENTINEL as f64 {
            None
        } else {
            Some(r)
        }
    }
}

/// Strip "$", "," and spaces, then parse. "1,250,000" -> 1250000.
pub fn parse_separated_number(s: &str) -> Option<i64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(n);
    }
    cleaned.parse::<f64>().ok().map(|f| f.round() as i64)
}

fn count(v: &Option<RawNumber>) -> Option<i64> {
    v.as_ref().and_then(RawNumber::as_count)
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawAddress {
    pub full_address: Option<String>,
    pub street_address: Option<String>,
}

/// Geography arrives either as {lat, lng} or as a GeoJSON point
/// with [lng, lat] ordering.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLocation {
    LatLng { lat: f64, lng: f64 },
    GeoPoint { coordinates: Vec<f64> },
}

impl RawLocation {
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        match self {
            RawLocation::LatLng { lat, lng } => Some((*lat, *lng)),
            RawLocation::GeoPoint { coordinates } => {
                // GeoJSON order is [lng, lat]
                match (coordinates.get(1), coordinates.get(0)) {
                    (Some(lat), Some(lng)) => Some((*lat, *lng)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawUnitInfo {
    pub total_units: Option<RawNumber>,
    pub residential_units: Option<RawNumber>,
    pub vacant_residential: Option<RawNumber>,
    pub commercial_units: Option<RawNumber>,
    pub vacant_commercial: Option<RawNumber>,
    pub is_vacant_lot: Option<bool>,
}

/// Ingestion-vintage document: nested address/location/unit/financial
/// objects, date-only notice timestamp.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IngestedDoc {
    pub id: Option<String>,
    pub date: Option<String>,
    pub address: Option<RawAddress>,
    pub location: Option<RawLocation>,
    pub neighborhood: Option<String>,
    pub basic_property_info: Option<RawUnitInfo>,
    pub financial_data: Option<Value>,
    pub flagged: Option<bool>,
}

/// Stored flat shape. Already-normalized records re-enter through this
/// variant unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoredDoc {
    pub id: Option<String>,
    pub street_address: Option<String>,
    pub full_address: Option<String>,
    pub address: Option<RawAddress>,
    pub neighborhood: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location: Option<RawLocation>,
    pub total_units: Option<RawNumber>,
    pub residential_units: Option<RawNumber>,
    pub vacant_residential: Option<RawNumber>,
    pub commercial_units: Option<RawNumber>,
    pub vacant_commercial: Option<RawNumber>,
    pub asking_price: Option<RawNumber>,
    pub time_sent_tz: Option<String>,
    pub flagged: Option<bool>,
    pub is_vacant_lot: Option<bool>,
    pub details: Option<Value>,
    pub updated_at: Option<String>,
    pub email_subject: Option<String>,
    pub email_sender: Option<String>,
}

/// Tagged union over the observed shape vintages. This module is the single
/// place allowed to pattern-match on shape variants; downstream code only
/// sees the canonical `Listing`.
#[derive(Debug)]
pub enum RawListing {
    Ingested(IngestedDoc),
    Stored(StoredDoc),
}

impl RawListing {
    /// Classify a raw JSON document into its shape vintage and parse it.
    pub fn from_value(value: &Value) -> Result<RawListing, serde_json::Error> {
        let ingested = value.as_object().is_some_and(|m| {
            m.contains_key("basic_property_info")
                || m.contains_key("financial_data")
                || m.contains_key("seller_info")
                || (m.contains_key("date") && !m.contains_key("time_sent_tz"))
        });
        if ingested {
            serde_json::from_value::<IngestedDoc>(value.clone()).map(RawListing::Ingested)
        } else {
            serde_json::from_value::<StoredDoc>(value.clone()).map(RawListing::Stored)
        }
    }

    /// Raw sensitive payload to hand to the details store, if any.
    pub fn details_value(&self) -> Option<Value> {
        match self {
            RawListing::Ingested(doc) => doc
                .financial_data
                .as_ref()
                .map(|fd| serde_json::json!({ "financials": fd })),
            RawListing::Stored(doc) => doc.details.clone(),
        }
    }

    /// Map either vintage into the flat `Listing`. Missing objects at any
    /// level are treated as absent, never as errors. Normalizing an
    /// already-normalized record is a no-op.
    pub fn normalize(self) -> Listing {
        match self {
            RawListing::Ingested(doc) => {
                let address = doc.address.unwrap_or_default();
                let units = doc.basic_property_info.unwrap_or_default();
                let (latitude, longitude) = split_location(doc.location.as_ref());
                let full_address = non_empty(address.full_address);
                Listing {
                    id: doc.id.unwrap_or_default(),
                    street_address: address
                        .street_address
                        .filter(|s| !s.trim().is_empty())
                        .or_else(|| full_address.as_deref().map(street_from_full))
                        .unwrap_or_default(),
                    full_address,
                    neighborhood: non_empty(doc.neighborhood),
                    latitude,
                    longitude,
                    total_units: count(&units.total_units),
                    residential_units: count(&units.residential_units),
                    vacant_residential: count(&units.vacant_residential),
                    commercial_units: count(&units.commercial_units),
                    vacant_commercial: count(&units.vacant_commercial),
                    asking_price: doc
                        .financial_data
                        .as_ref()
                        .and_then(|fd| raw_number_field(fd, "asking_price")),
                    time_sent_tz: doc.date.as_deref().and_then(parse_timestamp),
                    flagged: doc.flagged.unwrap_or(false),
                    is_vacant_lot: units.is_vacant_lot.unwrap_or(false),
                    updated_at: None,
                    email_subject: None,
                    email_sender: None,
                }
            }
            RawListing::Stored(doc) => {
                let address = doc.address.unwrap_or_default();
                let full_address =
                    non_empty(doc.full_address).or_else(|| non_empty(address.full_address));
                let (loc_lat, loc_lng) = split_location(doc.location.as_ref());
                Listing {
                    id: doc.id.unwrap_or_default(),
                    street_address: doc
                        .street_address
                        .or(address.street_address)
                        .filter(|s| !s.trim().is_empty())
                        .or_else(|| full_address.as_deref().map(street_from_full))
                        .unwrap_or_default(),
                    full_address,
                    neighborhood: non_empty(doc.neighborhood),
                    latitude: doc.latitude.or(loc_lat),
                    longitude: doc.longitude.or(loc_lng),
                    total_units: count(&doc.total_units),
                    residential_units: count(&doc.residential_units),
                    vacant_residential: count(&doc.vacant_residential),
                    commercial_units: count(&doc.commercial_units),
                    vacant_commercial: count(&doc.vacant_commercial),
                    asking_price: count(&doc.asking_price),
                    time_sent_tz: doc.time_sent_tz.as_deref().and_then(parse_timestamp),
                    flagged: doc.flagged.unwrap_or(false),
                    is_vacant_lot: doc.is_vacant_lot.unwrap_or(false),
                    updated_at: doc.updated_at,
                    email_subject: doc.email_subject,
                    email_sender: doc.email_sender,
                }
            }
        }
    }
}

fn split_location(loc: Option<&RawLocation>) -> (Option<f64>, Option<f64>) {
    match loc.and_then(RawLocation::lat_lng) {
        Some((lat, lng)) => (Some(lat), Some(lng)),
        None => (None, None),
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

fn street_from_full(full: &str) -> String {
    full.split(',').next().unwrap_or(full).trim().to_string()
}

fn raw_number_field(v: &Value, key: &str) -> Option<i64> {
    let field = v.get(key)?;
    serde_json::from_value::<RawNumber>(field.clone())
        .ok()
        .and_then(|n| n.as_count())
}

fn raw_rate_field(v: &Value, key: &str) -> Option<f64> {
    let field = v.get(key)?;
    serde_json::from_value::<RawNumber>(field.clone())
        .ok()
        .and_then(|n| n.as_rate())
}

/// RFC3339 first, date-only second (ingestion vintage wrote bare dates).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

// ---------------------------------------------------------------------------
// Sensitive details payload
// ---------------------------------------------------------------------------

/// Decrypted sensitive payload for one listing. Only the details lookup
/// produces this, and only for an authenticated user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsPayload {
    pub phone_number: Option<String>,
    pub soft_story: Option<bool>,
    pub square_footage: Option<i64>,
    pub parking_spaces: Option<i64>,
    pub unit_mix: Option<String>,
    pub financials: Financials,
    pub rent_roll: Vec<RentRollEntry>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Financials {
    pub monthly_income: Option<i64>,
    pub total_rents: Option<i64>,
    pub other_income: Option<i64>,
    pub total_monthly_income: Option<i64>,
    pub total_annual_income: Option<i64>,
    pub annual_expenses: Option<i64>,
    pub net_operating_income: Option<i64>,
    pub property_tax_rate: Option<f64>,
    pub property_tax_amount: Option<i64>,
    pub management_rate: Option<f64>,
    pub management_amount: Option<i64>,
    pub insurance: Option<i64>,
    pub utilities: Option<i64>,
    pub maintenance: Option<i64>,
    pub other_expenses: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentRollEntry {
    pub unit: Option<String>,
    pub monthly_rent: Option<i64>,
    pub occupied: Option<bool>,
}

impl Financials {
    /// Read the financial fields out of one JSON object level.
    fn from_object(v: &Value) -> Financials {
        Financials {
            monthly_income: raw_number_field(v, "monthly_income"),
            total_rents: raw_number_field(v, "total_rents"),
            other_income: raw_number_field(v, "other_income"),
            total_monthly_income: raw_number_field(v, "total_monthly_income"),
            total_annual_income: raw_number_field(v, "total_annual_income"),
            annual_expenses: raw_number_field(v, "annual_expenses"),
            net_operating_income: raw_number_field(v, "net_operating_income"),
            property_tax_rate: raw_rate_field(v, "property_tax_rate"),
            property_tax_amount: raw_number_field(v, "property_tax_amount"),
            management_rate: raw_rate_field(v, "management_rate"),
            management_amount: raw_number_field(v, "management_amount"),
            insurance: raw_number_field(v, "insurance"),
            utilities: raw_number_field(v, "utilities"),
            maintenance: raw_number_field(v, "maintenance"),
            other_expenses: raw_number_field(v, "other_expenses"),
        }
    }

    fn merge(nested: Financials, flat: Financials) -> Financials {
        // Explicit nested object wins; the flattened vintage fills gaps.
        Financials {
            monthly_income: nested.monthly_income.or(flat.monthly_income),
            total_rents: nested.total_rents.or(flat.total_rents),
            other_income: nested.other_income.or(flat.other_income),
            total_monthly_income: nested.total_monthly_income.or(flat.total_monthly_income),
            total_annual_income: nested.total_annual_income.or(flat.total_annual_income),
            annual_expenses: nested.annual_expenses.or(flat.annual_expenses),
            net_operating_income: nested.net_operating_income.or(flat.net_operating_income),
            property_tax_rate: nested.property_tax_rate.or(flat.property_tax_rate),
            property_tax_amount: nested.property_tax_amount.or(flat.property_tax_amount),
            management_rate: nested.management_rate.or(flat.management_rate),
            management_amount: nested.management_amount.or(flat.management_amount),
            insurance: nested.insurance.or(flat.insurance),
            utilities: nested.utilities.or(flat.utilities),
            maintenance: nested.maintenance.or(flat.maintenance),
            other_expenses: nested.other_expenses.or(flat.other_expenses),
        }
    }
}

impl DetailsPayload {
    /// Parse the stored details document. Depending on source vintage the
    /// financial fields sit under a "financials" object or directly at the
    /// top level; both are accepted here and nowhere else.
    pub fn from_value(v: &Value) -> DetailsPayload {
        let nested = v
            .get("financials")
            .map(Financials::from_object)
            .unwrap_or_default();
        let flat = Financials::from_object(v);

        let rent_roll = v
            .get("rent_roll")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .map(|row| RentRollEntry {
                        unit: row
                            .get("unit")
                            .or_else(|| row.get("unit_number"))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        monthly_rent: raw_number_field(row, "monthly_rent")
                            .or_else(|| raw_number_field(row, "rent")),
                        occupied: row.get("occupied").and_then(Value::as_bool),
                    })
                    .collect()
            })
            .unwrap_or_default();

        DetailsPayload {
            phone_number: v
                .get("phone_number")
                .or_else(|| v.get("phone"))
                .and_then(Value::as_str)
                .map(str::to_string),
            soft_story: v
                .get("soft_story")
                .or_else(|| v.get("soft_story_required"))
                .and_then(Value::as_bool),
            square_footage: raw_number_field(v, "square_footage"),
            parking_spaces: raw_number_field(v, "parking_spaces"),
            unit_mix: v.get("unit_mix").and_then(Value::as_str).map(str::to_string),
            financials: Financials::merge(nested, flat),
            rent_roll,
        }
    }
}
