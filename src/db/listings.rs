// src/db/listings.rs
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use tracing::warn;

use crate::auth::token::generate_listing_id;
use crate::db::connection::Database;
use crate::domain::editor::ListingPatch;
use crate::domain::listing::{parse_timestamp, Listing, RawListing};
use crate::errors::ServerError;

/// Result of a conditional write. The store is the sole arbiter of
/// conflicts; callers never merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    Updated { updated_at: String },
    /// The stored concurrency token no longer matches the one the caller
    /// rendered its form against.
    Conflict,
    NotFound,
}

const LISTING_COLUMNS: &str = "l.id, l.street_address, l.full_address, l.neighborhood,
    l.latitude, l.longitude,
    l.total_units, l.residential_units, l.vacant_residential,
    l.commercial_units, l.vacant_commercial,
    l.asking_price, l.time_sent_tz, l.flagged, l.is_vacant_lot, l.updated_at";

fn listing_from_row(row: &Row, with_email: bool) -> rusqlite::Result<Listing> {
    let time_sent: Option<String> = row.get(12)?;
    Ok(Listing {
        id: row.get(0)?,
        street_address: row.get(1)?,
        full_address: row.get(2)?,
        neighborhood: row.get(3)?,
        latitude: row.get(4)?,
        longitude: row.get(5)?,
        total_units: row.get(6)?,
        residential_units: row.get(7)?,
        vacant_residential: row.get(8)?,
        commercial_units: row.get(9)?,
        vacant_commercial: row.get(10)?,
        asking_price: row.get(11)?,
        time_sent_tz: time_sent.as_deref().and_then(parse_timestamp),
        flagged: row.get(13)?,
        is_vacant_lot: row.get(14)?,
        updated_at: row.get(15)?,
        email_subject: if with_email { row.get(16)? } else { None },
        email_sender: if with_email { row.get(17)? } else { None },
    })
}

/// All listings, newest notice first (order established here, preserved by
/// the filter engine), joined with the latest email per listing so the text
/// filter can search subject and sender.
pub fn list_all(db: &Database) -> Result<Vec<Listing>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&format!(
                r#"
                SELECT {LISTING_COLUMNS}, e.subject, e.from_address
                FROM listings l
                LEFT JOIN emails e ON e.id = (
                    SELECT e2.id FROM emails e2
                    WHERE e2.listing_id = l.id
                    ORDER BY e2.received_at DESC, e2.id DESC
                    LIMIT 1
                )
                ORDER BY l.time_sent_tz IS NULL, l.time_sent_tz DESC, l.id
                "#
            ))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| listing_from_row(row, true))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(results)
    })
}

pub fn get_one(db: &Database, id: &str) -> Result<Option<Listing>, ServerError> {
    db.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = ?"),
            params![id],
            |row| listing_from_row(row, false),
        )
        .optional()
        .map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// Conditional update guarded by the concurrency token. Only the editable
/// fields move; everything else is owned by the ingestion pipeline.
pub fn update_listing(
    db: &Database,
    id: &str,
    patch: &ListingPatch,
    expected_updated_at: &str,
    now: DateTime<Utc>,
) -> Result<UpdateResult, ServerError> {
    let new_token = now.to_rfc3339();
    db.with_conn(|conn| {
        let changed = conn
            .execute(
                r#"
                UPDATE listings SET
                    street_address = ?1,
                    neighborhood = ?2,
                    asking_price = ?3,
                    total_units = ?4,
                    residential_units = ?5,
                    vacant_residential = ?6,
                    commercial_units = ?7,
                    vacant_commercial = ?8,
                    updated_at = ?9
                WHERE id = ?10 AND updated_at = ?11
                "#,
                params![
                    patch.street_address,
                    patch.neighborhood,
                    patch.asking_price,
                    patch.total_units,
                    patch.residential_units,
                    patch.vacant_residential,
                    patch.commercial_units,
                    patch.vacant_commercial,
                    new_token,
                    id,
                    expected_updated_at,
                ],
            )
            .map_err(|e| ServerError::DbError(format!("update listing failed: {e}")))?;

        if changed == 1 {
            return Ok(UpdateResult::Updated {
                updated_at: new_token.clone(),
            });
        }

        let exists: Option<String> = conn
            .query_row(
                "SELECT id FROM listings WHERE id = ?",
                params![id],
                |r| r.get(0),
            )
            .optional()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        Ok(if exists.is_some() {
            UpdateResult::Conflict
        } else {
            UpdateResult::NotFound
        })
    })
}

/// Insert one normalized listing (plus its sensitive payload, if any).
/// Used by the bulk import path; the dashboard itself never creates rows.
pub fn insert_normalized(
    db: &Database,
    listing: &Listing,
    details: Option<&Value>,
    now: DateTime<Utc>,
) -> Result<String, ServerError> {
    let id = if listing.id.is_empty() {
        generate_listing_id()
    } else {
        listing.id.clone()
    };
    let now_str = now.to_rfc3339();

    db.with_conn(|conn: &mut Connection| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        tx.execute(
            r#"
            INSERT INTO listings (
                id, street_address, full_address, neighborhood,
                latitude, longitude,
                total_units, residential_units, vacant_residential,
                commercial_units, vacant_commercial,
                asking_price, time_sent_tz, flagged, is_vacant_lot,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            ON CONFLICT(id) DO UPDATE SET
                street_address = excluded.street_address,
                full_address = excluded.full_address,
                neighborhood = excluded.neighborhood,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                total_units = excluded.total_units,
                residential_units = excluded.residential_units,
                vacant_residential = excluded.vacant_residential,
                commercial_units = excluded.commercial_units,
                vacant_commercial = excluded.vacant_commercial,
                asking_price = excluded.asking_price,
                time_sent_tz = excluded.time_sent_tz,
                flagged = excluded.flagged,
                is_vacant_lot = excluded.is_vacant_lot,
                updated_at = excluded.updated_at
            "#,
            params![
                id,
                listing.street_address,
                listing.full_address,
                listing.neighborhood,
                listing.latitude,
                listing.longitude,
                listing.total_units,
                listing.residential_units,
                listing.vacant_residential,
                listing.commercial_units,
                listing.vacant_commercial,
                listing.asking_price,
                listing.time_sent_tz.map(|t| t.to_rfc3339()),
                listing.flagged,
                listing.is_vacant_lot,
                now_str,
                now_str,
            ],
        )
        .map_err(|e| ServerError::DbError(format!("insert listing failed: {e}")))?;

        if let Some(payload) = details {
            tx.execute(
                r#"
                INSERT INTO listing_details (listing_id, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(listing_id) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
                params![id, payload.to_string(), now_str],
            )
            .map_err(|e| ServerError::DbError(format!("insert details failed: {e}")))?;
        }

        tx.commit()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(id.clone())
    })
}

#[derive(Debug, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub flagged: usize,
    pub skipped: usize,
}

/// Bulk import of raw listing documents: a JSON array, or an object with a
/// top-level "listings" array. Each document goes through the normalizer;
/// records arriving without a resolvable neighborhood are flagged for
/// review, mirroring the ingestion pipeline.
pub fn import_from_value(
    db: &Database,
    data: &Value,
    now: DateTime<Utc>,
) -> Result<ImportSummary, ServerError> {
    let docs = data
        .get("listings")
        .and_then(Value::as_array)
        .or_else(|| data.as_array())
        .ok_or_else(|| {
            ServerError::BadRequest("expected a JSON array or {\"listings\": [...]}".into())
        })?;

    let mut summary = ImportSummary::default();
    for doc in docs {
        let raw = match RawListing::from_value(doc) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping unparseable listing document: {e}");
                summary.skipped += 1;
                continue;
            }
        };
        let details = raw.details_value();
        let mut listing = raw.normalize();
        if listing.neighborhood.is_none() {
            listing.flagged = true;
        }
        insert_normalized(db, &listing, details.as_ref(), now)?;
        if listing.flagged {
            summary.flagged += 1;
        }
        summary.imported += 1;
    }
    Ok(summary)
}
