// src/db/details.rs
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::db::connection::Database;
use crate::domain::listing::DetailsPayload;
use crate::errors::ServerError;

/// Fetch the sensitive payload for one listing on behalf of an
/// authenticated user. This is the only read path for `listing_details`;
/// the dashboard list view never touches it. Callers must tolerate failure:
/// the detail page still renders its non-sensitive fields without this.
pub fn get_decrypted_details(
    db: &Database,
    listing_id: &str,
    _user_id: i64,
) -> Result<Option<DetailsPayload>, ServerError> {
    let raw: Option<String> = db.with_conn(|conn| {
        conn.query_row(
            "select payload from listing_details where listing_id = ?",
            params![listing_id],
            |r| r.get(0),
        )
        .optional()
        .map_err(|e| ServerError::DbError(format!("select details failed: {e}")))
    })?;

    let Some(raw) = raw else {
        return Ok(None);
    };

    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| ServerError::DbError(format!("details payload is not valid JSON: {e}")))?;

    Ok(Some(DetailsPayload::from_value(&value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::init_db;
    use crate::db::listings::insert_normalized;
    use crate::domain::listing::{Listing, RawListing};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn test_db() -> Database {
        let path = std::env::temp_dir().join(format!(
            "copa_details_test_{}.sqlite",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let db = Database::new(path.to_string_lossy().to_string());
        init_db(&db, "sql/schema.sql").expect("schema applies");
        db
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-08-06T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn details_round_trip_through_the_store() {
        let db = test_db();
        let raw = json!({
            "id": "lst_d",
            "street_address": "12 Guerrero St",
            "details": {
                "phone_number": "(415) 555-0199",
                "financials": { "net_operating_income": "310,000" }
            }
        });
        let parsed = RawListing::from_value(&raw).unwrap();
        let details = parsed.details_value();
        let listing = parsed.normalize();
        insert_normalized(&db, &listing, details.as_ref(), now()).unwrap();

        let payload = get_decrypted_details(&db, "lst_d", 1).unwrap().unwrap();
        assert_eq!(payload.phone_number.as_deref(), Some("(415) 555-0199"));
        assert_eq!(payload.financials.net_operating_income, Some(310_000));
    }

    #[test]
    fn missing_details_are_none_not_an_error() {
        let db = test_db();
        let listing = Listing {
            id: "lst_plain".to_string(),
            street_address: "1 Plain St".to_string(),
            full_address: None,
            neighborhood: None,
            latitude: None,
            longitude: None,
            total_units: None,
            residential_units: None,
            vacant_residential: None,
            commercial_units: None,
            vacant_commercial: None,
            asking_price: None,
            time_sent_tz: None,
            flagged: false,
            is_vacant_lot: false,
            updated_at: None,
            email_subject: None,
            email_sender: None,
        };
        insert_normalized(&db, &listing, None, now()).unwrap();
        assert_eq!(get_decrypted_details(&db, "lst_plain", 1).unwrap(), None);
    }
}
