// src/db/neighborhoods.rs
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::db::connection::Database;
use crate::errors::ServerError;
use crate::geos::polygon::Geometry;

/// Replace the cached reference rows with a fresh feed snapshot.
pub fn upsert_all(
    db: &Database,
    features: &[(String, Geometry)],
    now: DateTime<Utc>,
) -> Result<(), ServerError> {
    let now_str = now.to_rfc3339();
    db.with_conn(|conn| {
        let tx = conn
            .transaction()
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        for (name, geometry) in features {
            let geometry_json = serde_json::to_string(geometry)
                .map_err(|e| ServerError::DbError(format!("serialize geometry failed: {e}")))?;
            tx.execute(
                "insert into neighborhoods (name, geometry, fetched_at)
                 values (?1, ?2, ?3)
                 on conflict(name) do update set
                     geometry = excluded.geometry,
                     fetched_at = excluded.fetched_at",
                params![name, geometry_json, now_str],
            )
            .map_err(|e| ServerError::DbError(format!("upsert neighborhood failed: {e}")))?;
        }
        tx.commit().map_err(|e| ServerError::DbError(e.to_string()))?;
        Ok(())
    })
}

/// Neighborhood names for filter checkboxes and the editor select,
/// alphabetical.
pub fn names(db: &Database) -> Result<Vec<String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("select name from neighborhoods order by name")
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}

/// Reverse lookup of a coordinate to a neighborhood name via the cached
/// polygons. This is the store's own lookup; the map provider is never
/// asked.
pub fn neighborhood_for_point(
    db: &Database,
    lat: f64,
    lng: f64,
) -> Result<Option<String>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare("select name, geometry from neighborhoods")
            .map_err(|e| ServerError::DbError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        for r in rows {
            let (name, geometry_json) = r.map_err(|e| ServerError::DbError(e.to_string()))?;
            let geometry: Geometry = serde_json::from_str(&geometry_json)
                .map_err(|e| ServerError::DbError(format!("bad stored geometry: {e}")))?;
            if geometry.contains(lng, lat) {
                return Ok(Some(name));
            }
        }
        Ok(None)
    })
}
