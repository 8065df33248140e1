// src/db/access_log.rs
use chrono::{DateTime, Utc};
use rusqlite::params;
use tracing::warn;

use crate::db::connection::Database;
use crate::errors::ServerError;

/// Record that a user opened a listing's detail view. Best-effort: the
/// caller uses `record_view_best_effort`, which swallows failures after
/// logging them, so the detail page never blocks on the audit trail.
pub fn record_view(
    db: &Database,
    user_id: i64,
    listing_id: &str,
    now: DateTime<Utc>,
) -> Result<(), ServerError> {
    db.with_conn(|conn| {
        conn.execute(
            "insert into listing_access_log (user_id, listing_id, viewed_at) values (?, ?, ?)",
            params![user_id, listing_id, now.to_rfc3339()],
        )
        .map_err(|e| ServerError::DbError(format!("insert access log failed: {e}")))?;
        Ok(())
    })
}

pub fn record_view_best_effort(db: &Database, user_id: i64, listing_id: &str, now: DateTime<Utc>) {
    if let Err(e) = record_view(db, user_id, listing_id, now) {
        warn!("access log write failed for listing {listing_id}: {e}");
    }
}
