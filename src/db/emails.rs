// src/db/emails.rs
use rusqlite::params;

use crate::db::connection::Database;
use crate::errors::ServerError;

/// One inbound email associated with a listing. Read-only from the
/// dashboard's perspective; the ingestion pipeline writes these.
#[derive(Debug, Clone)]
pub struct EmailRow {
    pub id: i64,
    pub subject: Option<String>,
    pub from_address: Option<String>,
    pub received_at: Option<String>,
    pub raw_text: Option<String>,
    pub raw_html: Option<String>,
}

/// Emails for one listing, newest first.
pub fn list_for_listing(db: &Database, listing_id: &str) -> Result<Vec<EmailRow>, ServerError> {
    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(
                "select id, subject, from_address, received_at, raw_text, raw_html
                 from emails
                 where listing_id = ?
                 order by received_at desc, id desc",
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(params![listing_id], |row| {
                Ok(EmailRow {
                    id: row.get(0)?,
                    subject: row.get(1)?,
                    from_address: row.get(2)?,
                    received_at: row.get(3)?,
                    raw_text: row.get(4)?,
                    raw_html: row.get(5)?,
                })
            })
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
        }
        Ok(out)
    })
}
