// src/db/attachments.rs
use rusqlite::{params, OptionalExtension};
use url::form_urlencoded;

use crate::auth::token::{hashes_equal, sign_parts};
use crate::db::connection::Database;
use crate::errors::ServerError;

/// Default lifetime for signed attachment URLs, matching the source
/// system's one-hour links.
pub const SIGNED_URL_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct AttachmentRow {
    pub id: i64,
    pub email_id: i64,
    pub filename: String,
    pub content_type: Option<String>,
    pub file_size: Option<i64>,
    pub storage_path: Option<String>,
}

/// Attachments for a set of emails (one listing's worth), grouped by the
/// caller. The email id set is small, so an inline IN list is fine.
pub fn list_for_emails(db: &Database, email_ids: &[i64]) -> Result<Vec<AttachmentRow>, ServerError> {
    if email_ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; email_ids.len()].join(", ");
    let sql = format!(
        "select id, email_id, filename, content_type, file_size, storage_path
         from email_attachments
         where email_id in ({placeholders})
         order by email_id, id"
    );

    db.with_conn(|conn| {
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| ServerError::DbError(e.to_string()))?;

        let rows = stmt
            .query_map(rusqlite::params_from_iter(email_ids.iter()), |row| {
                Ok(AttachmentRow {
                    id: row.get(0)?,
                    email_id: row.get(1)?,
                    filename: row.get(2)?,
                    content_type: row.get(3)?,
                    file_size: row.get(4)?,
                    storage_path: row.get(5)?,
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

/// Look an attachment up by its storage path; the file-serving route needs
/// the stored filename and content type.
pub fn find_by_storage_path(
    db: &Database,
    storage_path: &str,
) -> Result<Option<AttachmentRow>, ServerError> {
    db.with_conn(|conn| {
        conn.query_row(
            "select id, email_id, filename, content_type, file_size, storage_path
             from email_attachments
             where storage_path = ?",
            params![storage_path],
            |row| {
                Ok(AttachmentRow {
                    id: row.get(0)?,
                    email_id: row.get(1)?,
                    filename: row.get(2)?,
                    content_type: row.get(3)?,
                    file_size: row.get(4)?,
                    storage_path: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(|e| ServerError::DbError(e.to_string()))
    })
}

/// Mint a time-limited capability URL for one stored attachment.
/// The signature covers the path and the expiry, keyed by the server secret.
pub fn signed_url(secret: &str, storage_path: &str, ttl_secs: i64, now: i64) -> String {
    let exp = (now + ttl_secs).to_string();
    let sig = sign_parts(secret, &[storage_path, &exp]);
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("path", storage_path)
        .append_pair("exp", &exp)
        .append_pair("sig", &sig)
        .finish();
    format!("/files?{query}")
}

/// Validate a presented signature and expiry. Rejects tampered paths,
/// tampered expiries, and anything past its lifetime.
pub fn verify_signed_request(
    secret: &str,
    storage_path: &str,
    exp: &str,
    sig: &str,
    now: i64,
) -> bool {
    let Ok(exp_secs) = exp.parse::<i64>() else {
        return false;
    };
    if exp_secs <= now {
        return false;
    }
    let expected = sign_parts(secret, &[storage_path, exp]);
    hashes_equal(expected.as_bytes(), sig.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_url_round_trips() {
        let url = signed_url("secret", "emails/42/rent_roll.pdf", 3600, 1000);
        assert!(url.starts_with("/files?"));

        let pairs: std::collections::HashMap<String, String> =
            form_urlencoded::parse(url.trim_start_matches("/files?").as_bytes())
                .into_owned()
                .collect();
        assert_eq!(pairs["path"], "emails/42/rent_roll.pdf");
        assert_eq!(pairs["exp"], "4600");
        assert!(verify_signed_request(
            "secret",
            &pairs["path"],
            &pairs["exp"],
            &pairs["sig"],
            2000
        ));
    }

    #[test]
    fn expired_or_tampered_requests_are_rejected() {
        let url = signed_url("secret", "emails/42/a.pdf", 60, 1000);
        let pairs: std::collections::HashMap<String, String> =
            form_urlencoded::parse(url.trim_start_matches("/files?").as_bytes())
                .into_owned()
                .collect();

        // past expiry
        assert!(!verify_signed_request("secret", &pairs["path"], &pairs["exp"], &pairs["sig"], 1061));
        // tampered path
        assert!(!verify_signed_request("secret", "emails/42/b.pdf", &pairs["exp"], &pairs["sig"], 1001));
        // tampered expiry
        assert!(!verify_signed_request("secret", &pairs["path"], "99999", &pairs["sig"], 1001));
        // wrong secret
        assert!(!verify_signed_request("other", &pairs["path"], &pairs["exp"], &pairs["sig"], 1001));
    }
}
