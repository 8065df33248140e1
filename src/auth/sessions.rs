// src/auth/sessions.rs
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::auth::token::generate_token_default;
use crate::errors::ServerError;

const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7; // 7 days

/// The authenticated identity resolved from a session cookie.
/// Passed by value into handlers and templates; there is no ambient
/// session singleton anywhere.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i64,
    pub email: String,
}

pub fn create_session(conn: &Connection, user_id: i64, now: i64) -> Result<String, ServerError> {
    let raw_token = generate_token_default();
    let hash = Sha256::digest(raw_token.as_bytes());
    let expires_at = now + SESSION_TTL_SECS;

    conn.execute(
        "insert into sessions (user_id, token_hash, created_at, expires_at)
         values (?, ?, ?, ?)",
        params![user_id, hash.as_slice(), now, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(raw_token)
}

pub fn load_user_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<SessionUser>, ServerError> {
    let hash = Sha256::digest(raw_token.as_bytes());

    conn.query_row(
        "select u.id, u.email
         from sessions s
         join users u on u.id = s.user_id
         where s.token_hash = ?
           and s.expires_at > ?
           and s.revoked_at is null",
        params![hash.as_slice(), now],
        |row| {
            Ok(SessionUser {
                user_id: row.get(0)?,
                email: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}

pub fn revoke_session(conn: &Connection, raw_token: &str, now: i64) -> Result<(), ServerError> {
    let hash = Sha256::digest(raw_token.as_bytes());

    conn.execute(
        "update sessions set revoked_at = ? where token_hash = ? and revoked_at is null",
        params![now, hash.as_slice()],
    )
    .map_err(|e| ServerError::DbError(format!("revoke session failed: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_schema(conn: &Connection) {
        conn.execute_batch(
            r#"
            create table if not exists users (
              id            integer primary key,
              email         text not null unique,
              created_at    integer not null,
              last_login_at integer
            );

            create table if not exists sessions (
              id         integer primary key,
              user_id    integer not null,
              token_hash blob not null,
              created_at integer not null,
              expires_at integer not null,
              revoked_at integer
            );
            "#,
        )
        .unwrap();
        conn.execute(
            "insert into users (email, created_at) values ('s@t.org', 1)",
            [],
        )
        .unwrap();
    }

    #[test]
    fn session_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn);

        let token = create_session(&conn, 1, 1000).unwrap();
        let user = load_user_from_session(&conn, &token, 1001).unwrap().unwrap();
        assert_eq!(user.user_id, 1);
        assert_eq!(user.email, "s@t.org");
    }

    #[test]
    fn expired_session_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn);

        let token = create_session(&conn, 1, 1000).unwrap();
        let late = 1000 + SESSION_TTL_SECS + 1;
        assert!(load_user_from_session(&conn, &token, late).unwrap().is_none());
    }

    #[test]
    fn revoked_session_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        apply_schema(&conn);

        let token = create_session(&conn, 1, 1000).unwrap();
        revoke_session(&conn, &token, 1001).unwrap();
        assert!(load_user_from_session(&conn, &token, 1002).unwrap().is_none());
    }
}
