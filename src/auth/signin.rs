// src/auth/signin.rs
use rusqlite::Connection;

use crate::auth::token::{generate_token_default, hash_token};
use crate::db::auth as db_auth;
use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct SignInConfig {
    /// TTL for one-time sign-in links, in seconds.
    pub ttl_secs: i64,
    /// Relative path used when building links, e.g. "/auth/magic".
    pub redeem_path: String,
}

impl Default for SignInConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 15 * 60,
            redeem_path: "/auth/magic".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IssuedSignIn {
    pub email: String,
    pub user_id: i64,
    /// Raw token (never stored; only its hash goes to the DB).
    pub token: String,
    pub expires_at: i64,
    /// Relative URL like "/auth/magic?token=..."
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct RedeemedSignIn {
    pub user_id: i64,
    pub email: String,
}

/// One-time-code email login, signup and login unified: any vetted staff
/// email gets a user row on first request.
pub struct SignInService {
    cfg: SignInConfig,
}

impl SignInService {
    pub fn new(cfg: SignInConfig) -> Self {
        Self { cfg }
    }

    /// Trim + lowercase, minimal sanity check.
    pub fn normalize_email(email: &str) -> Result<String, ServerError> {
        let e = email.trim().to_lowercase();
        if e.is_empty() || !e.contains('@') || e.starts_with('@') || e.ends_with('@') {
            return Err(ServerError::BadRequest("invalid email".into()));
        }
        Ok(e)
    }

    /// Request a sign-in link: normalize email, get-or-create the user,
    /// store the token hash. Sending the email is the caller's concern.
    pub fn request_link(
        &self,
        conn: &Connection,
        email: &str,
        now: i64,
    ) -> Result<IssuedSignIn, ServerError> {
        let email = Self::normalize_email(email)?;
        let user_id = db_auth::get_or_create_user(conn, &email, now)?;

        let token = generate_token_default();
        let token_hash = hash_token(&token);
        let expires_at = now + self.cfg.ttl_secs;

        db_auth::insert_login_token(conn, user_id, &token_hash, now, expires_at)?;

        let link = format!("{}?token={}", self.cfg.redeem_path, token);
        Ok(IssuedSignIn {
            email,
            user_id,
            token,
            expires_at,
            link,
        })
    }

    /// Redeem a sign-in token (transactional single-use) and record the login.
    pub fn redeem(
        &self,
        conn: &mut Connection,
        token: &str,
        now: i64,
    ) -> Result<RedeemedSignIn, ServerError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServerError::BadRequest("missing token".into()));
        }

        let token_hash = hash_token(token);
        let Some(user_id) = db_auth::consume_login_token(conn, &token_hash, now)? else {
            return Err(ServerError::Unauthorized("invalid or expired link".into()));
        };

        conn.execute(
            "update users set last_login_at = ? where id = ?",
            rusqlite::params![now, user_id],
        )
        .map_err(|e| ServerError::DbError(format!("update last_login_at failed: {e}")))?;

        let email = db_auth::user_email(conn, user_id)?;
        Ok(RedeemedSignIn { user_id, email })
    }
}
