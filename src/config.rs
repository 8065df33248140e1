// src/config.rs
use std::env;
use tracing::warn;

/// Runtime configuration, read once at startup. Every value has a
/// development default so `cargo run` works with an empty environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the server binds, e.g. "127.0.0.1:3000".
    pub bind_addr: String,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Directory holding email attachment files (served via signed URLs only).
    pub storage_dir: String,
    /// Secret mixed into signed-URL signatures.
    pub signing_secret: String,
    /// Base URL used when building absolute sign-in links for email.
    pub public_base_url: String,
    /// Brevo API key. Absent in development: sign-in links are logged instead.
    pub brevo_api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
    /// Public neighborhood geodata feed (name + polygon per row).
    pub geodata_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let signing_secret = match env::var("COPA_SIGNING_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("COPA_SIGNING_SECRET not set, using development default");
                "dev-secret-not-for-production".to_string()
            }
        };

        Self {
            bind_addr: var_or("COPA_BIND_ADDR", "127.0.0.1:3000"),
            database_path: var_or("COPA_DATABASE_PATH", "copa_dashboard.sqlite3"),
            storage_dir: var_or("COPA_STORAGE_DIR", "attachments"),
            signing_secret,
            public_base_url: var_or("COPA_PUBLIC_BASE_URL", "http://127.0.0.1:3000"),
            brevo_api_key: env::var("BREVO_API_KEY").ok().filter(|s| !s.is_empty()),
            sender_email: var_or("COPA_SENDER_EMAIL", "no-reply@copa.local"),
            sender_name: var_or("COPA_SENDER_NAME", "COPA Dashboard"),
            geodata_url: var_or(
                "COPA_GEODATA_URL",
                "https://data.sfgov.org/resource/gfpk-269f.json?$limit=2000",
            ),
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}
