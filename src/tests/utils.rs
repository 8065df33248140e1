use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use astra::{Body, Response};
use chrono::{DateTime, Utc};
use http::Method;

use crate::auth::sessions;
use crate::config::Config;
use crate::db::auth::get_or_create_user;
use crate::db::connection::{init_db, Database};
use crate::domain::listing::Listing;
use crate::errors::ServerError;
use crate::router::App;

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// Fresh app with its own temp database and attachment dir, using the
/// production schema. No mailer key: sign-in links are logged, not sent.
pub fn test_app() -> App {
    let nanos = nanos();
    let db_path = std::env::temp_dir().join(format!("copa_router_test_{nanos}.sqlite"));
    let storage_dir = std::env::temp_dir().join(format!("copa_storage_test_{nanos}"));
    std::fs::create_dir_all(&storage_dir).unwrap();

    let db = Database::new(db_path.to_string_lossy().to_string());
    init_db(&db, "sql/schema.sql").expect("Failed to initialize DB");

    App {
        db,
        cfg: Config {
            bind_addr: "127.0.0.1:0".to_string(),
            database_path: db_path.to_string_lossy().to_string(),
            storage_dir: storage_dir.to_string_lossy().to_string(),
            signing_secret: "test-secret".to_string(),
            public_base_url: "http://dashboard.test".to_string(),
            brevo_api_key: None,
            sender_email: "no-reply@dashboard.test".to_string(),
            sender_name: "COPA Dashboard".to_string(),
            geodata_url: "http://unused.test".to_string(),
        },
    }
}

/// Create a user and a live session directly, returning the session token
/// for the cookie header.
pub fn sign_in(app: &App, email: &str) -> String {
    app.db
        .with_conn(|conn| {
            let user_id = get_or_create_user(conn, email, now_unix())?;
            sessions::create_session(conn, user_id, now_unix())
        })
        .unwrap()
}

pub fn get(uri: &str) -> astra::Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_signed_in(uri: &str, session: &str) -> astra::Request {
    http::Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("Cookie", format!("session={session}"))
        .body(Body::empty())
        .unwrap()
}

pub fn post_form(uri: &str, session: Option<&str>, fields: &[(&str, &str)]) -> astra::Request {
    let mut body = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in fields {
        body.append_pair(k, v);
    }
    let body = body.finish();

    let mut builder = http::Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(token) = session {
        builder = builder.header("Cookie", format!("session={token}"));
    }
    builder.body(Body::from(body.into_bytes())).unwrap()
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body()
        .reader()
        .read_to_string(&mut body)
        .unwrap();
    body
}

/// Minimal listing fixture; callers override what they need.
pub fn listing_fixture(id: &str, street: &str) -> Listing {
    Listing {
        id: id.to_string(),
        street_address: street.to_string(),
        full_address: None,
        neighborhood: Some("Mission".to_string()),
        latitude: None,
        longitude: None,
        total_units: Some(6),
        residential_units: Some(5),
        vacant_residential: None,
        commercial_units: Some(1),
        vacant_commercial: None,
        asking_price: Some(1_500_000),
        time_sent_tz: None,
        flagged: false,
        is_vacant_lot: false,
        updated_at: None,
        email_subject: None,
        email_sender: None,
    }
}

pub fn seed_listing(app: &App, listing: &Listing) {
    crate::db::listings::insert_normalized(&app.db, listing, None, Utc::now()).unwrap();
}

pub fn seed_email(
    app: &App,
    listing_id: &str,
    subject: &str,
    from_address: &str,
    received_at: DateTime<Utc>,
) -> i64 {
    app.db
        .with_conn(|conn| {
            conn.execute(
                "insert into emails (listing_id, subject, from_address, raw_text, received_at)
                 values (?, ?, ?, ?, ?)",
                rusqlite::params![
                    listing_id,
                    subject,
                    from_address,
                    "Notice body text",
                    received_at.to_rfc3339()
                ],
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
            Ok(conn.last_insert_rowid())
        })
        .unwrap()
}

pub fn seed_attachment(
    app: &App,
    email_id: i64,
    filename: &str,
    content_type: &str,
    storage_path: &str,
    bytes: &[u8],
) {
    let full = std::path::Path::new(&app.cfg.storage_dir).join(storage_path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(&full, bytes).unwrap();

    app.db
        .with_conn(|conn| {
            conn.execute(
                "insert into email_attachments
                     (email_id, filename, content_type, file_size, storage_path)
                 values (?, ?, ?, ?, ?)",
                rusqlite::params![
                    email_id,
                    filename,
                    content_type,
                    bytes.len() as i64,
                    storage_path
                ],
            )
            .map_err(|e| ServerError::DbError(e.to_string()))?;
            Ok(())
        })
        .unwrap();
}
