// src/tests/router_tests/files_tests.rs
use chrono::Utc;

use crate::db::attachments::{signed_url, SIGNED_URL_TTL_SECS};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, listing_fixture, now_unix, seed_attachment, seed_email, seed_listing,
    test_app,
};

fn seed_pdf(app: &crate::router::App) -> &'static str {
    seed_listing(app, &listing_fixture("lst_f", "1 File St"));
    let email_id = seed_email(app, "lst_f", "Notice", "a@b.com", Utc::now());
    seed_attachment(
        app,
        email_id,
        "offering.pdf",
        "application/pdf",
        "emails/lst_f/offering.pdf",
        b"%PDF-1.4 offering memo",
    );
    "emails/lst_f/offering.pdf"
}

#[test]
fn signed_url_serves_the_attachment() {
    let app = test_app();
    let path = seed_pdf(&app);

    let url = signed_url(&app.cfg.signing_secret, path, SIGNED_URL_TTL_SECS, now_unix());
    let resp = handle(get(&url), &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()
            .get("Content-Type")
            .and_then(|v| v.to_str().ok()),
        Some("application/pdf")
    );
    assert!(resp
        .headers()
        .get("Content-Disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .contains("offering.pdf"));
    assert_eq!(body_string(resp), "%PDF-1.4 offering memo");
}

#[test]
fn tampered_signature_is_rejected() {
    let app = test_app();
    let path = seed_pdf(&app);

    let url = signed_url(&app.cfg.signing_secret, path, SIGNED_URL_TTL_SECS, now_unix());
    let tampered = url.replace("sig=", "sig=x");
    match handle(get(&tampered), &app) {
        Err(ServerError::Unauthorized(_)) => {}
        other => panic!("expected Unauthorized, got: {:?}", other),
    }
}

#[test]
fn expired_url_is_rejected() {
    let app = test_app();
    let path = seed_pdf(&app);

    // minted two hours ago with a one-hour lifetime
    let url = signed_url(
        &app.cfg.signing_secret,
        path,
        SIGNED_URL_TTL_SECS,
        now_unix() - 2 * SIGNED_URL_TTL_SECS,
    );
    match handle(get(&url), &app) {
        Err(ServerError::Unauthorized(_)) => {}
        other => panic!("expected Unauthorized, got: {:?}", other),
    }
}

#[test]
fn unknown_storage_path_is_not_found() {
    let app = test_app();
    seed_pdf(&app);

    let url = signed_url(
        &app.cfg.signing_secret,
        "emails/lst_f/other.pdf",
        SIGNED_URL_TTL_SECS,
        now_unix(),
    );
    match handle(get(&url), &app) {
        Err(ServerError::NotFound) => {}
        other => panic!("expected NotFound, got: {:?}", other),
    }
}
