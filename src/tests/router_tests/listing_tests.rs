// src/tests/router_tests/listing_tests.rs
use chrono::Utc;

use crate::db::listings::{get_one, insert_normalized};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{
    body_string, get, get_signed_in, listing_fixture, post_form, seed_attachment, seed_email,
    seed_listing, sign_in, test_app,
};

#[test]
fn listing_detail_requires_login() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_p", "1 Private St"));

    let resp = handle(get("/listings/lst_p"), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
}

#[test]
fn detail_page_shows_sources_details_and_editor() {
    let app = test_app();
    let raw = serde_json::json!({
        "id": "lst_d",
        "street_address": "2210 Mission St",
        "neighborhood": "Mission",
        "total_units": 8,
        "time_sent_tz": Utc::now().to_rfc3339(),
        "details": {
            "phone_number": "(415) 555-0114",
            "financials": { "net_operating_income": 210000 }
        }
    });
    let parsed = crate::domain::listing::RawListing::from_value(&raw).unwrap();
    let details = parsed.details_value();
    insert_normalized(&app.db, &parsed.normalize(), details.as_ref(), Utc::now()).unwrap();

    let email_id = seed_email(
        &app,
        "lst_d",
        "COPA Notice - 2210 Mission",
        "agent@brokerage.com",
        Utc::now(),
    );
    seed_attachment(
        &app,
        email_id,
        "rent_roll.pdf",
        "application/pdf",
        "emails/lst_d/rent_roll.pdf",
        b"%PDF-1.4 fake",
    );

    let session = sign_in(&app, "viewer@example.org");
    let resp = handle(get_signed_in("/listings/lst_d", &session), &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    // header + countdown
    assert!(body.contains("2210 Mission St"));
    assert!(body.contains("days left"));
    // source materials with a signed attachment link
    assert!(body.contains("COPA Notice - 2210 Mission"));
    assert!(body.contains("rent_roll.pdf"));
    assert!(body.contains("/files?path="));
    // decrypted details
    assert!(body.contains("(415) 555-0114"));
    assert!(body.contains("$210,000"));
    // editor form bound to the concurrency token
    let token = get_one(&app.db, "lst_d").unwrap().unwrap().updated_at.unwrap();
    assert!(body.contains(&token));
}

#[test]
fn detail_view_writes_the_access_log() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_log", "5 Audit St"));

    let session = sign_in(&app, "audit@example.org");
    handle(get_signed_in("/listings/lst_log", &session), &app).unwrap();

    let count: i64 = app
        .db
        .with_conn(|conn| {
            conn.query_row(
                "select count(*) from listing_access_log where listing_id = 'lst_log'",
                [],
                |r| r.get(0),
            )
            .map_err(|e| ServerError::DbError(e.to_string()))
        })
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn missing_listing_is_not_found() {
    let app = test_app();
    let session = sign_in(&app, "missing@example.org");

    let res = handle(get_signed_in("/listings/lst_nope", &session), &app);
    match res {
        Err(ServerError::NotFound) => {}
        other => panic!("expected NotFound, got: {:?}", other),
    }
}

fn save_fields<'a>(street: &'a str, token: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("action", "save"),
        ("street_address", street),
        ("neighborhood", "Mission"),
        ("asking_price", "1,750,000"),
        ("total_units", "10"),
        ("residential_units", "4"),
        ("vacant_residential", ""),
        ("commercial_units", "4"),
        ("vacant_commercial", ""),
        ("expected_updated_at", token),
    ]
}

#[test]
fn valid_save_updates_listing_and_shows_banner() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_s", "1 Before St"));
    let token = get_one(&app.db, "lst_s").unwrap().unwrap().updated_at.unwrap();

    let session = sign_in(&app, "editor@example.org");
    let req = post_form(
        "/listings/lst_s",
        Some(&session),
        &save_fields("2 After St", &token),
    );
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("Changes saved successfully!"));

    let after = get_one(&app.db, "lst_s").unwrap().unwrap();
    assert_eq!(after.street_address, "2 After St");
    assert_eq!(after.asking_price, Some(1_750_000));
    // the token rotated
    assert_ne!(after.updated_at.unwrap(), token);
}

#[test]
fn stale_token_save_conflicts_instead_of_overwriting() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_c", "1 Original St"));
    let token = get_one(&app.db, "lst_c").unwrap().unwrap().updated_at.unwrap();
    let session = sign_in(&app, "racer@example.org");

    // first writer wins
    let first = handle(
        post_form(
            "/listings/lst_c",
            Some(&session),
            &save_fields("2 First Writer St", &token),
        ),
        &app,
    )
    .unwrap();
    assert_eq!(first.status(), 200);

    // second writer still holds the stale token
    let second = handle(
        post_form(
            "/listings/lst_c",
            Some(&session),
            &save_fields("3 Second Writer St", &token),
        ),
        &app,
    )
    .unwrap();
    assert_eq!(second.status(), 409);
    let body = body_string(second);
    assert!(body.contains("changed by someone else"));
    assert!(body.contains("Reload the listing"));

    // no overwrite happened
    let after = get_one(&app.db, "lst_c").unwrap().unwrap();
    assert_eq!(after.street_address, "2 First Writer St");
}

#[test]
fn validation_errors_block_the_save() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_v", "1 Valid St"));
    let token = get_one(&app.db, "lst_v").unwrap().unwrap().updated_at.unwrap();
    let session = sign_in(&app, "validator@example.org");

    // 6 + 6 > 10
    let req = post_form(
        "/listings/lst_v",
        Some(&session),
        &[
            ("action", "save"),
            ("street_address", "1 Valid St"),
            ("total_units", "10"),
            ("residential_units", "6"),
            ("commercial_units", "6"),
            ("expected_updated_at", &token),
        ],
    );
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).contains("Total units must be ≥ residential + commercial"));

    // nothing was written
    let after = get_one(&app.db, "lst_v").unwrap().unwrap();
    assert_eq!(after.total_units, Some(6));
    assert_eq!(after.updated_at.unwrap(), token);
}
