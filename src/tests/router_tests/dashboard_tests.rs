// src/tests/router_tests/dashboard_tests.rs
use chrono::{Duration, Utc};

use crate::router::handle;
use crate::tests::utils::{
    body_string, get, get_signed_in, listing_fixture, seed_listing, sign_in, test_app,
};

#[test]
fn dashboard_redirects_anonymous_to_login() {
    let app = test_app();

    let resp = handle(get("/dashboard"), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
}

#[test]
fn dashboard_lists_seeded_listings() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_a", "2210 Mission St"));
    seed_listing(&app, &listing_fixture("lst_b", "88 Haight St"));

    let session = sign_in(&app, "dash@example.org");
    let resp = handle(get_signed_in("/dashboard", &session), &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("2210 Mission St"));
    assert!(body.contains("88 Haight St"));
    assert!(body.contains("dash@example.org"));
}

#[test]
fn flagged_filter_is_a_strict_partition() {
    let app = test_app();
    let mut flagged = listing_fixture("lst_f", "1 Flagged Ave");
    flagged.flagged = true;
    seed_listing(&app, &flagged);
    seed_listing(&app, &listing_fixture("lst_ok", "2 Clean St"));

    let session = sign_in(&app, "f@example.org");

    // default: unflagged only
    let body = body_string(handle(get_signed_in("/dashboard", &session), &app).unwrap());
    assert!(body.contains("2 Clean St"));
    assert!(!body.contains("1 Flagged Ave"));

    // flagged=1: flagged only
    let body = body_string(
        handle(get_signed_in("/dashboard?flagged=1", &session), &app).unwrap(),
    );
    assert!(body.contains("1 Flagged Ave"));
    assert!(!body.contains("2 Clean St"));
}

#[test]
fn active_filter_end_to_end() {
    let app = test_app();
    let now = Utc::now();

    // days remaining: 0, 3, 5
    let mut expired = listing_fixture("lst_0", "10 Expired Way");
    expired.time_sent_tz = Some(now - Duration::days(6));
    let mut urgent = listing_fixture("lst_3", "30 Urgent Way");
    urgent.time_sent_tz = Some(now - Duration::days(2));
    let mut fresh = listing_fixture("lst_5", "50 Fresh Way");
    fresh.time_sent_tz = Some(now);
    seed_listing(&app, &expired);
    seed_listing(&app, &urgent);
    seed_listing(&app, &fresh);

    let session = sign_in(&app, "active@example.org");

    let body = body_string(
        handle(
            get_signed_in("/dashboard?active=1&days_left=1", &session),
            &app,
        )
        .unwrap(),
    );
    assert!(!body.contains("10 Expired Way"));
    assert!(body.contains("30 Urgent Way"));
    assert!(body.contains("50 Fresh Way"));

    let body = body_string(
        handle(
            get_signed_in("/dashboard?active=1&days_left=4", &session),
            &app,
        )
        .unwrap(),
    );
    assert!(!body.contains("10 Expired Way"));
    assert!(!body.contains("30 Urgent Way"));
    assert!(body.contains("50 Fresh Way"));
}

#[test]
fn neighborhood_and_unit_filters_combine() {
    let app = test_app();
    let mut soma = listing_fixture("lst_s", "500 Howard St");
    soma.neighborhood = Some("SOMA".to_string());
    soma.total_units = Some(40);
    seed_listing(&app, &soma);

    let mut mission_small = listing_fixture("lst_m", "22 Valencia St");
    mission_small.total_units = Some(4);
    seed_listing(&app, &mission_small);

    let session = sign_in(&app, "combo@example.org");

    let body = body_string(
        handle(
            get_signed_in("/dashboard?neighborhood=SOMA&units=26-49", &session),
            &app,
        )
        .unwrap(),
    );
    assert!(body.contains("500 Howard St"));
    assert!(!body.contains("22 Valencia St"));

    // bucket that matches nothing
    let body = body_string(
        handle(
            get_signed_in("/dashboard?neighborhood=SOMA&units=1-10", &session),
            &app,
        )
        .unwrap(),
    );
    assert!(body.contains("No properties match"));
}

#[test]
fn text_search_matches_email_subject() {
    let app = test_app();
    seed_listing(&app, &listing_fixture("lst_e", "9 Search St"));
    seed_listing(&app, &listing_fixture("lst_o", "7 Other St"));
    crate::tests::utils::seed_email(
        &app,
        "lst_e",
        "COPA Notice - 9 Search St",
        "agent@brokerage.com",
        Utc::now(),
    );

    let session = sign_in(&app, "search@example.org");
    let body = body_string(
        handle(get_signed_in("/dashboard?q=brokerage", &session), &app).unwrap(),
    );
    assert!(body.contains("9 Search St"));
    assert!(!body.contains("7 Other St"));
}
