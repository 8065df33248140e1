// src/tests/router_tests/auth_flow_tests.rs
use crate::auth::signin::{SignInConfig, SignInService};
use crate::errors::ServerError;
use crate::router::handle;
use crate::tests::utils::{body_string, get, get_signed_in, post_form, now_unix, test_app};

#[test]
fn login_page_loads_successfully() {
    let app = test_app();

    let resp = handle(get("/login"), &app).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Sign in"));
    assert!(body.contains("form"));
}

#[test]
fn request_link_returns_partial_html_for_htmx() {
    let app = test_app();
    let email = "staff@example.org";

    let req = post_form("/auth/request-link", None, &[("email", email)]);
    let resp = handle(req, &app).expect("Failed to handle request");
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("Check your email"));
    assert!(body.contains(email));

    // partial, not a full document, which is crucial for HTMX swapping
    assert!(!body.contains("<!DOCTYPE html>"));
    assert!(!body.contains("<html"));
}

#[test]
fn invalid_email_shows_inline_error() {
    let app = test_app();

    let req = post_form("/auth/request-link", None, &[("email", "not-an-address")]);
    let resp = handle(req, &app).unwrap();
    assert_eq!(resp.status(), 200);

    let body = body_string(resp);
    assert!(body.contains("invalid email"));
    assert!(!body.contains("Check your email"));
}

#[test]
fn magic_redeem_sets_session_and_redirects() {
    let app = test_app();

    // Issue a sign-in link directly against the store
    let token = app
        .db
        .with_conn(|conn| {
            let svc = SignInService::new(SignInConfig::default());
            let issued = svc.request_link(conn, "c@d.org", now_unix())?;
            Ok::<_, ServerError>(issued.token)
        })
        .unwrap();

    let resp = handle(get(&format!("/auth/magic?token={token}")), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/dashboard")
    );

    let cookie = resp
        .headers()
        .get("Set-Cookie")
        .and_then(|v| v.to_str().ok())
        .expect("session cookie set");
    assert!(cookie.starts_with("session="));

    // the cookie is a live session
    let session = cookie
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap();
    let dash = handle(get_signed_in("/dashboard", session), &app).unwrap();
    assert_eq!(dash.status(), 200);
    assert!(body_string(dash).contains("c@d.org"));
}

#[test]
fn invalid_token_is_rejected() {
    let app = test_app();

    let res = handle(get("/auth/magic?token=bogus"), &app);
    match res {
        Err(ServerError::Unauthorized(_)) => {}
        other => panic!("expected Unauthorized, got: {:?}", other),
    }
}

#[test]
fn logout_revokes_the_session() {
    let app = test_app();
    let session = crate::tests::utils::sign_in(&app, "out@example.org");

    let resp = handle(post_form("/auth/logout", Some(&session), &[]), &app).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/login")
    );

    // the old cookie no longer works
    let dash = handle(get_signed_in("/dashboard", &session), &app).unwrap();
    assert_eq!(dash.status(), 302);
    assert_eq!(
        dash.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("/login")
    );
}
