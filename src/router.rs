// src/router.rs
use std::collections::HashMap;
use std::io::Read;
use std::time::{SystemTime, UNIX_EPOCH};

use astra::Request;
use chrono::Utc;
use tracing::{error, info, warn};
use url::form_urlencoded;

use crate::auth::sessions::{self, SessionUser};
use crate::auth::signin::{SignInConfig, SignInService};
use crate::config::Config;
use crate::db::attachments::SIGNED_URL_TTL_SECS;
use crate::db::listings::UpdateResult;
use crate::db::{self, Database};
use crate::domain::editor::{self, EditForm, EditPhase, FieldErrors, SaveOutcome};
use crate::domain::filter::{filter_listings, FilterSpec, UnitBucket};
use crate::errors::{ResultResp, ServerError};
use crate::geos;
use crate::mailer::BrevoMailer;
use crate::responses::{
    file_response, html_response, html_response_with_status, redirect,
    redirect_with_session_cookie,
};
use crate::templates::components::editor_form::EditorVm;
use crate::templates::components::source_emails::{AttachmentLink, SourceEmail};
use crate::templates::pages::check_email::{check_email_content, sign_in_error_content};
use crate::templates::pages::dashboard::{dashboard_page, DashboardVm};
use crate::templates::pages::listing::{listing_page, ListingPageVm};
use crate::templates::pages::login::login_page;

/// Everything a request handler needs. Owned by the server loop and shared
/// read-only across workers.
pub struct App {
    pub db: Database,
    pub cfg: Config,
}

pub fn handle(mut req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => redirect("/dashboard"),

        ("GET", "/login") => match current_user(&req, app)? {
            Some(_) => redirect("/dashboard"),
            None => html_response(login_page()),
        },

        ("POST", "/auth/request-link") => request_link(&mut req, app),
        ("GET", "/auth/magic") => redeem_link(&req, app),
        ("POST", "/auth/logout") => logout(&req, app),

        ("GET", "/dashboard") => dashboard(&req, app),
        ("GET", "/files") => serve_file(&req, app),

        ("GET", p) if p.starts_with("/static/") => serve_static(p),

        _ => match path.strip_prefix("/listings/") {
            Some(id) if !id.is_empty() && !id.contains('/') => match method.as_str() {
                "GET" => listing_detail(&req, app, id),
                "POST" => listing_save(&mut req, app, id),
                _ => Err(ServerError::NotFound),
            },
            _ => Err(ServerError::NotFound),
        },
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

fn request_link(req: &mut Request, app: &App) -> ResultResp {
    let form = read_form(req)?;
    let email = form.get("email").map(String::as_str).unwrap_or("");

    let svc = SignInService::new(SignInConfig::default());
    let issued = match app
        .db
        .with_conn(|conn| svc.request_link(conn, email, now_unix()))
    {
        Ok(issued) => issued,
        // invalid address: inline, retryable, nothing persisted
        Err(ServerError::BadRequest(msg)) => return html_response(sign_in_error_content(&msg)),
        Err(other) => return Err(other),
    };

    let sign_in_url = format!("{}{}", app.cfg.public_base_url, issued.link);
    match &app.cfg.brevo_api_key {
        Some(key) => {
            let mailer = BrevoMailer::new(
                key.clone(),
                app.cfg.sender_email.clone(),
                app.cfg.sender_name.clone(),
            );
            if let Err(e) = mailer.send_sign_in_link(&issued.email, &sign_in_url) {
                error!("sign-in email to {} failed: {e}", issued.email);
                return html_response(sign_in_error_content(
                    "We could not send the email right now.",
                ));
            }
        }
        None => info!(
            "no mailer configured; sign-in link for {}: {sign_in_url}",
            issued.email
        ),
    }

    html_response(check_email_content(&issued.email))
}

fn redeem_link(req: &Request, app: &App) -> ResultResp {
    let pairs = query_pairs(req);
    let token = pairs
        .iter()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.as_str())
        .unwrap_or("");

    let now = now_unix();
    let svc = SignInService::new(SignInConfig::default());
    let redeemed = app.db.with_conn(|conn| svc.redeem(conn, token, now))?;
    let session = app
        .db
        .with_conn(|conn| sessions::create_session(conn, redeemed.user_id, now))?;

    redirect_with_session_cookie("/dashboard", &session)
}

fn logout(req: &Request, app: &App) -> ResultResp {
    if let Some(token) = session_token(req) {
        app.db
            .with_conn(|conn| sessions::revoke_session(conn, &token, now_unix()))?;
    }
    redirect_with_session_cookie("/login", "")
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn dashboard(req: &Request, app: &App) -> ResultResp {
    let Some(user) = current_user(req, app)? else {
        return redirect("/login");
    };

    let spec = filter_spec_from_query(&query_pairs(req));
    let all = db::listings::list_all(&app.db)?;
    let now = Utc::now();
    let listings = filter_listings(&all, &spec, now);
    let neighborhoods = db::neighborhoods::names(&app.db)?;

    let vm = DashboardVm {
        email: user.email,
        total_count: all.len(),
        listings,
        spec,
        neighborhoods,
        now,
    };
    html_response(dashboard_page(&vm))
}

fn filter_spec_from_query(pairs: &[(String, String)]) -> FilterSpec {
    let mut spec = FilterSpec::default();
    for (key, value) in pairs {
        match key.as_str() {
            "q" => spec.query = value.clone(),
            "neighborhood" => {
                if !value.is_empty() {
                    spec.neighborhoods.push(value.clone());
                }
            }
            "units" => spec.unit_bucket = UnitBucket::parse(value),
            "active" => spec.show_active = checkbox_on(value),
            "days_left" => {
                if let Ok(n) = value.parse::<i64>() {
                    spec.min_days_left = n;
                }
            }
            "flagged" => spec.flagged = checkbox_on(value),
            _ => {}
        }
    }
    spec
}

fn checkbox_on(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

// ---------------------------------------------------------------------------
// Listing detail + editor
// ---------------------------------------------------------------------------

fn listing_detail(req: &Request, app: &App, id: &str) -> ResultResp {
    let Some(user) = current_user(req, app)? else {
        return redirect("/login");
    };

    // best-effort audit trail, never blocks the view
    db::access_log::record_view_best_effort(&app.db, user.user_id, id, Utc::now());

    render_listing(app, &user, id, EditPhase::Viewing, None, FieldErrors::new(), None, 200)
}

fn listing_save(req: &mut Request, app: &App, id: &str) -> ResultResp {
    let Some(user) = current_user(req, app)? else {
        return redirect("/login");
    };

    let data = read_form(req)?;
    let get = |k: &str| data.get(k).cloned().unwrap_or_default();
    let form = EditForm {
        street_address: get("street_address"),
        neighborhood: get("neighborhood"),
        asking_price: get("asking_price"),
        total_units: get("total_units"),
        residential_units: get("residential_units"),
        vacant_residential: get("vacant_residential"),
        commercial_units: get("commercial_units"),
        vacant_commercial: get("vacant_commercial"),
        expected_updated_at: get("expected_updated_at"),
    };

    if get("action") == "find_neighborhood" {
        return find_neighborhood(app, &user, id, form);
    }

    let phase = EditPhase::Viewing.field_changed().save_requested();
    match editor::validate(&form) {
        Err(errors) => {
            // field errors block the save; re-render the form as-posted
            let phase = phase.validated(false);
            render_listing(app, &user, id, phase, Some(form), errors, None, 200)
        }
        Ok(patch) => {
            let phase = phase.validated(true);
            match db::listings::update_listing(
                &app.db,
                id,
                &patch,
                &form.expected_updated_at,
                Utc::now(),
            ) {
                Ok(UpdateResult::Updated { .. }) => {
                    let phase = phase.store_result(SaveOutcome::Saved);
                    // re-read so the form reflects the stored record and the
                    // fresh concurrency token
                    render_listing(app, &user, id, phase, None, FieldErrors::new(), None, 200)
                }
                Ok(UpdateResult::Conflict) => {
                    let phase = phase.store_result(SaveOutcome::Conflict);
                    render_listing(app, &user, id, phase, Some(form), FieldErrors::new(), None, 409)
                }
                Ok(UpdateResult::NotFound) => Err(ServerError::NotFound),
                Err(e) => {
                    error!("listing update failed for {id}: {e}");
                    let phase = phase.store_result(SaveOutcome::Error);
                    render_listing(app, &user, id, phase, Some(form), FieldErrors::new(), None, 200)
                }
            }
        }
    }
}

/// Editor helper: geocode the street address, then resolve the neighborhood
/// through our own polygon table. Every failure degrades to manual entry.
fn find_neighborhood(app: &App, user: &SessionUser, id: &str, mut form: EditForm) -> ResultResp {
    if form.street_address.trim().is_empty() {
        let mut errors = FieldErrors::new();
        errors.insert("street_address", "Enter a street address first".to_string());
        return render_listing(app, user, id, EditPhase::Editing, Some(form), errors, None, 200);
    }

    let notice = match geos::geocode::geocode_street_address(&form.street_address) {
        Ok(Some((lat, lng))) => {
            match db::neighborhoods::neighborhood_for_point(&app.db, lat, lng) {
                Ok(Some(name)) => {
                    form.neighborhood = name.clone();
                    format!("Found neighborhood: {name}")
                }
                Ok(None) => "Address is not in a recognized San Francisco neighborhood. \
                             Please select manually."
                    .to_string(),
                Err(e) => {
                    warn!("neighborhood lookup failed: {e}");
                    "Could not determine the neighborhood. Please select manually.".to_string()
                }
            }
        }
        Ok(None) => "Address not found. Please check the address.".to_string(),
        Err(e) => {
            warn!("geocoding failed: {e}");
            "Geocoding failed. Please select the neighborhood manually.".to_string()
        }
    };

    render_listing(app, user, id, EditPhase::Editing, Some(form), FieldErrors::new(), Some(notice), 200)
}

#[allow(clippy::too_many_arguments)]
fn render_listing(
    app: &App,
    user: &SessionUser,
    id: &str,
    phase: EditPhase,
    form_override: Option<EditForm>,
    errors: FieldErrors,
    notice: Option<String>,
    status: u16,
) -> ResultResp {
    let now = Utc::now();
    let listing = db::listings::get_one(&app.db, id)?.ok_or(ServerError::NotFound)?;

    // Decryption failure must not take down the detail view.
    let details = match db::details::get_decrypted_details(&app.db, id, user.user_id) {
        Ok(d) => d,
        Err(e) => {
            warn!("details lookup failed for {id}: {e}");
            None
        }
    };

    let email_rows = db::emails::list_for_listing(&app.db, id)?;
    let email_ids: Vec<i64> = email_rows.iter().map(|e| e.id).collect();
    let attachment_rows = match db::attachments::list_for_emails(&app.db, &email_ids) {
        Ok(rows) => rows,
        Err(e) => {
            warn!("attachment lookup failed for {id}: {e}");
            Vec::new()
        }
    };

    let now_secs = now_unix();
    let mut by_email: HashMap<i64, Vec<AttachmentLink>> = HashMap::new();
    for att in attachment_rows {
        let signed_url = att.storage_path.as_deref().map(|p| {
            db::attachments::signed_url(&app.cfg.signing_secret, p, SIGNED_URL_TTL_SECS, now_secs)
        });
        by_email
            .entry(att.email_id)
            .or_default()
            .push(AttachmentLink { row: att, signed_url });
    }
    let emails: Vec<SourceEmail> = email_rows
        .into_iter()
        .map(|email| SourceEmail {
            attachments: by_email.remove(&email.id).unwrap_or_default(),
            email,
        })
        .collect();

    let form = form_override.unwrap_or_else(|| EditForm::from_listing(&listing));
    let neighborhoods = db::neighborhoods::names(&app.db)?;

    let vm = ListingPageVm {
        listing: &listing,
        details: details.as_ref(),
        emails: &emails,
        editor: EditorVm {
            listing_id: id,
            phase,
            form: &form,
            errors: &errors,
            source: &listing,
            neighborhoods: &neighborhoods,
            notice,
        },
        now,
    };
    html_response_with_status(listing_page(&vm), status)
}

// ---------------------------------------------------------------------------
// Signed attachment files
// ---------------------------------------------------------------------------

fn serve_file(req: &Request, app: &App) -> ResultResp {
    let pairs = query_pairs(req);
    let get = |k: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == k)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    };
    let path = get("path");
    let exp = get("exp");
    let sig = get("sig");

    if !db::attachments::verify_signed_request(&app.cfg.signing_secret, path, exp, sig, now_unix())
    {
        return Err(ServerError::Unauthorized("invalid or expired link".into()));
    }
    // signed paths are always relative storage keys
    if path.is_empty() || path.contains("..") || path.starts_with('/') {
        return Err(ServerError::BadRequest("bad storage path".into()));
    }

    let attachment =
        db::attachments::find_by_storage_path(&app.db, path)?.ok_or(ServerError::NotFound)?;

    let full_path = std::path::Path::new(&app.cfg.storage_dir).join(path);
    let bytes = std::fs::read(&full_path).map_err(|_| ServerError::NotFound)?;

    file_response(bytes, attachment.content_type.as_deref(), &attachment.filename)
}

fn serve_static(path: &str) -> ResultResp {
    let rel = path.trim_start_matches('/');
    if rel.contains("..") {
        return Err(ServerError::BadRequest("bad static path".into()));
    }

    let content_type = match rel.rsplit('.').next() {
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    };

    let bytes = std::fs::read(rel).map_err(|_| ServerError::NotFound)?;
    let resp = astra::ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type)
        .header("Cache-Control", "public, max-age=3600")
        .body(astra::Body::from(bytes))
        .unwrap();
    Ok(resp)
}

// ---------------------------------------------------------------------------
// Request plumbing
// ---------------------------------------------------------------------------

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn query_pairs(req: &Request) -> Vec<(String, String)> {
    req.uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn read_form(req: &mut Request) -> Result<HashMap<String, String>, ServerError> {
    let mut buf = Vec::new();
    req.body_mut()
        .reader()
        .read_to_end(&mut buf)
        .map_err(|_| ServerError::BadRequest("unreadable request body".into()))?;
    Ok(form_urlencoded::parse(&buf).into_owned().collect())
}

fn session_token(req: &Request) -> Option<String> {
    let header = req.headers().get("cookie")?.to_str().ok()?;
    header
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("session=").map(str::to_string))
}

/// Resolve the session cookie to a user, if any. Handlers receive the user
/// as a value; no ambient session state exists anywhere.
fn current_user(req: &Request, app: &App) -> Result<Option<SessionUser>, ServerError> {
    let Some(token) = session_token(req) else {
        return Ok(None);
    };
    app.db
        .with_conn(|conn| sessions::load_user_from_session(conn, &token, now_unix()))
}
