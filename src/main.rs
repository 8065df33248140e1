use astra::Server;
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::connection::{init_db, Database};
use crate::responses::html_error_response;
use crate::router::{handle, App};

mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod geos;
mod mailer;
mod responses;
mod router;
mod templates;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env();
    let db = Database::new(cfg.database_path.clone());

    if let Err(e) = init_db(&db, "sql/schema.sql") {
        error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    // `copa_dashboard import <listings.json>` loads raw documents and exits;
    // the dashboard itself never creates listings.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(cmd) = args.first() {
        match (cmd.as_str(), args.get(1)) {
            ("import", Some(path)) => {
                run_import(&db, path);
                return;
            }
            _ => {
                eprintln!("usage: copa_dashboard [import <listings.json>]");
                std::process::exit(2);
            }
        }
    }

    refresh_neighborhoods(&db, &cfg);

    let addr: SocketAddr = match cfg.bind_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("invalid bind address {:?}: {e}", cfg.bind_addr);
            std::process::exit(1);
        }
    };
    info!("starting server at http://{addr}");

    let app = App { db, cfg };
    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => html_error_response(err),
    });

    if let Err(e) = result {
        error!("server ended with error: {e}");
    }
}

fn run_import(db: &Database, path: &str) {
    let raw = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            error!("reading {path} failed: {e}");
            std::process::exit(1);
        }
    };
    let value: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(v) => v,
        Err(e) => {
            error!("{path} is not valid JSON: {e}");
            std::process::exit(1);
        }
    };

    match db::listings::import_from_value(db, &value, chrono::Utc::now()) {
        Ok(summary) => info!(
            "imported {} listings ({} flagged for review, {} skipped)",
            summary.imported, summary.flagged, summary.skipped
        ),
        Err(e) => {
            error!("import failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Fetch the public neighborhood feed once per start and cache it. A failed
/// refresh is tolerated: the previously cached rows keep serving.
fn refresh_neighborhoods(db: &Database, cfg: &Config) {
    match geos::feed::fetch(&cfg.geodata_url) {
        Ok(features) => {
            if let Err(e) = db::neighborhoods::upsert_all(db, &features, chrono::Utc::now()) {
                warn!("caching neighborhood polygons failed: {e}");
            }
        }
        Err(e) => warn!("neighborhood feed refresh failed: {e}"),
    }
}
