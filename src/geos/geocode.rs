// src/geos/geocode.rs
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::errors::ServerError;

const NOMINATIM_SEARCH: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

/// Forward-geocode a street address (scoped to San Francisco, like the
/// notices themselves). Returns (lat, lng), or None when the provider has
/// no match. Network and parse failures are errors for the caller to
/// degrade on; there is no retry.
pub fn geocode_street_address(street_address: &str) -> Result<Option<(f64, f64)>, ServerError> {
    let query = format!("{}, San Francisco, CA", street_address.trim());
    let url = Url::parse_with_params(
        NOMINATIM_SEARCH,
        &[
            ("q", query.as_str()),
            ("format", "json"),
            ("limit", "1"),
            ("countrycodes", "us"),
        ],
    )
    .map_err(|e| ServerError::UpstreamError(format!("build geocode url failed: {e}")))?;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| ServerError::UpstreamError(format!("build http client failed: {e}")))?;

    let hits: Vec<NominatimHit> = client
        .get(url)
        // Nominatim requires an identifying UA
        .header("User-Agent", "copa-dashboard/0.1")
        .send()
        .map_err(|e| ServerError::UpstreamError(format!("geocode request failed: {e}")))?
        .error_for_status()
        .map_err(|e| ServerError::UpstreamError(format!("geocode status: {e}")))?
        .json()
        .map_err(|e| ServerError::UpstreamError(format!("geocode parse failed: {e}")))?;

    let Some(hit) = hits.first() else {
        return Ok(None);
    };

    match (hit.lat.parse::<f64>(), hit.lon.parse::<f64>()) {
        (Ok(lat), Ok(lng)) => Ok(Some((lat, lng))),
        _ => Ok(None),
    }
}
