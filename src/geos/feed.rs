// src/geos/feed.rs
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::errors::ServerError;
use crate::geos::polygon::Geometry;

/// One row of the public neighborhood feed: a name plus MultiPolygon
/// geometry in GeoJSON [lng, lat] order.
#[derive(Debug, Deserialize)]
struct FeedRow {
    name: Option<String>,
    the_geom: Option<FeedGeometry>,
}

#[derive(Debug, Deserialize)]
struct FeedGeometry {
    #[serde(rename = "type")]
    kind: Option<String>,
    coordinates: Option<serde_json::Value>,
}

/// Fetch the neighborhood reference feed once. Called at startup; the
/// result is cached in the `neighborhoods` table and treated as static
/// reference data for the rest of the session.
pub fn fetch(url: &str) -> Result<Vec<(String, Geometry)>, ServerError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| ServerError::UpstreamError(format!("build http client failed: {e}")))?;

    let rows: Vec<FeedRow> = client
        .get(url)
        .send()
        .map_err(|e| ServerError::UpstreamError(format!("neighborhood feed fetch failed: {e}")))?
        .error_for_status()
        .map_err(|e| ServerError::UpstreamError(format!("neighborhood feed status: {e}")))?
        .json()
        .map_err(|e| ServerError::UpstreamError(format!("neighborhood feed parse failed: {e}")))?;

    let mut out = Vec::new();
    for row in rows {
        let Some(name) = row.name.filter(|n| !n.trim().is_empty()) else {
            continue;
        };
        let Some(geom) = row.the_geom else { continue };
        if let Some(geometry) = flatten_geometry(&geom) {
            out.push((name, geometry));
        }
    }
    info!("fetched {} neighborhood polygons", out.len());
    Ok(out)
}

/// MultiPolygon coordinates are [polygon][ring][vertex][lng/lat]; plain
/// Polygon drops the outermost level. Either way we flatten to a ring list.
fn flatten_geometry(geom: &FeedGeometry) -> Option<Geometry> {
    let coords = geom.coordinates.as_ref()?;
    let mut rings = Vec::new();

    match geom.kind.as_deref() {
        Some("MultiPolygon") => {
            for polygon in coords.as_array()? {
                for ring in polygon.as_array()? {
                    rings.push(parse_ring(ring)?);
                }
            }
        }
        Some("Polygon") => {
            for ring in coords.as_array()? {
                rings.push(parse_ring(ring)?);
            }
        }
        _ => return None,
    }

    if rings.is_empty() {
        None
    } else {
        Some(Geometry { rings })
    }
}

fn parse_ring(ring: &serde_json::Value) -> Option<Vec<[f64; 2]>> {
    let mut out = Vec::new();
    for vertex in ring.as_array()? {
        let pair = vertex.as_array()?;
        let lng = pair.first()?.as_f64()?;
        let lat = pair.get(1)?.as_f64()?;
        out.push([lng, lat]);
    }
    Some(out)
}
