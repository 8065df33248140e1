// src/geos/polygon.rs
use serde::{Deserialize, Serialize};

/// A closed ring of [lng, lat] vertices (GeoJSON ordering).
pub type Ring = Vec<[f64; 2]>;

/// Flattened polygon geometry for one neighborhood. Holes are handled by
/// even-odd counting across all rings, so outer and inner rings can live
/// in the same list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub rings: Vec<Ring>,
}

impl Geometry {
    /// Even-odd ray cast: a point is inside when it crosses an odd number
    /// of edges on its way out.
    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        let mut inside = false;
        for ring in &self.rings {
            let n = ring.len();
            if n < 3 {
                continue;
            }
            let mut j = n - 1;
            for i in 0..n {
                let [xi, yi] = ring[i];
                let [xj, yj] = ring[j];
                let crosses = (yi > lat) != (yj > lat)
                    && lng < (xj - xi) * (lat - yi) / (yj - yi) + xi;
                if crosses {
                    inside = !inside;
                }
                j = i;
            }
        }
        inside
    }
}
