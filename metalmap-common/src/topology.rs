//! World atlas topology
//!
//! Decodes a TopoJSON topology (the `world-atlas` countries file) into named
//! country features with lon/lat rings. The decoded features are keyed by
//! name once at load and never mutated.
//!
//! Projection and painting stay with the browser; this module only provides
//! what the pipeline needs: name lookup, a centroid for the search pulse, and
//! a GeoJSON rendition for the page.

use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::{Error, Result};

/// Object inside `objects` holding the country geometries
pub const COUNTRIES_OBJECT: &str = "countries";

/// A closed ring of `[lon, lat]` positions
pub type Ring = Vec<[f64; 2]>;

/// A polygon: outer ring followed by holes
pub type Polygon = Vec<Ring>;

#[derive(Debug, Deserialize)]
struct Topology {
    #[serde(default)]
    transform: Option<Transform>,
    #[serde(default)]
    arcs: Vec<Vec<Vec<f64>>>,
    #[serde(default)]
    objects: BTreeMap<String, GeometryCollection>,
}

#[derive(Debug, Deserialize)]
struct Transform {
    scale: [f64; 2],
    translate: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct GeometryCollection {
    #[serde(default)]
    geometries: Vec<GeometryObject>,
}

#[derive(Debug, Deserialize)]
struct GeometryObject {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    arcs: Value,
    #[serde(default)]
    properties: Option<FeatureProperties>,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    name: Option<String>,
}

/// Country feature: canonical name plus polygons in lon/lat
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

impl CountryFeature {
    /// Area-weighted planar centroid of the outer rings, in `[lon, lat]`
    ///
    /// Falls back to the mean vertex when every ring is degenerate. Returns
    /// `None` for features without geometry.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        let mut area_sum = 0.0;
        let mut cx = 0.0;
        let mut cy = 0.0;

        for ring in self.polygons.iter().filter_map(|p| p.first()) {
            let (a, x, y) = ring_moments(ring);
            area_sum += a;
            cx += x;
            cy += y;
        }

        if area_sum.abs() > f64::EPSILON {
            return Some([cx / (3.0 * area_sum), cy / (3.0 * area_sum)]);
        }

        let points: Vec<&[f64; 2]> = self.polygons.iter().flatten().flatten().collect();
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        Some([
            points.iter().map(|p| p[0]).sum::<f64>() / n,
            points.iter().map(|p| p[1]).sum::<f64>() / n,
        ])
    }

    /// GeoJSON feature for the page's renderer
    pub fn to_geojson(&self) -> Value {
        let geometry = if self.polygons.is_empty() {
            Value::Null
        } else {
            json!({ "type": "MultiPolygon", "coordinates": self.polygons })
        };
        json!({
            "type": "Feature",
            "properties": { "name": self.name },
            "geometry": geometry,
        })
    }
}

/// Signed area and first moments of a ring (shoelace)
fn ring_moments(ring: &Ring) -> (f64, f64, f64) {
    let mut a = 0.0;
    let mut x = 0.0;
    let mut y = 0.0;
    for pair in ring.windows(2) {
        let [x0, y0] = pair[0];
        let [x1, y1] = pair[1];
        let cross = x0 * y1 - x1 * y0;
        a += cross;
        x += (x0 + x1) * cross;
        y += (y0 + y1) * cross;
    }
    (a / 2.0, x / 2.0, y / 2.0)
}

/// Name-keyed lookup of country features
#[derive(Debug, Clone, Default)]
pub struct Atlas {
    features: BTreeMap<String, CountryFeature>,
}

impl Atlas {
    /// Build from already decoded features
    ///
    /// Later features with a duplicate name replace earlier ones.
    pub fn from_features(features: impl IntoIterator<Item = CountryFeature>) -> Self {
        Self {
            features: features.into_iter().map(|f| (f.name.clone(), f)).collect(),
        }
    }

    /// Decode a TopoJSON document
    pub fn from_topojson(text: &str) -> Result<Self> {
        let topology: Topology = serde_json::from_str(text)?;
        let arcs = decode_arcs(&topology.arcs, topology.transform.as_ref());

        let collection = topology.objects.get(COUNTRIES_OBJECT).ok_or_else(|| {
            Error::InvalidInput(format!("topology has no '{}' object", COUNTRIES_OBJECT))
        })?;

        let mut features = Vec::new();
        for geometry in &collection.geometries {
            let Some(name) = geometry.properties.as_ref().and_then(|p| p.name.clone()) else {
                continue;
            };
            let polygons = match geometry.kind.as_deref() {
                Some("Polygon") => vec![polygon_from(&geometry.arcs, &arcs)?],
                Some("MultiPolygon") => geometry
                    .arcs
                    .as_array()
                    .map(|polys| {
                        polys
                            .iter()
                            .map(|p| polygon_from(p, &arcs))
                            .collect::<Result<Vec<Polygon>>>()
                    })
                    .transpose()?
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            features.push(CountryFeature { name, polygons });
        }

        Ok(Self::from_features(features))
    }

    pub fn get(&self, name: &str) -> Option<&CountryFeature> {
        self.features.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.features.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Features in name order
    pub fn features(&self) -> impl Iterator<Item = &CountryFeature> {
        self.features.values()
    }

    /// GeoJSON FeatureCollection of the whole atlas
    pub fn to_geojson(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features().map(CountryFeature::to_geojson).collect::<Vec<_>>(),
        })
    }
}

/// Apply the quantization transform (delta decoding) to every arc
fn decode_arcs(raw: &[Vec<Vec<f64>>], transform: Option<&Transform>) -> Vec<Ring> {
    raw.iter()
        .map(|arc| {
            let mut x = 0.0;
            let mut y = 0.0;
            arc.iter()
                .filter(|p| p.len() >= 2)
                .map(|p| match transform {
                    Some(t) => {
                        x += p[0];
                        y += p[1];
                        [x * t.scale[0] + t.translate[0], y * t.scale[1] + t.translate[1]]
                    }
                    None => [p[0], p[1]],
                })
                .collect()
        })
        .collect()
}

/// Stitch one polygon (`[[arc index]]`) out of decoded arcs
fn polygon_from(value: &Value, arcs: &[Ring]) -> Result<Polygon> {
    let rings = value
        .as_array()
        .ok_or_else(|| Error::InvalidInput("polygon arcs must be an array".to_string()))?;
    rings.iter().map(|ring| ring_from(ring, arcs)).collect()
}

fn ring_from(value: &Value, arcs: &[Ring]) -> Result<Ring> {
    let indexes = value
        .as_array()
        .ok_or_else(|| Error::InvalidInput("ring arcs must be an array".to_string()))?;

    let mut ring: Ring = Vec::new();
    for index in indexes {
        let index = index
            .as_i64()
            .ok_or_else(|| Error::InvalidInput("arc index must be an integer".to_string()))?;
        // Negative indexes reference the one's complement arc, reversed
        let (arc_index, reversed) = if index < 0 { (!index, true) } else { (index, false) };
        let arc = arcs
            .get(arc_index as usize)
            .ok_or_else(|| Error::InvalidInput(format!("arc index {} out of range", index)))?;

        let mut points = arc.clone();
        if reversed {
            points.reverse();
        }
        // Consecutive arcs share their joining point
        let skip = usize::from(!ring.is_empty());
        ring.extend(points.into_iter().skip(skip));
    }
    Ok(ring)
}
