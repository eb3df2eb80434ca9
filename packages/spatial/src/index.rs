//! R-tree index over census tract polygons.
//!
//! Adapted query shapes:
//!
//! - [`TractIndex::tracts_in_buffer`] — all tracts sharing any area with a
//!   circular buffer (strict geometric intersection, not
//!   centroid-containment).
//! - [`TractIndex::counties_containing`] — STCOFIPS of the tract(s) whose
//!   polygon contains a point.
//!
//! Queries are clipped to the loaded dataset: a buffer near the edge of a
//! loaded state omits true neighbors from adjacent, unloaded datasets.
//! That is a declared constraint of the lookup, not an error, and is never
//! corrected by guessing at unloaded geography.

use std::collections::BTreeSet;

use geo::{BoundingRect, Distance, Euclidean, Intersects, MultiPolygon};
use geojson::GeoJson;
use ppe_priority_geography_models::fips;
use rstar::{AABB, RTree, RTreeObject};

use crate::{PlanarPoint, RadiusBuffer, SpatialError};

/// A tract polygon stored in the R-tree with its census identifiers.
struct TractEntry {
    fips: String,
    stcofips: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for TractEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable spatial index over a tract boundary dataset.
///
/// Built once per process from a `GeoJSON` `FeatureCollection` whose
/// geometries are pre-projected to the EPSG:2163 plane, then queried many
/// times. All query operations are read-only, so one loaded index can be
/// shared across concurrent queries without locking.
pub struct TractIndex {
    tracts: RTree<TractEntry>,
}

impl TractIndex {
    /// Parses a tract boundary `FeatureCollection` and builds the R-tree.
    ///
    /// Each feature needs a `FIPS` (or `GEOID`) property carrying the
    /// 11-digit tract code and a `Polygon`/`MultiPolygon` geometry in the
    /// equal-area plane. The 5-digit STCOFIPS comes from a `STCOFIPS` (or
    /// `STCNTY`) property when present, otherwise from the FIPS prefix.
    /// Features with unusable identifiers or geometry are skipped with a
    /// warning; duplicate FIPS codes keep the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::IndexLoad`] if the document does not parse
    /// or no usable tract survives filtering.
    pub fn load(geojson_text: &str) -> Result<Self, SpatialError> {
        let geojson: GeoJson = geojson_text
            .parse()
            .map_err(|e: geojson::Error| SpatialError::IndexLoad {
                message: format!("GeoJSON parse failure: {e}"),
            })?;

        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::IndexLoad {
                message: "boundary dataset is not a FeatureCollection".to_string(),
            });
        };

        let mut seen = BTreeSet::new();
        let mut entries = Vec::new();

        for feature in collection.features {
            let Some(fips) = property_string(feature.properties.as_ref(), &["FIPS", "GEOID"])
            else {
                log::warn!("Skipping tract feature without a FIPS/GEOID property");
                continue;
            };

            let stcofips = property_string(feature.properties.as_ref(), &["STCOFIPS", "STCNTY"])
                .or_else(|| fips::county_prefix(&fips).map(String::from));
            let Some(stcofips) = stcofips else {
                log::warn!("Skipping tract {fips}: identifier too short to derive a county");
                continue;
            };

            let Some(polygon) = feature.geometry.and_then(to_multi_polygon) else {
                log::warn!("Skipping tract {fips}: missing or non-polygon geometry");
                continue;
            };

            if !seen.insert(fips.clone()) {
                log::warn!("Duplicate tract FIPS {fips}; keeping the first occurrence");
                continue;
            }

            let envelope = compute_envelope(&polygon);

            entries.push(TractEntry {
                fips,
                stcofips,
                envelope,
                polygon,
            });
        }

        if entries.is_empty() {
            return Err(SpatialError::IndexLoad {
                message: "boundary dataset contains no usable tracts".to_string(),
            });
        }

        log::info!("Loaded {} census tracts into spatial index", entries.len());

        Ok(Self {
            tracts: RTree::bulk_load(entries),
        })
    }

    /// Number of tracts in the index.
    #[must_use]
    pub fn tract_count(&self) -> usize {
        self.tracts.size()
    }

    /// Returns the FIPS codes of every tract whose polygon shares any area
    /// with the buffer disk.
    ///
    /// The test is exact: a tract intersects when its minimum distance to
    /// the buffer center is at most the radius, so tracts straddling the
    /// rim are included even when only partially overlapping, and tangency
    /// (distance exactly equal to the radius) counts as intersecting.
    #[must_use]
    pub fn tracts_in_buffer(&self, buffer: &RadiusBuffer) -> BTreeSet<String> {
        let center = buffer.center();
        let radius = buffer.radius_m();
        let point = geo::Point::new(center.x, center.y);
        let query_env = AABB::from_corners(
            [center.x - radius, center.y - radius],
            [center.x + radius, center.y + radius],
        );

        self.tracts
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| Euclidean.distance(&point, &entry.polygon) <= radius)
            .map(|entry| entry.fips.clone())
            .collect()
    }

    /// Returns the STCOFIPS codes of the tract(s) whose polygon contains
    /// the point.
    ///
    /// Normally a single county, but the test is boundary-inclusive
    /// (`geo::Intersects`), so a point on a shared tract edge matches every
    /// adjacent tract and the full set is returned. An empty set means the
    /// point lies outside the loaded dataset ("outside coverage"), which is
    /// distinct from a resolution failure.
    #[must_use]
    pub fn counties_containing(&self, point: PlanarPoint) -> BTreeSet<String> {
        let geo_point = geo::Point::new(point.x, point.y);
        let query_env = AABB::from_point([point.x, point.y]);

        self.tracts
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.intersects(&geo_point))
            .map(|entry| entry.stcofips.clone())
            .collect()
    }
}

/// Reads the first present property from `keys` as a string.
fn property_string(
    properties: Option<&geojson::JsonObject>,
    keys: &[&str],
) -> Option<String> {
    let properties = properties?;
    keys.iter().find_map(|key| {
        properties
            .get(*key)
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    })
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multi_polygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Computes the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A 2x2 grid of 1000 m square tracts in two counties, with x/y as
    /// planar meters. West column is county 25017, east column 25025.
    fn grid_fixture() -> String {
        let tract = |fips: &str, stcofips: &str, x0: f64, y0: f64| {
            format!(
                r#"{{"type":"Feature","properties":{{"FIPS":"{fips}","STCOFIPS":"{stcofips}"}},
                   "geometry":{{"type":"Polygon","coordinates":[[
                     [{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]
                   ]]}}}}"#,
                x1 = x0 + 1000.0,
                y1 = y0 + 1000.0,
            )
        };
        format!(
            r#"{{"type":"FeatureCollection","features":[{},{},{},{}]}}"#,
            tract("25017000100", "25017", 0.0, 0.0),
            tract("25017000200", "25017", 0.0, 1000.0),
            tract("25025000100", "25025", 1000.0, 0.0),
            tract("25025000200", "25025", 1000.0, 1000.0),
        )
    }

    fn load_grid() -> TractIndex {
        TractIndex::load(&grid_fixture()).unwrap()
    }

    #[test]
    fn loads_all_tracts() {
        assert_eq!(load_grid().tract_count(), 4);
    }

    #[test]
    fn rejects_empty_collection() {
        let err = TractIndex::load(r#"{"type":"FeatureCollection","features":[]}"#).unwrap_err();
        assert!(matches!(err, SpatialError::IndexLoad { .. }));
    }

    #[test]
    fn rejects_garbage() {
        let err = TractIndex::load("not geojson").unwrap_err();
        assert!(matches!(err, SpatialError::IndexLoad { .. }));
    }

    #[test]
    fn derives_stcofips_from_fips_prefix() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"GEOID":"25017353500"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}}
        ]}"#;
        let index = TractIndex::load(doc).unwrap();
        let counties = index.counties_containing(PlanarPoint::new(0.5, 0.5));
        assert_eq!(counties, BTreeSet::from(["25017".to_string()]));
    }

    #[test]
    fn point_in_tract_interior_matches_exactly_one_county() {
        let index = load_grid();
        let counties = index.counties_containing(PlanarPoint::new(500.0, 500.0));
        assert_eq!(counties, BTreeSet::from(["25017".to_string()]));
    }

    #[test]
    fn point_on_shared_edge_matches_both_counties() {
        let index = load_grid();
        let counties = index.counties_containing(PlanarPoint::new(1000.0, 500.0));
        assert_eq!(
            counties,
            BTreeSet::from(["25017".to_string(), "25025".to_string()])
        );
    }

    #[test]
    fn point_outside_coverage_is_empty_not_an_error() {
        let index = load_grid();
        assert!(
            index
                .counties_containing(PlanarPoint::new(50_000.0, 50_000.0))
                .is_empty()
        );
    }

    #[test]
    fn small_buffer_hits_only_the_containing_tract() {
        let index = load_grid();
        let buffer = RadiusBuffer::new(PlanarPoint::new(500.0, 500.0), 100.0).unwrap();
        assert_eq!(
            index.tracts_in_buffer(&buffer),
            BTreeSet::from(["25017000100".to_string()])
        );
    }

    #[test]
    fn buffer_includes_partially_overlapped_tracts() {
        // 600 m from (500, 500) crosses into the east column at x=1000.
        let index = load_grid();
        let buffer = RadiusBuffer::new(PlanarPoint::new(500.0, 500.0), 600.0).unwrap();
        let fips = index.tracts_in_buffer(&buffer);
        assert!(fips.contains("25017000100"));
        assert!(fips.contains("25025000100"));
        assert!(!fips.contains("25025000200"));
    }

    #[test]
    fn radius_growth_is_monotonic() {
        let index = load_grid();
        let center = PlanarPoint::new(500.0, 500.0);
        let mut previous = BTreeSet::new();
        for radius in [100.0, 501.0, 600.0, 800.0, 2500.0] {
            let buffer = RadiusBuffer::new(center, radius).unwrap();
            let current = index.tracts_in_buffer(&buffer);
            assert!(
                previous.is_subset(&current),
                "radius {radius} dropped tracts"
            );
            previous = current;
        }
        assert_eq!(previous.len(), 4);
    }

    #[test]
    fn buffer_outside_coverage_is_empty() {
        let index = load_grid();
        let buffer = RadiusBuffer::new(PlanarPoint::new(90_000.0, 90_000.0), 500.0).unwrap();
        assert!(index.tracts_in_buffer(&buffer).is_empty());
    }

    #[test]
    fn corner_reach_uses_true_disk_distance() {
        // The nearest corner of the NE tract is (1000, 1000), at distance
        // ~707.1 m from (500, 500). A 700 m buffer misses it; 710 m hits it.
        let index = load_grid();
        let center = PlanarPoint::new(500.0, 500.0);
        let short = RadiusBuffer::new(center, 700.0).unwrap();
        assert!(!index.tracts_in_buffer(&short).contains("25025000200"));
        let long = RadiusBuffer::new(center, 710.0).unwrap();
        assert!(index.tracts_in_buffer(&long).contains("25025000200"));
    }

    #[test]
    fn cambridge_address_resolves_to_middlesex_county() {
        // Gazetteer point for postal code 02139, reprojected once, with a
        // tract polygon covering it in the equal-area plane.
        let point = crate::project(crate::GeoPoint::new(-71.1046, 42.3626));
        let doc = format!(
            r#"{{"type":"FeatureCollection","features":[
                {{"type":"Feature","properties":{{"FIPS":"25017353500","STCOFIPS":"25017"}},
                  "geometry":{{"type":"Polygon","coordinates":[[
                    [{x0},{y0}],[{x1},{y0}],[{x1},{y1}],[{x0},{y1}],[{x0},{y0}]
                  ]]}}}}
            ]}}"#,
            x0 = point.x - 5000.0,
            y0 = point.y - 5000.0,
            x1 = point.x + 5000.0,
            y1 = point.y + 5000.0,
        );
        let index = TractIndex::load(&doc).unwrap();

        let counties = index.counties_containing(point);
        assert_eq!(counties, BTreeSet::from(["25017".to_string()]));

        let buffer =
            RadiusBuffer::new(point, crate::miles_to_meters(5.0)).unwrap();
        let tracts = index.tracts_in_buffer(&buffer);
        assert!(!tracts.is_empty());
        assert!(tracts.iter().all(|fips| fips.starts_with("25")));
    }

    #[test]
    fn duplicate_fips_keeps_first() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"FIPS":"25017000100","STCOFIPS":"25017"},
             "geometry":{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type":"Feature","properties":{"FIPS":"25017000100","STCOFIPS":"99999"},
             "geometry":{"type":"Polygon","coordinates":[[[100,100],[110,100],[110,110],[100,110],[100,100]]]}}
        ]}"#;
        let index = TractIndex::load(doc).unwrap();
        assert_eq!(index.tract_count(), 1);
        let counties = index.counties_containing(PlanarPoint::new(5.0, 5.0));
        assert_eq!(counties, BTreeSet::from(["25017".to_string()]));
    }
}
