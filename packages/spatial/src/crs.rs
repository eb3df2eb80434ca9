//! Coordinate reference system handling.
//!
//! Geographic coordinates (EPSG:4326) are not units of distance, so every
//! buffer or containment predicate runs in EPSG:2163 — US National Atlas
//! Equal Area, a Lambert azimuthal equal-area projection on the Clarke 1866
//! authalic sphere. Boundary datasets are pre-projected to this plane;
//! gazetteer output is reprojected here exactly once per query, immediately
//! after resolution.
//!
//! Distinct point types keep the two systems from mixing: a [`GeoPoint`]
//! cannot reach a geometric predicate without going through [`project`].

/// Radius of the Clarke 1866 authalic sphere, in meters (the EPSG:2163
/// datum sphere).
pub const SPHERE_RADIUS_M: f64 = 6_370_997.0;

/// Latitude of the projection center, in degrees.
const CENTER_LAT_DEG: f64 = 45.0;

/// Longitude of the projection center, in degrees.
const CENTER_LON_DEG: f64 = -100.0;

/// A geographic coordinate in EPSG:4326 (degrees, WGS84 order lon/lat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees, east-positive.
    pub lon: f64,
    /// Latitude in degrees, north-positive.
    pub lat: f64,
}

impl GeoPoint {
    /// Creates a geographic point from longitude and latitude in degrees.
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A planar coordinate in EPSG:2163 (meters east/north of the projection
/// center at 45°N 100°W).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanarPoint {
    /// Easting in meters.
    pub x: f64,
    /// Northing in meters.
    pub y: f64,
}

impl PlanarPoint {
    /// Creates a planar point from easting and northing in meters.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Projects a geographic point onto the EPSG:2163 plane.
///
/// Spherical Lambert azimuthal equal-area forward formulas. Defined for
/// the whole sphere except the antipode of the projection center (55°S
/// 80°E), which no US address resolves to.
#[must_use]
pub fn project(point: GeoPoint) -> PlanarPoint {
    let (sin_lat0, cos_lat0) = CENTER_LAT_DEG.to_radians().sin_cos();
    let (sin_lat, cos_lat) = point.lat.to_radians().sin_cos();
    let dlon = (point.lon - CENTER_LON_DEG).to_radians();
    let (sin_dlon, cos_dlon) = dlon.sin_cos();

    let k = (2.0 / (1.0 + sin_lat0 * sin_lat + cos_lat0 * cos_lat * cos_dlon)).sqrt();

    PlanarPoint {
        x: SPHERE_RADIUS_M * k * cos_lat * sin_dlon,
        y: SPHERE_RADIUS_M * k * (cos_lat0 * sin_lat - sin_lat0 * cos_lat * cos_dlon),
    }
}

/// Inverse-projects an EPSG:2163 planar point back to EPSG:4326.
#[must_use]
pub fn unproject(point: PlanarPoint) -> GeoPoint {
    let rho = point.x.hypot(point.y);
    if rho == 0.0 {
        return GeoPoint::new(CENTER_LON_DEG, CENTER_LAT_DEG);
    }

    let (sin_lat0, cos_lat0) = CENTER_LAT_DEG.to_radians().sin_cos();
    // Angular distance from the projection center; clamp guards rounding
    // at the outer edge of the projection domain.
    let c = 2.0 * (rho / (2.0 * SPHERE_RADIUS_M)).clamp(-1.0, 1.0).asin();
    let (sin_c, cos_c) = c.sin_cos();

    let lat = (cos_c * sin_lat0 + point.y * sin_c * cos_lat0 / rho).asin();
    let lon_offset = (point.x * sin_c).atan2(rho * cos_lat0 * cos_c - point.y * sin_lat0 * sin_c);

    GeoPoint {
        lon: CENTER_LON_DEG + lon_offset.to_degrees(),
        lat: lat.to_degrees(),
    }
}
