//! Circular query buffers.
//!
//! A [`RadiusBuffer`] is an ephemeral true disk in the equal-area plane:
//! center plus radius in meters. Intersection tests use exact
//! point-to-polygon distance rather than a sampled N-gon approximation,
//! so tracts near the rim are never systematically excluded.

use crate::{PlanarPoint, SpatialError};

/// Meters per statute mile, the fixed conversion factor for radius input.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Converts a radius in miles to meters.
///
/// Radius queries must never buffer in unprojected degrees; callers convert
/// miles to meters here and build the buffer in the planar CRS.
#[must_use]
pub fn miles_to_meters(miles: f64) -> f64 {
    miles * METERS_PER_MILE
}

/// A circular buffer around a planar point. Constructed per query and
/// discarded after use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusBuffer {
    center: PlanarPoint,
    radius_m: f64,
}

impl RadiusBuffer {
    /// Creates a buffer of `radius_m` meters around `center`.
    ///
    /// The center must already be in the index's equal-area CRS; see
    /// [`crate::project`].
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidRadius`] unless `radius_m` is a
    /// positive finite number.
    pub fn new(center: PlanarPoint, radius_m: f64) -> Result<Self, SpatialError> {
        if radius_m.is_finite() && radius_m > 0.0 {
            Ok(Self { center, radius_m })
        } else {
            Err(SpatialError::InvalidRadius { radius: radius_m })
        }
    }

    /// The buffer center.
    #[must_use]
    pub const fn center(&self) -> PlanarPoint {
        self.center
    }

    /// The buffer radius in meters.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_miles() {
        assert!((miles_to_meters(1.0) - 1609.34).abs() < 1e-9);
        assert!((miles_to_meters(5.0) - 8046.7).abs() < 1e-9);
    }

    #[test]
    fn accepts_positive_radius() {
        let buffer = RadiusBuffer::new(PlanarPoint::new(0.0, 0.0), 100.0).unwrap();
        assert!((buffer.radius_m() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_positive_radius() {
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = RadiusBuffer::new(PlanarPoint::new(0.0, 0.0), radius).unwrap_err();
            assert!(matches!(err, SpatialError::InvalidRadius { .. }));
        }
    }
}
