#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory spatial index over census tract boundaries.
//!
//! Loads tract polygons (pre-projected to the US National Atlas equal-area
//! plane) from `GeoJSON` at startup, builds an R-tree index, and answers the
//! two query shapes the PPE priority pipeline needs:
//!
//! - which tracts intersect a circular buffer around a facility, and
//! - which county (STCOFIPS) contains a facility's location.
//!
//! The index is built once, is immutable afterwards, and is safe to share
//! across concurrent readers. [`shared::IndexCell`] models the explicit
//! load-then-query lifecycle for long-lived processes.

pub mod buffer;
pub mod crs;
pub mod index;
pub mod shared;

pub use buffer::{METERS_PER_MILE, RadiusBuffer, miles_to_meters};
pub use crs::{GeoPoint, PlanarPoint, project, unproject};
pub use index::TractIndex;
pub use shared::IndexCell;

use thiserror::Error;

/// Errors from tract index construction and queries.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The boundary dataset failed to parse or contained no usable tracts.
    /// Fatal to the load phase; there is no recovery path.
    #[error("Failed to load tract index: {message}")]
    IndexLoad {
        /// What went wrong during parsing or indexing.
        message: String,
    },

    /// A query was issued before the index finished loading.
    #[error("Tract index queried before load completed")]
    IndexNotReady,

    /// A buffer radius was zero, negative, or not a number.
    #[error("Invalid radius: {radius} (must be a positive number of meters)")]
    InvalidRadius {
        /// The rejected radius, in meters.
        radius: f64,
    },
}
