#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! PPE allocation priority scoring.
//!
//! Prioritizes allocation of scarce PPE to facilities providing acute care
//! for COVID-19 patients whose workers are most at risk of infection,
//! while weighting equitable access for facilities serving vulnerable
//! populations. Four independent sub-scores — need, vulnerability,
//! exposure, capacity — are computed as pure functions over a
//! [`FacilityReport`] and combined under configured weights.
//!
//! The geographic inputs (high-SVI tract counts) come from the spatial
//! pipeline; see `ppe_priority_spatial` and `ppe_priority_svi`.

pub mod config;
pub mod report;

pub use config::{ScoreWeights, ScoringConfig};
pub use report::{
    FacilityReport, FacilityType, OccupancyBand, SupplyDuration, SurgeCapacity, SviComparison,
};

use serde::Serialize;
use thiserror::Error;

/// Errors from scoring configuration.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// Configuration TOML failed to parse.
    #[error("Invalid scoring config: {0}")]
    Config(#[from] toml::de::Error),
}

/// The weighted sub-scores and total for one facility request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Weighted need/urgency score.
    pub need: u32,
    /// Weighted vulnerability score.
    pub vulnerability: u32,
    /// Weighted exposure score.
    pub exposure: u32,
    /// Weighted capacity score.
    pub capacity: u32,
    /// Sum of the four weighted sub-scores.
    pub total: u32,
}

/// Unweighted need/urgency score: base urgency points for predicted
/// supply lifetime, multiplied by the conservation-posture factor.
#[must_use]
pub fn need_score(report: &FacilityReport) -> u32 {
    report.current_supply.points() * report.surge_capacity.multiplier()
}

/// Unweighted vulnerability score: one point per vulnerable facility type
/// served, plus the count of local tracts in the top SVI bracket of the
/// configured baseline.
#[must_use]
pub fn vulnerability_score(report: &FacilityReport, config: &ScoringConfig) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let type_points = report
        .facility_types
        .intersection(&config.vulnerable_types)
        .count() as u32;

    let svi_points = match config.svi_comparison {
        SviComparison::County => report.county_high_svi_tracts,
        SviComparison::Region => report.regional_high_svi_tracts,
    };

    type_points + svi_points
}

/// Unweighted exposure score: +10 for treating COVID-19 patients, +6 for
/// operating an ICU, +3 for aerosol-generating procedures without an ICU
/// (e.g. freestanding ERs, paramedics).
#[must_use]
pub fn exposure_score(report: &FacilityReport) -> u32 {
    let mut score = 0;
    if report.treats_covid {
        score += 10;
    }
    if report.has_icu {
        score += 6;
    }
    if report.aerosol_procedures && !report.has_icu {
        score += 3;
    }
    score
}

/// Unweighted capacity score from occupancy bands. Occupancy reporting is
/// optional; unreported bands score the configured regional-median
/// fallback. ICU occupancy only counts for facilities with an ICU.
#[must_use]
pub fn capacity_score(report: &FacilityReport, config: &ScoringConfig) -> u32 {
    let mut score = report
        .bed_occupancy
        .map_or(config.default_bed_occupancy_points, OccupancyBand::points);

    if report.has_icu {
        score += report
            .icu_occupancy
            .map_or(config.default_icu_occupancy_points, OccupancyBand::points);
    }

    score
}

/// Computes the full weighted priority score for one facility request.
#[must_use]
pub fn compute_priority(report: &FacilityReport, config: &ScoringConfig) -> ScoreBreakdown {
    let need = need_score(report) * config.weights.need;
    let vulnerability = vulnerability_score(report, config) * config.weights.vulnerability;
    let exposure = exposure_score(report) * config.weights.exposure;
    let capacity = capacity_score(report, config) * config.weights.capacity;

    ScoreBreakdown {
        need,
        vulnerability,
        exposure,
        capacity,
        total: need + vulnerability + exposure + capacity,
    }
}
