//! Scoring configuration.
//!
//! Everything the original allocation guidelines treated as a tunable —
//! domain weights, the vulnerable-facility list, the SVI comparison
//! baseline — is explicit configuration passed into the scoring functions,
//! loadable from TOML. Defaults reproduce the published point tables.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::ScoringError;
use crate::report::{FacilityType, SviComparison};

/// Multipliers applied to the four domain sub-scores.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScoreWeights {
    /// Need/urgency domain weight.
    pub need: u32,
    /// Vulnerability domain weight.
    pub vulnerability: u32,
    /// Exposure domain weight.
    pub exposure: u32,
    /// Capacity domain weight.
    pub capacity: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            need: 1,
            vulnerability: 1,
            exposure: 1,
            capacity: 1,
        }
    }
}

/// Full scoring configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ScoringConfig {
    /// Domain weights.
    pub weights: ScoreWeights,
    /// Facility types serving vulnerable or underserved populations; each
    /// match adds one vulnerability point.
    pub vulnerable_types: BTreeSet<FacilityType>,
    /// Which reference population the SVI tract counts are scored against.
    pub svi_comparison: SviComparison,
    /// Percentile threshold for the high-vulnerability tract comparison.
    pub svi_percentile: f64,
    /// Capacity points substituted when bed occupancy is not reported
    /// (regional median).
    pub default_bed_occupancy_points: u32,
    /// Capacity points substituted when ICU occupancy is not reported
    /// (regional median).
    pub default_icu_occupancy_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            vulnerable_types: BTreeSet::from([
                FacilityType::Fqhc,
                FacilityType::DisproportionateShareHospital,
                FacilityType::RuralHealthClinic,
                FacilityType::CriticalAccessHospital,
                FacilityType::TribalHealthcare,
                FacilityType::CommunityHealthCenter,
                FacilityType::HomelessShelter,
                FacilityType::CorrectionalFacility,
            ]),
            svi_comparison: SviComparison::default(),
            svi_percentile: 75.0,
            default_bed_occupancy_points: 2,
            default_icu_occupancy_points: 2,
        }
    }
}

impl ScoringConfig {
    /// Parses a configuration from TOML text. Absent fields keep their
    /// defaults, so partial overrides are fine.
    ///
    /// # Errors
    ///
    /// Returns [`ScoringError`] if the TOML does not parse.
    pub fn from_toml_str(text: &str) -> Result<Self, ScoringError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_vulnerable_list_has_eight_types() {
        assert_eq!(ScoringConfig::default().vulnerable_types.len(), 8);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ScoringConfig::from_toml_str(
            "svi_comparison = \"region\"\n\
             [weights]\n\
             vulnerability = 2\n",
        )
        .unwrap();
        assert_eq!(config.svi_comparison, SviComparison::Region);
        assert_eq!(config.weights.vulnerability, 2);
        assert_eq!(config.weights.need, 1);
        assert!((config.svi_percentile - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn vulnerable_types_override() {
        let config =
            ScoringConfig::from_toml_str("vulnerable_types = [\"fqhc\", \"hs\"]\n").unwrap();
        assert_eq!(config.vulnerable_types.len(), 2);
        assert!(config.vulnerable_types.contains(&FacilityType::HomelessShelter));
    }

    #[test]
    fn invalid_toml_fails() {
        assert!(ScoringConfig::from_toml_str("weights = \"heavy\"").is_err());
    }
}
