//! Facility self-report types.
//!
//! Priority scoring runs on self-reported intake data: it updates in real
//! time during a crisis and collects the same indicators from every
//! requesting facility, avoiding the measurement biases of external
//! facility-level datasets. Survey answer categories are explicit enums,
//! never compared as string sentinels.

use std::collections::BTreeSet;

use ppe_priority_geography_models::FacilityAddress;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Healthcare facility type codes from the intake form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
pub enum FacilityType {
    /// Acute care hospital.
    #[serde(rename = "ach")]
    #[strum(serialize = "ach")]
    AcuteCareHospital,
    /// Freestanding emergency room.
    #[serde(rename = "fs_er")]
    #[strum(serialize = "fs_er")]
    FreestandingEr,
    /// Field hospital.
    #[serde(rename = "fh")]
    #[strum(serialize = "fh")]
    FieldHospital,
    /// Hospital overflow facility.
    #[serde(rename = "hof")]
    #[strum(serialize = "hof")]
    HospitalOverflow,
    /// Emergency medical services / fire department.
    #[serde(rename = "ems")]
    #[strum(serialize = "ems")]
    Ems,
    /// Non-acute care hospital.
    #[serde(rename = "nach")]
    #[strum(serialize = "nach")]
    NonAcuteHospital,
    /// Residential or inpatient psychiatric facility.
    #[serde(rename = "rp")]
    #[strum(serialize = "rp")]
    ResidentialPsychiatric,
    /// Inpatient rehabilitation facility.
    #[serde(rename = "ir")]
    #[strum(serialize = "ir")]
    InpatientRehab,
    /// Residential substance treatment center.
    #[serde(rename = "rs")]
    #[strum(serialize = "rs")]
    ResidentialSubstanceTreatment,
    /// Nursing home, skilled nursing, or assisted living facility.
    #[serde(rename = "nh_sn_al")]
    #[strum(serialize = "nh_sn_al")]
    NursingHome,
    /// Long term care facility.
    #[serde(rename = "ltc")]
    #[strum(serialize = "ltc")]
    LongTermCare,
    /// Group home.
    #[serde(rename = "gh")]
    #[strum(serialize = "gh")]
    GroupHome,
    /// Homeless shelter.
    #[serde(rename = "hs")]
    #[strum(serialize = "hs")]
    HomelessShelter,
    /// Correctional facility or detention center.
    #[serde(rename = "cf_dt")]
    #[strum(serialize = "cf_dt")]
    CorrectionalFacility,
    /// Federally qualified health center (or look-alike).
    #[serde(rename = "fqhc")]
    #[strum(serialize = "fqhc")]
    Fqhc,
    /// Medicaid disproportionate share hospital.
    #[serde(rename = "dsh")]
    #[strum(serialize = "dsh")]
    DisproportionateShareHospital,
    /// Rural health clinic.
    #[serde(rename = "rhc")]
    #[strum(serialize = "rhc")]
    RuralHealthClinic,
    /// Critical access hospital.
    #[serde(rename = "cah")]
    #[strum(serialize = "cah")]
    CriticalAccessHospital,
    /// Indian or tribal healthcare facility.
    #[serde(rename = "indian_tribal")]
    #[strum(serialize = "indian_tribal")]
    TribalHealthcare,
    /// Community health center.
    #[serde(rename = "chc")]
    #[strum(serialize = "chc")]
    CommunityHealthCenter,
}

/// How long the facility's current supply of the requested item is
/// predicted to last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyDuration {
    /// No supply remaining — critical need.
    NoneRemaining,
    /// Two days or less — dire need.
    TwoDaysOrLess,
    /// One week or less — urgent need.
    OneWeekOrLess,
    /// Two weeks or less — high need.
    TwoWeeksOrLess,
    /// More than two weeks — moderate need.
    MoreThanTwoWeeks,
}

impl SupplyDuration {
    /// Base urgency points.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::NoneRemaining => 5,
            Self::TwoDaysOrLess => 4,
            Self::OneWeekOrLess => 3,
            Self::TwoWeeksOrLess => 2,
            Self::MoreThanTwoWeeks => 1,
        }
    }
}

/// The facility's PPE conservation posture for the requested item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurgeCapacity {
    /// Standard practices.
    Conventional,
    /// Conservation measures in effect.
    Contingency,
    /// Crisis standards of care.
    Crisis,
}

impl SurgeCapacity {
    /// Multiplier applied to the base urgency points.
    #[must_use]
    pub const fn multiplier(self) -> u32 {
        match self {
            Self::Conventional => 1,
            Self::Contingency => 10,
            Self::Crisis => 100,
        }
    }
}

/// Reported occupancy relative to licensed capacity. Absence of a value
/// means "not reported", which scores a configured regional-median
/// fallback instead of zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupancyBand {
    /// 100–150 % of licensed capacity.
    #[serde(rename = "100_150")]
    Percent100To150,
    /// 151–200 % of licensed capacity.
    #[serde(rename = "151_200")]
    Percent151To200,
    /// More than 200 % of licensed capacity.
    #[serde(rename = "over_200")]
    Over200,
}

impl OccupancyBand {
    /// Capacity strain points.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Percent100To150 => 1,
            Self::Percent151To200 => 2,
            Self::Over200 => 3,
        }
    }
}

/// Which reference population the SVI comparison ran against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SviComparison {
    /// Compare local tracts to the containing county's tracts.
    #[default]
    County,
    /// Compare local tracts to the whole region's tracts.
    Region,
}

/// A facility's PPE request self-report, the input to priority scoring.
///
/// The SVI tract counts are produced by the geographic pipeline (radius
/// query + vulnerability aggregation) before scoring; both baselines are
/// carried so the comparison choice stays a configuration concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityReport {
    /// The facility's postal address.
    pub address: FacilityAddress,
    /// All facility type codes the facility self-identifies as.
    pub facility_types: BTreeSet<FacilityType>,
    /// Predicted lifetime of current supply.
    pub current_supply: SupplyDuration,
    /// PPE conservation posture.
    pub surge_capacity: SurgeCapacity,
    /// Whether the facility is treating confirmed COVID-19 patients.
    pub treats_covid: bool,
    /// Whether the facility operates an ICU.
    pub has_icu: bool,
    /// Whether the facility performs aerosol-generating procedures.
    pub aerosol_procedures: bool,
    /// Reported bed occupancy band, if any.
    #[serde(default)]
    pub bed_occupancy: Option<OccupancyBand>,
    /// Reported ICU occupancy band, if any. Ignored unless
    /// [`has_icu`](Self::has_icu) is set.
    #[serde(default)]
    pub icu_occupancy: Option<OccupancyBand>,
    /// Local tracts in the top SVI bracket of the county baseline.
    #[serde(default)]
    pub county_high_svi_tracts: u32,
    /// Local tracts in the top SVI bracket of the regional baseline.
    #[serde(default)]
    pub regional_high_svi_tracts: u32,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn facility_type_codes_round_trip() {
        assert_eq!(FacilityType::from_str("fqhc").unwrap(), FacilityType::Fqhc);
        assert_eq!(
            FacilityType::from_str("nh_sn_al").unwrap(),
            FacilityType::NursingHome
        );
        assert_eq!(FacilityType::Fqhc.to_string(), "fqhc");
        assert!(FacilityType::from_str("hospital").is_err());
    }

    #[test]
    fn supply_points_are_ordered_by_urgency() {
        assert_eq!(SupplyDuration::NoneRemaining.points(), 5);
        assert_eq!(SupplyDuration::MoreThanTwoWeeks.points(), 1);
    }

    #[test]
    fn surge_multipliers() {
        assert_eq!(SurgeCapacity::Conventional.multiplier(), 1);
        assert_eq!(SurgeCapacity::Contingency.multiplier(), 10);
        assert_eq!(SurgeCapacity::Crisis.multiplier(), 100);
    }

    #[test]
    fn report_deserializes_with_optional_fields_absent() {
        let json = r#"{
            "address": {
                "street": "77 Massachusetts Avenue",
                "city": "Cambridge",
                "state": "MA",
                "postalCode": "02139"
            },
            "facilityTypes": ["ach", "dsh"],
            "currentSupply": "two_days_or_less",
            "surgeCapacity": "contingency",
            "treatsCovid": true,
            "hasIcu": true,
            "aerosolProcedures": true
        }"#;
        let report: FacilityReport = serde_json::from_str(json).unwrap();
        assert_eq!(report.current_supply, SupplyDuration::TwoDaysOrLess);
        assert!(report.bed_occupancy.is_none());
        assert_eq!(report.county_high_svi_tracts, 0);
        assert!(report.facility_types.contains(&FacilityType::AcuteCareHospital));
    }

    #[test]
    fn occupancy_band_uses_survey_labels() {
        let band: OccupancyBand = serde_json::from_str(r#""151_200""#).unwrap();
        assert_eq!(band, OccupancyBand::Percent151To200);
        assert_eq!(band.points(), 2);
    }
}
