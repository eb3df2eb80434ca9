#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Facility address and census geography identifier types.
//!
//! These types are shared by the gazetteer resolver, the spatial index, and
//! the CLI. They carry no geometry; polygon handling lives in
//! `ppe_priority_spatial`.

pub mod fips;

use serde::{Deserialize, Serialize};

/// A facility's postal address as reported on a PPE request intake form.
///
/// All four fields are accepted for completeness and traceability, but only
/// [`postal_code`](Self::postal_code) participates in geographic resolution:
/// the street, city, and state are logged alongside results and otherwise
/// unused. Callers should not expect street-level precision from downstream
/// lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityAddress {
    /// Street number and name (e.g. "77 Massachusetts Avenue").
    pub street: String,
    /// City name.
    pub city: String,
    /// Two-letter state abbreviation.
    pub state: String,
    /// 5-digit ZIP code, optionally in ZIP+4 form.
    pub postal_code: String,
}

impl FacilityAddress {
    /// Formats the address as a single display line.
    #[must_use]
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street, self.city, self.state, self.postal_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_format() {
        let addr = FacilityAddress {
            street: "77 Massachusetts Avenue".to_string(),
            city: "Cambridge".to_string(),
            state: "MA".to_string(),
            postal_code: "02139".to_string(),
        };
        assert_eq!(
            addr.one_line(),
            "77 Massachusetts Avenue, Cambridge, MA 02139"
        );
    }

    #[test]
    fn serde_round_trip() {
        let addr = FacilityAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
        };
        let json = serde_json::to_string(&addr).unwrap();
        assert!(json.contains("postalCode"));
        let back: FacilityAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
