//! US state FIPS code utilities.
//!
//! Census identifiers used throughout the toolchain are FIPS-prefixed:
//! an 11-digit tract FIPS is 2-digit state + 3-digit county + 6-digit
//! tract, and the 5-digit state+county prefix (STCOFIPS) identifies the
//! containing county.

/// A US state (or DC) with its census identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateFips {
    /// Two-digit state FIPS code.
    pub fips: &'static str,
    /// Two-letter postal abbreviation.
    pub abbr: &'static str,
    /// Full state name.
    pub name: &'static str,
}

/// The 50 US states + DC, ordered by FIPS code.
pub const STATES: &[StateFips] = &[
    StateFips { fips: "01", abbr: "AL", name: "Alabama" },
    StateFips { fips: "02", abbr: "AK", name: "Alaska" },
    StateFips { fips: "04", abbr: "AZ", name: "Arizona" },
    StateFips { fips: "05", abbr: "AR", name: "Arkansas" },
    StateFips { fips: "06", abbr: "CA", name: "California" },
    StateFips { fips: "08", abbr: "CO", name: "Colorado" },
    StateFips { fips: "09", abbr: "CT", name: "Connecticut" },
    StateFips { fips: "10", abbr: "DE", name: "Delaware" },
    StateFips { fips: "11", abbr: "DC", name: "District of Columbia" },
    StateFips { fips: "12", abbr: "FL", name: "Florida" },
    StateFips { fips: "13", abbr: "GA", name: "Georgia" },
    StateFips { fips: "15", abbr: "HI", name: "Hawaii" },
    StateFips { fips: "16", abbr: "ID", name: "Idaho" },
    StateFips { fips: "17", abbr: "IL", name: "Illinois" },
    StateFips { fips: "18", abbr: "IN", name: "Indiana" },
    StateFips { fips: "19", abbr: "IA", name: "Iowa" },
    StateFips { fips: "20", abbr: "KS", name: "Kansas" },
    StateFips { fips: "21", abbr: "KY", name: "Kentucky" },
    StateFips { fips: "22", abbr: "LA", name: "Louisiana" },
    StateFips { fips: "23", abbr: "ME", name: "Maine" },
    StateFips { fips: "24", abbr: "MD", name: "Maryland" },
    StateFips { fips: "25", abbr: "MA", name: "Massachusetts" },
    StateFips { fips: "26", abbr: "MI", name: "Michigan" },
    StateFips { fips: "27", abbr: "MN", name: "Minnesota" },
    StateFips { fips: "28", abbr: "MS", name: "Mississippi" },
    StateFips { fips: "29", abbr: "MO", name: "Missouri" },
    StateFips { fips: "30", abbr: "MT", name: "Montana" },
    StateFips { fips: "31", abbr: "NE", name: "Nebraska" },
    StateFips { fips: "32", abbr: "NV", name: "Nevada" },
    StateFips { fips: "33", abbr: "NH", name: "New Hampshire" },
    StateFips { fips: "34", abbr: "NJ", name: "New Jersey" },
    StateFips { fips: "35", abbr: "NM", name: "New Mexico" },
    StateFips { fips: "36", abbr: "NY", name: "New York" },
    StateFips { fips: "37", abbr: "NC", name: "North Carolina" },
    StateFips { fips: "38", abbr: "ND", name: "North Dakota" },
    StateFips { fips: "39", abbr: "OH", name: "Ohio" },
    StateFips { fips: "40", abbr: "OK", name: "Oklahoma" },
    StateFips { fips: "41", abbr: "OR", name: "Oregon" },
    StateFips { fips: "42", abbr: "PA", name: "Pennsylvania" },
    StateFips { fips: "44", abbr: "RI", name: "Rhode Island" },
    StateFips { fips: "45", abbr: "SC", name: "South Carolina" },
    StateFips { fips: "46", abbr: "SD", name: "South Dakota" },
    StateFips { fips: "47", abbr: "TN", name: "Tennessee" },
    StateFips { fips: "48", abbr: "TX", name: "Texas" },
    StateFips { fips: "49", abbr: "UT", name: "Utah" },
    StateFips { fips: "50", abbr: "VT", name: "Vermont" },
    StateFips { fips: "51", abbr: "VA", name: "Virginia" },
    StateFips { fips: "53", abbr: "WA", name: "Washington" },
    StateFips { fips: "54", abbr: "WV", name: "West Virginia" },
    StateFips { fips: "55", abbr: "WI", name: "Wisconsin" },
    StateFips { fips: "56", abbr: "WY", name: "Wyoming" },
];

/// Looks up a state by its two-digit FIPS code.
#[must_use]
pub fn by_fips(fips: &str) -> Option<&'static StateFips> {
    STATES.iter().find(|s| s.fips == fips)
}

/// Looks up a state by its two-letter abbreviation (case-insensitive).
#[must_use]
pub fn by_abbr(abbr: &str) -> Option<&'static StateFips> {
    STATES.iter().find(|s| s.abbr.eq_ignore_ascii_case(abbr))
}

/// Extracts the two-digit state prefix from a tract FIPS or STCOFIPS code.
#[must_use]
pub fn state_prefix(code: &str) -> Option<&str> {
    code.get(..2)
}

/// Extracts the 5-digit STCOFIPS (state + county) prefix from an
/// 11-digit tract FIPS code.
#[must_use]
pub fn county_prefix(tract_fips: &str) -> Option<&str> {
    tract_fips.get(..5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_count() {
        assert_eq!(STATES.len(), 51);
    }

    #[test]
    fn lookup_round_trip() {
        for state in STATES {
            assert_eq!(by_fips(state.fips), Some(state));
            assert_eq!(by_abbr(state.abbr), Some(state));
        }
    }

    #[test]
    fn abbr_lookup_is_case_insensitive() {
        assert_eq!(by_abbr("ma").map(|s| s.fips), Some("25"));
        assert_eq!(by_abbr("Ma").map(|s| s.fips), Some("25"));
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(by_fips("99"), None);
        assert_eq!(by_abbr("XX"), None);
    }

    #[test]
    fn prefixes() {
        assert_eq!(state_prefix("25017353500"), Some("25"));
        assert_eq!(county_prefix("25017353500"), Some("25017"));
        assert_eq!(county_prefix("250"), None);
    }
}
