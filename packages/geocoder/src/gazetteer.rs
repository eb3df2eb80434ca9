//! Postal-code gazetteer loading and lookup.
//!
//! The Census ZCTA gazetteer ships as tab-delimited text with `GEOID`,
//! `INTPTLAT`, and `INTPTLONG` columns (and, notoriously, trailing
//! whitespace in the header row). Community mirrors re-export the same
//! data comma-delimited with assorted column names. The loader accepts
//! both shapes.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::LazyLock;

use ppe_priority_geography_models::FacilityAddress;
use ppe_priority_spatial::GeoPoint;
use regex::Regex;

use crate::GeocodeError;

/// Accepted header names for the postal-code column.
const CODE_COLUMNS: &[&str] = &["GEOID", "ZCTA5", "ZCTA5CE10", "ZIP"];

/// Accepted header names for the latitude column.
const LAT_COLUMNS: &[&str] = &["INTPTLAT", "LAT", "LATITUDE"];

/// Accepted header names for the longitude column.
const LON_COLUMNS: &[&str] = &["INTPTLONG", "INTPTLON", "LON", "LNG", "LONGITUDE"];

/// Regex for a 5-digit ZIP, optionally in ZIP+4 form.
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{5})(?:-\d{4})?\s*$").expect("valid regex"));

/// Normalizes a postal code to its 5-digit form.
///
/// Returns `None` for anything that is not a 5-digit or ZIP+4 code.
#[must_use]
pub fn normalize_postal_code(raw: &str) -> Option<&str> {
    ZIP_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Static mapping from 5-digit postal code to a geographic point.
///
/// Loaded once, read-only for the process lifetime. Gazetteers may carry
/// multiple entries per code (e.g. PO-box vs. standard delivery); the first
/// record in file order wins, which keeps resolution deterministic for a
/// given input file.
pub struct Gazetteer {
    records: BTreeMap<String, GeoPoint>,
}

impl Gazetteer {
    /// Parses a gazetteer from CSV or tab-delimited text.
    ///
    /// Rows with unparseable coordinates are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the input cannot be read, the required
    /// columns are missing, or no usable record remains.
    pub fn from_csv_reader<R: Read>(mut reader: R) -> Result<Self, GeocodeError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let delimiter = if text.lines().next().is_some_and(|l| l.contains('\t')) {
            b'\t'
        } else {
            b','
        };

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = csv_reader.headers()?.clone();
        let code_idx = find_column(&headers, CODE_COLUMNS).ok_or_else(|| {
            GeocodeError::Malformed {
                message: format!("no postal code column (expected one of {CODE_COLUMNS:?})"),
            }
        })?;
        let lat_idx =
            find_column(&headers, LAT_COLUMNS).ok_or_else(|| GeocodeError::Malformed {
                message: format!("no latitude column (expected one of {LAT_COLUMNS:?})"),
            })?;
        let lon_idx =
            find_column(&headers, LON_COLUMNS).ok_or_else(|| GeocodeError::Malformed {
                message: format!("no longitude column (expected one of {LON_COLUMNS:?})"),
            })?;

        let mut records = BTreeMap::new();

        for row in csv_reader.records() {
            let row = row?;
            let Some(code) = row.get(code_idx).and_then(normalize_postal_code) else {
                log::warn!("Skipping gazetteer row with unusable code: {row:?}");
                continue;
            };
            let coords = row
                .get(lat_idx)
                .and_then(|v| v.parse::<f64>().ok())
                .zip(row.get(lon_idx).and_then(|v| v.parse::<f64>().ok()));
            let Some((lat, lon)) = coords else {
                log::warn!("Skipping gazetteer row for {code}: unparseable coordinates");
                continue;
            };

            // First record in file order wins for duplicate codes.
            records
                .entry(code.to_string())
                .or_insert_with(|| GeoPoint::new(lon, lat));
        }

        if records.is_empty() {
            return Err(GeocodeError::Malformed {
                message: "gazetteer contains no usable records".to_string(),
            });
        }

        log::info!("Loaded {} gazetteer records", records.len());

        Ok(Self { records })
    }

    /// Number of distinct postal codes in the gazetteer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the gazetteer holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolves a postal code to its gazetteer point (EPSG:4326).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::UnknownPostalCode`] if the code is malformed
    /// or absent from the gazetteer.
    pub fn resolve_point(&self, postal_code: &str) -> Result<GeoPoint, GeocodeError> {
        normalize_postal_code(postal_code)
            .and_then(|code| self.records.get(code))
            .copied()
            .ok_or_else(|| GeocodeError::UnknownPostalCode {
                code: postal_code.to_string(),
            })
    }

    /// Resolves a full facility address record.
    ///
    /// Only the postal code participates in resolution; the street, city,
    /// and state fields are logged for traceability and otherwise unused.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::UnknownPostalCode`] if the address's postal
    /// code does not resolve.
    pub fn resolve_facility(&self, address: &FacilityAddress) -> Result<GeoPoint, GeocodeError> {
        let point = self.resolve_point(&address.postal_code)?;
        log::info!(
            "Resolved {} to ({:.4}, {:.4}) via postal code {}",
            address.one_line(),
            point.lat,
            point.lon,
            address.postal_code
        );
        Ok(point)
    }
}

/// Finds the index of the first header matching any of `names`,
/// case-insensitively and ignoring surrounding whitespace.
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers.iter().position(|header| {
        names
            .iter()
            .any(|name| header.trim().eq_ignore_ascii_case(name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMBRIDGE: &str = "\
GEOID\tALAND\tINTPTLAT\tINTPTLONG   \n\
02139\t6772716\t42.3626\t-71.1046\n\
02140\t3163259\t42.3934\t-71.1332\n";

    fn gazetteer() -> Gazetteer {
        Gazetteer::from_csv_reader(CAMBRIDGE.as_bytes()).unwrap()
    }

    #[test]
    fn resolves_known_code() {
        let point = gazetteer().resolve_point("02139").unwrap();
        assert!((point.lat - 42.3626).abs() < 1e-9);
        assert!((point.lon - -71.1046).abs() < 1e-9);
    }

    #[test]
    fn resolves_zip_plus_four() {
        let point = gazetteer().resolve_point("02139-4301").unwrap();
        assert!((point.lat - 42.3626).abs() < 1e-9);
    }

    #[test]
    fn unknown_code_fails() {
        let err = gazetteer().resolve_point("99999").unwrap_err();
        assert!(matches!(err, GeocodeError::UnknownPostalCode { .. }));
    }

    #[test]
    fn malformed_code_fails_as_unknown() {
        let err = gazetteer().resolve_point("not-a-zip").unwrap_err();
        assert!(matches!(err, GeocodeError::UnknownPostalCode { .. }));
    }

    #[test]
    fn comma_delimited_with_alternate_names() {
        let csv = "ZIP,LAT,LNG\n62701,39.7990,-89.6440\n";
        let gazetteer = Gazetteer::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(gazetteer.len(), 1);
        let point = gazetteer.resolve_point("62701").unwrap();
        assert!((point.lon - -89.6440).abs() < 1e-9);
    }

    #[test]
    fn duplicate_codes_are_deterministic_first_wins() {
        let csv = "ZIP,LAT,LNG\n10001,40.75,-73.99\n10001,0.0,0.0\n";
        let gazetteer = Gazetteer::from_csv_reader(csv.as_bytes()).unwrap();
        let point = gazetteer.resolve_point("10001").unwrap();
        assert!((point.lat - 40.75).abs() < 1e-9);
    }

    #[test]
    fn missing_columns_fail() {
        let err = Gazetteer::from_csv_reader("ZIP,FOO\n10001,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }

    #[test]
    fn empty_gazetteer_fails() {
        let err = Gazetteer::from_csv_reader("ZIP,LAT,LNG\n".as_bytes()).unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }

    #[test]
    fn resolves_facility_by_postal_code_only() {
        let address = FacilityAddress {
            street: "77 Massachusetts Avenue".to_string(),
            city: "Cambridge".to_string(),
            state: "MA".to_string(),
            postal_code: "02139".to_string(),
        };
        let point = gazetteer().resolve_facility(&address).unwrap();
        assert!((point.lat - 42.3626).abs() < 1e-9);
    }

    #[test]
    fn normalizes_postal_codes() {
        assert_eq!(normalize_postal_code("02139"), Some("02139"));
        assert_eq!(normalize_postal_code(" 02139 "), Some("02139"));
        assert_eq!(normalize_postal_code("02139-4301"), Some("02139"));
        assert_eq!(normalize_postal_code("2139"), None);
        assert_eq!(normalize_postal_code("021390"), None);
        assert_eq!(normalize_postal_code("abcde"), None);
    }
}
