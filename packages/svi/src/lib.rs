#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Social Vulnerability Index tables and tract aggregation.
//!
//! Answers "how does local vulnerability compare to a reference
//! population": given the tract FIPS codes near a facility and a reference
//! table of per-tract SVI values (a county's tracts, or a whole region's),
//! count how many local tracts sit at or above a percentile of the
//! reference distribution. The choice of reference population is the
//! caller's; this package is agnostic to it.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use ppe_priority_geography_models::fips;
use thiserror::Error;

/// Sentinel used by the CDC SVI export for tracts without data.
pub const MISSING_SENTINEL: f64 = -999.0;

/// Default SVI value column in the CDC export (overall percentile ranking
/// across all four themes).
pub const DEFAULT_VALUE_COLUMN: &str = "RPL_THEMES";

/// Errors from SVI table loading and aggregation.
#[derive(Debug, Error)]
pub enum SviError {
    /// The reference population has no SVI values; no percentile exists.
    #[error("Reference population is empty")]
    EmptyReferencePopulation,

    /// SVI table read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SVI table rows failed to parse.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The SVI table is structurally unusable (missing columns).
    #[error("Malformed SVI table: {message}")]
    Malformed {
        /// Description of the structural problem.
        message: String,
    },
}

/// Result of a high-vulnerability count against a reference population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VulnerabilitySummary {
    /// Local tracts whose SVI is at or above the reference threshold.
    pub high_count: usize,
    /// Local tracts absent from the reference table. Missing data, not
    /// zero vulnerability; callers must surface this count rather than
    /// silently under-reporting.
    pub skipped: usize,
    /// The percentile threshold value that was applied.
    pub threshold: f64,
}

/// Per-tract SVI values keyed by 11-digit FIPS code.
///
/// Reference data supplied by the caller per aggregation; this package
/// never fetches or caches it.
#[derive(Debug, Clone, Default)]
pub struct SviTable {
    values: BTreeMap<String, f64>,
}

impl SviTable {
    /// Builds a table from `(FIPS, value)` pairs. Later duplicates
    /// overwrite earlier ones.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    /// Parses an SVI table from CSV text with a `FIPS` column and the
    /// named value column (see [`DEFAULT_VALUE_COLUMN`]).
    ///
    /// Rows carrying the CDC missing-data sentinel (−999) or unparseable
    /// values are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SviError`] if the input cannot be read or the required
    /// columns are missing.
    pub fn from_csv_reader<R: Read>(reader: R, value_column: &str) -> Result<Self, SviError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let fips_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case("FIPS"))
            .ok_or_else(|| SviError::Malformed {
                message: "no FIPS column".to_string(),
            })?;
        let value_idx = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(value_column))
            .ok_or_else(|| SviError::Malformed {
                message: format!("no {value_column} column"),
            })?;

        let mut values = BTreeMap::new();
        for row in csv_reader.records() {
            let row = row?;
            let Some(fips) = row.get(fips_idx).filter(|f| !f.is_empty()) else {
                continue;
            };
            let Some(value) = row.get(value_idx).and_then(|v| v.parse::<f64>().ok()) else {
                log::warn!("Skipping SVI row for {fips}: unparseable value");
                continue;
            };
            if !value.is_finite() || (value - MISSING_SENTINEL).abs() < f64::EPSILON {
                log::debug!("Skipping SVI row for {fips}: missing-data sentinel");
                continue;
            }
            values.insert(fips.to_string(), value);
        }

        log::info!("Loaded {} SVI values", values.len());

        Ok(Self { values })
    }

    /// SVI value for a tract, if present.
    #[must_use]
    pub fn get(&self, tract_fips: &str) -> Option<f64> {
        self.values.get(tract_fips).copied()
    }

    /// Number of tracts in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the table holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Restricts the table to the tracts of one county (STCOFIPS prefix).
    #[must_use]
    pub fn county_reference(&self, stcofips: &str) -> Self {
        self.subset(|tract| fips::county_prefix(tract) == Some(stcofips))
    }

    /// Restricts the table to the tracts of a list of counties — the
    /// regional reference population.
    #[must_use]
    pub fn regional_reference<S: AsRef<str>>(&self, counties: &[S]) -> Self {
        self.subset(|tract| {
            counties
                .iter()
                .any(|county| fips::county_prefix(tract) == Some(county.as_ref()))
        })
    }

    fn subset<F: Fn(&str) -> bool>(&self, keep: F) -> Self {
        Self {
            values: self
                .values
                .iter()
                .filter(|(tract, _)| keep(tract))
                .map(|(tract, value)| (tract.clone(), *value))
                .collect(),
        }
    }
}

/// Counts the local tracts whose SVI sits at or above the
/// `percentile`-th percentile of the reference population.
///
/// The threshold is the empirical percentile of all values in `reference`
/// with linear interpolation at rank `(n + 1) · p / 100` (so the 75th
/// percentile of `[10, 20, 30, 40]` is 37.5). `percentile` is clamped to
/// `[0, 100]`: at 0 every scored tract counts, at 100 only tracts equal to
/// the reference maximum count. Local tracts absent from the reference are
/// reported in [`VulnerabilitySummary::skipped`], never silently dropped.
///
/// # Errors
///
/// Returns [`SviError::EmptyReferencePopulation`] if `reference` holds no
/// values. A single-value reference is its own minimum and maximum.
pub fn count_high_vulnerability(
    local_fips: &BTreeSet<String>,
    reference: &SviTable,
    percentile: f64,
) -> Result<VulnerabilitySummary, SviError> {
    if reference.is_empty() {
        return Err(SviError::EmptyReferencePopulation);
    }

    let mut sorted: Vec<f64> = reference.values.values().copied().collect();
    sorted.sort_unstable_by(f64::total_cmp);
    let threshold = score_at_percentile(&sorted, percentile.clamp(0.0, 100.0));

    let mut high_count = 0;
    let mut skipped = 0;
    for tract in local_fips {
        match reference.get(tract) {
            Some(value) if value >= threshold => high_count += 1,
            Some(_) => {}
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        log::warn!("{skipped} local tract(s) missing from the SVI reference population");
    }

    Ok(VulnerabilitySummary {
        high_count,
        skipped,
        threshold,
    })
}

/// Empirical percentile with linear interpolation at rank `(n + 1) · p /
/// 100` (one-based), clamped to the observed range.
///
/// `sorted` must be ascending and non-empty.
#[allow(clippy::cast_precision_loss)]
fn score_at_percentile(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    let rank = (percentile / 100.0 * (n as f64 + 1.0)).clamp(1.0, n as f64);
    let below = rank.floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let idx = below as usize - 1;
    let fraction = rank - below;
    if idx + 1 < n {
        sorted[idx] + fraction * (sorted[idx + 1] - sorted[idx])
    } else {
        sorted[idx]
    }
}
