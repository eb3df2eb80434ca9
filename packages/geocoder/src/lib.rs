#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Postal-code gazetteer resolver.
//!
//! Resolves a facility's 5-digit postal code to a geographic point by
//! lookup against a static gazetteer (the Census ZCTA gazetteer format, or
//! anything with compatible columns). Resolution is postal-code-only:
//! street, city, and state on the intake form are accepted and logged but
//! never used geometrically.

pub mod gazetteer;

pub use gazetteer::Gazetteer;

use thiserror::Error;

/// Errors from gazetteer loading and postal-code resolution.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The postal code is absent from the gazetteer (or is not a valid
    /// 5-digit / ZIP+4 code).
    #[error("Unknown postal code: {code}")]
    UnknownPostalCode {
        /// The code as supplied by the caller.
        code: String,
    },

    /// Gazetteer file read failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Gazetteer rows failed to parse.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The gazetteer is structurally unusable (missing columns, no rows).
    #[error("Malformed gazetteer: {message}")]
    Malformed {
        /// Description of the structural problem.
        message: String,
    },
}
