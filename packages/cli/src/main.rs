#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line tools for the PPE priority pipeline.
//!
//! Three subcommands over the same geographic core:
//!
//! - `county` — resolve a facility address to its containing county
//!   (STCOFIPS).
//! - `tracts` — list the census tracts within a radius of a facility
//!   address.
//! - `score` — compute the full priority score for a facility report,
//!   running the radius query and SVI aggregation along the way.
//!
//! Exit codes: 0 on success (including empty "outside coverage" results),
//! 2 for bad input (unknown postal code, invalid radius), 1 for any other
//! failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use ppe_priority_geocoder::{Gazetteer, GeocodeError};
use ppe_priority_geography::FetchError;
use ppe_priority_geography_models::FacilityAddress;
use ppe_priority_scoring::{FacilityReport, ScoringConfig, ScoringError, compute_priority};
use ppe_priority_spatial::{
    IndexCell, PlanarPoint, RadiusBuffer, SpatialError, TractIndex, miles_to_meters, project,
};
use ppe_priority_svi::{DEFAULT_VALUE_COLUMN, SviError, SviTable, count_high_vulnerability};

/// Facility address flags, kept compatible with the original four-field
/// intake interface. Only the postal code is load-bearing for resolution;
/// the other fields are recorded for logging.
#[derive(Args)]
struct AddressArgs {
    /// Street number and name.
    #[arg(long = "street_name_num")]
    street_name_num: String,
    /// City name.
    #[arg(long)]
    city: String,
    /// Two-letter state abbreviation.
    #[arg(long)]
    state: String,
    /// 5-digit ZIP code (ZIP+4 accepted).
    #[arg(long)]
    zipcode: String,
}

impl AddressArgs {
    fn to_address(&self) -> FacilityAddress {
        FacilityAddress {
            street: self.street_name_num.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.zipcode.clone(),
        }
    }
}

/// Data asset locations, each a local path or an `http(s)://` URL.
#[derive(Args)]
struct AssetArgs {
    /// Postal-code gazetteer (CSV or tab-delimited).
    #[arg(long)]
    gazetteer: String,
    /// Tract boundary `GeoJSON`, pre-projected to the equal-area plane.
    #[arg(long)]
    tract_boundaries: String,
}

#[derive(Parser)]
#[command(name = "ppe_priority", about = "PPE allocation priority toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the STCOFIPS code(s) of the county containing a facility
    County {
        #[command(flatten)]
        address: AddressArgs,
        #[command(flatten)]
        assets: AssetArgs,
    },
    /// Print the FIPS codes of census tracts within a radius of a facility
    Tracts {
        #[command(flatten)]
        address: AddressArgs,
        #[command(flatten)]
        assets: AssetArgs,
        /// Radius in miles.
        #[arg(long, default_value_t = 5.0)]
        radius: f64,
    },
    /// Compute the priority score for a facility report
    Score {
        /// Facility report JSON file.
        #[arg(long)]
        report: PathBuf,
        /// Scoring configuration TOML file (defaults apply if omitted).
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        assets: AssetArgs,
        /// SVI table CSV (FIPS + value column), the regional reference.
        #[arg(long)]
        svi_table: String,
        /// SVI value column name.
        #[arg(long, default_value = DEFAULT_VALUE_COLUMN)]
        svi_column: String,
        /// Radius in miles for the local tract query.
        #[arg(long, default_value_t = 5.0)]
        radius: f64,
    },
}

/// Errors surfaced by the CLI, mapped to exit codes.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Spatial(#[from] SpatialError),
    #[error(transparent)]
    Svi(#[from] SviError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid facility report: {0}")]
    Report(#[from] serde_json::Error),
}

impl CliError {
    /// Bad input gets exit code 2; everything else 1.
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Geocode(GeocodeError::UnknownPostalCode { .. })
            | Self::Spatial(SpatialError::InvalidRadius { .. }) => ExitCode::from(2),
            _ => ExitCode::from(1),
        }
    }
}

/// Process-wide tract index, installed once after the load phase.
static INDEX: IndexCell = IndexCell::new();

#[tokio::main]
async fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let client = ppe_priority_geography::build_client()?;

    match cli.command {
        Commands::County { address, assets } => {
            let point = resolve(&client, &address.to_address(), &assets).await?;
            let counties = INDEX.get()?.counties_containing(point);
            if counties.is_empty() {
                log::warn!("Point lies outside the loaded tract coverage");
            }
            for stcofips in counties {
                println!("{stcofips}");
            }
        }
        Commands::Tracts {
            address,
            assets,
            radius,
        } => {
            let point = resolve(&client, &address.to_address(), &assets).await?;
            let buffer = RadiusBuffer::new(point, miles_to_meters(radius))?;
            let tracts = INDEX.get()?.tracts_in_buffer(&buffer);
            if tracts.is_empty() {
                log::warn!("No tracts within {radius} miles of the resolved point");
            }
            for fips in tracts {
                println!("{fips}");
            }
        }
        Commands::Score {
            report,
            config,
            assets,
            svi_table,
            svi_column,
            radius,
        } => {
            let report_text = tokio::fs::read_to_string(&report).await?;
            let mut report: FacilityReport = serde_json::from_str(&report_text)?;

            let config = match config {
                Some(path) => {
                    ScoringConfig::from_toml_str(&tokio::fs::read_to_string(&path).await?)?
                }
                None => ScoringConfig::default(),
            };

            let svi_text = ppe_priority_geography::fetch_text(&client, &svi_table).await?;
            let svi = SviTable::from_csv_reader(svi_text.as_bytes(), &svi_column)?;

            let point = resolve(&client, &report.address, &assets).await?;
            let index = INDEX.get()?;

            let counties = index.counties_containing(point);
            let buffer = RadiusBuffer::new(point, miles_to_meters(radius))?;
            let local = index.tracts_in_buffer(&buffer);

            // An empty county set means the address resolved outside the
            // loaded coverage; the county comparison is skipped, not failed.
            let county = if counties.is_empty() {
                log::warn!("Point lies outside the loaded tract coverage; skipping county SVI comparison");
                None
            } else {
                let county_refs: Vec<&str> = counties.iter().map(String::as_str).collect();
                let county_svi = svi.regional_reference(&county_refs);
                Some(count_high_vulnerability(&local, &county_svi, config.svi_percentile)?)
            };
            let regional = count_high_vulnerability(&local, &svi, config.svi_percentile)?;

            report.county_high_svi_tracts = county
                .map_or(0, |c| u32::try_from(c.high_count).unwrap_or(u32::MAX));
            report.regional_high_svi_tracts =
                u32::try_from(regional.high_count).unwrap_or(u32::MAX);

            let county_skipped = county.map_or(0, |c| c.skipped);
            if county_skipped > 0 || regional.skipped > 0 {
                println!(
                    "tracts skipped for missing SVI data: county {county_skipped} / regional {}",
                    regional.skipped
                );
            }

            let breakdown = compute_priority(&report, &config);
            println!("need: {}", breakdown.need);
            println!("vulnerability: {}", breakdown.vulnerability);
            println!("exposure: {}", breakdown.exposure);
            println!("capacity: {}", breakdown.capacity);
            println!("total: {}", breakdown.total);
        }
    }

    Ok(())
}

/// Resolves a facility address to a planar point and installs the tract
/// index: gazetteer lookup, then reprojection (exactly once, before any
/// geometric predicate), then the one-time boundary load.
async fn resolve(
    client: &reqwest::Client,
    address: &FacilityAddress,
    assets: &AssetArgs,
) -> Result<PlanarPoint, CliError> {
    let gazetteer_text = ppe_priority_geography::fetch_text(client, &assets.gazetteer).await?;
    let gazetteer = Gazetteer::from_csv_reader(gazetteer_text.as_bytes())?;
    let geo_point = gazetteer.resolve_facility(address)?;
    let point = project(geo_point);

    let boundary_text =
        ppe_priority_geography::fetch_text(client, &assets.tract_boundaries).await?;
    INDEX.install(TractIndex::load(&boundary_text)?);

    Ok(point)
}
