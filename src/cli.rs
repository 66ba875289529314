//! CLI argument definitions using clap
//!
//! Commands:
//! - neo inspect --pdes <designation> | --name <name> [--approaches]
//! - neo query [criteria flags] [--limit N] [--outfile results.csv|results.json]

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use neo_database::{parse_date, FilterCriteria};

/// Explore near-Earth objects and their close approaches to Earth
#[derive(Parser, Debug)]
#[command(name = "neo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// CSV file with NEO data
    #[arg(long, global = true, default_value = "data/neos.csv")]
    pub neofile: PathBuf,

    /// JSON file with close-approach data
    #[arg(long, global = true, default_value = "data/cad.json")]
    pub cadfile: PathBuf,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up one NEO by designation or by name
    Inspect(InspectArgs),

    /// List close approaches matching the given criteria
    Query(QueryArgs),
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Primary designation, e.g. 433 or "2020 AB"
    #[arg(short, long, conflicts_with = "name", required_unless_present = "name")]
    pub pdes: Option<String>,

    /// IAU name, e.g. Eros
    #[arg(short, long)]
    pub name: Option<String>,

    /// Also list the NEO's close approaches
    #[arg(short, long)]
    pub approaches: bool,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Only approaches on this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = date_arg)]
    pub date: Option<NaiveDate>,

    /// Only approaches on or after this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = date_arg)]
    pub start_date: Option<NaiveDate>,

    /// Only approaches on or before this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = date_arg)]
    pub end_date: Option<NaiveDate>,

    /// Minimum approach distance (au)
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Maximum approach distance (au)
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Minimum relative velocity (km/s)
    #[arg(long)]
    pub min_velocity: Option<f64>,

    /// Maximum relative velocity (km/s)
    #[arg(long)]
    pub max_velocity: Option<f64>,

    /// Minimum NEO diameter (km)
    #[arg(long)]
    pub min_diameter: Option<f64>,

    /// Maximum NEO diameter (km)
    #[arg(long)]
    pub max_diameter: Option<f64>,

    /// Only potentially hazardous NEOs
    #[arg(long, conflicts_with = "not_hazardous")]
    pub hazardous: bool,

    /// Only NEOs that are not potentially hazardous
    #[arg(long)]
    pub not_hazardous: bool,

    /// JSON file with criteria; flags above override it
    #[arg(long)]
    pub criteria: Option<PathBuf>,

    /// Maximum number of results (0 = no limit)
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Write results to a .csv or .json file instead of stdout
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

impl QueryArgs {
    /// Criteria from the flags alone
    pub fn flag_criteria(&self) -> FilterCriteria {
        let hazardous = match (self.hazardous, self.not_hazardous) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        FilterCriteria {
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            distance_min: self.min_distance,
            distance_max: self.max_distance,
            velocity_min: self.min_velocity,
            velocity_max: self.max_velocity,
            diameter_min: self.min_diameter,
            diameter_max: self.max_diameter,
            hazardous,
        }
    }

    /// Criteria file (if any) with the flags laid on top
    pub fn criteria(&self) -> Result<FilterCriteria> {
        let base = match &self.criteria {
            Some(path) => FilterCriteria::from_file(path)?,
            None => FilterCriteria::default(),
        };
        Ok(base.merge(self.flag_criteria()))
    }
}

fn date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| format!("{:#}", e))
}
