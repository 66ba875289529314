// 📤 Write - stream close approaches to CSV or JSON
//
// Defaults for missing values live here, not in the core:
// no name → "", unknown or unlinked diameter → NaN, unlinked → not hazardous.

use anyhow::{Context, Result};
use serde::{Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::models::LinkedApproach;

/// Flattened CSV row
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    designation: &'a str,
    name: &'a str,
    diameter_km: f64,
    potentially_hazardous: &'static str,
}

impl<'a> CsvRow<'a> {
    fn from_linked(linked: &LinkedApproach<'a>) -> Self {
        let approach = linked.approach();
        let neo = linked.neo();

        CsvRow {
            datetime_utc: approach.time_str(),
            distance_au: approach.distance,
            velocity_km_s: approach.velocity,
            designation: &approach.designation,
            name: neo.and_then(|n| n.name.as_deref()).unwrap_or(""),
            diameter_km: neo.map_or(f64::NAN, |n| n.diameter),
            potentially_hazardous: if neo.map_or(false, |n| n.hazardous) {
                "True"
            } else {
                "False"
            },
        }
    }
}

/// NEO part of a JSON record
#[derive(Debug, Serialize)]
struct JsonNeo<'a> {
    designation: &'a str,
    name: &'a str,
    /// NaN is written as null
    diameter_km: f64,
    potentially_hazardous: bool,
}

/// One JSON record: the approach plus its NEO
#[derive(Debug, Serialize)]
struct JsonApproach<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    neo: JsonNeo<'a>,
}

impl<'a> JsonApproach<'a> {
    fn from_linked(linked: &LinkedApproach<'a>) -> Self {
        let approach = linked.approach();
        let neo = linked.neo();

        JsonApproach {
            datetime_utc: approach.time_str(),
            distance_au: approach.distance,
            velocity_km_s: approach.velocity,
            neo: JsonNeo {
                designation: neo.map_or(approach.designation.as_str(), |n| n.designation.as_str()),
                name: neo.and_then(|n| n.name.as_deref()).unwrap_or(""),
                diameter_km: neo.map_or(f64::NAN, |n| n.diameter),
                potentially_hazardous: neo.map_or(false, |n| n.hazardous),
            },
        }
    }
}

/// Write close approaches to a CSV file (header + one row per approach)
///
/// Returns the number of rows written.
pub fn write_to_csv<'a, I>(results: I, filename: &Path) -> Result<usize>
where
    I: IntoIterator<Item = LinkedApproach<'a>>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(filename)
        .with_context(|| format!("Failed to create file: {}", filename.display()))?;

    // Explicit header: it must go out even when there are no rows
    writer.write_record([
        "datetime_utc",
        "distance_au",
        "velocity_km_s",
        "designation",
        "name",
        "diameter_km",
        "potentially_hazardous",
    ])?;

    let mut written = 0;
    for linked in results {
        writer
            .serialize(CsvRow::from_linked(&linked))
            .with_context(|| format!("Failed to write CSV row to {}", filename.display()))?;
        written += 1;
    }

    writer.flush()?;
    debug!(path = %filename.display(), rows = written, "wrote CSV results");
    Ok(written)
}

/// Write close approaches to a JSON file as a pretty-printed array
///
/// Returns the number of records written.
pub fn write_to_json<'a, I>(results: I, filename: &Path) -> Result<usize>
where
    I: IntoIterator<Item = LinkedApproach<'a>>,
{
    let file = File::create(filename)
        .with_context(|| format!("Failed to create file: {}", filename.display()))?;
    let mut serializer = serde_json::Serializer::pretty(BufWriter::new(file));

    // collect_seq pulls one record at a time: the results are never collected
    let mut written = 0;
    serializer
        .collect_seq(results.into_iter().map(|linked| {
            written += 1;
            JsonApproach::from_linked(&linked)
        }))
        .with_context(|| format!("Failed to write JSON to {}", filename.display()))?;

    let mut out = serializer.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;

    debug!(path = %filename.display(), records = written, "wrote JSON results");
    Ok(written)
}
