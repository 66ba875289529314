// 📥 Extract - NEOs from CSV, close approaches from JSON
//
// Format-specific decoding only. Every record comes out unlinked; linking is
// NeoDatabase's job.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::helpers::cd_to_datetime;
use crate::models::{CloseApproach, NearEarthObject};

// ============================================================================
// NEOs (CSV)
// ============================================================================

/// One row of the NEO CSV. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct NeoRow {
    /// Primary designation (required column, may be empty)
    pdes: String,

    #[serde(default)]
    name: String,

    /// "Y" for potentially hazardous
    #[serde(default)]
    pha: String,

    /// Kilometers, empty when unknown
    #[serde(default)]
    diameter: String,
}

impl NeoRow {
    fn into_neo(self) -> Result<NearEarthObject> {
        let name = if self.name.is_empty() {
            None
        } else {
            Some(self.name)
        };

        let diameter = match self.diameter.trim() {
            "" => f64::NAN,
            value => value
                .parse::<f64>()
                .with_context(|| format!("Invalid diameter: {:?}", value))?,
        };

        Ok(NearEarthObject::new(
            self.pdes,
            name,
            diameter,
            self.pha.trim() == "Y",
        ))
    }
}

/// Read near-Earth objects from a CSV file with a header row
pub fn load_neos(neo_csv_path: &Path) -> Result<Vec<NearEarthObject>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(neo_csv_path)
        .with_context(|| format!("Failed to open file: {}", neo_csv_path.display()))?;

    let mut neos = Vec::new();

    for (line_num, result) in reader.deserialize::<NeoRow>().enumerate() {
        // +2 because: 1-indexed + header row
        let line = line_num + 2;
        let row = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line, neo_csv_path.display())
        })?;
        let neo = row.into_neo().with_context(|| {
            format!("Invalid NEO on line {} in {}", line, neo_csv_path.display())
        })?;

        neos.push(neo);
    }

    debug!(path = %neo_csv_path.display(), count = neos.len(), "loaded NEOs");
    Ok(neos)
}

// ============================================================================
// CLOSE APPROACHES (JSON)
// ============================================================================

/// Column positions in the JPL close-approach API "data" rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CadColumns {
    des: usize,
    cd: usize,
    dist: usize,
    v_rel: usize,
}

impl CadColumns {
    /// Standard column layout of the API, used when "fields" is absent
    const DEFAULT: CadColumns = CadColumns {
        des: 0,
        cd: 3,
        dist: 4,
        v_rel: 7,
    };

    fn from_fields(fields: &[Value]) -> Result<Self> {
        let position = |name: &str| {
            fields
                .iter()
                .position(|f| f.as_str() == Some(name))
                .ok_or_else(|| anyhow!("JSON 'fields' missing column '{}'", name))
        };

        Ok(CadColumns {
            des: position("des")?,
            cd: position("cd")?,
            dist: position("dist")?,
            v_rel: position("v_rel")?,
        })
    }
}

fn string_at<'a>(row: &'a [Value], column: usize, name: &str) -> Result<&'a str> {
    row.get(column)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("Missing or non-string '{}' value", name))
}

fn float_at(row: &[Value], column: usize, name: &str) -> Result<f64> {
    let raw = string_at(row, column, name)?;
    raw.trim()
        .parse::<f64>()
        .with_context(|| format!("Invalid '{}' value: {:?}", name, raw))
}

fn parse_approach(row: &[Value], columns: CadColumns) -> Result<CloseApproach> {
    let designation = string_at(row, columns.des, "des")?.to_string();
    let time = cd_to_datetime(string_at(row, columns.cd, "cd")?)?;
    let distance = float_at(row, columns.dist, "dist")?;
    let velocity = float_at(row, columns.v_rel, "v_rel")?;

    Ok(CloseApproach::new(designation, time, distance, velocity))
}

/// Read close approaches from a JPL close-approach JSON document
///
/// Expected shape:
/// ```json
/// { "fields": ["des", "orbit_id", "jd", "cd", "dist", ...], "data": [["433", ...], ...] }
/// ```
pub fn load_approaches(cad_json_path: &Path) -> Result<Vec<CloseApproach>> {
    let file = File::open(cad_json_path)
        .with_context(|| format!("Failed to open file: {}", cad_json_path.display()))?;

    let reader = BufReader::new(file);
    let json: Value = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse JSON from {}", cad_json_path.display()))?;

    let columns = match json.get("fields").and_then(|f| f.as_array()) {
        Some(fields) => CadColumns::from_fields(fields)?,
        None => CadColumns::DEFAULT,
    };

    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow!("JSON missing 'data' array"))?;

    let mut approaches = Vec::with_capacity(data.len());

    for (idx, item) in data.iter().enumerate() {
        let row = item
            .as_array()
            .ok_or_else(|| anyhow!("Row {} in {} is not an array", idx, cad_json_path.display()))?;
        let approach = parse_approach(row, columns).with_context(|| {
            format!("Invalid close approach at row {} in {}", idx, cad_json_path.display())
        })?;

        approaches.push(approach);
    }

    debug!(path = %cad_json_path.display(), count = approaches.len(), "loaded close approaches");
    Ok(approaches)
}

// ============================================================================
// TESTS
// ============================================================================
