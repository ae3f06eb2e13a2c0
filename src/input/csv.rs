use anyhow::{Context, Result};
use std::io::Read;

use crate::core::{Coordinate, Path, PathNode};

/// Load a prebuilt path from CSV
///
/// Columns are found by header name, in any order:
/// - lat / latitude
/// - lng / lon / longitude
/// - distance / segment_distance
/// - duration / segment_duration
/// - step (optional)
pub fn load_csv(path: &str) -> Result<Path> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open {}", path))?;
    read_csv(file)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Path> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = detect_columns(&headers)?;

    let mut nodes = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.context("Failed to read CSV row")?;

        let field = |idx: usize, name: &str| -> Result<f64> {
            let raw = record.get(idx).with_context(|| format!("Row {}: missing {}", row + 1, name))?;
            raw.trim()
                .parse::<f64>()
                .with_context(|| format!("Row {}: invalid {} {:?}", row + 1, name, raw))
        };

        let step = match columns.step {
            Some(idx) => record.get(idx).and_then(|s| s.trim().parse::<usize>().ok()).unwrap_or(0),
            None => 0,
        };

        nodes.push(PathNode {
            location: Coordinate::new(field(columns.lat, "latitude")?, field(columns.lng, "longitude")?),
            step,
            segment_distance: field(columns.distance, "distance")?,
            segment_duration: field(columns.duration, "duration")?,
        });
    }

    Ok(Path::new(nodes)?)
}

struct Columns {
    lat: usize,
    lng: usize,
    distance: usize,
    duration: usize,
    step: Option<usize>,
}

/// Detect column indices from CSV headers
fn detect_columns(headers: &csv::StringRecord) -> Result<Columns> {
    Ok(Columns {
        lat: find_column(headers, &["lat", "latitude"])?,
        lng: find_column(headers, &["lng", "lon", "long", "longitude"])?,
        distance: find_column(headers, &["distance", "segment_distance"])?,
        duration: find_column(headers, &["duration", "segment_duration"])?,
        step: find_column(headers, &["step"]).ok(),
    })
}

/// Find a column by checking possible names
fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Result<usize> {
    for (idx, header) in headers.iter().enumerate() {
        let header_lower = header.trim().to_lowercase();
        if names.iter().any(|&name| header_lower == name) {
            return Ok(idx);
        }
    }

    anyhow::bail!("Could not find column with names: {:?}", names)
}
