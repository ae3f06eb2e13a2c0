pub mod csv;
pub mod directions;

pub use csv::load_csv;
pub use directions::{build_path, DirectionsResult};

use anyhow::{Context, Result};
use crate::core::Path;

/// Input format detection result
#[derive(Debug, Clone, PartialEq)]
pub enum InputFormat {
    /// A directions result as JSON
    Directions,
    /// A prebuilt path as JSON
    PathJson,
    Csv,
    Unknown,
}

/// Detect the format of a route file from its contents
pub fn detect_format(data: &[u8]) -> InputFormat {
    let text = match std::str::from_utf8(&data[..data.len().min(4096)]) {
        Ok(text) => text.trim_start(),
        // A multi-byte character may straddle the sample boundary
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&data[..e.valid_up_to()]) {
            Ok(text) => text.trim_start(),
            Err(_) => return InputFormat::Unknown,
        },
        Err(_) => return InputFormat::Unknown,
    };

    if text.starts_with('{') {
        return InputFormat::Directions;
    }
    if text.starts_with('[') {
        return InputFormat::PathJson;
    }
    if is_csv(text) {
        return InputFormat::Csv;
    }
    InputFormat::Unknown
}

fn is_csv(text: &str) -> bool {
    // Header plus at least one row with three or more commas
    text.lines().take(5).filter(|line| line.chars().filter(|&c| c == ',').count() >= 3).count() >= 2
}

/// Load a route file, auto-detecting its format
pub fn load_file(path: &str) -> Result<Path> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;

    match detect_format(&data) {
        InputFormat::Directions => {
            let directions: DirectionsResult =
                serde_json::from_slice(&data).with_context(|| format!("{} is not a directions result", path))?;
            Ok(build_path(&directions)?)
        }
        InputFormat::PathJson => {
            serde_json::from_slice(&data).with_context(|| format!("{} is not a valid path", path))
        }
        InputFormat::Csv => load_csv(path),
        InputFormat::Unknown => anyhow::bail!("Unknown input format: {}", path),
    }
}
