//! Custom marker rows from CSV
//!
//! Expected columns are `distance,nickname,cutoff` with a header row. Rows
//! that do not deserialize are skipped with a warning; value checks happen
//! later when markers are merged into the course.

use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;

use crate::error::{LoadError, Result};
use crate::models::CustomMarker;

/// Read custom markers from a CSV file
pub fn read_markers_file(path: &Path) -> Result<Vec<CustomMarker>> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Parse {
            reason: e.to_string(),
        },
    })?;
    Ok(read_markers(file))
}

/// Read custom markers from CSV content, skipping malformed rows
pub fn read_markers<R: Read>(reader: R) -> Vec<CustomMarker> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut markers = Vec::new();
    for (row, record) in csv_reader.deserialize::<CustomMarker>().enumerate() {
        match record {
            Ok(mut marker) => {
                if marker.cutoff.as_deref().is_some_and(|c| c.is_empty()) {
                    marker.cutoff = None;
                }
                markers.push(marker);
            }
            Err(e) => {
                tracing::warn!(row = row + 1, error = %e, "Skipping malformed marker row");
            }
        }
    }

    markers
}
