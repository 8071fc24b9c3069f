use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::models::{units as convert, Units};
use crate::planner::PlannedCourse;

pub mod csv;
pub mod json;
pub mod text;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Kilometer splits as CSV
    Csv,
    /// Every sample of the course table as CSV
    #[serde(rename = "samples")]
    SamplesCsv,
    Json,
    Text,
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "samples" | "samples-csv" => Ok(ExportFormat::SamplesCsv),
            "json" => Ok(ExportFormat::Json),
            "text" | "txt" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Write a planned course in the requested format
pub fn export_course<P: AsRef<Path>>(
    course: &PlannedCourse,
    format: ExportFormat,
    units: Units,
    output_path: P,
) -> Result<(), ExportError> {
    let path = output_path.as_ref();
    match format {
        ExportFormat::Csv => csv::export_splits(&course.splits, units, path)?,
        ExportFormat::SamplesCsv => csv::export_samples(course.table(), path)?,
        ExportFormat::Json => json::export_json(course, path)?,
        ExportFormat::Text => text::export_course_report(course, units, path)?,
    }

    tracing::info!(path = %path.display(), ?format, "Exported course");
    Ok(())
}

/// Distance label in the display units
pub fn format_distance(km: f64, units: Units) -> String {
    match units {
        Units::Metric => format!("{:.2} km", km),
        Units::Imperial => format!("{:.2} mi", convert::km_to_miles(km)),
    }
}

/// Pace label in the display units
pub fn format_pace(min_per_km: f64, units: Units) -> String {
    match units {
        Units::Metric => format!("{:.2} min/km", min_per_km),
        Units::Imperial => format!("{:.2} min/mi", convert::pace_km_to_mile(min_per_km)),
    }
}

/// Elevation label in the display units
pub fn format_elevation(meters: f64, units: Units) -> String {
    match units {
        Units::Metric => format!("{:.0} m", meters),
        Units::Imperial => format!("{:.0} ft", convert::meters_to_feet(meters)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(
            "samples".parse::<ExportFormat>().unwrap(),
            ExportFormat::SamplesCsv
        );
        assert!(matches!(
            "pdf".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_serialized_names_parse_back() {
        for format in [
            ExportFormat::Csv,
            ExportFormat::SamplesCsv,
            ExportFormat::Json,
            ExportFormat::Text,
        ] {
            let name = serde_json::to_value(format).unwrap();
            let name = name.as_str().unwrap();
            assert_eq!(name.parse::<ExportFormat>().unwrap(), format);
        }
        assert_eq!(
            serde_json::to_string(&ExportFormat::SamplesCsv).unwrap(),
            "\"samples\""
        );
    }

    #[test]
    fn test_unit_labels() {
        assert_eq!(format_distance(10.0, Units::Metric), "10.00 km");
        assert_eq!(format_distance(16.0934, Units::Imperial), "10.00 mi");
        assert_eq!(format_pace(6.0, Units::Imperial), "9.66 min/mi");
        assert_eq!(format_elevation(100.0, Units::Imperial), "328 ft");
    }
}
