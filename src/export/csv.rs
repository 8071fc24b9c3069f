use ::csv::Writer;
use serde::Serialize;
use std::path::Path;

use super::ExportError;
use crate::models::{units as convert, CourseTable, Units};
use crate::planner::SplitRow;

/// Flat CSV record for one sample
#[derive(Debug, Serialize)]
struct SampleRecord<'a> {
    latitude: f64,
    longitude: f64,
    elevation: f64,
    lap: u32,
    segment_distance: f64,
    total_distance: f64,
    segment_gain: f64,
    is_km_marker: u8,
    km_number: Option<u32>,
    grade: f64,
    pace: f64,
    segment_time: f64,
    cumulative_time: f64,
    cumulative_time_hms: &'a str,
    clock_time: Option<String>,
    marker_nickname: Option<&'a str>,
    cutoff_time: Option<String>,
    cutoff_buffer_minutes: Option<f64>,
}

/// Flat CSV record for one kilometer split, in display units
#[derive(Debug, Serialize)]
struct SplitRecord<'a> {
    km: u32,
    lap: u32,
    distance: f64,
    pace: f64,
    grade: f64,
    elevation: f64,
    cumulative_time: &'a str,
    clock_time: Option<&'a str>,
    nickname: Option<&'a str>,
    cutoff_time: Option<&'a str>,
    cutoff_buffer_minutes: Option<f64>,
    notes: &'a str,
}

/// Export the full course table, one row per sample
pub fn export_samples<P: AsRef<Path>>(table: &CourseTable, output_path: P) -> Result<(), ExportError> {
    let mut writer = Writer::from_path(output_path)?;

    for sample in table.samples() {
        writer.serialize(SampleRecord {
            latitude: sample.latitude,
            longitude: sample.longitude,
            elevation: sample.elevation,
            lap: sample.lap,
            segment_distance: sample.segment_distance,
            total_distance: sample.cumulative_distance,
            segment_gain: sample.segment_gain,
            is_km_marker: u8::from(sample.is_marker),
            km_number: sample.marker_number,
            grade: sample.grade,
            pace: sample.pace,
            segment_time: sample.segment_time,
            cumulative_time: sample.cumulative_time,
            cumulative_time_hms: &sample.cumulative_time_hms,
            clock_time: sample.clock_time_hms(),
            marker_nickname: sample.marker_nickname.as_deref(),
            cutoff_time: sample.cutoff_time.map(|t| t.format("%H:%M:%S").to_string()),
            cutoff_buffer_minutes: sample.cutoff_buffer_minutes,
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Export kilometer splits; distance, pace and elevation follow `units`
pub fn export_splits<P: AsRef<Path>>(
    splits: &[SplitRow],
    units: Units,
    output_path: P,
) -> Result<(), ExportError> {
    let mut writer = Writer::from_path(output_path)?;

    for split in splits {
        let (distance, pace, elevation) = match units {
            Units::Metric => (split.distance, split.pace, split.elevation),
            Units::Imperial => (
                convert::km_to_miles(split.distance),
                convert::pace_km_to_mile(split.pace),
                convert::meters_to_feet(split.elevation),
            ),
        };

        writer.serialize(SplitRecord {
            km: split.km,
            lap: split.lap,
            distance,
            pace,
            grade: split.grade,
            elevation,
            cumulative_time: &split.cumulative_time_hms,
            clock_time: split.clock_time.as_deref(),
            nickname: split.nickname.as_deref(),
            cutoff_time: split.cutoff_time.as_deref(),
            cutoff_buffer_minutes: split.cutoff_buffer_minutes,
            notes: &split.notes,
        })?;
    }

    writer.flush()?;
    Ok(())
}
