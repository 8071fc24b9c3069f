use super::{format_distance, format_elevation, format_pace, ExportError};
use crate::models::Units;
use crate::planner::PlannedCourse;
use std::io::Write;
use std::path::Path;

/// Write the course report: summary statistics then the kilometer splits
pub fn write_course_report<W: Write>(
    out: &mut W,
    course: &PlannedCourse,
    units: Units,
) -> std::io::Result<()> {
    let summary = &course.summary;

    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "PACE PLAN REPORT")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out)?;

    writeln!(out, "Route: {}", course.name.as_deref().unwrap_or("GPX Route"))?;
    writeln!(
        out,
        "Generated: {}",
        chrono::Local::now().format("%B %d, %Y at %I:%M %p")
    )?;
    writeln!(out)?;

    writeln!(out, "SUMMARY STATISTICS")?;
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(out, "Total Distance: {}", format_distance(summary.total_distance, units))?;
    writeln!(out, "Average Pace: {}", format_pace(summary.average_pace, units))?;
    writeln!(out, "Estimated Duration: {}", summary.total_time_hms)?;
    writeln!(out, "Elevation Gain: {}", format_elevation(summary.elevation_gain, units))?;
    writeln!(out, "Elevation Loss: {}", format_elevation(summary.elevation_loss, units))?;
    writeln!(out, "Laps: {}", summary.laps)?;
    if let (Some(start), Some(finish)) = (summary.race_start, summary.finish_clock_time) {
        writeln!(
            out,
            "Start / Finish: {} / {}",
            start.format("%H:%M:%S"),
            finish.format("%H:%M:%S")
        )?;
    }
    writeln!(out)?;

    writeln!(out, "KILOMETER SPLITS")?;
    writeln!(out, "{}", "-".repeat(40))?;
    writeln!(
        out,
        "{:>4}  {:>10}  {:>14}  {:>8}  {:>10}  {:>8}  Notes",
        "KM", "Distance", "Pace", "Grade", "Time", "Clock"
    )?;

    for split in &course.splits {
        let mut notes = Vec::new();
        if let Some(nickname) = &split.nickname {
            notes.push(nickname.clone());
        }
        if let (Some(cutoff), Some(buffer)) = (&split.cutoff_time, split.cutoff_buffer_minutes) {
            notes.push(format!("cutoff {} ({:+.1} min)", cutoff, buffer));
        }
        if !split.notes.is_empty() {
            notes.push(split.notes.clone());
        }

        writeln!(
            out,
            "{:>4}  {:>10}  {:>14}  {:>7.1}%  {:>10}  {:>8}  {}",
            split.km,
            format_distance(split.distance, units),
            format_pace(split.pace, units),
            split.grade,
            split.cumulative_time_hms,
            split.clock_time.as_deref().unwrap_or("-"),
            notes.join("; ")
        )?;
    }

    if !course.discarded_markers().is_empty() {
        writeln!(out)?;
        writeln!(out, "Skipped custom markers:")?;
        for (marker, reason) in course.discarded_markers() {
            writeln!(out, "• {:?} at {}: {}", marker.nickname, marker.distance, reason)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Generated by paceplan")?;
    Ok(())
}

/// Export the course report to a text file
pub fn export_course_report<P: AsRef<Path>>(
    course: &PlannedCourse,
    units: Units,
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    write_course_report(&mut file, course, units)?;
    Ok(())
}
