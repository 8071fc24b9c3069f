//! Elapsed and wall-clock timing
//!
//! Elapsed minutes are the source of truth. Clock times and cutoff buffers
//! are derived from them and the race start.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{InvalidStartTimeError, Result};
use crate::models::CourseTable;

/// Accepted time-of-day layouts, tried in order
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Parse a time of day as HH:MM:SS, falling back to HH:MM
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// Parse a race start time
pub fn parse_start_time(value: &str) -> Result<NaiveTime> {
    parse_time_of_day(value).ok_or_else(|| {
        InvalidStartTimeError {
            value: value.to_string(),
        }
        .into()
    })
}

/// Whole milliseconds in `minutes`, rounded to absorb float noise
fn minutes_to_millis(minutes: f64) -> i64 {
    (minutes * 60_000.0).round() as i64
}

/// Format minutes as HH:MM:SS, dropping partial seconds
pub fn format_hms(minutes: f64) -> String {
    let total_seconds = minutes_to_millis(minutes.max(0.0)) / 1000;
    let hours = total_seconds / 3600;
    let mins = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

/// Start anchored on a nominal date so elapsed time can cross midnight
fn anchored_start(start: NaiveTime) -> NaiveDateTime {
    NaiveDate::default().and_time(start)
}

/// Minutes between arrival and cutoff; negative when arriving late
///
/// Arrival is `start` plus `elapsed_minutes`. The cutoff resolves to its
/// first occurrence at or after the start, so an overnight cutoff falls on
/// the following day.
pub fn cutoff_buffer_minutes(start: NaiveTime, elapsed_minutes: f64, cutoff: NaiveTime) -> f64 {
    let start_at = anchored_start(start);
    let arrival = start_at + Duration::milliseconds(minutes_to_millis(elapsed_minutes));

    let mut cutoff_at = start_at.date().and_time(cutoff);
    if cutoff_at < start_at {
        cutoff_at += Duration::days(1);
    }

    cutoff_at.signed_duration_since(arrival).num_milliseconds() as f64 / 60_000.0
}

/// Converts per-sample pace into segment, elapsed and wall-clock times
pub struct TimeIntegrator;

impl TimeIntegrator {
    /// Fill segment time, cumulative time and the elapsed time string
    pub fn integrate(table: &mut CourseTable) {
        let mut cumulative = 0.0;

        for sample in table.samples_mut() {
            sample.segment_time = sample.segment_distance * sample.pace;
            cumulative += sample.segment_time;
            sample.cumulative_time = cumulative;
            sample.cumulative_time_hms = format_hms(cumulative);
        }

        tracing::debug!(total_minutes = cumulative, "Integrated split times");
    }

    /// Fill clock time as start plus elapsed time, wrapping past midnight
    pub fn apply_clock(table: &mut CourseTable, start: NaiveTime) {
        for sample in table.samples_mut() {
            let elapsed = Duration::milliseconds(minutes_to_millis(sample.cumulative_time));
            let (clock, _) = start.overflowing_add_signed(elapsed);
            sample.clock_time = Some(clock);
        }
    }

    /// Parse the race start and fill clock times
    pub fn apply_start(table: &mut CourseTable, race_start: &str) -> Result<NaiveTime> {
        let start = parse_start_time(race_start)?;
        Self::apply_clock(table, start);
        Ok(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlannerError;
    use crate::models::Sample;

    fn table(segments: &[(f64, f64)]) -> CourseTable {
        let samples = segments
            .iter()
            .map(|&(distance, pace)| {
                let mut s = Sample::new(0.0, 0.0, 0.0);
                s.segment_distance = distance;
                s.pace = pace;
                s
            })
            .collect();
        CourseTable::from_samples(samples)
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(0.0), "00:00:00");
        assert_eq!(format_hms(24.0), "00:24:00");
        assert_eq!(format_hms(61.5), "01:01:30");
        assert_eq!(format_hms(61.999), "01:01:59");
        assert_eq!(format_hms(23.999_999_999_9), "00:24:00");
        assert_eq!(format_hms(1500.0), "25:00:00");
    }

    #[test]
    fn test_integrate() {
        let mut course = table(&[(0.0, 6.0), (1.0, 6.0), (0.5, 8.0)]);
        TimeIntegrator::integrate(&mut course);

        let samples = course.samples();
        assert_eq!(samples[0].segment_time, 0.0);
        assert_eq!(samples[1].segment_time, 6.0);
        assert_eq!(samples[2].segment_time, 4.0);
        assert_eq!(samples[2].cumulative_time, 10.0);
        assert_eq!(samples[2].cumulative_time_hms, "00:10:00");
    }

    #[test]
    fn test_clock_time() {
        let mut course = table(&[(0.0, 6.0), (10.0, 6.5)]);
        TimeIntegrator::integrate(&mut course);
        let start = TimeIntegrator::apply_start(&mut course, "07:30").unwrap();

        assert_eq!(start, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(course.samples()[0].clock_time_hms().as_deref(), Some("07:30:00"));
        assert_eq!(course.samples()[1].clock_time_hms().as_deref(), Some("08:35:00"));
    }

    #[test]
    fn test_clock_wraps_midnight() {
        let mut course = table(&[(0.0, 6.0), (10.0, 6.0)]);
        TimeIntegrator::integrate(&mut course);
        TimeIntegrator::apply_start(&mut course, "23:30:00").unwrap();
        assert_eq!(course.samples()[1].clock_time_hms().as_deref(), Some("00:30:00"));
    }

    #[test]
    fn test_cutoff_buffer_overnight() {
        let start = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
        let cutoff = NaiveTime::from_hms_opt(0, 30, 0).unwrap();

        // arrive 23:30, cutoff 00:30 the next day
        assert_eq!(cutoff_buffer_minutes(start, 30.0, cutoff), 60.0);
        // arrive 00:00
        assert_eq!(cutoff_buffer_minutes(start, 60.0, cutoff), 30.0);
        // arrive 01:00
        assert_eq!(cutoff_buffer_minutes(start, 120.0, cutoff), -30.0);
    }

    #[test]
    fn test_cutoff_buffer_same_day() {
        let start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let cutoff = NaiveTime::from_hms_opt(8, 25, 0).unwrap();
        assert_eq!(cutoff_buffer_minutes(start, 30.0, cutoff), -5.0);
        assert_eq!(cutoff_buffer_minutes(start, 0.0, start), 0.0);
    }

    #[test]
    fn test_cutoff_buffer_past_a_day() {
        let start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let cutoff = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        // cutoff resolves to 05:00 the next day, arrival 06:00 the next day
        assert_eq!(cutoff_buffer_minutes(start, 1440.0, cutoff), -60.0);
    }

    #[test]
    fn test_invalid_start() {
        let mut course = table(&[(0.0, 6.0)]);
        let result = TimeIntegrator::apply_start(&mut course, "half past seven");
        assert!(matches!(result, Err(PlannerError::InvalidStartTime(_))));
        assert_eq!(course.samples()[0].clock_time, None);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(
            parse_time_of_day("06:45:10"),
            NaiveTime::from_hms_opt(6, 45, 10)
        );
        assert_eq!(parse_time_of_day(" 06:45 "), NaiveTime::from_hms_opt(6, 45, 0));
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(parse_time_of_day(""), None);
    }
}
