//! Custom waypoints merged onto kilometer markers
//!
//! Each valid waypoint attaches to the kilometer marker nearest its target
//! distance. Malformed waypoints are dropped with a warning and never fail
//! the planning run.

use chrono::NaiveTime;

use crate::error::ValidationError;
use crate::models::{CourseTable, CustomMarker, DistanceUnit};
use crate::timing::{cutoff_buffer_minutes, parse_time_of_day};

/// Joins nicknames when several waypoints land on one marker
pub const NICKNAME_SEPARATOR: &str = " / ";

/// A custom marker that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidMarker {
    pub distance_km: f64,
    pub nickname: String,
    pub cutoff: Option<NaiveTime>,
}

/// Parse a cutoff as HH:MM:SS or HH:MM; blank means no cutoff
pub fn parse_cutoff(value: Option<&str>) -> Result<Option<NaiveTime>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_time_of_day(text)
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidCutoff {
                value: text.to_string(),
            }),
    }
}

/// Check a raw marker and convert its distance to kilometers
pub fn validate_marker(
    marker: &CustomMarker,
    unit: DistanceUnit,
) -> Result<ValidMarker, ValidationError> {
    if !(marker.distance > 0.0) {
        return Err(ValidationError::NonPositiveDistance {
            value: marker.distance,
        });
    }

    let nickname = marker.nickname.trim();
    if nickname.is_empty() {
        return Err(ValidationError::EmptyNickname);
    }

    let cutoff = parse_cutoff(marker.cutoff.as_deref())?;

    Ok(ValidMarker {
        distance_km: unit.to_km(marker.distance),
        nickname: nickname.to_string(),
        cutoff,
    })
}

/// Outcome of a merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// (kilometer, sample index) for each attached marker
    pub attached: Vec<(u32, usize)>,
    /// Rejected markers with the reason
    pub discarded: Vec<(CustomMarker, ValidationError)>,
}

/// Attaches custom markers to kilometer markers
pub struct CustomMarkerMerger {
    unit: DistanceUnit,
    race_start: Option<NaiveTime>,
}

impl CustomMarkerMerger {
    pub fn new(unit: DistanceUnit) -> Self {
        Self {
            unit,
            race_start: None,
        }
    }

    /// Race start used to compute cutoff buffers
    pub fn with_race_start(mut self, race_start: Option<NaiveTime>) -> Self {
        self.race_start = race_start;
        self
    }

    /// Index of the marker sample nearest `distance_km`, first on ties
    fn nearest_marker(table: &CourseTable, distance_km: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (index, sample) in table.marker_samples() {
            let diff = (sample.cumulative_distance - distance_km).abs();
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((index, diff));
            }
        }

        best.map(|(index, _)| index)
    }

    /// Merge markers into the table
    ///
    /// Nicknames accumulate on a shared marker and the earliest cutoff wins.
    /// The buffer is computed whenever the marker has a cutoff and a race
    /// start is known.
    pub fn merge(&self, table: &mut CourseTable, markers: &[CustomMarker]) -> MergeReport {
        let mut report = MergeReport::default();

        for marker in markers {
            let valid = match validate_marker(marker, self.unit) {
                Ok(valid) => valid,
                Err(reason) => {
                    tracing::warn!(
                        nickname = %marker.nickname,
                        distance = marker.distance,
                        %reason,
                        "Discarding custom marker"
                    );
                    report.discarded.push((marker.clone(), reason));
                    continue;
                }
            };

            let Some(index) = Self::nearest_marker(table, valid.distance_km) else {
                continue;
            };

            let sample = &mut table.samples_mut()[index];
            sample.marker_nickname = Some(match sample.marker_nickname.take() {
                Some(existing) => format!("{}{}{}", existing, NICKNAME_SEPARATOR, valid.nickname),
                None => valid.nickname.clone(),
            });

            if let Some(cutoff) = valid.cutoff {
                sample.cutoff_time = Some(match sample.cutoff_time {
                    Some(existing) => existing.min(cutoff),
                    None => cutoff,
                });
            }

            sample.cutoff_buffer_minutes = match (sample.cutoff_time, self.race_start) {
                (Some(cutoff), Some(start)) => {
                    Some(cutoff_buffer_minutes(start, sample.cumulative_time, cutoff))
                }
                _ => None,
            };

            let km = sample.marker_number.unwrap_or_default();
            tracing::debug!(nickname = %valid.nickname, km, "Attached custom marker");
            report.attached.push((km, index));
        }

        report
    }
}
