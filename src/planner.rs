//! Course planning pipeline
//!
//! `plan_course` is a pure function from a loaded track and a [`PlanConfig`]
//! to a [`PlannedCourse`]. Stages run strictly in order on a table owned by
//! the run; nothing is returned unless every fatal stage succeeds.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::course::{self, BEARING_LOOK_AHEAD};
use crate::error::{Result, ValidationError};
use crate::import::ImportManager;
use crate::markers::{CustomMarkerMerger, MergeReport};
use crate::models::{CourseTable, CustomMarker, DistanceUnit, Sample, Track};
use crate::pace::PaceModel;
use crate::timing::{format_hms, TimeIntegrator};

/// Validated inputs for one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Number of laps of the track
    pub loops: u32,

    /// Base pace in minutes per `pace_unit`
    pub base_pace: f64,

    pub pace_unit: DistanceUnit,

    /// Add fatigue decay
    pub decay: bool,

    /// Add uphill penalty
    pub hills: bool,

    /// Race start as HH:MM:SS or HH:MM
    pub race_start: Option<String>,

    /// Named waypoints, distances in `marker_unit`
    pub markers: Vec<CustomMarker>,

    pub marker_unit: DistanceUnit,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            loops: 1,
            base_pace: 6.0,
            pace_unit: DistanceUnit::Km,
            decay: false,
            hills: false,
            race_start: None,
            markers: Vec::new(),
            marker_unit: DistanceUnit::Km,
        }
    }
}

impl PlanConfig {
    /// Base pace converted to min/km
    pub fn base_pace_per_km(&self) -> f64 {
        self.pace_unit.pace_to_min_per_km(self.base_pace)
    }

    /// Reject parameters no course can be planned with
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.loops == 0 {
            return Err(ValidationError::InvalidLoopCount { value: self.loops });
        }
        if !(self.base_pace > 0.0) || !self.base_pace.is_finite() {
            return Err(ValidationError::InvalidBasePace {
                value: self.base_pace,
            });
        }
        Ok(())
    }

    pub fn pace_model(&self) -> PaceModel {
        PaceModel::new(self.base_pace_per_km())
            .with_decay(self.decay)
            .with_hills(self.hills)
    }
}

/// Course-level figures handed to report and chart renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    /// Total distance in km
    pub total_distance: f64,

    /// Mean of per-sample pace in min/km
    pub average_pace: f64,

    /// Total elapsed time in minutes
    pub total_minutes: f64,

    /// Total elapsed time as HH:MM:SS
    pub total_time_hms: String,

    /// Sum of climbs in meters
    pub elevation_gain: f64,

    /// Sum of descents in meters, as a positive number
    pub elevation_loss: f64,

    pub race_start: Option<NaiveTime>,

    pub finish_clock_time: Option<NaiveTime>,

    pub laps: u32,

    pub samples: usize,

    pub markers: usize,
}

impl CourseSummary {
    pub fn from_table(table: &CourseTable, race_start: Option<NaiveTime>) -> Self {
        let samples = table.samples();
        let count = samples.len();

        let average_pace = if count == 0 {
            0.0
        } else {
            samples.iter().map(|s| s.pace).sum::<f64>() / count as f64
        };

        let (elevation_gain, elevation_loss) =
            samples.iter().fold((0.0, 0.0), |(gain, loss), s| {
                if s.segment_gain > 0.0 {
                    (gain + s.segment_gain, loss)
                } else {
                    (gain, loss - s.segment_gain)
                }
            });

        let last = samples.last();
        let total_minutes = last.map_or(0.0, |s| s.cumulative_time);

        Self {
            total_distance: table.total_distance(),
            average_pace,
            total_minutes,
            total_time_hms: format_hms(total_minutes),
            elevation_gain,
            elevation_loss,
            race_start,
            finish_clock_time: last.and_then(|s| s.clock_time),
            laps: table.lap_count(),
            samples: count,
            markers: table.markers().len(),
        }
    }
}

/// One kilometer split row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRow {
    pub km: u32,
    pub lap: u32,
    /// Cumulative distance in km at the marker sample
    pub distance: f64,
    pub elevation: f64,
    /// Pace in min/km
    pub pace: f64,
    pub grade: f64,
    pub cumulative_time_hms: String,
    pub clock_time: Option<String>,
    /// Direction toward the course ahead, in degrees
    pub bearing: Option<f64>,
    pub nickname: Option<String>,
    pub cutoff_time: Option<String>,
    pub cutoff_buffer_minutes: Option<f64>,
    /// Free-text notes, empty unless filled by the caller
    pub notes: String,
}

impl SplitRow {
    fn from_sample(sample: &Sample, bearing: Option<f64>) -> Self {
        Self {
            km: sample.marker_number.unwrap_or_default(),
            lap: sample.lap,
            distance: sample.cumulative_distance,
            elevation: sample.elevation,
            pace: sample.pace,
            grade: sample.grade,
            cumulative_time_hms: sample.cumulative_time_hms.clone(),
            clock_time: sample.clock_time_hms(),
            bearing,
            nickname: sample.marker_nickname.clone(),
            cutoff_time: sample.cutoff_time.map(|t| t.format("%H:%M:%S").to_string()),
            cutoff_buffer_minutes: sample.cutoff_buffer_minutes,
            notes: String::new(),
        }
    }
}

/// Kilometer split rows in course order
pub fn split_rows(table: &CourseTable) -> Vec<SplitRow> {
    let bearings = course::marker_bearings(table, BEARING_LOOK_AHEAD);

    table
        .marker_samples()
        .zip(bearings)
        .map(|((_, sample), (_, bearing))| SplitRow::from_sample(sample, bearing))
        .collect()
}

/// Result of a successful planning run, read-only for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedCourse {
    pub name: Option<String>,
    pub summary: CourseSummary,
    pub splits: Vec<SplitRow>,
    table: CourseTable,
    #[serde(skip)]
    discarded_markers: Vec<(CustomMarker, ValidationError)>,
}

impl PlannedCourse {
    pub fn table(&self) -> &CourseTable {
        &self.table
    }

    /// Custom markers dropped during the merge, with the reason
    pub fn discarded_markers(&self) -> &[(CustomMarker, ValidationError)] {
        &self.discarded_markers
    }
}

/// Run every stage for `track` under `config`
#[tracing::instrument(skip_all, fields(points = track.samples.len(), loops = config.loops))]
pub fn plan_course(track: &Track, config: &PlanConfig) -> Result<PlannedCourse> {
    config.validate()?;

    let mut table = course::expand_loops(&track.samples, config.loops);
    course::accumulate_distances(&mut table);
    course::locate_markers(&mut table);
    course::estimate_grades(&mut table);
    config.pace_model().apply(&mut table);
    TimeIntegrator::integrate(&mut table);

    let race_start = match config.race_start.as_deref() {
        Some(start) => Some(TimeIntegrator::apply_start(&mut table, start)?),
        None => None,
    };

    let MergeReport { discarded, .. } =
        CustomMarkerMerger::new(config.marker_unit)
            .with_race_start(race_start)
            .merge(&mut table, &config.markers);

    let summary = CourseSummary::from_table(&table, race_start);
    let splits = split_rows(&table);

    tracing::info!(
        total_km = summary.total_distance,
        average_pace = summary.average_pace,
        total_time = %summary.total_time_hms,
        "Course planned"
    );

    Ok(PlannedCourse {
        name: track.name.clone(),
        summary,
        splits,
        table,
        discarded_markers: discarded,
    })
}

/// Plans courses from track files
pub struct CoursePlanner {
    config: PlanConfig,
    importers: ImportManager,
}

impl CoursePlanner {
    pub fn new(config: PlanConfig) -> Self {
        Self {
            config,
            importers: ImportManager::new(),
        }
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    /// Plan an already loaded track
    pub fn plan(&self, track: &Track) -> Result<PlannedCourse> {
        plan_course(track, &self.config)
    }

    /// Load a track file and plan it
    pub fn plan_file(&self, path: &Path) -> Result<PlannedCourse> {
        let track = self.importers.import_file(path)?;
        self.plan(&track)
    }
}
