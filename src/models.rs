use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Kilometers in one statute mile
pub const KM_PER_MILE: f64 = 1.60934;

/// Feet in one meter
pub const FEET_PER_METER: f64 = 3.28084;

/// Unit flag for user-supplied distances and paces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Km,
    Mile,
}

impl Default for DistanceUnit {
    fn default() -> Self {
        DistanceUnit::Km
    }
}

impl DistanceUnit {
    /// Convert a distance in this unit to kilometers
    pub fn to_km(&self, distance: f64) -> f64 {
        match self {
            DistanceUnit::Km => distance,
            DistanceUnit::Mile => units::miles_to_km(distance),
        }
    }

    /// Convert a pace (minutes per this unit) to minutes per kilometer
    pub fn pace_to_min_per_km(&self, pace: f64) -> f64 {
        match self {
            DistanceUnit::Km => pace,
            DistanceUnit::Mile => units::pace_mile_to_km(pace),
        }
    }
}

impl std::str::FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "km" | "kilometer" | "kilometers" => Ok(DistanceUnit::Km),
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Mile),
            _ => Err(format!("Invalid distance unit: {}", s)),
        }
    }
}

/// Display units for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    Imperial,
}

impl Default for Units {
    fn default() -> Self {
        Units::Metric
    }
}

impl std::str::FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(format!("Invalid units: {}", s)),
        }
    }
}

/// Conversions between metric and imperial distances and paces
pub mod units {
    use super::{FEET_PER_METER, KM_PER_MILE};

    pub fn km_to_miles(km: f64) -> f64 {
        km / KM_PER_MILE
    }

    pub fn miles_to_km(miles: f64) -> f64 {
        miles * KM_PER_MILE
    }

    /// min/km to min/mile
    pub fn pace_km_to_mile(pace_min_per_km: f64) -> f64 {
        pace_min_per_km * KM_PER_MILE
    }

    /// min/mile to min/km
    pub fn pace_mile_to_km(pace_min_per_mile: f64) -> f64 {
        pace_min_per_mile / KM_PER_MILE
    }

    pub fn meters_to_feet(meters: f64) -> f64 {
        meters * FEET_PER_METER
    }
}

/// One track point of the (possibly lap-expanded) course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Latitude in degrees
    pub latitude: f64,

    /// Longitude in degrees
    pub longitude: f64,

    /// Elevation in meters, zero when the track has none
    pub elevation: f64,

    /// 1-based lap this sample belongs to
    pub lap: u32,

    /// Distance from the previous sample in km
    pub segment_distance: f64,

    /// Running distance total in km
    pub cumulative_distance: f64,

    /// Elevation change from the previous sample in meters
    pub segment_gain: f64,

    /// Sample is the nearest point to a whole kilometer
    pub is_marker: bool,

    /// Kilometer this sample marks (marker samples only)
    pub marker_number: Option<u32>,

    /// Most recent marker at or before this sample
    pub km_group: Option<u32>,

    /// Net elevation change of the kilometer group, percent per km
    pub grade: f64,

    /// Modeled pace in min/km
    pub pace: f64,

    /// Minutes spent on the segment ending at this sample
    pub segment_time: f64,

    /// Minutes elapsed since the start
    pub cumulative_time: f64,

    /// Elapsed time as HH:MM:SS
    pub cumulative_time_hms: String,

    /// Wall-clock arrival, when a race start is known
    pub clock_time: Option<NaiveTime>,

    /// Custom waypoint names attached to this marker
    pub marker_nickname: Option<String>,

    /// Custom waypoint cutoff
    pub cutoff_time: Option<NaiveTime>,

    /// Minutes between arrival and cutoff; negative when late
    pub cutoff_buffer_minutes: Option<f64>,
}

impl Sample {
    /// Create a loaded sample; downstream fields start unset
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            lap: 1,
            segment_distance: 0.0,
            cumulative_distance: 0.0,
            segment_gain: 0.0,
            is_marker: false,
            marker_number: None,
            km_group: None,
            grade: 0.0,
            pace: 0.0,
            segment_time: 0.0,
            cumulative_time: 0.0,
            cumulative_time_hms: String::new(),
            clock_time: None,
            marker_nickname: None,
            cutoff_time: None,
            cutoff_buffer_minutes: None,
        }
    }

    /// Index into a per-lap color palette
    pub fn lap_color_index(&self, palette_len: usize) -> usize {
        if palette_len == 0 {
            return 0;
        }
        (self.lap.max(1) as usize - 1) % palette_len
    }

    /// Wall-clock arrival formatted as HH:MM:SS
    pub fn clock_time_hms(&self) -> Option<String> {
        self.clock_time.map(|t| t.format("%H:%M:%S").to_string())
    }
}

/// A loaded track, before loop expansion
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Track name from the file, if any
    pub name: Option<String>,

    /// Points in file order, lap fixed at 1
    pub samples: Vec<Sample>,

    /// Whether the file carried any elevation values
    pub has_elevation: bool,
}

/// Kilometer marker assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmMarker {
    /// Whole kilometer
    pub number: u32,

    /// Index of the nearest sample
    pub index: usize,
}

/// Ordered per-sample course table shared by every pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseTable {
    samples: Vec<Sample>,
    markers: Vec<KmMarker>,
}

impl CourseTable {
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            markers: Vec::new(),
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub(crate) fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }

    /// Every (kilometer, sample index) pair, including shared samples
    pub fn markers(&self) -> &[KmMarker] {
        &self.markers
    }

    pub(crate) fn set_markers(&mut self, markers: Vec<KmMarker>) {
        self.markers = markers;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples flagged as kilometer markers, in course order
    pub fn marker_samples(&self) -> impl Iterator<Item = (usize, &Sample)> {
        self.samples.iter().enumerate().filter(|(_, s)| s.is_marker)
    }

    /// Largest cumulative distance in km
    pub fn total_distance(&self) -> f64 {
        self.samples
            .iter()
            .map(|s| s.cumulative_distance)
            .fold(0.0, f64::max)
    }

    /// Number of laps in the expanded course
    pub fn lap_count(&self) -> u32 {
        self.samples.iter().map(|s| s.lap).max().unwrap_or(0)
    }
}

/// User-supplied named waypoint, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomMarker {
    /// Target distance in the merger's unit
    pub distance: f64,

    /// Display name
    pub nickname: String,

    /// Cutoff as HH:MM:SS or HH:MM
    #[serde(default)]
    pub cutoff: Option<String>,
}

impl CustomMarker {
    pub fn new(distance: f64, nickname: impl Into<String>, cutoff: Option<&str>) -> Self {
        Self {
            distance,
            nickname: nickname.into(),
            cutoff: cutoff.map(str::to_string),
        }
    }
}
