//! Course geometry: lap expansion, geodesic distance, kilometer markers and grade
//!
//! Each stage works on the shared [`CourseTable`] in order and only reads
//! fields produced by the stages before it.

use geo::{Bearing, Distance, Geodesic, Point};

use crate::models::{CourseTable, KmMarker, Sample};

/// Absorbs float noise when a course total lands a hair under a whole kilometer
const DISTANCE_EPSILON_KM: f64 = 1e-9;

/// Look-ahead used for marker direction arrows
pub const BEARING_LOOK_AHEAD: usize = 5;

/// Replicate the base track `loops` times, tagging each copy with its lap
///
/// A loop count of zero is treated as a single lap.
pub fn expand_loops(base: &[Sample], loops: u32) -> CourseTable {
    let loops = loops.max(1);
    let mut samples = Vec::with_capacity(base.len() * loops as usize);

    for lap in 1..=loops {
        samples.extend(base.iter().map(|sample| Sample {
            lap,
            ..sample.clone()
        }));
    }

    tracing::debug!(laps = loops, samples = samples.len(), "Expanded course");
    CourseTable::from_samples(samples)
}

fn point(sample: &Sample) -> Point<f64> {
    Point::new(sample.longitude, sample.latitude)
}

/// Ellipsoidal distance between two samples in kilometers
pub fn geodesic_km(from: &Sample, to: &Sample) -> f64 {
    Geodesic.distance(point(from), point(to)) / 1000.0
}

/// Fill segment distance, cumulative distance and segment gain
///
/// The expanded course is one continuous path, so the closure between the
/// end of one lap and the start of the next is counted like any segment.
pub fn accumulate_distances(table: &mut CourseTable) {
    let samples = table.samples_mut();
    let mut cumulative = 0.0;

    for i in 0..samples.len() {
        let (segment, gain) = if i == 0 {
            (0.0, 0.0)
        } else {
            (
                geodesic_km(&samples[i - 1], &samples[i]),
                samples[i].elevation - samples[i - 1].elevation,
            )
        };

        cumulative += segment;
        let sample = &mut samples[i];
        sample.segment_distance = segment;
        sample.cumulative_distance = cumulative;
        sample.segment_gain = gain;
    }

    tracing::debug!(total_km = cumulative, "Accumulated distances");
}

/// Find the sample nearest each whole kilometer and flag it as a marker
///
/// Ties go to the earliest sample. Two kilometers may resolve to the same
/// sample on a near-stationary course; both assignments are kept in
/// [`CourseTable::markers`] and the later kilometer wins `marker_number`.
pub fn locate_markers(table: &mut CourseTable) {
    if table.is_empty() {
        return;
    }

    let total = table.total_distance();
    let marker_count = (total + DISTANCE_EPSILON_KM).floor() as u32 + 1;
    let samples = table.samples_mut();

    for sample in samples.iter_mut() {
        sample.is_marker = false;
        sample.marker_number = None;
    }

    let mut markers = Vec::with_capacity(marker_count as usize);
    for km in 0..marker_count {
        let target = km as f64;
        let mut best_index = 0;
        let mut best_diff = f64::INFINITY;

        for (index, sample) in samples.iter().enumerate() {
            let diff = (sample.cumulative_distance - target).abs();
            if diff < best_diff {
                best_diff = diff;
                best_index = index;
            }
        }

        samples[best_index].is_marker = true;
        samples[best_index].marker_number = Some(km);
        markers.push(KmMarker {
            number: km,
            index: best_index,
        });
    }

    tracing::debug!(markers = markers.len(), "Located kilometer markers");
    table.set_markers(markers);
}

/// Carry the last seen marker number forward onto every sample
pub fn forward_fill_groups(table: &mut CourseTable) {
    let mut current = None;
    for sample in table.samples_mut() {
        if sample.marker_number.is_some() {
            current = sample.marker_number;
        }
        sample.km_group = current;
    }
}

/// Grade per kilometer group: net elevation change across the group
///
/// Each group nominally spans one kilometer, so the meter delta reads as
/// percent per km. Every sample in a group gets the same grade.
pub fn estimate_grades(table: &mut CourseTable) {
    forward_fill_groups(table);

    let samples = table.samples_mut();
    let mut start = 0;
    while start < samples.len() {
        let group = samples[start].km_group;
        let mut end = start;
        while end + 1 < samples.len() && samples[end + 1].km_group == group {
            end += 1;
        }

        let grade = (samples[end].elevation - samples[start].elevation) / 1.0;
        for sample in &mut samples[start..=end] {
            sample.grade = grade;
        }

        start = end + 1;
    }
}

/// Initial geodesic bearing from one sample to another in degrees, 0..360
/// clockwise from north
pub fn bearing(from: &Sample, to: &Sample) -> f64 {
    Geodesic.bearing(point(from), point(to)).rem_euclid(360.0)
}

/// Direction at each marker, looking a few samples ahead along the course
///
/// The look-ahead shrinks to the number of markers remaining; the final
/// marker has no direction.
pub fn marker_bearings(table: &CourseTable, look_ahead: usize) -> Vec<(u32, Option<f64>)> {
    let samples = table.samples();
    let marker_rows: Vec<(usize, &Sample)> = table.marker_samples().collect();
    let count = marker_rows.len();

    marker_rows
        .iter()
        .enumerate()
        .map(|(i, (index, sample))| {
            let number = sample.marker_number.unwrap_or_default();
            let ahead = look_ahead.min(count - i - 1);
            let direction = (ahead > 0 && index + ahead < samples.len())
                .then(|| bearing(sample, &samples[index + ahead]));
            (number, direction)
        })
        .collect()
}
