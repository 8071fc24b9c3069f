//! Synthetic pace model
//!
//! Pace starts from a flat base pace and adds two independent terms: a
//! piecewise-logarithmic fatigue decay over distance and an uphill penalty
//! driven by the kilometer grade. Both are heuristics.

use crate::models::CourseTable;

/// Pace ceiling on extreme grades, about 20 min/mile
pub const EXTREME_GRADE_PACE_CAP: f64 = 12.5;

/// Grade at which the steep hill factor and the cap apply
pub const STEEP_GRADE: f64 = 20.0;

const EARLY_DECAY_FACTOR: f64 = 0.05;
const LATE_DECAY_FACTOR: f64 = 0.2;
const HILL_FACTOR: f64 = 0.08;
const STEEP_HILL_FACTOR: f64 = 0.12;

/// Pace model configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaceModel {
    /// Base pace in min/km
    pub base_pace: f64,
    pub decay_enabled: bool,
    pub hill_enabled: bool,
}

impl PaceModel {
    pub fn new(base_pace: f64) -> Self {
        Self {
            base_pace,
            decay_enabled: false,
            hill_enabled: false,
        }
    }

    pub fn with_decay(mut self, enabled: bool) -> Self {
        self.decay_enabled = enabled;
        self
    }

    pub fn with_hills(mut self, enabled: bool) -> Self {
        self.hill_enabled = enabled;
        self
    }

    /// Fatigue slowdown at `distance` km into a course of `total_distance` km
    ///
    /// Grows slowly up to halfway, then faster beyond it.
    pub fn decay_term(distance: f64, total_distance: f64) -> f64 {
        let halfway = total_distance / 2.0;
        if halfway <= 0.0 {
            return 0.0;
        }

        if distance <= halfway {
            EARLY_DECAY_FACTOR * (1.0 + distance / halfway).ln()
        } else {
            EARLY_DECAY_FACTOR * 2.0_f64.ln() + LATE_DECAY_FACTOR * (1.0 + (distance - halfway)).ln()
        }
    }

    /// Uphill slowdown for a grade in percent; flat and downhill give zero
    pub fn hill_term(grade: f64) -> f64 {
        if grade <= 0.0 {
            0.0
        } else if grade < STEEP_GRADE {
            HILL_FACTOR * grade
        } else {
            STEEP_HILL_FACTOR * grade
        }
    }

    /// Adjusted pace in min/km for one sample
    pub fn adjusted_pace(&self, distance: f64, grade: f64, total_distance: f64) -> f64 {
        let mut pace = self.base_pace;

        if self.decay_enabled {
            pace += Self::decay_term(distance, total_distance);
        }

        if self.hill_enabled && grade > 0.0 {
            pace += Self::hill_term(grade);
            if grade >= STEEP_GRADE {
                pace = pace.min(EXTREME_GRADE_PACE_CAP);
            }
        }

        pace.max(0.0)
    }

    /// Fill `pace` on every sample
    pub fn apply(&self, table: &mut CourseTable) {
        let total_distance = table.total_distance();

        for sample in table.samples_mut() {
            sample.pace = self.adjusted_pace(sample.cumulative_distance, sample.grade, total_distance);
        }

        tracing::debug!(
            base_pace = self.base_pace,
            decay = self.decay_enabled,
            hills = self.hill_enabled,
            "Applied pace model"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sample;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_no_adjustments_returns_base() {
        let model = PaceModel::new(6.0);
        for (distance, grade) in [(0.0, 0.0), (3.0, 15.0), (9.5, 60.0), (1.0, -30.0)] {
            assert_eq!(model.adjusted_pace(distance, grade, 10.0), 6.0);
        }
    }

    #[test]
    fn test_decay_steeper_after_halfway() {
        let model = PaceModel::new(6.0).with_decay(true);
        let halfway = model.adjusted_pace(5.0, 0.0, 10.0);
        let late = model.adjusted_pace(9.0, 0.0, 10.0);

        assert!((halfway - (6.0 + 0.05 * 2.0_f64.ln())).abs() < EPS);
        assert!((late - (6.0 + 0.05 * 2.0_f64.ln() + 0.2 * 5.0_f64.ln())).abs() < EPS);
        assert!(halfway < late);
    }

    #[test]
    fn test_decay_is_continuous_at_halfway() {
        let before = PaceModel::decay_term(5.0, 10.0);
        let after = PaceModel::decay_term(5.0 + 1e-9, 10.0);
        assert!((before - after).abs() < 1e-8);
        assert_eq!(PaceModel::decay_term(0.0, 10.0), 0.0);
    }

    #[test]
    fn test_decay_on_zero_length_course() {
        assert_eq!(PaceModel::decay_term(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_hill_terms() {
        let model = PaceModel::new(6.0).with_hills(true);
        assert!((model.adjusted_pace(1.0, 10.0, 10.0) - 6.8).abs() < EPS);
        assert!((model.adjusted_pace(1.0, 25.0, 10.0) - 9.0).abs() < EPS);
        assert_eq!(model.adjusted_pace(1.0, 0.0, 10.0), 6.0);
        assert_eq!(model.adjusted_pace(1.0, -12.0, 10.0), 6.0);
    }

    #[test]
    fn test_extreme_grade_is_capped() {
        let model = PaceModel::new(6.0).with_hills(true);
        assert_eq!(model.adjusted_pace(1.0, 60.0, 10.0), EXTREME_GRADE_PACE_CAP);

        // Below the steep threshold there is no cap
        let slow = PaceModel::new(12.0).with_hills(true);
        assert!(slow.adjusted_pace(1.0, 19.0, 10.0) > EXTREME_GRADE_PACE_CAP);
    }

    #[test]
    fn test_terms_are_additive() {
        let model = PaceModel::new(6.0).with_decay(true).with_hills(true);
        let expected = 6.0 + PaceModel::decay_term(7.0, 10.0) + PaceModel::hill_term(5.0);
        assert!((model.adjusted_pace(7.0, 5.0, 10.0) - expected).abs() < EPS);
    }

    #[test]
    fn test_apply_uses_course_total() {
        let samples = [0.0, 5.0, 10.0]
            .iter()
            .map(|&d| {
                let mut s = Sample::new(0.0, 0.0, 0.0);
                s.cumulative_distance = d;
                s
            })
            .collect();
        let mut table = CourseTable::from_samples(samples);
        PaceModel::new(5.0).with_decay(true).apply(&mut table);

        let paces: Vec<f64> = table.samples().iter().map(|s| s.pace).collect();
        assert_eq!(paces[0], 5.0);
        assert!((paces[1] - (5.0 + 0.05 * 2.0_f64.ln())).abs() < EPS);
        assert!(paces[2] > paces[1]);
    }
}
