use paceplan::pace::{EXTREME_GRADE_PACE_CAP, STEEP_GRADE};
use paceplan::{plan_course, PaceModel, PlanConfig, Sample, Track};
use proptest::prelude::*;

/// Property checks for the pace model and the timing it drives

fn track_from(steps: &[(f64, f64)]) -> Track {
    let mut lon = 0.0;
    let samples = steps
        .iter()
        .map(|(step_degrees, elevation)| {
            lon += step_degrees;
            Sample::new(0.0, lon, *elevation)
        })
        .collect();
    Track {
        name: None,
        samples,
        has_elevation: true,
    }
}

proptest! {
    #[test]
    fn prop_no_adjustments_returns_base(
        base in 0.5f64..20.0,
        distance in 0.0f64..100.0,
        grade in -50.0f64..50.0,
        total in 0.0f64..100.0,
    ) {
        let model = PaceModel::new(base);
        prop_assert_eq!(model.adjusted_pace(distance, grade, total), base);
    }

    #[test]
    fn prop_decay_never_speeds_up(
        base in 0.5f64..20.0,
        fraction in 0.0f64..=1.0,
        total in 0.1f64..100.0,
    ) {
        let model = PaceModel::new(base).with_decay(true);
        let pace = model.adjusted_pace(fraction * total, 0.0, total);
        prop_assert!(pace >= base);
    }

    #[test]
    fn prop_decay_grows_with_distance(
        a in 0.0f64..1.0,
        b in 0.0f64..1.0,
        total in 0.1f64..100.0,
    ) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            PaceModel::decay_term(near * total, total) <= PaceModel::decay_term(far * total, total)
        );
    }

    #[test]
    fn prop_steep_grades_are_capped(
        base in 0.5f64..12.0,
        grade in STEEP_GRADE..200.0,
    ) {
        let model = PaceModel::new(base).with_hills(true);
        let pace = model.adjusted_pace(0.0, grade, 10.0);
        prop_assert!(pace <= EXTREME_GRADE_PACE_CAP + 1e-12);
    }

    #[test]
    fn prop_downhill_is_not_adjusted(
        base in 0.5f64..20.0,
        grade in -100.0f64..=0.0,
    ) {
        let model = PaceModel::new(base).with_hills(true);
        prop_assert_eq!(model.adjusted_pace(0.0, grade, 10.0), base);
    }

    #[test]
    fn prop_pace_is_non_negative(
        base in 0.0f64..20.0,
        distance in 0.0f64..50.0,
        grade in -100.0f64..100.0,
        total in 0.0f64..50.0,
    ) {
        let model = PaceModel::new(base).with_decay(true).with_hills(true);
        prop_assert!(model.adjusted_pace(distance, grade, total) >= 0.0);
    }

    #[test]
    fn prop_cumulative_time_is_monotone(
        steps in prop::collection::vec((0.0f64..0.01, 0.0f64..300.0), 2..40),
        loops in 1u32..4,
    ) {
        let config = PlanConfig {
            loops,
            decay: true,
            hills: true,
            ..PlanConfig::default()
        };
        let course = plan_course(&track_from(&steps), &config).unwrap();
        let samples = course.table().samples();

        prop_assert_eq!(samples.len(), steps.len() * loops as usize);
        for pair in samples.windows(2) {
            prop_assert!(pair[1].cumulative_distance >= pair[0].cumulative_distance);
            prop_assert!(pair[1].cumulative_time >= pair[0].cumulative_time);
        }
        prop_assert!(samples.iter().all(|s| s.pace >= 0.0));
    }

    #[test]
    fn prop_every_kilometer_gets_a_marker(
        steps in prop::collection::vec((0.0f64..0.02, 0.0f64..50.0), 2..30),
    ) {
        let course = plan_course(&track_from(&steps), &PlanConfig::default()).unwrap();
        let table = course.table();
        let total = table.total_distance();

        prop_assert_eq!(table.markers().len(), (total + 1e-9).floor() as usize + 1);
        prop_assert!(table.markers().iter().enumerate().all(|(km, m)| m.number as usize == km));
        prop_assert!(table.samples()[0].is_marker);
    }
}
