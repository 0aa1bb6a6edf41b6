//! Geometry pipeline tests: hull closure, normalization, resampling and the
//! observation layout.

use crate::geometry::*;
use proptest::prelude::*;

const N: usize = SURFACE_POINTS;

fn base() -> Airfoil {
    BumpGeometry::new().airfoil().unwrap()
}

fn upper_y(airfoil: &Airfoil) -> Vec<f64> {
    // Stored trailing -> leading; flip to station order.
    airfoil.y()[..N].iter().rev().copied().collect()
}

fn lower_y(airfoil: &Airfoil) -> Vec<f64> {
    airfoil.y()[N..].to_vec()
}

fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

// ============================================================================
// Observation layout
// ============================================================================

#[test]
fn should_emit_two_by_two_hundred_observation() {
    let airfoil = base();
    assert_eq!(airfoil.len(), 200);
    assert_eq!(airfoil.observation_shape(), [2, 200]);

    let obs = airfoil.observation();
    assert_eq!(obs.len(), 400);
    assert_eq!(obs[0], airfoil.x()[0] as f32);
    assert_eq!(obs[200], airfoil.y()[0] as f32);
}

#[test]
fn should_order_upper_trailing_to_leading_then_lower_leading_to_trailing() {
    let airfoil = base();
    let x = airfoil.x();

    assert!((x[0] - 1.0).abs() < 1e-12, "upper surface starts at trailing edge");
    assert!((x[N - 1] - 1e-4).abs() < 1e-12, "upper surface ends at leading edge");
    assert!((x[N] - 1e-4).abs() < 1e-12, "lower surface starts at leading edge");
    assert!((x[2 * N - 1] - 1.0).abs() < 1e-12, "lower surface ends at trailing edge");

    assert!(x[..N].windows(2).all(|w| w[0] > w[1]));
    assert!(x[N..].windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn should_keep_upper_surface_above_lower() {
    let airfoil = base();
    for (u, l) in upper_y(&airfoil).iter().zip(lower_y(&airfoil)) {
        assert!(*u >= l - 1e-6, "upper {} below lower {}", u, l);
    }
}

// ============================================================================
// Normalization and bumps
// ============================================================================

#[test]
fn should_scale_nose_radius_by_chord() {
    // Chord runs from the nose circle's leftmost point to the trailing circle's
    // rightmost point: 0.05 + 1.001.
    let chord = 1.051;
    let thickness = max(&upper_y(&base()));
    assert!((thickness - 0.05 / chord).abs() < 1e-3, "got {}", thickness);
}

#[test]
fn should_thicken_airfoil_when_bump_added() {
    let mut geometry = BumpGeometry::new();
    geometry.add_bump(0.4, 0.1).unwrap();
    let airfoil = geometry.airfoil().unwrap();

    let thickness = max(&upper_y(&airfoil));
    assert!((thickness - 0.1 / 1.051).abs() < 1e-3, "got {}", thickness);
    assert!((max(&lower_y(&airfoil).iter().map(|y| -y).collect::<Vec<_>>()) - 0.1 / 1.051).abs() < 1e-3);
}

#[test]
fn should_ignore_zero_radius_bump_inside_hull() {
    let mut geometry = BumpGeometry::new();
    geometry.add_bump(0.5, 0.0).unwrap();
    assert_eq!(geometry.bumps(), 1);
    assert_eq!(geometry.airfoil().unwrap(), base());
}

#[test]
fn should_restore_base_circles_on_reset() {
    let mut geometry = BumpGeometry::new();
    geometry.add_bump(0.2, 0.15).unwrap();
    geometry.add_bump(0.6, 0.05).unwrap();
    geometry.reset();

    assert_eq!(geometry.circles(), &BASE_CIRCLES);
    assert_eq!(geometry.bumps(), 0);
    assert_eq!(geometry.airfoil().unwrap(), base());
}

#[test]
fn should_honor_custom_surface_resolution() {
    let airfoil = BumpGeometry::new().with_surface_points(40).airfoil().unwrap();
    assert_eq!(airfoil.observation_shape(), [2, 80]);
}

#[test]
fn should_reject_too_coarse_circles() {
    let err = BumpGeometry::new().with_points_per_circle(2).airfoil().unwrap_err();
    assert!(matches!(err, crate::GeometryError::TooFewPoints { what: "circle", .. }));
}

// ============================================================================
// Hull invariants
// ============================================================================

fn assert_encloses(hull: &[Point], points: &[Point]) {
    for i in 0..hull.len() {
        let a = hull[i];
        let b = hull[(i + 1) % hull.len()];
        for p in points {
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            assert!(cross >= -1e-12, "point {:?} outside edge {:?} -> {:?}", p, a, b);
        }
    }
}

#[test]
fn should_build_closed_counter_clockwise_hull() {
    let points: Vec<Point> = BASE_CIRCLES
        .iter()
        .flat_map(|c| c.points(POINTS_PER_CIRCLE))
        .collect();
    let hull = convex_hull(&points);

    assert!(hull.len() >= 3);
    assert_ne!(hull.first(), hull.last(), "closing vertex is not repeated");
    assert_encloses(&hull, &points);
}

proptest! {
    #[test]
    fn prop_hull_encloses_all_points(
        coords in prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), 3..40)
    ) {
        let points: Vec<Point> = coords.into_iter().map(|(x, y)| Point::new(x, y)).collect();
        let hull = convex_hull(&points);
        if hull.len() >= 3 {
            assert_encloses(&hull, &points);
        }
    }

    #[test]
    fn prop_any_bump_sequence_yields_valid_observation(
        bumps in prop::collection::vec((0.0f64..0.8, 0.0f64..0.2), 1..5)
    ) {
        let mut geometry = BumpGeometry::new();
        for (x, r) in bumps {
            geometry.add_bump(x, r).unwrap();
        }
        let airfoil = geometry.airfoil().unwrap();

        prop_assert_eq!(airfoil.observation_shape(), [2, 200]);
        prop_assert!(airfoil.observation().iter().all(|v| v.is_finite()));
        prop_assert!(airfoil.x().iter().all(|&x| (1e-4 - 1e-12..=1.0 + 1e-12).contains(&x)));
        for (u, l) in upper_y(&airfoil).iter().zip(lower_y(&airfoil)) {
            prop_assert!(*u >= l - 1e-6);
        }
    }
}
