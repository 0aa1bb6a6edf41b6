//! Bump-primitive airfoil geometry.
//!
//! A shape is the convex hull of a set of circles on the chord line. The
//! pipeline from circles to observation is:
//!
//! ```text
//! circles ──► 100 points each ──► convex hull ──► normalize ──► split
//!                                                                 │
//!             [2, 2N] observation ◄── resample each surface to N ◄┘
//! ```
//!
//! Normalization moves the leftmost hull point to the origin and divides
//! both coordinates by the resulting chord. Surfaces are resampled at
//! stations clustered toward the leading edge.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Points sampled per circle before taking the hull.
pub const POINTS_PER_CIRCLE: usize = 100;

/// Resampled points per surface.
pub const SURFACE_POINTS: usize = 100;

/// Fraction of surface stations placed geometrically in the nose region.
const FRONT_FRACTION: f64 = 0.3;
const FRONT_START: f64 = 1e-4;
const FRONT_END: f64 = 0.1;

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Circle primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// `n` points evenly spaced in angle, starting at angle 0.
    pub fn points(&self, n: usize) -> impl Iterator<Item = Point> + '_ {
        let step = std::f64::consts::TAU / n as f64;
        (0..n).map(move |i| {
            let theta = step * i as f64;
            Point::new(
                self.center.x + theta.cos() * self.radius,
                self.center.y + theta.sin() * self.radius,
            )
        })
    }
}

/// Nose circle and trailing-edge circle every episode starts from.
pub const BASE_CIRCLES: [Circle; 2] = [
    Circle::new(Point::new(0.0, 0.0), 0.05),
    Circle::new(Point::new(1.0, 0.0), 0.001),
];

/// The growing set of circles that defines the current shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BumpGeometry {
    circles: Vec<Circle>,
    points_per_circle: usize,
    surface_points: usize,
}

impl Default for BumpGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl BumpGeometry {
    /// Geometry holding only the base circles.
    pub fn new() -> Self {
        Self {
            circles: BASE_CIRCLES.to_vec(),
            points_per_circle: POINTS_PER_CIRCLE,
            surface_points: SURFACE_POINTS,
        }
    }

    pub fn with_points_per_circle(mut self, n: usize) -> Self {
        self.points_per_circle = n;
        self
    }

    pub fn with_surface_points(mut self, n: usize) -> Self {
        self.surface_points = n;
        self
    }

    /// Drop every bump and return to the base circles.
    pub fn reset(&mut self) {
        self.circles.clear();
        self.circles.extend_from_slice(&BASE_CIRCLES);
    }

    /// Append a circle of radius `radius` centered at `(x, 0)`.
    pub fn add_bump(&mut self, x: f64, radius: f64) -> Result<(), GeometryError> {
        if !x.is_finite() || !radius.is_finite() || radius < 0.0 {
            return Err(GeometryError::InvalidBump { x, radius });
        }
        self.circles.push(Circle::new(Point::new(x, 0.0), radius));
        Ok(())
    }

    pub fn circles(&self) -> &[Circle] {
        &self.circles
    }

    /// Number of bumps added since the last reset.
    pub fn bumps(&self) -> usize {
        self.circles.len() - BASE_CIRCLES.len()
    }

    pub fn surface_points(&self) -> usize {
        self.surface_points
    }

    /// Run the full pipeline and return the resampled airfoil.
    pub fn airfoil(&self) -> Result<Airfoil, GeometryError> {
        if self.points_per_circle < 3 {
            return Err(GeometryError::TooFewPoints {
                what: "circle",
                count: self.points_per_circle,
            });
        }
        let points: Vec<Point> = self
            .circles
            .iter()
            .flat_map(|c| c.points(self.points_per_circle))
            .collect();

        let hull = normalize(convex_hull(&points))?;
        let (upper, lower) = split_surfaces(&hull);
        let stations = surface_stations(self.surface_points);

        let upper_y = interpolate(&upper, &stations, "upper")?;
        let lower_y = interpolate(&lower, &stations, "lower")?;

        let mut x = Vec::with_capacity(2 * stations.len());
        let mut y = Vec::with_capacity(2 * stations.len());
        // Upper surface runs trailing edge -> leading edge.
        x.extend(stations.iter().rev());
        y.extend(upper_y.iter().rev());
        x.extend(stations.iter());
        y.extend(lower_y.iter());

        Ok(Airfoil { x, y })
    }
}

/// Resampled airfoil coordinates in Selig order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airfoil {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl Airfoil {
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.x.iter().zip(&self.y).map(|(&x, &y)| Point::new(x, y))
    }

    /// Observation shape: `[2, len]`.
    pub fn observation_shape(&self) -> [usize; 2] {
        [2, self.len()]
    }

    /// Row-major `[2, len]` observation: all x, then all y.
    pub fn observation(&self) -> Vec<f32> {
        self.x
            .iter()
            .chain(&self.y)
            .map(|&v| v as f32)
            .collect()
    }
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull by Andrew's monotone chain.
///
/// Returns the hull vertices counter-clockwise, starting from the lowest-x
/// (then lowest-y) point, without repeating the first vertex. Collinear
/// points are dropped.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut sorted: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(2 * sorted.len());
    for &p in &sorted {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in sorted.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Shift the leftmost point to the origin and scale by the chord.
pub fn normalize(mut hull: Vec<Point>) -> Result<Vec<Point>, GeometryError> {
    let leading = hull
        .iter()
        .copied()
        .min_by(|a, b| a.x.total_cmp(&b.x))
        .ok_or(GeometryError::TooFewPoints {
            what: "hull",
            count: 0,
        })?;
    let trailing_x = hull.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let chord = trailing_x - leading.x;
    if !(chord > f64::EPSILON) {
        return Err(GeometryError::DegenerateChord { chord });
    }

    for p in &mut hull {
        p.x = (p.x - leading.x) / chord;
        p.y = (p.y - leading.y) / chord;
    }
    Ok(hull)
}

/// Split a normalized hull into upper (`y >= 0`) and lower (`y <= 0`)
/// surfaces, each sorted by x. Points on the chord line belong to both.
pub fn split_surfaces(hull: &[Point]) -> (Vec<Point>, Vec<Point>) {
    let mut sorted = hull.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x));
    let upper = sorted.iter().copied().filter(|p| p.y >= 0.0).collect();
    let lower = sorted.iter().copied().filter(|p| p.y <= 0.0).collect();
    (upper, lower)
}

/// Chordwise stations for `n` points: 30% geometric on `[1e-4, 0.1)`, the
/// rest linear on `[0.1, 1]`.
pub fn surface_stations(n: usize) -> Vec<f64> {
    let n_front = (FRONT_FRACTION * n as f64) as usize;
    let n_back = n - n_front;

    let ratio = (FRONT_END / FRONT_START).ln();
    let front = (0..n_front).map(move |i| FRONT_START * (ratio * i as f64 / n_front as f64).exp());
    let back = (0..n_back).map(move |i| match n_back {
        1 => FRONT_END,
        _ => FRONT_END + (1.0 - FRONT_END) * i as f64 / (n_back - 1) as f64,
    });
    front.chain(back).collect()
}

/// Piecewise-linear interpolation of `surface` at ascending `stations`.
///
/// Stations outside the surface's x range extrapolate along the first or
/// last segment. Vertical segments contribute their left endpoint.
pub fn interpolate(
    surface: &[Point],
    stations: &[f64],
    name: &'static str,
) -> Result<Vec<f64>, GeometryError> {
    if surface.len() < 2 {
        return Err(GeometryError::TooFewPoints {
            what: name,
            count: surface.len(),
        });
    }

    let last_segment = surface.len() - 2;
    let mut segment = 0;
    let values = stations
        .iter()
        .map(|&x| {
            while segment < last_segment && x > surface[segment + 1].x {
                segment += 1;
            }
            let (a, b) = (surface[segment], surface[segment + 1]);
            let dx = b.x - a.x;
            if dx.abs() < f64::EPSILON {
                a.y
            } else {
                a.y + (b.y - a.y) * (x - a.x) / dx
            }
        })
        .collect();
    Ok(values)
}
