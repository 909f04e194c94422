//! Piecewise-cubic interpolation of scattered (x, y, z) samples
//!
//! Samples are triangulated, a gradient is estimated at every vertex by a
//! local least-squares fit, and each triangle carries a cubic Bezier patch
//! matching the vertex values and gradients. Queries outside the convex
//! hull of the samples evaluate to NaN.

use nalgebra::{DMatrix, DVector, Point2, Vector2};
use thiserror::Error;

use super::delaunay::{orient, triangulate, Triangulation};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum InterpolationError {
    #[error("at least 3 distinct points are required, got {0}")]
    TooFewPoints(usize),

    #[error("points are collinear; no surface can be fitted")]
    Degenerate,
}

/// Barycentric coordinates below this count as inside
const INSIDE_TOLERANCE: f64 = 1e-9;

pub struct CubicInterpolator {
    triangulation: Triangulation,
    values: Vec<f64>,
    gradients: Vec<Vector2<f64>>,
    /// Counter-clockwise convex hull, in normalised coordinates
    hull: Vec<Point2<f64>>,
    offset: Vector2<f64>,
    scale: Vector2<f64>,
}

impl CubicInterpolator {
    /// Build from distinct (x, y, z) samples. Each axis is rescaled to the
    /// unit interval before triangulation.
    pub fn new(samples: &[(f64, f64, f64)]) -> Result<Self, InterpolationError> {
        if samples.len() < 3 {
            return Err(InterpolationError::TooFewPoints(samples.len()));
        }

        let (min_x, max_x) = bounds(samples.iter().map(|s| s.0));
        let (min_y, max_y) = bounds(samples.iter().map(|s| s.1));
        if max_x - min_x <= 0.0 || max_y - min_y <= 0.0 {
            return Err(InterpolationError::Degenerate);
        }
        let offset = Vector2::new(min_x, min_y);
        let scale = Vector2::new(1.0 / (max_x - min_x), 1.0 / (max_y - min_y));

        let points: Vec<Point2<f64>> = samples
            .iter()
            .map(|&(x, y, _)| Point2::new((x - offset.x) * scale.x, (y - offset.y) * scale.y))
            .collect();
        let values: Vec<f64> = samples.iter().map(|s| s.2).collect();

        let triangulation = triangulate(&points);
        if triangulation.triangles.is_empty() {
            return Err(InterpolationError::Degenerate);
        }

        let gradients = estimate_gradients(&triangulation, &values);
        let hull = convex_hull(&points);

        Ok(Self {
            triangulation,
            values,
            gradients,
            hull,
            offset,
            scale,
        })
    }

    /// Interpolated value at (x, y), NaN outside the convex hull
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let p = Point2::new((x - self.offset.x) * self.scale.x, (y - self.offset.y) * self.scale.y);
        if !self.hull_contains(&p) {
            return f64::NAN;
        }

        // Containing triangle, or the closest one for points on the hull
        // boundary that the triangulation left uncovered
        let mut best: Option<(usize, [f64; 3], f64)> = None;
        for (idx, t) in self.triangulation.triangles.iter().enumerate() {
            let bary = self.barycentric(t, &p);
            let worst = bary[0].min(bary[1]).min(bary[2]);
            if worst >= -INSIDE_TOLERANCE {
                return self.patch(t, bary);
            }
            if best.map_or(true, |(_, _, w)| worst > w) {
                best = Some((idx, bary, worst));
            }
        }
        match best {
            Some((idx, bary, _)) => self.patch(&self.triangulation.triangles[idx], bary),
            None => f64::NAN,
        }
    }

    /// Values on the grid spanned by `xs` and `ys`; `result[j][i]` is at (`xs[i]`, `ys[j]`)
    pub fn grid(&self, xs: &[f64], ys: &[f64]) -> Vec<Vec<f64>> {
        ys.iter()
            .map(|&y| xs.iter().map(|&x| self.evaluate(x, y)).collect())
            .collect()
    }

    fn hull_contains(&self, p: &Point2<f64>) -> bool {
        let n = self.hull.len();
        (0..n).all(|i| orient(&self.hull[i], &self.hull[(i + 1) % n], p) >= -INSIDE_TOLERANCE)
    }

    fn barycentric(&self, t: &[usize; 3], p: &Point2<f64>) -> [f64; 3] {
        let pts = &self.triangulation.points;
        let (a, b, c) = (&pts[t[0]], &pts[t[1]], &pts[t[2]]);
        let area = orient(a, b, c);
        [orient(p, b, c) / area, orient(a, p, c) / area, orient(a, b, p) / area]
    }

    /// Cubic Bezier patch over triangle `t` at barycentric `[u, v, w]`
    fn patch(&self, t: &[usize; 3], [u, v, w]: [f64; 3]) -> f64 {
        let pts = &self.triangulation.points;
        let p = [pts[t[0]], pts[t[1]], pts[t[2]]];
        let z = [self.values[t[0]], self.values[t[1]], self.values[t[2]]];
        let g = [self.gradients[t[0]], self.gradients[t[1]], self.gradients[t[2]]];

        // Control point one third of the way from vertex i towards vertex j
        let edge = |i: usize, j: usize| z[i] + g[i].dot(&(p[j] - p[i])) / 3.0;

        let b210 = edge(0, 1);
        let b201 = edge(0, 2);
        let b120 = edge(1, 0);
        let b021 = edge(1, 2);
        let b102 = edge(2, 0);
        let b012 = edge(2, 1);

        let e = (b210 + b201 + b120 + b021 + b102 + b012) / 6.0;
        let centre = (z[0] + z[1] + z[2]) / 3.0;
        let b111 = e + (e - centre) / 2.0;

        z[0] * u.powi(3)
            + z[1] * v.powi(3)
            + z[2] * w.powi(3)
            + 3.0 * (b210 * u * u * v + b201 * u * u * w + b120 * u * v * v)
            + 3.0 * (b021 * v * v * w + b102 * u * w * w + b012 * v * w * w)
            + 6.0 * b111 * u * v * w
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
}

/// Least-squares gradient at each vertex from its triangulation neighbours:
/// a quadratic fit where the neighbourhood supports it, otherwise a plane.
fn estimate_gradients(tri: &Triangulation, values: &[f64]) -> Vec<Vector2<f64>> {
    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); tri.points.len()];
    for t in &tri.triangles {
        for k in 0..3 {
            for m in 1..3 {
                let (a, b) = (t[k], t[(k + m) % 3]);
                if !neighbours[a].contains(&b) {
                    neighbours[a].push(b);
                }
            }
        }
    }

    neighbours
        .iter()
        .enumerate()
        .map(|(i, around)| {
            let origin = tri.points[i];
            let deltas: Vec<Vector2<f64>> = around.iter().map(|&j| tri.points[j] - origin).collect();
            let rhs = DVector::from_iterator(around.len(), around.iter().map(|&j| values[j] - values[i]));

            let quadratic = DMatrix::from_fn(around.len(), 5, |r, c| {
                let d = deltas[r];
                [d.x, d.y, d.x * d.x, d.x * d.y, d.y * d.y][c]
            });
            let linear = DMatrix::from_fn(around.len(), 2, |r, c| [deltas[r].x, deltas[r].y][c]);

            solve_gradient(quadratic, &rhs, 5)
                .or_else(|| solve_gradient(linear, &rhs, 2))
                .unwrap_or_else(Vector2::zeros)
        })
        .collect()
}

fn solve_gradient(a: DMatrix<f64>, b: &DVector<f64>, unknowns: usize) -> Option<Vector2<f64>> {
    if a.nrows() < unknowns {
        return None;
    }
    let svd = a.svd(true, true);
    if svd.rank(1e-10) < unknowns {
        return None;
    }
    let solution = svd.solve(b, 1e-12).ok()?;
    Some(Vector2::new(solution[0], solution[1]))
}

/// Andrew's monotone chain, counter-clockwise without repeated endpoints
fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));

    let mut lower: Vec<Point2<f64>> = Vec::new();
    for p in &sorted {
        while lower.len() >= 2 && orient(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }
    let mut upper: Vec<Point2<f64>> = Vec::new();
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && orient(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic scattered points in [0, 10] x [0, 5]
    fn scattered(f: impl Fn(f64, f64) -> f64) -> Vec<(f64, f64, f64)> {
        let mut samples = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 5.0), (0.0, 5.0)];
        for k in 1..40 {
            let x = (k as f64 * 7.31) % 10.0;
            let y = (k as f64 * 3.17) % 5.0;
            samples.push((x, y));
        }
        samples.into_iter().map(|(x, y)| (x, y, f(x, y))).collect()
    }

    #[test]
    fn test_reproduces_samples_exactly() {
        let samples = scattered(|x, y| (x * 0.3).sin() + y * y);
        let interp = CubicInterpolator::new(&samples).unwrap();
        for &(x, y, z) in &samples {
            assert!((interp.evaluate(x, y) - z).abs() < 1e-9);
        }
    }

    #[test]
    fn test_reproduces_planes() {
        let plane = |x: f64, y: f64| 2.0 * x - 3.0 * y + 1.0;
        let interp = CubicInterpolator::new(&scattered(plane)).unwrap();
        for &(x, y) in &[(1.3, 2.2), (7.7, 0.4), (5.0, 4.9), (9.9, 2.5)] {
            assert!((interp.evaluate(x, y) - plane(x, y)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_nan_outside_hull() {
        let samples = vec![(0.0, 0.0, 1.0), (1.0, 0.0, 2.0), (0.0, 1.0, 3.0)];
        let interp = CubicInterpolator::new(&samples).unwrap();
        assert!(interp.evaluate(1.0, 1.0).is_nan());
        assert!(interp.evaluate(-0.1, 0.5).is_nan());
        assert!((interp.evaluate(0.2, 0.2) - (1.0 + 0.2 + 0.4)).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(
            CubicInterpolator::new(&[(0.0, 0.0, 1.0), (1.0, 1.0, 1.0)]).err(),
            Some(InterpolationError::TooFewPoints(2))
        );
        let line: Vec<_> = (0..4).map(|i| (i as f64, i as f64, 0.0)).collect();
        assert_eq!(
            CubicInterpolator::new(&line).err(),
            Some(InterpolationError::Degenerate)
        );
    }
}
