//! Bowyer-Watson Delaunay triangulation of scattered points

use nalgebra::Point2;

/// Triangles as counter-clockwise vertex indices into `points`
#[derive(Debug, Clone)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    pub triangles: Vec<[usize; 3]>,
}

/// Twice the signed area of (a, b, c); positive when counter-clockwise
pub fn orient(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `d` lies strictly inside the circumcircle of the CCW triangle (a, b, c)
fn in_circumcircle(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, d: &Point2<f64>) -> bool {
    let (adx, ady) = (a.x - d.x, a.y - d.y);
    let (bdx, bdy) = (b.x - d.x, b.y - d.y);
    let (cdx, cdy) = (c.x - d.x, c.y - d.y);
    let det = (adx * adx + ady * ady) * (bdx * cdy - cdx * bdy)
        - (bdx * bdx + bdy * bdy) * (adx * cdy - cdx * ady)
        + (cdx * cdx + cdy * cdy) * (adx * bdy - bdx * ady);
    det > 1e-12
}

/// Triangulate distinct points. Collinear or fewer than three points give
/// no triangles.
pub fn triangulate(points: &[Point2<f64>]) -> Triangulation {
    let n = points.len();
    if n < 3 {
        return Triangulation {
            points: points.to_vec(),
            triangles: Vec::new(),
        };
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(f64::EPSILON);
    let (mid_x, mid_y) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    // Enclosing triangle, removed again at the end. The uneven offsets keep
    // its corners off the lines through regularly spaced input points.
    let mut all = points.to_vec();
    all.push(Point2::new(mid_x - 97.3 * span, mid_y - 89.1 * span));
    all.push(Point2::new(mid_x + 103.7 * span, mid_y - 91.9 * span));
    all.push(Point2::new(mid_x + 1.3 * span, mid_y + 107.9 * span));

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for i in 0..n {
        let p = all[i];
        let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|t| in_circumcircle(&all[t[0]], &all[t[1]], &all[t[2]], &p));

        // Boundary of the cavity: edges belonging to exactly one bad triangle
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for t in &bad {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let shared = bad.iter().any(|other| {
                    other != t && (0..3).any(|k| other[k] == b && other[(k + 1) % 3] == a)
                });
                if !shared {
                    boundary.push((a, b));
                }
            }
        }

        triangles = good;
        for (a, b) in boundary {
            if orient(&all[a], &all[b], &p) > 0.0 {
                triangles.push([a, b, i]);
            }
        }
    }

    triangles.retain(|t| t.iter().all(|&v| v < n));
    Triangulation {
        points: points.to_vec(),
        triangles,
    }
}
