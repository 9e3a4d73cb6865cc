use log::trace;

use crate::options::{Flattening, MAX_FLATTENING_DEPTH};
use crate::transform::AffineTransform;
use crate::types::Tuple;

/// A cubic Bézier curve given by its start point, two control points and end
/// point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    pub control_points: [Tuple; 4],
}

impl CubicBezier {
    pub fn new(start: Tuple, c1: Tuple, c2: Tuple, end: Tuple) -> Self {
        CubicBezier {
            control_points: [start, c1, c2, end],
        }
    }

    pub fn start(&self) -> Tuple {
        self.control_points[0]
    }

    pub fn end(&self) -> Tuple {
        self.control_points[3]
    }

    /// de Casteljau split at `t`. The outer points of both halves are copied,
    /// never recomputed.
    pub fn split(&self, t: f64) -> (CubicBezier, CubicBezier) {
        let [p0, p1, p2, p3] = self.control_points;
        let p01 = p0.lerp(p1, t);
        let p12 = p1.lerp(p2, t);
        let p23 = p2.lerp(p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = p012.lerp(p123, t);

        (
            CubicBezier::new(p0, p01, p012, mid),
            CubicBezier::new(mid, p123, p23, p3),
        )
    }

    /// Subdivides the curve in halves from `level` down to `limit` and
    /// returns the `2^(limit - level) + 1` vertices in order. The depth is
    /// capped at `MAX_FLATTENING_DEPTH`.
    pub fn recursive_interpolate(&self, limit: u32, level: u32) -> Vec<Tuple> {
        let depth = limit.saturating_sub(level).min(MAX_FLATTENING_DEPTH);
        let mut vertices = Vec::with_capacity((1usize << depth) + 1);
        vertices.push(self.start());
        self.subdivide(depth, &mut vertices);
        vertices
    }

    fn subdivide(&self, depth: u32, vertices: &mut Vec<Tuple>) {
        if depth == 0 {
            vertices.push(self.end());
            return;
        }
        let (left, right) = self.split(0.5);
        left.subdivide(depth - 1, vertices);
        right.subdivide(depth - 1, vertices);
    }

    /// Largest distance of the inner control points from the chord.
    fn flatness(&self) -> f64 {
        let [p0, p1, p2, p3] = self.control_points;
        let dx = p3.x - p0.x;
        let dy = p3.y - p0.y;
        let chord = (dx * dx + dy * dy).sqrt();

        let distance = |p: Tuple| {
            if chord == 0.0 {
                ((p.x - p0.x).powi(2) + (p.y - p0.y).powi(2)).sqrt()
            } else {
                ((p.x - p0.x) * dy - (p.y - p0.y) * dx).abs() / chord
            }
        };

        distance(p1).max(distance(p2))
    }

    fn subdivide_adaptive(&self, tolerance: f64, depth: u32, vertices: &mut Vec<Tuple>) {
        if depth == 0 || self.flatness() <= tolerance {
            vertices.push(self.end());
            return;
        }
        let (left, right) = self.split(0.5);
        left.subdivide_adaptive(tolerance, depth - 1, vertices);
        right.subdivide_adaptive(tolerance, depth - 1, vertices);
    }

    /// Approximates the curve by a polyline. The first and last vertices are
    /// always the curve's start and end points.
    pub fn flatten(&self, flattening: Flattening) -> Vec<Tuple> {
        let vertices = match flattening {
            Flattening::Uniform { depth } => self.recursive_interpolate(depth, 0),
            Flattening::Adaptive {
                tolerance,
                max_depth,
            } => {
                let mut vertices = vec![self.start()];
                let max_depth = max_depth.min(MAX_FLATTENING_DEPTH);
                self.subdivide_adaptive(tolerance, max_depth, &mut vertices);
                vertices
            }
        };
        trace!("flattened curve into {} vertices", vertices.len());
        vertices
    }

    /// The same curve with every control point mapped through `transform`.
    pub fn map(&self, transform: &AffineTransform) -> CubicBezier {
        let [p0, p1, p2, p3] = self.control_points;
        CubicBezier::new(
            transform.apply(p0),
            transform.apply(p1),
            transform.apply(p2),
            transform.apply(p3),
        )
    }
}
