//! One continuous pen-down-to-pen-up gesture.

use super::Point;
use serde::{Deserialize, Serialize};

/// Weights of the smoothing kernel, centered on the current point.
const SMOOTHING_WEIGHTS: [i64; 5] = [1, 1, 2, 1, 1];

/// Number of times the smoothing kernel is applied.
const SMOOTHING_PASSES: usize = 3;

/// An ordered sequence of points forming one stroke.
///
/// Insertion order is temporal order. A stroke is non-empty once capture
/// of it has completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stroke {
    /// Points in the stroke.
    pub points: Vec<Point>,
    /// One-shot guard: smoothing already applied.
    #[serde(skip)]
    is_smoothed: bool,
}

impl Stroke {
    /// Create a new empty stroke.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            is_smoothed: false,
        }
    }

    /// Append a point, preserving order.
    pub fn append_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the stroke has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the smoothing pass has already run on this stroke.
    pub fn is_smoothed(&self) -> bool {
        self.is_smoothed
    }

    /// Elapsed time between the first and last point, in milliseconds.
    ///
    /// `None` when either endpoint carries no timestamp. Absence of a
    /// value, not an error: untimestamped records are valid.
    pub fn duration(&self) -> Option<u64> {
        let first = self.points.first()?.timestamp?;
        let last = self.points.last()?.timestamp?;
        Some(last.saturating_sub(first))
    }

    /// Remove input jitter with a weighted moving average.
    ///
    /// Each pass recomputes every interior point from a frozen copy of the
    /// previous pass, as
    ///
    /// ```text
    /// p'(i) = (p(i-2) + p(i-1) + 2*p(i) + p(i+1) + p(i+2)) / 6
    /// ```
    ///
    /// rounded to the nearest integer. Points within two indices of either
    /// boundary are left unmodified, so genuine endpoints and corners
    /// survive. Strokes shorter than the kernel are left untouched.
    /// Idempotent: a second call is a no-op.
    pub fn smooth(&mut self) {
        if self.is_smoothed {
            return;
        }

        let len = self.points.len();
        if len < SMOOTHING_WEIGHTS.len() {
            return;
        }

        let offset = SMOOTHING_WEIGHTS.len() / 2;
        let wsum: i64 = SMOOTHING_WEIGHTS.iter().sum();

        for _ in 0..SMOOTHING_PASSES {
            let frozen = self.points.clone();

            for i in offset..len - offset {
                let mut x = 0;
                let mut y = 0;

                for (j, weight) in SMOOTHING_WEIGHTS.iter().enumerate() {
                    let p = &frozen[i + j - offset];
                    x += weight * p.x;
                    y += weight * p.y;
                }

                self.points[i].x = (x as f64 / wsum as f64).round() as i64;
                self.points[i].y = (y as f64 / wsum as f64).round() as i64;
            }
        }

        self.is_smoothed = true;
    }

    /// Scale every point in place.
    pub fn resize(&mut self, xrate: f64, yrate: f64) {
        for point in &mut self.points {
            point.resize(xrate, yrate);
        }
    }

    /// Translate every point in place.
    pub fn move_rel(&mut self, dx: i64, dy: i64) {
        for point in &mut self.points {
            point.move_rel(dx, dy);
        }
    }
}

impl PartialEq for Stroke {
    /// Point-wise equality; the smoothing guard is transient state and is
    /// not compared.
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}
