//! A full drawing: the ordered strokes composing one character.

use super::{Point, Stroke};
use serde::{Deserialize, Serialize};

/// Fraction of the canvas a normalized writing occupies.
const NORMALIZE_PROPORTION: f64 = 0.7;

/// Below this fraction of the canvas an axis is left unscaled, so very
/// thin writings (like a vertical bar) are not blown up.
const NORMALIZE_MIN_SIZE: f64 = 0.1;

/// An ordered sequence of strokes plus the logical canvas size.
///
/// The canvas is a fixed logical coordinate space (1000x1000 by default),
/// never the physical pixel size of the display surface; stored records
/// are device-resolution-independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Writing {
    width: u32,
    height: u32,
    strokes: Vec<Stroke>,
}

impl Default for Writing {
    fn default() -> Self {
        Self::new()
    }
}

impl Writing {
    /// Default logical canvas width.
    pub const WIDTH: u32 = 1000;
    /// Default logical canvas height.
    pub const HEIGHT: u32 = 1000;

    /// Create a new empty writing on the default 1000x1000 canvas.
    pub fn new() -> Self {
        Self {
            width: Self::WIDTH,
            height: Self::HEIGHT,
            strokes: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    /// The strokes, in capture order.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Number of strokes.
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Total number of points across all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Start a new stroke at `point` ("pen down").
    pub fn move_to_point(&mut self, point: Point) {
        let mut stroke = Stroke::new();
        stroke.append_point(point);
        self.append_stroke(stroke);
    }

    /// Append `point` to the last stroke ("pen move").
    ///
    /// With no open stroke this is a silent no-op; the capture side
    /// guarantees a move-to precedes any line-to.
    pub fn line_to_point(&mut self, point: Point) {
        match self.strokes.last_mut() {
            Some(stroke) => stroke.append_point(point),
            None => log::trace!("line_to_point with no open stroke ignored"),
        }
    }

    /// Append a complete stroke.
    pub fn append_stroke(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Drop the last stroke, if any.
    pub fn remove_last_stroke(&mut self) {
        self.strokes.pop();
    }

    /// Reset to an empty writing. Canvas size is kept.
    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Elapsed time between the first point of the first stroke and the
    /// last point of the last stroke, in milliseconds.
    ///
    /// `None` when the writing is empty or either endpoint carries no
    /// timestamp.
    pub fn duration(&self) -> Option<u64> {
        let first = self.strokes.first()?.points.first()?.timestamp?;
        let last = self.strokes.last()?.points.last()?.timestamp?;
        Some(last.saturating_sub(first))
    }

    /// Smooth every stroke independently. See [`Stroke::smooth`].
    pub fn smooth(&mut self) {
        for stroke in &mut self.strokes {
            stroke.smooth();
        }
    }

    /// Smooth only the most recent stroke.
    ///
    /// Used by capture to clean up a just-completed stroke without
    /// touching earlier ones.
    pub fn smooth_last_stroke(&mut self) {
        if let Some(stroke) = self.strokes.last_mut() {
            stroke.smooth();
        }
    }

    /// Bounding box of all points as `(x, y, width, height)`, or `None`
    /// for a writing with no points.
    pub fn bounds(&self) -> Option<(i64, i64, i64, i64)> {
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        let mut seen = false;

        for stroke in &self.strokes {
            for point in &stroke.points {
                min_x = min_x.min(point.x);
                min_y = min_y.min(point.y);
                max_x = max_x.max(point.x);
                max_y = max_y.max(point.y);
                seen = true;
            }
        }

        if seen {
            Some((min_x, min_y, max_x - min_x, max_y - min_y))
        } else {
            None
        }
    }

    /// Scale every point in place.
    pub fn resize(&mut self, xrate: f64, yrate: f64) {
        for stroke in &mut self.strokes {
            stroke.resize(xrate, yrate);
        }
    }

    /// Translate every point in place.
    pub fn move_rel(&mut self, dx: i64, dy: i64) {
        for stroke in &mut self.strokes {
            stroke.move_rel(dx, dy);
        }
    }

    /// Scale the writing to a standard proportion of the canvas and
    /// center it.
    pub fn normalize(&mut self) {
        self.normalize_size();
        self.normalize_position();
    }

    fn normalize_size(&mut self) {
        let Some((_, _, width, height)) = self.bounds() else {
            return;
        };

        let xrate = if width as f64 / self.width as f64 > NORMALIZE_MIN_SIZE {
            self.width as f64 * NORMALIZE_PROPORTION / width as f64
        } else {
            1.0
        };

        let yrate = if height as f64 / self.height as f64 > NORMALIZE_MIN_SIZE {
            self.height as f64 * NORMALIZE_PROPORTION / height as f64
        } else {
            1.0
        };

        self.resize(xrate, yrate);
    }

    fn normalize_position(&mut self) {
        let Some((x, y, width, height)) = self.bounds() else {
            return;
        };

        let dx = (self.width as i64 - width) / 2 - x;
        let dy = (self.height as i64 - height) / 2 - y;

        self.move_rel(dx, dy);
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
