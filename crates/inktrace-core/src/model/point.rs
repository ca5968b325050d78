//! A single pen sample.

use serde::{Deserialize, Serialize};

/// One sample of pen input, in logical canvas coordinates.
///
/// Coordinates are integral: the capture side maps physical surface
/// positions into the fixed logical space and rounds. `timestamp` is
/// milliseconds since the first point of the owning
/// [`Writing`](crate::model::Writing) and, when present, is
/// non-decreasing in capture order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
    /// Pen pressure, if the device reports it.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pressure: Option<f64>,
    /// Pen tilt along the x axis, if the device reports it.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub xtilt: Option<f64>,
    /// Pen tilt along the y axis, if the device reports it.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ytilt: Option<f64>,
    /// Milliseconds since the first point of the writing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<u64>,
}

impl Point {
    /// Create a point with only a position.
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Create a point with a position and a timestamp.
    pub fn with_timestamp(x: i64, y: i64, timestamp: u64) -> Self {
        Self {
            x,
            y,
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    /// Scale the position in place.
    pub fn resize(&mut self, xrate: f64, yrate: f64) {
        self.x = (self.x as f64 * xrate).round() as i64;
        self.y = (self.y as f64 * yrate).round() as i64;
    }

    /// Translate the position in place.
    pub fn move_rel(&mut self, dx: i64, dy: i64) {
        self.x += dx;
        self.y += dy;
    }
}
