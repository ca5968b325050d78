//! The compact parenthesized record format.
//!
//! ```text
//! (character (width W) (height H) (strokes ((x y) (x y) ...) ...))
//! ```
//!
//! One parenthesized point list per stroke; only positions are carried.
//! This is a write-only export format; the XML record is the one that
//! round-trips.

use crate::model::{Point, Stroke, Writing};

impl Point {
    /// Serialize to the `(x y)` coordinate form.
    pub fn to_sexp(&self) -> String {
        format!("({} {})", self.x, self.y)
    }
}

impl Stroke {
    /// Serialize to a parenthesized point list.
    pub fn to_sexp(&self) -> String {
        let points: Vec<String> = self.points.iter().map(Point::to_sexp).collect();
        format!("({})", points.join(" "))
    }
}

impl Writing {
    /// Serialize to the complete parenthesized record.
    pub fn to_sexp(&self) -> String {
        let strokes: Vec<String> = self.strokes().iter().map(Stroke::to_sexp).collect();
        format!(
            "(character (width {}) (height {}) (strokes {}))",
            self.width(),
            self.height(),
            strokes.join(" ")
        )
    }
}
