//! Handwriting data model: points, strokes, writings and characters.

mod character;
mod point;
mod stroke;
mod writing;

pub use character::Character;
pub use point::Point;
pub use stroke::Stroke;
pub use writing::Writing;
