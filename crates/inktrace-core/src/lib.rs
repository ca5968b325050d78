//! InkTrace Core Library
//!
//! Platform-agnostic handwriting model: pen strokes captured from a pointing
//! device, normalized into a fixed logical coordinate space, smoothed,
//! serialized for transport, and replayed as a timed animation.

pub mod capture;
pub mod format;
pub mod model;
pub mod replay;

pub use capture::{CaptureController, CoordinateMap, RecordingSink, StrokeSink, TracingSink};
pub use format::FormatError;
pub use model::{Character, Point, Stroke, Writing};
pub use replay::{
    DrawCommand, ReplayEngine, ReplayLock, ReplayMode, ReplayState, ReplayTick, ReplayToken,
};
