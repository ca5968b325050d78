//! Capture-side pointer handling.
//!
//! The host surface pushes raw pointer events here; this module maps them
//! into the fixed logical coordinate space, stamps them with time elapsed
//! since the first point, and feeds them to a [`StrokeSink`]. Capture is
//! permissive by design: malformed event ordering and operations arriving
//! while a replay holds the surface are silent no-ops, reported only
//! through the `bool` return values.

use crate::model::{Point, Stroke, Writing};
use crate::replay::{DrawCommand, ReplayLock};
use kurbo::Point as SurfacePoint;

/// Maps between physical surface coordinates and the fixed logical canvas.
///
/// Records always live in the logical space, so they are independent of
/// the resolution of the surface they were drawn on.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMap {
    surface_to_logical_x: f64,
    surface_to_logical_y: f64,
    logical_to_surface_x: f64,
    logical_to_surface_y: f64,
}

impl CoordinateMap {
    /// Create a map for a surface of the given physical size.
    pub fn new(surface_width: f64, surface_height: f64) -> Self {
        let logical_to_surface_x = surface_width / Writing::WIDTH as f64;
        let logical_to_surface_y = surface_height / Writing::HEIGHT as f64;
        Self {
            surface_to_logical_x: 1.0 / logical_to_surface_x,
            surface_to_logical_y: 1.0 / logical_to_surface_y,
            logical_to_surface_x,
            logical_to_surface_y,
        }
    }

    /// Map a physical surface position into logical coordinates, rounded
    /// to the integral grid of the record.
    pub fn to_logical(&self, position: SurfacePoint) -> (i64, i64) {
        (
            (position.x * self.surface_to_logical_x).round() as i64,
            (position.y * self.surface_to_logical_y).round() as i64,
        )
    }

    /// Map logical coordinates back out to the physical surface.
    pub fn to_surface(&self, x: i64, y: i64) -> SurfacePoint {
        SurfacePoint::new(
            x as f64 * self.logical_to_surface_x,
            y as f64 * self.logical_to_surface_y,
        )
    }
}

/// Where captured pen trajectories go.
///
/// The shared contract between capture mode (record the trajectory into a
/// writing) and playback mode (trace it as draw commands without
/// recording), selected by constructing the controller with one or the
/// other.
pub trait StrokeSink {
    /// Pen down: a new stroke begins at `point`.
    fn begin_stroke(&mut self, point: Point);

    /// Pen move: the open stroke extends to `point`.
    fn extend_stroke(&mut self, point: Point);

    /// Pen up: the open stroke is complete.
    fn end_stroke(&mut self) {}
}

/// Capture mode: records the trajectory into an owned [`Writing`].
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    writing: Writing,
    smooth_on_release: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and smooth each stroke as it completes, a mitigation for
    /// jittery low-resolution pointer devices.
    pub fn with_smoothing() -> Self {
        Self {
            writing: Writing::new(),
            smooth_on_release: true,
        }
    }

    pub fn writing(&self) -> &Writing {
        &self.writing
    }

    pub fn into_writing(self) -> Writing {
        self.writing
    }
}

impl StrokeSink for RecordingSink {
    fn begin_stroke(&mut self, point: Point) {
        self.writing.move_to_point(point);
    }

    fn extend_stroke(&mut self, point: Point) {
        self.writing.line_to_point(point);
    }

    fn end_stroke(&mut self) {
        if self.smooth_on_release {
            self.writing.smooth_last_stroke();
        }
    }
}

/// Playback mode: turns the trajectory into draw commands without
/// recording anything, for tracing over a background writing.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    commands: Vec<DrawCommand>,
    last: Option<Point>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands accumulated since the last drain.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Take the accumulated commands, leaving the sink empty.
    pub fn drain_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl StrokeSink for TracingSink {
    fn begin_stroke(&mut self, point: Point) {
        self.commands.push(DrawCommand::MoveTo { to: point });
        self.last = Some(point);
    }

    fn extend_stroke(&mut self, point: Point) {
        if let Some(from) = self.last {
            self.commands.push(DrawCommand::LineTo { from, to: point });
        }
        self.last = Some(point);
    }

    fn end_stroke(&mut self) {
        self.last = None;
    }
}

/// Consumes raw pointer events from the host surface.
///
/// Establishes `t0` on the very first point, maps positions into the
/// logical space, and keeps timestamps non-decreasing even if the host
/// clock misbehaves. All mutating entry points check the replay lock and
/// return `false` without effect while it is held.
pub struct CaptureController<S: StrokeSink> {
    map: CoordinateMap,
    sink: S,
    lock: ReplayLock,
    pen_down: bool,
    /// Host clock value of the writing's first point.
    t0: Option<u64>,
    /// Highest timestamp handed out so far.
    last_timestamp: u64,
}

impl<S: StrokeSink> CaptureController<S> {
    pub fn new(map: CoordinateMap, sink: S, lock: ReplayLock) -> Self {
        Self {
            map,
            sink,
            lock,
            pen_down: false,
            t0: None,
            last_timestamp: 0,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_pen_down(&self) -> bool {
        self.pen_down
    }

    /// Pen down at a physical surface position, at host time `time_ms`.
    pub fn on_pointer_down(&mut self, position: SurfacePoint, time_ms: u64) -> bool {
        if self.lock.is_locked() {
            log::debug!("pointer down ignored: surface locked by replay");
            return false;
        }
        if self.pen_down {
            // Missed pointer-up; keep the open stroke untouched.
            return false;
        }

        self.pen_down = true;
        let point = self.sample(position, time_ms);
        self.sink.begin_stroke(point);
        true
    }

    /// Pen move at a physical surface position, at host time `time_ms`.
    ///
    /// Ignored unless a stroke is open.
    pub fn on_pointer_move(&mut self, position: SurfacePoint, time_ms: u64) -> bool {
        if self.lock.is_locked() || !self.pen_down {
            return false;
        }

        let point = self.sample(position, time_ms);
        self.sink.extend_stroke(point);
        true
    }

    /// Pen up: closes the open stroke. The next pointer-down starts a new
    /// one.
    pub fn on_pointer_up(&mut self) -> bool {
        if self.lock.is_locked() || !self.pen_down {
            return false;
        }

        self.pen_down = false;
        self.sink.end_stroke();
        true
    }

    /// Map a raw event into a logical, timestamped point.
    fn sample(&mut self, position: SurfacePoint, time_ms: u64) -> Point {
        let (x, y) = self.map.to_logical(position);
        let t0 = *self.t0.get_or_insert(time_ms);
        // Clamp so timestamps never go backwards.
        let elapsed = time_ms.saturating_sub(t0).max(self.last_timestamp);
        self.last_timestamp = elapsed;
        Point::with_timestamp(x, y, elapsed)
    }

    fn reset_clock(&mut self) {
        self.t0 = None;
        self.last_timestamp = 0;
    }
}

impl CaptureController<RecordingSink> {
    /// The writing recorded so far.
    pub fn writing(&self) -> &Writing {
        self.sink.writing()
    }

    /// Drop the recording and start over. Rejected while a replay holds
    /// the surface.
    pub fn clear(&mut self) -> bool {
        if self.lock.is_locked() {
            return false;
        }

        self.sink.writing.clear();
        self.pen_down = false;
        self.reset_clock();
        true
    }

    /// Undo the most recent stroke. Rejected while a replay holds the
    /// surface.
    pub fn revert_stroke(&mut self) -> bool {
        if self.lock.is_locked() || self.pen_down {
            return false;
        }

        self.sink.writing.remove_last_stroke();
        true
    }

    /// Append a complete stroke (for example a restored one). Rejected
    /// while a replay holds the surface.
    pub fn append_stroke(&mut self, stroke: Stroke) -> bool {
        if self.lock.is_locked() {
            return false;
        }

        self.sink.writing.append_stroke(stroke);
        true
    }

    /// Replace the recording with an existing writing (for example a
    /// deserialized record). Rejected while a replay holds the surface.
    pub fn set_writing(&mut self, writing: Writing) -> bool {
        if self.lock.is_locked() {
            return false;
        }

        self.pen_down = false;
        self.reset_clock();
        // Further capture continues the loaded record's clock.
        self.last_timestamp = writing
            .strokes()
            .last()
            .and_then(|s| s.points.last())
            .and_then(|p| p.timestamp)
            .unwrap_or(0);
        self.sink.writing = writing;
        true
    }

    /// Smooth the whole recording. Rejected while a replay holds the
    /// surface.
    pub fn smooth(&mut self) -> bool {
        if self.lock.is_locked() {
            return false;
        }

        self.sink.writing.smooth();
        true
    }
}
