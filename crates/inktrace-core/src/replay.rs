//! Timed replay of a recorded writing.
//!
//! The engine is a pull generator: the host asks for the next tick, waits
//! the tick's delay on its own timer, applies the draw command, then asks
//! again. This keeps the timing algorithm independent of any particular
//! timer primitive, and guarantees ticks never overlap: the next one is
//! not computed until the current one has been applied.

use crate::model::{Point, Writing};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-point delay used when a needed timestamp is absent, in milliseconds.
pub const DEFAULT_POINT_DELAY_MS: u64 = 50;

/// Exclusivity lock over the drawing surface while a replay runs.
///
/// Shared between the engine and the capture side: mutating operations
/// check it and silently refuse while it is held. Cloning produces another
/// handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct ReplayLock(Arc<AtomicBool>);

impl ReplayLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a replay currently holds the surface.
    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn release(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// How inter-tick delays are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Use the recorded timestamps; inter-stroke pauses are preserved
    /// faithfully. Falls back to [`DEFAULT_POINT_DELAY_MS`] where a
    /// record carries no timestamps.
    Timestamps,
    /// A constant delay per point, in milliseconds.
    FixedDelay(u64),
}

/// Replay session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayState {
    Idle,
    Running,
    Done,
}

/// One drawing instruction, in logical canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    /// Pen-up move to the first point of a stroke. Nothing is drawn.
    MoveTo { to: Point },
    /// Draw a line segment between two consecutive points.
    LineTo { from: Point, to: Point },
}

/// One scheduled step of a replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayTick {
    /// Milliseconds to wait before applying `command`.
    pub delay_ms: u64,
    pub command: DrawCommand,
    /// Set when a stroke other than the last just completed: the number
    /// of strokes now fully drawn. The surface should redraw them from
    /// the model, discarding partial line-join artifacts.
    pub redraw_strokes: Option<usize>,
}

/// Ticket identifying one replay run.
///
/// Scheduled timer callbacks hold the token they were scheduled under; a
/// token from before a cancellation no longer matches and its late tick
/// becomes a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayToken(u64);

/// Replays a writing as a timed sequence of draw commands.
///
/// States: Idle -> Running -> Done, with `cancel` returning to Idle from
/// anywhere. While Running the engine holds the [`ReplayLock`].
pub struct ReplayEngine {
    writing: Writing,
    mode: ReplayMode,
    lock: ReplayLock,
    state: ReplayState,
    generation: u64,
    /// (stroke, point) cursor of the next tick to emit.
    cursor: (usize, usize),
}

impl ReplayEngine {
    pub fn new(writing: Writing, mode: ReplayMode, lock: ReplayLock) -> Self {
        Self {
            writing,
            mode,
            lock,
            state: ReplayState::Idle,
            generation: 0,
            cursor: (0, 0),
        }
    }

    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn writing(&self) -> &Writing {
        &self.writing
    }

    /// Begin a replay from the start of the writing.
    ///
    /// Returns the token for this run, or `None` when there is nothing to
    /// draw, a run is already in progress, or the surface lock is held
    /// elsewhere.
    pub fn start(&mut self) -> Option<ReplayToken> {
        if self.state == ReplayState::Running {
            return None;
        }

        let first = self.first_stroke_with_points()?;

        if !self.lock.try_acquire() {
            log::debug!("replay start refused: surface already locked");
            return None;
        }

        self.cursor = (first, 0);
        self.generation += 1;
        self.state = ReplayState::Running;
        log::debug!(
            "replay started: {} strokes, {} points",
            self.writing.stroke_count(),
            self.writing.point_count()
        );
        Some(ReplayToken(self.generation))
    }

    /// Stop a run and return to Idle, releasing the lock.
    ///
    /// Any timer callback still scheduled under the old token becomes a
    /// no-op.
    pub fn cancel(&mut self) {
        if self.state == ReplayState::Running {
            self.lock.release();
            log::debug!("replay cancelled at stroke {}", self.cursor.0);
        }
        self.state = ReplayState::Idle;
        self.generation += 1;
        self.cursor = (0, 0);
    }

    /// Produce the next tick of the run identified by `token`.
    ///
    /// Returns `None` once the run has finished, been cancelled, or when
    /// `token` belongs to an earlier run (the stale-timer guard).
    pub fn tick(&mut self, token: ReplayToken) -> Option<ReplayTick> {
        if self.state != ReplayState::Running || token.0 != self.generation {
            return None;
        }

        let (stroke_idx, point_idx) = self.cursor;
        let (command, stroke_len) = {
            let points = &self.writing.strokes()[stroke_idx].points;
            let command = if point_idx == 0 {
                DrawCommand::MoveTo {
                    to: points[point_idx],
                }
            } else {
                DrawCommand::LineTo {
                    from: points[point_idx - 1],
                    to: points[point_idx],
                }
            };
            (command, points.len())
        };

        let delay_ms = self.delay_for(stroke_idx, point_idx);

        // Advance the cursor, skipping any empty strokes.
        let mut redraw_strokes = None;
        if point_idx + 1 < stroke_len {
            self.cursor = (stroke_idx, point_idx + 1);
        } else {
            match self.next_stroke_with_points(stroke_idx + 1) {
                Some(next) => {
                    self.cursor = (next, 0);
                    redraw_strokes = Some(next);
                }
                None => {
                    self.state = ReplayState::Done;
                    self.lock.release();
                    log::debug!("replay done");
                }
            }
        }

        Some(ReplayTick {
            delay_ms,
            command,
            redraw_strokes,
        })
    }

    /// Delay before drawing point `(stroke_idx, point_idx)`.
    fn delay_for(&self, stroke_idx: usize, point_idx: usize) -> u64 {
        let fallback = match self.mode {
            ReplayMode::FixedDelay(ms) => return ms,
            ReplayMode::Timestamps => DEFAULT_POINT_DELAY_MS,
        };

        let strokes = self.writing.strokes();
        let current = strokes[stroke_idx].points[point_idx].timestamp;

        let previous = if point_idx > 0 {
            strokes[stroke_idx].points[point_idx - 1].timestamp
        } else if stroke_idx == self.first_stroke_with_points().unwrap_or(0) {
            // Very first point of the replay.
            return 0;
        } else {
            // First point of a later stroke: the pause since the previous
            // stroke's last point.
            strokes[..stroke_idx]
                .iter()
                .rev()
                .find_map(|s| s.points.last())
                .and_then(|p| p.timestamp)
        };

        match (previous, current) {
            (Some(prev), Some(cur)) => cur.saturating_sub(prev),
            _ => fallback,
        }
    }

    fn first_stroke_with_points(&self) -> Option<usize> {
        self.next_stroke_with_points(0)
    }

    fn next_stroke_with_points(&self, from: usize) -> Option<usize> {
        self.writing.strokes()[from.min(self.writing.stroke_count())..]
            .iter()
            .position(|s| !s.is_empty())
            .map(|offset| from + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two strokes of three points each, timestamps 0/100/250 and
    /// 400/450/500.
    fn sample_writing() -> Writing {
        let mut writing = Writing::new();
        writing.move_to_point(Point::with_timestamp(0, 0, 0));
        writing.line_to_point(Point::with_timestamp(10, 0, 100));
        writing.line_to_point(Point::with_timestamp(20, 0, 250));
        writing.move_to_point(Point::with_timestamp(100, 100, 400));
        writing.line_to_point(Point::with_timestamp(110, 100, 450));
        writing.line_to_point(Point::with_timestamp(120, 100, 500));
        writing
    }

    fn run_to_completion(engine: &mut ReplayEngine, token: ReplayToken) -> Vec<ReplayTick> {
        let mut ticks = Vec::new();
        while let Some(tick) = engine.tick(token) {
            ticks.push(tick);
        }
        ticks
    }

    #[test]
    fn test_timestamp_driven_delays() {
        let lock = ReplayLock::new();
        let mut engine = ReplayEngine::new(sample_writing(), ReplayMode::Timestamps, lock.clone());

        let token = engine.start().unwrap();
        assert_eq!(engine.state(), ReplayState::Running);
        assert!(lock.is_locked());

        let ticks = run_to_completion(&mut engine, token);
        assert_eq!(ticks.len(), 6);

        let delays: Vec<u64> = ticks.iter().map(|t| t.delay_ms).collect();
        assert_eq!(delays, vec![0, 100, 150, 150, 50, 50]);

        assert_eq!(engine.state(), ReplayState::Done);
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_commands_and_redraw_points() {
        let mut engine = ReplayEngine::new(
            sample_writing(),
            ReplayMode::Timestamps,
            ReplayLock::new(),
        );
        let token = engine.start().unwrap();
        let ticks = run_to_completion(&mut engine, token);

        // Stroke starts are pen-up moves, everything else draws.
        assert!(matches!(ticks[0].command, DrawCommand::MoveTo { .. }));
        assert!(matches!(ticks[1].command, DrawCommand::LineTo { .. }));
        assert!(matches!(ticks[3].command, DrawCommand::MoveTo { .. }));

        if let DrawCommand::LineTo { from, to } = ticks[2].command {
            assert_eq!((from.x, to.x), (10, 20));
        } else {
            panic!("expected LineTo");
        }

        // Completing the first stroke requests a redraw of it; the final
        // tick does not (the engine is Done instead).
        let redraws: Vec<Option<usize>> = ticks.iter().map(|t| t.redraw_strokes).collect();
        assert_eq!(redraws, vec![None, None, Some(1), None, None, None]);
    }

    #[test]
    fn test_fixed_delay_mode() {
        let mut engine = ReplayEngine::new(
            sample_writing(),
            ReplayMode::FixedDelay(20),
            ReplayLock::new(),
        );
        let token = engine.start().unwrap();
        let ticks = run_to_completion(&mut engine, token);

        assert_eq!(ticks.len(), 6);
        assert!(ticks.iter().all(|t| t.delay_ms == 20));
    }

    #[test]
    fn test_missing_timestamps_fall_back() {
        let mut writing = Writing::new();
        writing.move_to_point(Point::new(0, 0));
        writing.line_to_point(Point::new(10, 10));

        let mut engine = ReplayEngine::new(writing, ReplayMode::Timestamps, ReplayLock::new());
        let token = engine.start().unwrap();
        let ticks = run_to_completion(&mut engine, token);

        assert_eq!(ticks[0].delay_ms, 0);
        assert_eq!(ticks[1].delay_ms, DEFAULT_POINT_DELAY_MS);
    }

    #[test]
    fn test_empty_writing_does_not_start() {
        let lock = ReplayLock::new();
        let mut engine = ReplayEngine::new(Writing::new(), ReplayMode::Timestamps, lock.clone());
        assert!(engine.start().is_none());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_cancel_releases_lock_and_stales_old_token() {
        let lock = ReplayLock::new();
        let mut engine = ReplayEngine::new(sample_writing(), ReplayMode::Timestamps, lock.clone());

        let token = engine.start().unwrap();
        engine.tick(token).unwrap();
        engine.tick(token).unwrap();

        engine.cancel();
        assert_eq!(engine.state(), ReplayState::Idle);
        assert!(!lock.is_locked());

        // A timer that fires after cancellation does nothing.
        assert!(engine.tick(token).is_none());

        // A fresh run starts over with a new token.
        let token2 = engine.start().unwrap();
        assert_ne!(token, token2);
        assert!(engine.tick(token).is_none());
        let first = engine.tick(token2).unwrap();
        assert_eq!(first.delay_ms, 0);
    }

    #[test]
    fn test_tick_after_done_is_none() {
        let mut engine = ReplayEngine::new(
            sample_writing(),
            ReplayMode::Timestamps,
            ReplayLock::new(),
        );
        let token = engine.start().unwrap();
        let ticks = run_to_completion(&mut engine, token);
        assert_eq!(ticks.len(), 6);
        assert!(engine.tick(token).is_none());
    }

    #[test]
    fn test_start_refused_while_lock_held_elsewhere() {
        let lock = ReplayLock::new();
        assert!(lock.try_acquire());

        let mut engine = ReplayEngine::new(sample_writing(), ReplayMode::Timestamps, lock.clone());
        assert!(engine.start().is_none());
        assert_eq!(engine.state(), ReplayState::Idle);

        lock.release();
        assert!(engine.start().is_some());
    }

    #[test]
    fn test_restart_after_done() {
        let mut engine = ReplayEngine::new(
            sample_writing(),
            ReplayMode::Timestamps,
            ReplayLock::new(),
        );
        let token = engine.start().unwrap();
        run_to_completion(&mut engine, token);
        assert_eq!(engine.state(), ReplayState::Done);

        // Restartable from the start only.
        let token2 = engine.start().unwrap();
        let ticks = run_to_completion(&mut engine, token2);
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0].delay_ms, 0);
    }
}
