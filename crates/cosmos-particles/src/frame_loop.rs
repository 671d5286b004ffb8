//! Variable-rate frame loop that drives a per-frame callback until it asks to
//! stop or the loop is cancelled.
//!
//! Each frame hands the callback the clamped time since the previous frame
//! and the total elapsed time. Once stopped, the loop never invokes the
//! callback again.

use std::time::Instant;

/// Longest frame time passed to the callback, in seconds. Longer gaps (a
/// backgrounded tab, a debugger pause) are clamped so motion does not jump.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Whether the loop should keep scheduling frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Schedule another frame.
    Continue,
    /// Stop; the callback will not be called again.
    Stopped,
}

/// Frame scheduler state.
#[derive(Debug)]
pub struct FrameLoop {
    previous_time: Option<Instant>,
    elapsed: f64,
    frame_count: u64,
    cancelled: bool,
}

impl FrameLoop {
    /// A loop that has run no frames.
    pub fn new() -> Self {
        Self {
            previous_time: None,
            elapsed: 0.0,
            frame_count: 0,
            cancelled: false,
        }
    }

    /// Run one frame timed against the wall clock. The first frame reports a
    /// zero frame time.
    pub fn tick(&mut self, frame_fn: impl FnMut(f64, f64) -> FrameStatus) -> FrameStatus {
        let now = Instant::now();
        let frame_time = self
            .previous_time
            .map_or(0.0, |previous| now.duration_since(previous).as_secs_f64());
        self.previous_time = Some(now);
        self.advance(frame_time, frame_fn)
    }

    /// Run one frame with an explicit frame time in seconds.
    ///
    /// `frame_fn(dt, elapsed)` is called exactly once unless the loop has
    /// already stopped.
    pub fn advance(
        &mut self,
        frame_time: f64,
        mut frame_fn: impl FnMut(f64, f64) -> FrameStatus,
    ) -> FrameStatus {
        if self.cancelled {
            return FrameStatus::Stopped;
        }

        let mut dt = if frame_time.is_finite() { frame_time.max(0.0) } else { 0.0 };
        if dt > MAX_FRAME_TIME {
            log::warn!(
                "Frame time {:.1}ms exceeds maximum, clamping to {:.1}ms",
                dt * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
            dt = MAX_FRAME_TIME;
        }

        self.elapsed += dt;
        self.frame_count += 1;

        let status = frame_fn(dt, self.elapsed);
        if status == FrameStatus::Stopped {
            self.cancel();
        }
        status
    }

    /// Stop scheduling frames.
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::debug!("Frame loop cancelled after {} frames", self.frame_count);
        }
        self.cancelled = true;
    }

    /// Whether the loop has stopped for good.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Total clamped time in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}
