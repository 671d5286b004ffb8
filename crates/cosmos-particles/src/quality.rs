//! Frame-rate and memory sampling that decides when to degrade visuals.

/// Thresholds past which the engine trades quality for speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityThresholds {
    /// Sampled frame rates below this trigger optimization.
    pub low_fps: u32,
    /// Heap usage above this many megabytes triggers optimization.
    pub memory_limit_mb: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            low_fps: 30,
            memory_limit_mb: 100.0,
        }
    }
}

/// Minimum time between frame-rate samples, in seconds.
pub const FPS_SAMPLE_WINDOW: f64 = 1.0;

/// Counts frames and produces a frame-rate sample once per window.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRateSampler {
    window_start: Option<f64>,
    frames: u32,
    last_fps: Option<u32>,
}

impl Default for FrameRateSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRateSampler {
    /// A sampler with no frames recorded.
    pub fn new() -> Self {
        Self {
            window_start: None,
            frames: 0,
            last_fps: None,
        }
    }

    /// Record a frame presented at `now` seconds.
    ///
    /// Returns the frame rate once at least [`FPS_SAMPLE_WINDOW`] has passed
    /// since the window opened, then starts a new window.
    pub fn record_frame(&mut self, now: f64) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;

        let span = now - start;
        if span < FPS_SAMPLE_WINDOW {
            return None;
        }

        let fps = (f64::from(self.frames) / span).round() as u32;
        self.frames = 0;
        self.window_start = Some(now);
        self.last_fps = Some(fps);
        Some(fps)
    }

    /// Most recent completed sample.
    pub fn last_fps(&self) -> Option<u32> {
        self.last_fps
    }
}

/// Why a quality reduction was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QualityTrigger {
    /// A frame-rate sample fell below the threshold.
    LowFrameRate(u32),
    /// Memory usage exceeded the limit.
    MemoryPressure(f64),
}

/// Combines frame-rate and memory samples into optimization triggers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdaptiveQuality {
    thresholds: QualityThresholds,
    sampler: FrameRateSampler,
}

impl AdaptiveQuality {
    /// Monitor with the given thresholds.
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self {
            thresholds,
            sampler: FrameRateSampler::new(),
        }
    }

    /// Configured thresholds.
    pub fn thresholds(&self) -> QualityThresholds {
        self.thresholds
    }

    /// Most recent frame-rate sample.
    pub fn last_fps(&self) -> Option<u32> {
        self.sampler.last_fps()
    }

    /// Record a frame; returns a trigger when a completed sample is too slow.
    pub fn record_frame(&mut self, now: f64) -> Option<QualityTrigger> {
        self.sampler
            .record_frame(now)
            .filter(|&fps| fps < self.thresholds.low_fps)
            .map(QualityTrigger::LowFrameRate)
    }

    /// Check a memory sample in megabytes.
    pub fn record_memory_usage(&self, used_mb: f64) -> Option<QualityTrigger> {
        if used_mb > self.thresholds.memory_limit_mb {
            log::warn!("High memory usage detected ({used_mb:.1} MB), optimizing");
            Some(QualityTrigger::MemoryPressure(used_mb))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampler_waits_for_full_window() {
        let mut sampler = FrameRateSampler::new();
        for i in 0..60 {
            assert_eq!(sampler.record_frame(i as f64 / 60.0), None);
        }
        // 61st frame lands exactly at one second.
        assert_eq!(sampler.record_frame(1.0), Some(61));
        assert_eq!(sampler.last_fps(), Some(61));
    }

    #[test]
    fn test_sampler_restarts_window() {
        let mut sampler = FrameRateSampler::new();
        sampler.record_frame(0.0);
        assert_eq!(sampler.record_frame(2.0), Some(1));
        assert_eq!(sampler.record_frame(2.5), None);
        assert_eq!(sampler.record_frame(3.0), Some(2));
    }

    #[test]
    fn test_low_frame_rate_triggers() {
        let mut quality = AdaptiveQuality::default();
        let mut trigger = None;
        for i in 0..=20 {
            trigger = trigger.or(quality.record_frame(i as f64 * 0.05));
        }
        assert_eq!(trigger, Some(QualityTrigger::LowFrameRate(21)));
    }

    #[test]
    fn test_healthy_frame_rate_does_not_trigger() {
        let mut quality = AdaptiveQuality::default();
        for i in 0..=240 {
            assert_eq!(quality.record_frame(i as f64 / 60.0), None);
        }
        assert!(quality.last_fps().is_some_and(|fps| fps >= 59));
    }

    #[test]
    fn test_memory_threshold() {
        let quality = AdaptiveQuality::new(QualityThresholds {
            low_fps: 30,
            memory_limit_mb: 64.0,
        });
        assert_eq!(quality.record_memory_usage(64.0), None);
        assert_eq!(
            quality.record_memory_usage(80.0),
            Some(QualityTrigger::MemoryPressure(80.0))
        );
    }
}
