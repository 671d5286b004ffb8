//! Animation constants applied by [`ParticleFieldEngine::tick`](crate::ParticleFieldEngine::tick).
//!
//! Angular increments are radians per reference frame; a tick of `dt` seconds
//! applies them `dt / REFERENCE_FRAME_DT` times.

use std::str::FromStr;

use glam::{Vec2, Vec3};

use crate::error::ParticleError;

/// Duration of one reference frame in seconds.
pub const REFERENCE_FRAME_DT: f64 = 1.0 / 60.0;

/// Per-axis coordinate magnitude past which a floating particle reflects.
pub const FLOATING_BOUNDS: Vec3 = Vec3::new(1000.0, 1000.0, 500.0);

/// Star field spin per reference frame.
pub const STAR_FIELD_SPIN: Vec3 = Vec3::new(0.0001, 0.0002, 0.0);

/// Galaxy spiral spin per reference frame.
pub const SPIRAL_SPIN: Vec3 = Vec3::new(0.001, 0.002, 0.0);

/// Cosmic dust spin per reference frame.
pub const DUST_SPIN: Vec3 = Vec3::new(0.0002, -0.0003, 0.0);

/// Floating particle spin per reference frame.
pub const FLOATING_SPIN: Vec3 = Vec3::new(0.0, 0.0005, 0.0);

/// Base nebula spin per reference frame, multiplied by `index + 1`.
pub const NEBULA_SPIN: Vec3 = Vec3::new(0.0, 0.001, 0.0005);

/// Angular frequency of the nebula bob, radians per second of elapsed time.
pub const NEBULA_BOB_FREQUENCY: f32 = 0.5;

/// Vertical offset added per tick at the crest of the nebula bob.
pub const NEBULA_BOB_STEP: f32 = 0.1;

/// Amplitude of the anchored nebula bob: the bounded limit of summing
/// [`NEBULA_BOB_STEP`] once per reference frame.
pub const NEBULA_BOB_AMPLITUDE: f32 =
    NEBULA_BOB_STEP / (NEBULA_BOB_FREQUENCY * REFERENCE_FRAME_DT as f32);

/// Scale from pointer offset (pixels from viewport centre) to camera target.
pub const POINTER_TO_CAMERA: f32 = 0.0005;

/// Fraction of the remaining distance the camera covers per tick.
pub const CAMERA_FOLLOW_BLEND: f32 = 0.02;

/// Initial camera position.
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 0.0, 500.0);

/// Camera target for a pointer offset.
pub fn pointer_target(pointer: Vec2) -> Vec2 {
    pointer * POINTER_TO_CAMERA
}

/// How nebula clusters move vertically over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NebulaMotion {
    /// Add `sin(0.5 t + i) * 0.1` to the cluster's Y every tick. The offset
    /// accumulates, so clusters wander depending on frame rate.
    #[default]
    Drift,
    /// Oscillate around the cluster's initial Y with a bounded amplitude.
    Anchored,
}

impl NebulaMotion {
    /// Vertical position of nebula `index` after a tick at `elapsed` seconds.
    pub fn next_y(self, current_y: f32, anchor_y: f32, index: usize, elapsed: f64) -> f32 {
        let phase = index as f32;
        let angle = elapsed as f32 * NEBULA_BOB_FREQUENCY + phase;
        match self {
            Self::Drift => current_y + angle.sin() * NEBULA_BOB_STEP,
            Self::Anchored => anchor_y + NEBULA_BOB_AMPLITUDE * (phase.cos() - angle.cos()),
        }
    }
}

impl FromStr for NebulaMotion {
    type Err = ParticleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drift" => Ok(Self::Drift),
            "anchored" => Ok(Self::Anchored),
            other => Err(ParticleError::InvalidArgument(format!(
                "unknown nebula motion '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_amplitude_matches_drift_rate() {
        assert!((NEBULA_BOB_AMPLITUDE - 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_drift_accumulates() {
        let mut y = 0.0;
        for _ in 0..10 {
            y = NebulaMotion::Drift.next_y(y, 0.0, 1, 0.0);
        }
        let expected = 10.0 * 1.0f32.sin() * NEBULA_BOB_STEP;
        assert!((y - expected).abs() < 1e-5, "y = {y}, expected {expected}");
    }

    #[test]
    fn test_anchored_starts_at_anchor_and_stays_bounded() {
        let start = NebulaMotion::Anchored.next_y(123.0, 40.0, 2, 0.0);
        assert!((start - 40.0).abs() < 1e-4);

        for step in 0..2000 {
            let y = NebulaMotion::Anchored.next_y(0.0, 40.0, 2, step as f64 * 0.1);
            assert!(
                (y - 40.0).abs() <= 2.0 * NEBULA_BOB_AMPLITUDE + 1e-3,
                "anchored bob left its band: {y}"
            );
        }
    }

    #[test]
    fn test_parse_motion() {
        assert_eq!("drift".parse(), Ok(NebulaMotion::Drift));
        assert_eq!(" Anchored ".parse(), Ok(NebulaMotion::Anchored));
        assert!("wobble".parse::<NebulaMotion>().is_err());
    }

    #[test]
    fn test_pointer_target_scale() {
        let target = pointer_target(Vec2::new(400.0, -200.0));
        assert!((target.x - 0.2).abs() < 1e-6);
        assert!((target.y + 0.1).abs() < 1e-6);
    }
}
