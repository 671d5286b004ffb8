//! Pointer-follow camera.

use glam::{Vec2, Vec3};

use crate::motion::{CAMERA_FOLLOW_BLEND, CAMERA_START, pointer_target};

/// Camera position, eased toward a pointer-derived target every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    position: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraState {
    /// Camera at its starting position.
    pub fn new() -> Self {
        Self {
            position: CAMERA_START,
        }
    }

    /// Current position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move X and Y a fixed fraction of the way toward the target for
    /// `pointer` (offset from viewport centre, in pixels). Z is untouched.
    ///
    /// Returns the applied delta.
    pub(crate) fn follow(&mut self, pointer: Vec2) -> Vec3 {
        let target = pointer_target(pointer);
        let delta = (target - self.position.truncate()) * CAMERA_FOLLOW_BLEND;
        let delta = delta.extend(0.0);
        self.position += delta;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_behind_origin() {
        assert_eq!(CameraState::new().position(), Vec3::new(0.0, 0.0, 500.0));
    }

    #[test]
    fn test_follow_step_is_fixed_fraction() {
        let mut camera = CameraState::new();
        let delta = camera.follow(Vec2::new(1000.0, -2000.0));
        // target = (0.5, -1.0)
        assert!((delta.x - 0.01).abs() < 1e-7);
        assert!((delta.y + 0.02).abs() < 1e-7);
        assert_eq!(delta.z, 0.0);
        assert_eq!(camera.position().z, 500.0);
    }

    #[test]
    fn test_follow_converges_without_overshoot() {
        let mut camera = CameraState::new();
        let pointer = Vec2::new(800.0, 600.0);
        let target = pointer_target(pointer);
        let mut previous_gap = target.x;
        for _ in 0..1000 {
            camera.follow(pointer);
            let gap = target.x - camera.position().x;
            assert!(gap >= 0.0 && gap <= previous_gap);
            previous_gap = gap;
        }
        assert!((camera.position().truncate() - target).length() < 1e-4);
    }
}
