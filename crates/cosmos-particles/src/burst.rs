//! Cosmic bursts: short-lived shells of points thrown out from the origin,
//! pulled down by gravity and faded out over a fixed lifetime.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;

use crate::cloud::{CloudKind, CloudLayer, PointCloud, Rgb};
use crate::profile::DeviceProfile;

/// Layers per burst.
pub const BURST_LAYERS: usize = 3;
/// Points per burst layer.
pub const BURST_POINTS_PER_LAYER: usize = 300;
/// Delay between consecutive layers, in seconds.
pub const BURST_LAYER_DELAY: f64 = 0.2;
/// Lifetime of a layer in reference frames.
pub const BURST_LIFETIME_FRAMES: f32 = 80.0;
/// Downward velocity change per reference frame.
pub const BURST_GRAVITY: f32 = 0.2;

/// Base tint per layer: blue, purple, cyan.
pub const BURST_PALETTE: [Rgb; BURST_LAYERS] = [[0.4, 0.3, 1.0], [0.8, 0.2, 0.9], [0.2, 0.8, 1.0]];

const BURST_COLOR_JITTER: f32 = 0.2;
const BURST_BASE_SPEED: f32 = 15.0;
const BURST_SPEED_PER_LAYER: f32 = 5.0;

/// One expanding layer of a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct BurstLayer {
    layer: CloudLayer,
    velocities: Vec<Vec3>,
    starts_at: f64,
    age: f32,
}

impl BurstLayer {
    /// Build layer `index` (0-based), becoming active at `starts_at` seconds.
    pub(crate) fn generate<R: Rng + ?Sized>(
        index: usize,
        starts_at: f64,
        profile: &DeviceProfile,
        rng: &mut R,
    ) -> Self {
        let kind = CloudKind::Burst { layer: index };
        let size = kind.material(profile).size;
        let base = BURST_PALETTE[index % BURST_LAYERS];
        let max_speed = BURST_BASE_SPEED + BURST_SPEED_PER_LAYER * index as f32;

        let mut cloud = PointCloud::with_capacity(BURST_POINTS_PER_LAYER);
        let mut velocities = Vec::with_capacity(BURST_POINTS_PER_LAYER);
        for _ in 0..BURST_POINTS_PER_LAYER {
            let speed = (rng.random::<f32>() + 0.5) * max_speed;
            let theta = rng.random::<f32>() * TAU;
            let phi = rng.random::<f32>() * PI;
            velocities.push(
                Vec3::new(
                    phi.sin() * theta.cos(),
                    phi.sin() * theta.sin(),
                    phi.cos(),
                ) * speed,
            );

            let color = [
                base[0] + rng.random::<f32>() * BURST_COLOR_JITTER,
                base[1] + rng.random::<f32>() * BURST_COLOR_JITTER,
                base[2] + rng.random::<f32>() * BURST_COLOR_JITTER,
            ];
            cloud.push(Vec3::ZERO, color, size);
        }

        Self {
            layer: CloudLayer::new(kind, cloud, profile),
            velocities,
            starts_at,
            age: 0.0,
        }
    }

    /// Render state of the layer.
    pub fn layer(&self) -> &CloudLayer {
        &self.layer
    }

    /// Mutable render state, for the renderer to clear upload flags.
    pub fn layer_mut(&mut self) -> &mut CloudLayer {
        &mut self.layer
    }

    /// Per-point velocities.
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Whether the layer has started at `elapsed` seconds.
    pub fn is_active(&self, elapsed: f64) -> bool {
        elapsed >= self.starts_at
    }

    /// Age in reference frames since the layer started.
    pub fn age(&self) -> f32 {
        self.age
    }

    /// The layer has faded out completely and can be dropped.
    pub fn is_finished(&self) -> bool {
        self.age >= BURST_LIFETIME_FRAMES
    }

    /// Advance by `frame_scale` reference frames. No-op before the start time.
    ///
    /// Returns whether the buffers changed.
    pub(crate) fn advance(&mut self, elapsed: f64, frame_scale: f32) -> bool {
        if !self.is_active(elapsed) || self.is_finished() {
            return false;
        }

        let cloud = &mut self.layer.cloud;
        for (i, velocity) in self.velocities.iter_mut().enumerate() {
            let position = cloud.position(i) + *velocity * frame_scale;
            cloud.set_position(i, position);
            velocity.y -= BURST_GRAVITY * frame_scale;
        }
        cloud.mark_dirty();

        self.age += frame_scale;
        self.layer.material.opacity = (1.0 - self.age / BURST_LIFETIME_FRAMES).max(0.0);
        true
    }
}

/// Schedule a full burst whose first layer starts at `elapsed`.
pub(crate) fn spawn_burst<R: Rng + ?Sized>(
    elapsed: f64,
    profile: &DeviceProfile,
    rng: &mut R,
) -> Vec<BurstLayer> {
    (0..BURST_LAYERS)
        .map(|i| {
            BurstLayer::generate(
                i,
                elapsed + BURST_LAYER_DELAY * i as f64,
                profile,
                &mut *rng,
            )
        })
        .collect()
}
