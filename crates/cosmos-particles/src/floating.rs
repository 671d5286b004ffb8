//! Floating particles: the only cloud whose points move individually.
//!
//! Each point carries a velocity that persists across frames. When a
//! coordinate has strayed past [`FLOATING_BOUNDS`] and is still heading
//! outward, the matching velocity component is negated before the next
//! integration step. The check runs per axis on the pre-step position, so a
//! particle can overshoot the bound by up to one step before it turns around.
//! A particle already heading back keeps its velocity until it is inside.

use glam::Vec3;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::cloud::{CloudKind, PointCloud, Rgb};
use crate::error::{ParticleError, require_positive};
use crate::motion::FLOATING_BOUNDS;
use crate::nebula::centered_sample;
use crate::profile::DeviceProfile;

/// Extent of the box floating particles spawn in.
pub const FLOATING_SPAWN_EXTENT: Vec3 = Vec3::new(2000.0, 2000.0, 1000.0);

/// Brand colors particles are tinted with: indigo, violet, cyan.
pub const FLOATING_PALETTE: [Rgb; 3] = [
    hex_to_rgb(0x6366f1),
    hex_to_rgb(0x8b5cf6),
    hex_to_rgb(0x06b6d4),
];

/// Convert a `0xRRGGBB` color to normalized RGB.
pub const fn hex_to_rgb(hex: u32) -> Rgb {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

/// A point cloud paired with one velocity per point.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingParticles {
    cloud: PointCloud,
    velocities: Vec<Vec3>,
}

impl FloatingParticles {
    /// Pair an existing cloud with velocities; lengths must match.
    pub fn from_parts(cloud: PointCloud, velocities: Vec<Vec3>) -> Result<Self, ParticleError> {
        if cloud.len() != velocities.len() {
            return Err(ParticleError::MisalignedVelocities {
                points: cloud.len(),
                velocities: velocities.len(),
            });
        }
        Ok(Self { cloud, velocities })
    }

    /// The particle buffers.
    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// Mutable access for the renderer to clear the upload flag.
    pub fn cloud_mut(&mut self) -> &mut PointCloud {
        &mut self.cloud
    }

    /// Per-point velocities, index-aligned with the cloud.
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.velocities.len()
    }

    /// Whether there are no particles.
    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }

    /// Reflect out-of-bounds axes, then advance every particle by
    /// `velocity * frame_scale`. Flags the position buffer for upload.
    ///
    /// Returns the number of velocity components that were reflected. A zero
    /// `frame_scale` moves nothing and reflects nothing.
    pub fn step(&mut self, frame_scale: f32) -> usize {
        if !self.is_empty() {
            self.cloud.mark_dirty();
        }
        if frame_scale <= 0.0 {
            return 0;
        }

        let mut reflections = 0;
        for (i, velocity) in self.velocities.iter_mut().enumerate() {
            let position = self.cloud.position(i);
            for axis in 0..3 {
                let outside = position[axis].abs() > FLOATING_BOUNDS[axis];
                let heading_out = position[axis] * velocity[axis] > 0.0;
                if outside && heading_out {
                    velocity[axis] = -velocity[axis];
                    reflections += 1;
                }
            }
            self.cloud.set_position(i, position + *velocity * frame_scale);
        }
        reflections
    }
}

/// Generate `count` floating particles with velocities scaled by the profile.
pub fn generate_floating_particles<R: Rng + ?Sized>(
    count: usize,
    profile: &DeviceProfile,
    rng: &mut R,
) -> Result<FloatingParticles, ParticleError> {
    require_positive("particle count", count)?;

    let size = CloudKind::Floating.material(profile).size;
    let mut cloud = PointCloud::with_capacity(count);
    let mut velocities = Vec::with_capacity(count);
    for _ in 0..count {
        let position = centered_sample(rng) * FLOATING_SPAWN_EXTENT;
        velocities.push(centered_sample(rng) * profile.particle_speed);
        let color = *FLOATING_PALETTE.choose(rng).unwrap_or(&FLOATING_PALETTE[0]);
        cloud.push(position, color, size);
    }

    log::debug!("Generated {count} floating particles");
    FloatingParticles::from_parts(cloud, velocities)
}
