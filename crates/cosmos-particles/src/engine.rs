//! The particle field engine: owns every cloud, advances them once per frame
//! and exposes the buffers and transforms a renderer needs.

use glam::{Vec2, Vec3};
use rand::Rng;

use crate::burst::{BurstLayer, spawn_burst};
use crate::camera::CameraState;
use crate::cloud::{CloudKind, CloudLayer, PointMaterial, Transform};
use crate::dust::generate_cosmic_dust;
use crate::error::ParticleError;
use crate::floating::{FloatingParticles, generate_floating_particles};
use crate::motion::{
    DUST_SPIN, FLOATING_SPIN, NEBULA_SPIN, NebulaMotion, REFERENCE_FRAME_DT, SPIRAL_SPIN,
    STAR_FIELD_SPIN,
};
use crate::nebula::generate_nebula_clouds;
use crate::profile::DeviceProfile;
use crate::quality::{AdaptiveQuality, QualityThresholds, QualityTrigger};
use crate::spiral::generate_galaxy_spiral;
use crate::starfield::generate_star_field;

/// Floating particle material size is multiplied by this on optimization.
pub const OPTIMIZED_FLOATING_SIZE_FACTOR: f32 = 0.8;
/// Nebula opacity is multiplied by this on optimization.
pub const OPTIMIZED_NEBULA_OPACITY_FACTOR: f32 = 0.5;
/// Dust opacity is multiplied by this on optimization.
pub const OPTIMIZED_DUST_OPACITY_FACTOR: f32 = 0.7;

/// A nebula cluster layer plus the Y it started at.
#[derive(Debug, Clone, PartialEq)]
pub struct NebulaLayer {
    /// Render state.
    pub layer: CloudLayer,
    /// Initial vertical position, used by [`NebulaMotion::Anchored`].
    pub anchor_y: f32,
}

/// The floating particles plus their render state.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingLayer {
    /// Buffers and velocities.
    pub particles: FloatingParticles,
    /// Layer material.
    pub material: PointMaterial,
    /// Layer transform.
    pub transform: Transform,
    /// Whether the layer should be drawn.
    pub visible: bool,
}

impl FloatingLayer {
    /// Wrap particles with the default floating material.
    pub fn new(particles: FloatingParticles, profile: &DeviceProfile) -> Self {
        Self {
            particles,
            material: CloudKind::Floating.material(profile),
            transform: Transform::default(),
            visible: true,
        }
    }
}

/// Every cloud the engine animates. Absent layers are simply skipped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleField {
    /// Background star shell.
    pub star_field: Option<CloudLayer>,
    /// Nebula clusters, in palette order.
    pub nebulae: Vec<NebulaLayer>,
    /// Galaxy spiral.
    pub spiral: Option<CloudLayer>,
    /// Cosmic dust.
    pub dust: Option<CloudLayer>,
    /// Floating particles.
    pub floating: Option<FloatingLayer>,
}

impl ParticleField {
    /// Generate every cloud the profile asks for. Zero counts skip the layer.
    pub fn generate<R: Rng + ?Sized>(
        profile: &DeviceProfile,
        rng: &mut R,
    ) -> Result<Self, ParticleError> {
        let star_field = if profile.star_count > 0 {
            let cloud = generate_star_field(profile.star_count, profile, rng)?;
            Some(CloudLayer::new(CloudKind::StarField, cloud, profile))
        } else {
            None
        };

        let nebulae = if profile.nebula_cloud_count > 0 && profile.nebula_points_per_cloud > 0 {
            generate_nebula_clouds(
                profile.nebula_cloud_count,
                profile.nebula_points_per_cloud,
                profile,
                rng,
            )?
            .into_iter()
            .map(|cloud| NebulaLayer {
                layer: CloudLayer::new(CloudKind::Nebula, cloud, profile),
                anchor_y: 0.0,
            })
            .collect()
        } else {
            Vec::new()
        };

        let spiral = if profile.spiral_count > 0 {
            let cloud = generate_galaxy_spiral(profile.spiral_count, profile, rng)?;
            Some(CloudLayer::new(CloudKind::Spiral, cloud, profile))
        } else {
            None
        };

        let dust = if profile.dust_count > 0 {
            let cloud = generate_cosmic_dust(profile.dust_count, profile, rng)?;
            Some(CloudLayer::new(CloudKind::Dust, cloud, profile))
        } else {
            None
        };

        let floating = if profile.particle_count > 0 {
            let particles = generate_floating_particles(profile.particle_count, profile, rng)?;
            Some(FloatingLayer::new(particles, profile))
        } else {
            None
        };

        Ok(Self {
            star_field,
            nebulae,
            spiral,
            dust,
            floating,
        })
    }

    /// Total number of points across all layers.
    pub fn point_count(&self) -> usize {
        let layers = [&self.star_field, &self.spiral, &self.dust];
        layers.iter().flat_map(|l| l.iter()).map(|l| l.cloud.len()).sum::<usize>()
            + self.nebulae.iter().map(|n| n.layer.cloud.len()).sum::<usize>()
            + self.floating.as_ref().map_or(0, |f| f.particles.len())
    }
}

/// What a tick produced for the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    /// Offset applied to the camera this tick.
    pub camera_delta: Vec3,
    /// Number of point buffers flagged for re-upload this tick.
    pub dirty_buffers: usize,
}

/// Owns the particle clouds, camera and quality state for one background.
///
/// Created once per page composition; call [`stop`](Self::stop) before
/// dropping it so the host's frame loop stops scheduling ticks.
#[derive(Debug, Clone)]
pub struct ParticleFieldEngine {
    profile: DeviceProfile,
    field: ParticleField,
    bursts: Vec<BurstLayer>,
    camera: CameraState,
    nebula_motion: NebulaMotion,
    quality: AdaptiveQuality,
    adaptive_applied: bool,
    narrow_viewport_applied: bool,
    running: bool,
    ticks: u64,
}

impl ParticleFieldEngine {
    /// Generate all clouds for `profile` and return a running engine.
    pub fn new<R: Rng + ?Sized>(profile: DeviceProfile, rng: &mut R) -> Result<Self, ParticleError> {
        let field = ParticleField::generate(&profile, rng)?;
        log::info!(
            "Particle field ready: {} points for {} profile",
            field.point_count(),
            profile.class
        );
        Ok(Self::from_field(field, profile))
    }

    /// Build an engine around pre-built layers.
    pub fn from_field(mut field: ParticleField, profile: DeviceProfile) -> Self {
        for nebula in &mut field.nebulae {
            nebula.anchor_y = nebula.layer.transform.position.y;
        }
        Self {
            profile,
            field,
            bursts: Vec::new(),
            camera: CameraState::new(),
            nebula_motion: NebulaMotion::default(),
            quality: AdaptiveQuality::default(),
            adaptive_applied: false,
            narrow_viewport_applied: false,
            running: true,
            ticks: 0,
        }
    }

    /// Choose how nebula clusters move vertically.
    pub fn with_nebula_motion(mut self, motion: NebulaMotion) -> Self {
        self.nebula_motion = motion;
        self
    }

    /// Override the adaptive quality thresholds.
    pub fn with_quality_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.quality = AdaptiveQuality::new(thresholds);
        self
    }

    /// The profile the engine was built with.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// All persistent layers.
    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Mutable layers, for the renderer to clear upload flags.
    pub fn field_mut(&mut self) -> &mut ParticleField {
        &mut self.field
    }

    /// Burst layers that have not finished yet.
    pub fn bursts(&self) -> &[BurstLayer] {
        &self.bursts
    }

    /// Mutable burst layers, for the renderer to clear upload flags.
    pub fn bursts_mut(&mut self) -> &mut [BurstLayer] {
        &mut self.bursts
    }

    /// Current camera state.
    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Active nebula motion mode.
    pub fn nebula_motion(&self) -> NebulaMotion {
        self.nebula_motion
    }

    /// Number of ticks applied since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether [`apply_adaptive_optimization`](Self::apply_adaptive_optimization) has run.
    pub fn is_optimized(&self) -> bool {
        self.adaptive_applied
    }

    /// Whether ticks are still accepted.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop the engine. Further ticks are ignored and frame loops driving it
    /// stop scheduling.
    pub fn stop(&mut self) {
        if self.running {
            log::debug!("Particle field stopped after {} ticks", self.ticks);
        }
        self.running = false;
    }

    /// Advance one frame.
    ///
    /// `dt` is the time since the previous frame and scales every rate-like
    /// motion; `elapsed` is monotonic seconds since start; `pointer` is the
    /// pointer offset from the viewport centre in pixels. The nebula bob and
    /// camera easing run once per call regardless of `dt`.
    ///
    /// Returns `None` once the engine has been stopped.
    pub fn tick(&mut self, dt: f64, elapsed: f64, pointer: Vec2) -> Option<FrameUpdate> {
        if !self.running {
            return None;
        }

        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let frame_scale = (dt / REFERENCE_FRAME_DT) as f32;
        let mut dirty_buffers = 0;

        if let Some(floating) = &mut self.field.floating {
            floating.particles.step(frame_scale);
            if floating.particles.cloud().needs_upload() {
                dirty_buffers += 1;
            }
            floating.transform.rotation += FLOATING_SPIN * frame_scale;
        }

        if let Some(stars) = &mut self.field.star_field {
            stars.transform.rotation += STAR_FIELD_SPIN * frame_scale;
        }

        for (i, nebula) in self.field.nebulae.iter_mut().enumerate() {
            let transform = &mut nebula.layer.transform;
            transform.rotation += NEBULA_SPIN * (i + 1) as f32 * frame_scale;
            transform.position.y =
                self.nebula_motion
                    .next_y(transform.position.y, nebula.anchor_y, i, elapsed);
        }

        if let Some(spiral) = &mut self.field.spiral {
            spiral.transform.rotation += SPIRAL_SPIN * frame_scale;
        }

        if let Some(dust) = &mut self.field.dust {
            dust.transform.rotation += DUST_SPIN * frame_scale;
        }

        for burst in &mut self.bursts {
            if burst.advance(elapsed, frame_scale) {
                dirty_buffers += 1;
            }
        }
        self.bursts.retain(|b| !b.is_finished());

        let camera_delta = self.camera.follow(pointer);
        self.ticks += 1;

        Some(FrameUpdate {
            camera_delta,
            dirty_buffers,
        })
    }

    /// Schedule a cosmic burst whose first layer starts at `elapsed`.
    pub fn trigger_burst<R: Rng + ?Sized>(&mut self, elapsed: f64, rng: &mut R) {
        if !self.running {
            return;
        }
        self.bursts.extend(spawn_burst(elapsed, &self.profile, rng));
        log::debug!("Cosmic burst scheduled at {elapsed:.2}s");
    }

    /// Shrink floating particles and fade nebulae and dust.
    ///
    /// Applies at most once; returns whether anything changed.
    pub fn apply_adaptive_optimization(&mut self) -> bool {
        if self.adaptive_applied {
            return false;
        }

        if let Some(floating) = &mut self.field.floating {
            floating.material.size *= OPTIMIZED_FLOATING_SIZE_FACTOR;
        }
        for nebula in &mut self.field.nebulae {
            nebula.layer.material.opacity *= OPTIMIZED_NEBULA_OPACITY_FACTOR;
        }
        if let Some(dust) = &mut self.field.dust {
            dust.material.opacity *= OPTIMIZED_DUST_OPACITY_FACTOR;
        }

        self.adaptive_applied = true;
        log::info!("Performance optimization applied");
        true
    }

    /// Hide the star field, spiral and nebulae for narrow viewports.
    ///
    /// Tracked separately from adaptive optimization, so a narrow viewport
    /// can still be optimized later. Returns whether anything changed.
    pub fn reduce_for_narrow_viewport(&mut self) -> bool {
        if self.narrow_viewport_applied {
            return false;
        }

        for layer in [&mut self.field.star_field, &mut self.field.spiral]
            .into_iter()
            .flatten()
        {
            layer.visible = false;
        }
        for nebula in &mut self.field.nebulae {
            nebula.layer.visible = false;
        }

        self.narrow_viewport_applied = true;
        log::info!("Narrow viewport: background layers hidden");
        true
    }

    /// Feed a presented-frame timestamp to the quality monitor.
    ///
    /// Returns the trigger if this sample caused optimization to be applied.
    pub fn record_frame(&mut self, now: f64) -> Option<QualityTrigger> {
        let trigger = self.quality.record_frame(now)?;
        self.apply_adaptive_optimization().then_some(trigger)
    }

    /// Feed a heap usage sample in megabytes to the quality monitor.
    ///
    /// Returns the trigger if this sample caused optimization to be applied.
    pub fn record_memory_usage(&mut self, used_mb: f64) -> Option<QualityTrigger> {
        if self.adaptive_applied {
            return None;
        }
        let trigger = self.quality.record_memory_usage(used_mb)?;
        self.apply_adaptive_optimization().then_some(trigger)
    }

    /// Most recent frame-rate sample.
    pub fn last_fps(&self) -> Option<u32> {
        self.quality.last_fps()
    }
}
