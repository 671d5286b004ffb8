//! Procedural particle backgrounds: star shells, nebula clusters, a galaxy
//! spiral, cosmic dust and bouncing floating particles, sized per device and
//! animated one frame at a time.
//!
//! The crate is renderer-agnostic. Clouds expose flat position, color and
//! size buffers plus a material and transform; a host uploads whatever is
//! flagged [`PointCloud::needs_upload`] after each
//! [`ParticleFieldEngine::tick`].

pub mod burst;
pub mod camera;
pub mod cloud;
pub mod dust;
pub mod engine;
mod error;
pub mod floating;
pub mod frame_loop;
pub mod motion;
pub mod nebula;
pub mod profile;
pub mod quality;
pub mod spiral;
pub mod starfield;

pub use burst::BurstLayer;
pub use camera::CameraState;
pub use cloud::{Blending, CloudKind, CloudLayer, PointCloud, PointMaterial, Rgb, Transform};
pub use dust::generate_cosmic_dust;
pub use engine::{FloatingLayer, FrameUpdate, NebulaLayer, ParticleField, ParticleFieldEngine};
pub use error::ParticleError;
pub use floating::{FloatingParticles, generate_floating_particles};
pub use frame_loop::{FrameLoop, FrameStatus};
pub use motion::NebulaMotion;
pub use nebula::{generate_nebula_cloud, generate_nebula_clouds};
pub use profile::{DeviceCapabilities, DeviceClass, DeviceProfile};
pub use quality::{AdaptiveQuality, QualityThresholds, QualityTrigger};
pub use spiral::generate_galaxy_spiral;
pub use starfield::generate_star_field;
