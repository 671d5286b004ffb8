//! Cosmic dust: a sparse, barely visible haze filling a large cube.

use rand::Rng;

use crate::cloud::{CloudKind, PointCloud, Rgb};
use crate::error::{ParticleError, require_positive};
use crate::nebula::centered_sample;
use crate::profile::DeviceProfile;

/// Edge length of the dust cube.
pub const DUST_EXTENT: f32 = 1500.0;

/// Dust color when the profile disables color variety.
pub const FLAT_DUST_COLOR: Rgb = [0.15, 0.2, 0.3];

/// Generate `count` dust motes.
pub fn generate_cosmic_dust<R: Rng + ?Sized>(
    count: usize,
    profile: &DeviceProfile,
    rng: &mut R,
) -> Result<PointCloud, ParticleError> {
    require_positive("dust count", count)?;

    let size = CloudKind::Dust.material(profile).size;
    let mut cloud = PointCloud::with_capacity(count);
    for _ in 0..count {
        let position = centered_sample(rng) * DUST_EXTENT;
        let color = if profile.enable_color_variety {
            [
                0.1 + rng.random::<f32>() * 0.1,
                0.1 + rng.random::<f32>() * 0.2,
                0.2 + rng.random::<f32>() * 0.2,
            ]
        } else {
            FLAT_DUST_COLOR
        };
        cloud.push(position, color, size);
    }

    log::debug!("Generated cosmic dust with {count} points");
    Ok(cloud)
}
