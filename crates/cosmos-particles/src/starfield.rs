//! Star field generation: points scattered through a thick spherical shell
//! around the camera.

use rand::Rng;

use crate::cloud::{PointCloud, Rgb};
use crate::error::{ParticleError, require_positive};
use crate::profile::DeviceProfile;

/// Inner radius of the star shell.
pub const STAR_MIN_RADIUS: f32 = 200.0;
/// Outer radius of the star shell.
pub const STAR_MAX_RADIUS: f32 = 1000.0;

/// Star color when the profile disables color variety.
pub const FLAT_STAR_COLOR: Rgb = [0.8, 0.8, 1.0];

const STAR_MIN_SIZE: f32 = 1.0;
const STAR_SIZE_RANGE: f32 = 3.0;

/// Generate `count` stars.
///
/// Directions are uniform on the sphere (`phi = acos(2u - 1)`), radii uniform
/// in `[STAR_MIN_RADIUS, STAR_MAX_RADIUS)`.
pub fn generate_star_field<R: Rng + ?Sized>(
    count: usize,
    profile: &DeviceProfile,
    rng: &mut R,
) -> Result<PointCloud, ParticleError> {
    require_positive("star count", count)?;

    let mut cloud = PointCloud::with_capacity(count);
    for _ in 0..count {
        let radius = STAR_MIN_RADIUS + rng.random::<f32>() * (STAR_MAX_RADIUS - STAR_MIN_RADIUS);
        let theta = rng.random::<f32>() * std::f32::consts::TAU;
        let phi = (2.0 * rng.random::<f32>() - 1.0).acos();

        let position = glam::Vec3::new(
            radius * phi.sin() * theta.cos(),
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
        );

        let color = if profile.enable_color_variety {
            star_color(rng)
        } else {
            FLAT_STAR_COLOR
        };

        let size = STAR_MIN_SIZE + rng.random::<f32>() * STAR_SIZE_RANGE;
        cloud.push(position, color, size);
    }

    log::debug!("Generated star field with {count} points");
    Ok(cloud)
}

/// Weighted palette pick: 60% blue-white, 20% purple, 20% cyan.
fn star_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    let choice: f32 = rng.random();
    if choice < 0.6 {
        [
            0.8 + rng.random::<f32>() * 0.2,
            0.8 + rng.random::<f32>() * 0.2,
            1.0,
        ]
    } else if choice < 0.8 {
        [
            0.6 + rng.random::<f32>() * 0.4,
            0.3 + rng.random::<f32>() * 0.3,
            1.0,
        ]
    } else {
        [0.0, 0.8 + rng.random::<f32>() * 0.2, 1.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    #[test]
    fn test_star_count_matches_request() {
        let cloud = generate_star_field(5000, &DeviceProfile::default(), &mut rng()).unwrap();
        assert_eq!(cloud.len(), 5000);
        assert_eq!(cloud.positions().len(), 5000 * 3);
        assert_eq!(cloud.colors().len(), 5000 * 3);
        assert_eq!(cloud.sizes().len(), 5000);
    }

    #[test]
    fn test_star_radii_within_shell() {
        let cloud = generate_star_field(5000, &DeviceProfile::default(), &mut rng()).unwrap();
        for (i, p) in cloud.iter_positions().enumerate() {
            let r = p.length();
            assert!(
                (STAR_MIN_RADIUS - 1e-2..=STAR_MAX_RADIUS + 1e-2).contains(&r),
                "Star {i} has radius {r} outside [200, 1000]"
            );
        }
    }

    #[test]
    fn test_star_distribution_covers_full_sky() {
        let cloud = generate_star_field(5000, &DeviceProfile::default(), &mut rng()).unwrap();
        let mut octant_counts = [0u32; 8];
        for d in cloud.iter_positions() {
            let octant = ((d.x >= 0.0) as usize)
                | (((d.y >= 0.0) as usize) << 1)
                | (((d.z >= 0.0) as usize) << 2);
            octant_counts[octant] += 1;
        }
        for (i, &count) in octant_counts.iter().enumerate() {
            assert!(
                (300..=900).contains(&count),
                "Octant {i} has {count} stars, expected roughly 625"
            );
        }
    }

    #[test]
    fn test_flat_color_without_variety() {
        let profile = DeviceProfile::mobile();
        let cloud = generate_star_field(500, &profile, &mut rng()).unwrap();
        for (i, color) in cloud.iter_colors().enumerate() {
            assert_eq!(color, FLAT_STAR_COLOR, "Star {i} differs from flat color");
        }
    }

    #[test]
    fn test_palette_weights() {
        let cloud = generate_star_field(10_000, &DeviceProfile::default(), &mut rng()).unwrap();
        let cyan = cloud.iter_colors().filter(|c| c[0] == 0.0).count();
        let purple = cloud.iter_colors().filter(|c| c[1] < 0.6).count();
        let blue_white = cloud.len() - cyan - purple;
        assert!((5500..6500).contains(&blue_white), "blue-white: {blue_white}");
        assert!((1600..2400).contains(&purple), "purple: {purple}");
        assert!((1600..2400).contains(&cyan), "cyan: {cyan}");
    }

    #[test]
    fn test_star_sizes_in_range() {
        let cloud = generate_star_field(1000, &DeviceProfile::default(), &mut rng()).unwrap();
        assert!(cloud.sizes().iter().all(|s| (1.0..4.0).contains(s)));
    }

    #[test]
    fn test_zero_count_rejected() {
        let result = generate_star_field(0, &DeviceProfile::default(), &mut rng());
        assert!(matches!(result, Err(ParticleError::InvalidArgument(_))));
    }
}
