//! Nebula clusters: dense cubes of large, soft points around random centres.
//!
//! Points are jittered uniformly inside the cube, not with a Gaussian falloff.

use glam::Vec3;
use rand::Rng;

use crate::cloud::{PointCloud, Rgb};
use crate::error::{ParticleError, require_positive};
use crate::profile::DeviceProfile;

/// Base colors cycled across clusters: purple, blue, cyan.
pub const NEBULA_PALETTE: [Rgb; 3] = [[0.4, 0.1, 0.8], [0.1, 0.3, 0.9], [0.0, 0.6, 0.8]];

/// Random per-channel jitter added on top of the palette color.
pub const NEBULA_COLOR_JITTER: f32 = 0.2;

/// Edge length of the cube points are scattered in.
pub const NEBULA_SPREAD: f32 = 100.0;

/// Extent of the box cluster centres are drawn from.
pub const NEBULA_CENTER_EXTENT: Vec3 = Vec3::new(600.0, 400.0, 400.0);

const NEBULA_MIN_SIZE: f32 = 2.0;
const NEBULA_SIZE_RANGE: f32 = 8.0;

/// Generate `cloud_count` clusters of `points_per_cloud` points each.
///
/// Cluster `n` uses palette entry `n % NEBULA_PALETTE.len()`.
pub fn generate_nebula_clouds<R: Rng + ?Sized>(
    cloud_count: usize,
    points_per_cloud: usize,
    profile: &DeviceProfile,
    rng: &mut R,
) -> Result<Vec<PointCloud>, ParticleError> {
    require_positive("nebula cloud count", cloud_count)?;
    require_positive("points per nebula cloud", points_per_cloud)?;

    (0..cloud_count)
        .map(|n| generate_nebula_cloud(points_per_cloud, n % NEBULA_PALETTE.len(), profile, &mut *rng))
        .collect()
}

/// Generate a single cluster tinted with `NEBULA_PALETTE[palette_index]`.
pub fn generate_nebula_cloud<R: Rng + ?Sized>(
    points: usize,
    palette_index: usize,
    profile: &DeviceProfile,
    rng: &mut R,
) -> Result<PointCloud, ParticleError> {
    require_positive("points per nebula cloud", points)?;
    let base = *NEBULA_PALETTE.get(palette_index).ok_or_else(|| {
        ParticleError::InvalidArgument(format!(
            "nebula palette index {palette_index} out of range (0..{})",
            NEBULA_PALETTE.len()
        ))
    })?;

    let center = centered_sample(rng) * NEBULA_CENTER_EXTENT;

    let mut cloud = PointCloud::with_capacity(points);
    for _ in 0..points {
        let position = center + centered_sample(rng) * NEBULA_SPREAD;

        let color = if profile.enable_color_variety {
            [
                base[0] + rng.random::<f32>() * NEBULA_COLOR_JITTER,
                base[1] + rng.random::<f32>() * NEBULA_COLOR_JITTER,
                base[2] + rng.random::<f32>() * NEBULA_COLOR_JITTER,
            ]
        } else {
            NEBULA_PALETTE[0]
        };

        let size = NEBULA_MIN_SIZE + rng.random::<f32>() * NEBULA_SIZE_RANGE;
        cloud.push(position, color, size);
    }

    log::debug!("Generated nebula cloud (palette {palette_index}) with {points} points");
    Ok(cloud)
}

/// Uniform sample in `[-0.5, 0.5)^3`.
pub(crate) fn centered_sample<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    Vec3::new(
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
        rng.random::<f32>() - 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn centroid(cloud: &PointCloud) -> Vec3 {
        cloud.iter_positions().sum::<Vec3>() / cloud.len() as f32
    }

    #[test]
    fn test_cloud_and_point_counts() {
        let clouds = generate_nebula_clouds(3, 250, &DeviceProfile::default(), &mut rng()).unwrap();
        assert_eq!(clouds.len(), 3);
        for cloud in &clouds {
            assert_eq!(cloud.len(), 250);
            assert_eq!(cloud.positions().len(), 750);
        }
    }

    #[test]
    fn test_points_stay_inside_cube() {
        let clouds = generate_nebula_clouds(3, 500, &DeviceProfile::default(), &mut rng()).unwrap();
        let half_extent = NEBULA_CENTER_EXTENT * 0.5 + Vec3::splat(NEBULA_SPREAD * 0.5);
        for cloud in &clouds {
            let center = centroid(cloud);
            for p in cloud.iter_positions() {
                assert!(
                    ((p - center).abs()).max_element() <= NEBULA_SPREAD,
                    "point {p} too far from cluster centroid {center}"
                );
                assert!(p.abs().cmple(half_extent).all(), "point {p} outside volume");
            }
        }
    }

    #[test]
    fn test_palette_cycles_across_clouds() {
        let clouds = generate_nebula_clouds(4, 200, &DeviceProfile::default(), &mut rng()).unwrap();
        for (n, cloud) in clouds.iter().enumerate() {
            let base = NEBULA_PALETTE[n % NEBULA_PALETTE.len()];
            for color in cloud.iter_colors() {
                for ch in 0..3 {
                    assert!(
                        color[ch] >= base[ch] && color[ch] <= base[ch] + NEBULA_COLOR_JITTER,
                        "cloud {n} channel {ch} = {} outside palette band",
                        color[ch]
                    );
                }
            }
        }
    }

    #[test]
    fn test_flat_color_without_variety() {
        let clouds = generate_nebula_clouds(1, 100, &DeviceProfile::mobile(), &mut rng()).unwrap();
        assert!(clouds[0].iter_colors().all(|c| c == NEBULA_PALETTE[0]));
    }

    #[test]
    fn test_sizes_in_range() {
        let cloud = generate_nebula_cloud(300, 1, &DeviceProfile::default(), &mut rng()).unwrap();
        assert!(cloud.sizes().iter().all(|s| (2.0..10.0).contains(s)));
    }

    #[test]
    fn test_invalid_arguments() {
        let profile = DeviceProfile::default();
        assert!(matches!(
            generate_nebula_clouds(0, 10, &profile, &mut rng()),
            Err(ParticleError::InvalidArgument(_))
        ));
        assert!(matches!(
            generate_nebula_clouds(2, 0, &profile, &mut rng()),
            Err(ParticleError::InvalidArgument(_))
        ));
        assert!(matches!(
            generate_nebula_cloud(10, NEBULA_PALETTE.len(), &profile, &mut rng()),
            Err(ParticleError::InvalidArgument(_))
        ));
    }
}
