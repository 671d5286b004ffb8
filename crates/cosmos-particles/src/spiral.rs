//! Galaxy spiral: a single arm sweeping two full turns outward, bright at the
//! core and dimming towards the rim.

use std::f32::consts::PI;

use glam::Vec3;
use rand::Rng;

use crate::cloud::{CloudKind, PointCloud, Rgb};
use crate::error::{ParticleError, require_positive};
use crate::profile::DeviceProfile;

/// Radius of the first point.
pub const SPIRAL_INNER_RADIUS: f32 = 50.0;
/// Radial growth from the first to the last point.
pub const SPIRAL_RADIAL_SPAN: f32 = 300.0;
/// Total sweep angle of the arm.
pub const SPIRAL_SWEEP: f32 = 4.0 * PI;
/// Peak vertical displacement of the arm.
pub const SPIRAL_THICKNESS: f32 = 20.0;

/// Spiral color when the profile disables color variety.
pub const FLAT_SPIRAL_COLOR: Rgb = [0.5, 0.7, 1.0];

const BRIGHTNESS_REFERENCE_RADIUS: f32 = 350.0;
const BRIGHTNESS_FALLOFF: f32 = 0.7;

/// Brightness factor at `radius`: 1 at the centre, falling linearly outward.
pub fn spiral_brightness(radius: f32) -> f32 {
    1.0 - (radius / BRIGHTNESS_REFERENCE_RADIUS) * BRIGHTNESS_FALLOFF
}

/// Color at `radius` for the gradient palette.
pub fn spiral_color(radius: f32) -> Rgb {
    let b = spiral_brightness(radius);
    [0.3 + b * 0.4, 0.5 + b * 0.3, 0.9 + b * 0.1]
}

/// Generate `count` points along the spiral arm.
///
/// The layout is fully deterministic; `rng` is accepted so every generator
/// shares one signature.
pub fn generate_galaxy_spiral<R: Rng + ?Sized>(
    count: usize,
    profile: &DeviceProfile,
    _rng: &mut R,
) -> Result<PointCloud, ParticleError> {
    require_positive("spiral count", count)?;

    let size = CloudKind::Spiral.material(profile).size;
    let mut cloud = PointCloud::with_capacity(count);
    for i in 0..count {
        let fraction = i as f32 / count as f32;
        let t = fraction * SPIRAL_SWEEP;
        let radius = fraction * SPIRAL_RADIAL_SPAN + SPIRAL_INNER_RADIUS;
        let height = (t * 0.5).sin() * SPIRAL_THICKNESS;

        let position = Vec3::new(t.cos() * radius, height, t.sin() * radius);
        let color = if profile.enable_color_variety {
            spiral_color(radius)
        } else {
            FLAT_SPIRAL_COLOR
        };
        cloud.push(position, color, size);
    }

    log::debug!("Generated galaxy spiral with {count} points");
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spiral(count: usize, profile: &DeviceProfile) -> PointCloud {
        generate_galaxy_spiral(count, profile, &mut ChaCha8Rng::seed_from_u64(1)).unwrap()
    }

    fn planar_radius(p: Vec3) -> f32 {
        (p.x * p.x + p.z * p.z).sqrt()
    }

    #[test]
    fn test_spiral_count() {
        let cloud = spiral(1500, &DeviceProfile::default());
        assert_eq!(cloud.len(), 1500);
        assert_eq!(cloud.colors().len(), 4500);
    }

    #[test]
    fn test_radius_grows_linearly() {
        let cloud = spiral(1000, &DeviceProfile::default());
        let first = planar_radius(cloud.position(0));
        let last = planar_radius(cloud.position(999));
        assert!((first - SPIRAL_INNER_RADIUS).abs() < 1e-3);
        assert!(last < SPIRAL_INNER_RADIUS + SPIRAL_RADIAL_SPAN);
        assert!(last > SPIRAL_INNER_RADIUS + SPIRAL_RADIAL_SPAN * 0.99);
    }

    #[test]
    fn test_brightness_non_increasing_with_radius() {
        let cloud = spiral(1500, &DeviceProfile::default());
        let mut samples: Vec<(f32, f32)> = cloud
            .iter_positions()
            .zip(cloud.iter_colors())
            .map(|(p, c)| (planar_radius(p), c.iter().sum()))
            .collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));

        for pair in samples.windows(2) {
            assert!(
                pair[1].1 <= pair[0].1 + 1e-5,
                "brightness rose from {} to {} between radius {} and {}",
                pair[0].1,
                pair[1].1,
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn test_brightness_formula_endpoints() {
        assert_eq!(spiral_brightness(0.0), 1.0);
        assert!((spiral_brightness(350.0) - 0.3).abs() < 1e-6);
        assert!(spiral_brightness(50.0) > spiral_brightness(349.0));
    }

    #[test]
    fn test_height_follows_half_angle_sine() {
        let cloud = spiral(400, &DeviceProfile::default());
        let quarter = cloud.position(100); // t = pi, sin(pi / 2) = 1
        assert!((quarter.y - SPIRAL_THICKNESS).abs() < 1e-3);
    }

    #[test]
    fn test_flat_color_and_sizes() {
        let profile = DeviceProfile::mobile();
        let cloud = spiral(200, &profile);
        assert!(cloud.iter_colors().all(|c| c == FLAT_SPIRAL_COLOR));
        assert!(cloud.sizes().iter().all(|&s| s == 3.0));
    }

    #[test]
    fn test_zero_count_rejected() {
        let result =
            generate_galaxy_spiral(0, &DeviceProfile::default(), &mut ChaCha8Rng::seed_from_u64(1));
        assert!(matches!(result, Err(ParticleError::InvalidArgument(_))));
    }
}
