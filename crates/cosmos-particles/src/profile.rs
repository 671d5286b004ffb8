//! Device capability detection and the immutable [`DeviceProfile`] every
//! generator reads from.
//!
//! The profile is selected once at startup from a coarse classification of the
//! client (desktop, mobile, legacy mobile) and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;

use crate::error::ParticleError;

/// iOS major versions below this are treated as legacy hardware.
const LEGACY_IOS_MAJOR: u32 = 13;

/// Devices reporting fewer logical cores than this count as constrained.
const MIN_HARDWARE_CONCURRENCY: u32 = 4;

/// Upper bound on the render pixel ratio for desktop profiles.
const MAX_DESKTOP_PIXEL_RATIO: f32 = 2.0;

/// Coarse device classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// Desktop or laptop browser.
    Desktop,
    /// Phone or tablet.
    Mobile,
    /// iOS device older than iOS 13.
    LegacyMobile,
}

impl DeviceClass {
    /// Classify a client from its user agent string.
    pub fn detect(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        let is_ios = ["iphone", "ipad", "ipod"].iter().any(|m| ua.contains(m));
        let is_mobile = is_ios || ua.contains("android");

        if is_ios && ios_major_version(user_agent).unwrap_or(0) < LEGACY_IOS_MAJOR {
            Self::LegacyMobile
        } else if is_mobile {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Whether this class takes the reduced mobile code paths.
    pub fn is_mobile(self) -> bool {
        !matches!(self, Self::Desktop)
    }

    /// Canonical lowercase name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::LegacyMobile => "legacy-mobile",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeviceClass {
    type Err = ParticleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            "legacy-mobile" | "legacy" => Ok(Self::LegacyMobile),
            other => Err(ParticleError::UnknownDeviceClass(other.to_string())),
        }
    }
}

/// Parse the major version out of an iOS user agent's `OS <major>_<minor>` token.
fn ios_major_version(user_agent: &str) -> Option<u32> {
    user_agent.match_indices("OS ").find_map(|(idx, _)| {
        let rest = &user_agent[idx + 3..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() || !rest[digits.len()..].starts_with('_') {
            return None;
        }
        digits.parse().ok()
    })
}

/// Raw client facts reported by the host page.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// Browser user agent.
    pub user_agent: String,
    /// Number of logical cores reported by the client.
    pub hardware_concurrency: u32,
    /// Native device pixel ratio.
    pub device_pixel_ratio: f32,
}

impl DeviceCapabilities {
    /// Classification derived from the user agent.
    pub fn class(&self) -> DeviceClass {
        DeviceClass::detect(&self.user_agent)
    }

    /// Hosts should warn the user that some effects are disabled.
    pub fn is_constrained(&self) -> bool {
        match self.class() {
            DeviceClass::LegacyMobile => true,
            DeviceClass::Mobile => self.hardware_concurrency < MIN_HARDWARE_CONCURRENCY,
            DeviceClass::Desktop => false,
        }
    }

    /// The background should not be built at all on this device.
    pub fn should_skip_background(&self) -> bool {
        self.class() == DeviceClass::LegacyMobile
            && self.hardware_concurrency < MIN_HARDWARE_CONCURRENCY
    }
}

/// Immutable configuration snapshot driving particle counts and visual features.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    /// Class this profile was derived from.
    pub class: DeviceClass,
    /// Points in the star field.
    pub star_count: usize,
    /// Number of nebula clusters.
    pub nebula_cloud_count: usize,
    /// Points in each nebula cluster.
    pub nebula_points_per_cloud: usize,
    /// Points along the galaxy spiral.
    pub spiral_count: usize,
    /// Points in the cosmic dust volume.
    pub dust_count: usize,
    /// Floating particles with persistent velocities.
    pub particle_count: usize,
    /// Per-axis velocity magnitude of floating particles (units per reference frame).
    pub particle_speed: Vec3,
    /// Use multi-palette colours; otherwise every cloud gets one flat colour.
    pub enable_color_variety: bool,
    /// Blend points additively; constrained devices use normal blending.
    pub additive_blending: bool,
    /// Request an antialiased render surface.
    pub antialias: bool,
    /// Shadow map resolution in texels.
    pub shadow_map_size: u32,
    /// Render pixel ratio.
    pub pixel_ratio: f32,
    /// Enable shadow mapping.
    pub enable_shadows: bool,
    /// Enable exponential fog.
    pub enable_fog: bool,
    /// Enable bloom post-processing.
    pub enable_bloom: bool,
    /// Use the three-point light rig instead of a single ambient light.
    pub enable_advanced_lighting: bool,
    /// Maximum number of dynamic lights.
    pub max_lights: u32,
    /// Frame rate the host should aim for.
    pub target_fps: u32,
}

impl DeviceProfile {
    /// Select the profile for the given client.
    pub fn select(capabilities: &DeviceCapabilities) -> Self {
        Self::for_class(capabilities.class(), capabilities.device_pixel_ratio)
    }

    /// Profile preset for a device class.
    pub fn for_class(class: DeviceClass, device_pixel_ratio: f32) -> Self {
        match class {
            DeviceClass::Desktop => Self::desktop(device_pixel_ratio),
            DeviceClass::Mobile => Self::mobile(),
            DeviceClass::LegacyMobile => Self::legacy_mobile(),
        }
    }

    /// Full-quality desktop preset.
    pub fn desktop(device_pixel_ratio: f32) -> Self {
        Self {
            class: DeviceClass::Desktop,
            star_count: 2000,
            nebula_cloud_count: 3,
            nebula_points_per_cloud: 500,
            spiral_count: 1500,
            dust_count: 200,
            particle_count: 5000,
            particle_speed: Vec3::new(0.5, 0.5, 0.3),
            enable_color_variety: true,
            additive_blending: true,
            antialias: true,
            shadow_map_size: 2048,
            pixel_ratio: device_pixel_ratio.min(MAX_DESKTOP_PIXEL_RATIO),
            enable_shadows: true,
            enable_fog: true,
            enable_bloom: true,
            enable_advanced_lighting: true,
            max_lights: 3,
            target_fps: 60,
        }
    }

    /// Reduced preset for phones and tablets.
    pub fn mobile() -> Self {
        Self {
            class: DeviceClass::Mobile,
            star_count: 300,
            nebula_cloud_count: 1,
            nebula_points_per_cloud: 100,
            spiral_count: 200,
            dust_count: 50,
            particle_count: 500,
            particle_speed: Vec3::new(0.2, 0.2, 0.1),
            enable_color_variety: false,
            additive_blending: false,
            antialias: false,
            shadow_map_size: 512,
            pixel_ratio: 1.0,
            enable_shadows: false,
            enable_fog: false,
            enable_bloom: false,
            enable_advanced_lighting: false,
            max_lights: 1,
            target_fps: 30,
        }
    }

    /// Minimal preset for pre-iOS 13 devices.
    pub fn legacy_mobile() -> Self {
        Self {
            class: DeviceClass::LegacyMobile,
            star_count: 100,
            nebula_points_per_cloud: 50,
            spiral_count: 100,
            ..Self::mobile()
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::desktop(1.0)
    }
}
