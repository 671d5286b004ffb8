//! Point cloud buffers and the per-layer render state handed to the renderer.

use glam::Vec3;

use crate::profile::DeviceProfile;

/// Floats per point in the position buffer.
pub const POSITION_COMPONENTS: usize = 3;
/// Floats per point in the color buffer.
pub const COLOR_COMPONENTS: usize = 3;
/// Floats per point in the size buffer.
pub const SIZE_COMPONENTS: usize = 1;

/// Linear RGB triple.
pub type Rgb = [f32; 3];

/// A fixed-size set of points stored as flat, upload-ready attribute arrays.
///
/// The number of points never changes after construction. The
/// [`needs_upload`](Self::needs_upload) flag is the only signal the renderer
/// gets that CPU-side data changed and must be re-synced.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    positions: Vec<f32>,
    colors: Vec<f32>,
    sizes: Vec<f32>,
    needs_upload: bool,
}

impl PointCloud {
    pub(crate) fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count * POSITION_COMPONENTS),
            colors: Vec::with_capacity(count * COLOR_COMPONENTS),
            sizes: Vec::with_capacity(count * SIZE_COMPONENTS),
            // Freshly generated data has never been uploaded.
            needs_upload: true,
        }
    }

    /// Build a cloud from explicit `(position, color, size)` records.
    pub fn from_points(points: impl IntoIterator<Item = (Vec3, Rgb, f32)>) -> Self {
        let points = points.into_iter();
        let mut cloud = Self::with_capacity(points.size_hint().0);
        for (position, color, size) in points {
            cloud.push(position, color, size);
        }
        cloud
    }

    pub(crate) fn push(&mut self, position: Vec3, color: Rgb, size: f32) {
        self.positions.extend_from_slice(&position.to_array());
        self.colors.extend_from_slice(&color);
        self.sizes.push(size);
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Flat `xyz` position buffer, `len() * 3` floats.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    /// Flat `rgb` color buffer, `len() * 3` floats.
    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    /// Per-point size buffer, `len()` floats.
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    /// Position of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn position(&self, index: usize) -> Vec3 {
        let i = index * POSITION_COMPONENTS;
        Vec3::from_slice(&self.positions[i..i + POSITION_COMPONENTS])
    }

    /// Color of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn color(&self, index: usize) -> Rgb {
        let i = index * COLOR_COMPONENTS;
        [self.colors[i], self.colors[i + 1], self.colors[i + 2]]
    }

    /// Size of point `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn size(&self, index: usize) -> f32 {
        self.sizes[index]
    }

    /// Iterate over point positions.
    pub fn iter_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.positions
            .chunks_exact(POSITION_COMPONENTS)
            .map(Vec3::from_slice)
    }

    /// Iterate over point colors.
    pub fn iter_colors(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.colors.chunks_exact(COLOR_COMPONENTS).map(|c| [c[0], c[1], c[2]])
    }

    pub(crate) fn set_position(&mut self, index: usize, position: Vec3) {
        let i = index * POSITION_COMPONENTS;
        self.positions[i..i + POSITION_COMPONENTS].copy_from_slice(&position.to_array());
    }

    /// CPU-side data changed since the renderer last synced it.
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// Flag the buffers for re-upload.
    pub fn mark_dirty(&mut self) {
        self.needs_upload = true;
    }

    /// Called by the renderer once the buffers have been synced.
    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }
}

/// How point fragments combine with what is already on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blending {
    /// Standard alpha blending.
    Normal,
    /// Additive blending; overlapping points glow.
    Additive,
}

/// Render parameters shared by every point of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMaterial {
    /// Base point size.
    pub size: f32,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// Blend mode.
    pub blending: Blending,
    /// Scale points with distance from the camera.
    pub size_attenuation: bool,
}

/// Object-space transform applied to a whole layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Translation.
    pub position: Vec3,
    /// Euler rotation in radians, XYZ order.
    pub rotation: Vec3,
}

/// The kinds of point clouds the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudKind {
    /// Spherical shell of stars.
    StarField,
    /// One cubic nebula cluster.
    Nebula,
    /// Galaxy spiral arm.
    Spiral,
    /// Dim dust volume.
    Dust,
    /// Drifting particles with velocities.
    Floating,
    /// One layer of a cosmic burst.
    Burst {
        /// Layer index, `0..BURST_LAYERS`.
        layer: usize,
    },
}

impl CloudKind {
    /// Default material for this kind on the given device.
    pub fn material(self, profile: &DeviceProfile) -> PointMaterial {
        let blending = if profile.additive_blending {
            Blending::Additive
        } else {
            Blending::Normal
        };
        let (size, opacity, size_attenuation) = match self {
            Self::StarField => (2.0, 0.8, true),
            Self::Nebula => (5.0, 0.3, true),
            Self::Spiral => (3.0, 0.6, true),
            Self::Dust => (0.8, 0.4, true),
            Self::Floating => (4.0, 0.8, true),
            Self::Burst { layer } => {
                // Bursts always glow, regardless of device.
                return PointMaterial {
                    size: 6.0 + 2.0 * layer as f32,
                    opacity: 1.0,
                    blending: Blending::Additive,
                    size_attenuation: true,
                };
            }
        };
        PointMaterial {
            size,
            opacity,
            blending,
            size_attenuation,
        }
    }
}

/// A point cloud together with the state the renderer needs to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudLayer {
    /// What this layer represents.
    pub kind: CloudKind,
    /// Attribute buffers.
    pub cloud: PointCloud,
    /// Layer material.
    pub material: PointMaterial,
    /// Layer transform.
    pub transform: Transform,
    /// Hidden layers are still animated but should not be drawn.
    pub visible: bool,
}

impl CloudLayer {
    /// Wrap a cloud with the default material for `kind`.
    pub fn new(kind: CloudKind, cloud: PointCloud, profile: &DeviceProfile) -> Self {
        Self {
            kind,
            cloud,
            material: kind.material(profile),
            transform: Transform::default(),
            visible: true,
        }
    }
}
