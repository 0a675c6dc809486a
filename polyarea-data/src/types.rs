//! Shared value types for polygon areas.
//!
//! These are plain CPU-side values. Renderer-facing layouts with bytemuck
//! derives live in polyarea-mesh.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear RGBA color with components in the 0-1 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    /// Create a color from its four components.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Rgba {
    /// Translucent green, the usual overlay color for an area surface.
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.0, 0.3)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Zero-sized box at the origin, used for cleared meshes.
    pub const ZERO: Aabb = Aabb {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Compute the bounds of a set of positions.
    ///
    /// Returns [`Aabb::ZERO`] when the iterator is empty.
    pub fn from_points(positions: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut count = 0usize;

        for pos in positions {
            min = min.min(pos);
            max = max.max(pos);
            count += 1;
        }

        if count == 0 {
            return Self::ZERO;
        }

        Self { min, max }
    }
}
