use glam::{Affine3A, Quat, Vec3};

use crate::error::EditError;

/// Local-to-world transform of the entity that owns a point set.
///
/// Points are stored in local space; picks arrive in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    local_to_world: Affine3A,
    world_to_local: Affine3A,
}

impl LocalFrame {
    pub const IDENTITY: LocalFrame = LocalFrame {
        local_to_world: Affine3A::IDENTITY,
        world_to_local: Affine3A::IDENTITY,
    };

    /// Fails if the transform cannot be inverted (e.g. a zero scale axis).
    ///
    /// Degeneracy is judged relative to the axis lengths, so a uniformly tiny
    /// scale is still accepted.
    pub fn new(local_to_world: Affine3A) -> Result<Self, EditError> {
        let m = local_to_world.matrix3;
        let volume = m.x_axis.length() * m.y_axis.length() * m.z_axis.length();
        if !m.is_finite() || m.determinant().abs() <= 1e-6 * volume {
            return Err(EditError::SingularTransform);
        }
        let world_to_local = local_to_world.inverse();
        if !world_to_local.is_finite() {
            return Err(EditError::SingularTransform);
        }
        Ok(Self {
            local_to_world,
            world_to_local,
        })
    }

    pub fn from_scale_rotation_translation(
        scale: Vec3,
        rotation: Quat,
        translation: Vec3,
    ) -> Result<Self, EditError> {
        Self::new(Affine3A::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ))
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.local_to_world.transform_point3(local)
    }

    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.world_to_local.transform_point3(world)
    }
}

impl Default for LocalFrame {
    fn default() -> Self {
        Self::IDENTITY
    }
}
