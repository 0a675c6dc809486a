use glam::{Mat4, Vec2, Vec3};

use crate::raycast::Ray;

/// Camera pose representing position and look-at target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    /// Center/focus point the camera looks at.
    pub center: Vec3,
    /// Camera position in world space.
    pub position: Vec3,
}

impl CameraPose {
    /// Create a new camera pose.
    pub fn new(position: Vec3, center: Vec3) -> Self {
        Self { center, position }
    }

    /// Unit viewing direction.
    pub fn forward(&self) -> Vec3 {
        (self.center - self.position).normalize_or_zero()
    }
}

/// Camera that manages position and view matrix.
#[derive(Debug, Clone)]
pub struct Camera {
    pose: CameraPose,
}

impl Camera {
    /// Creates a camera at the given position looking at the center.
    pub fn new(position: Vec3, center: Vec3) -> Self {
        Self {
            pose: CameraPose::new(position, center),
        }
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        let forward = self.pose.forward();
        // Looking straight up or down: world Y cannot serve as the up hint.
        let right = forward.cross(Vec3::Y);
        let up = if right.length_squared() < 1e-8 {
            if forward.y < 0.0 { Vec3::NEG_Z } else { Vec3::Z }
        } else {
            right.cross(forward).normalize()
        };
        Mat4::look_to_rh(self.pose.position, forward, up)
    }
}

/// Projection matrix configuration.
#[derive(Debug, Clone)]
pub struct Projection {
    width: u32,
    height: u32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Projection {
    /// Create a new projection. `fov` is the vertical field of view in radians.
    pub fn new(width: u32, height: u32, fov: f32, near: f32, far: f32) -> Self {
        Self {
            width,
            height,
            fov,
            near,
            far,
        }
    }

    /// Get the projection matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov,
            self.width.max(1) as f32 / self.height.max(1) as f32,
            self.near,
            self.far,
        )
    }

    /// Update the projection size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Viewport size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Camera plus projection: converts between screen pixels and world space.
///
/// Screen coordinates have their origin at the top-left corner with y growing
/// downwards, as delivered by windowing toolkits.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub camera: Camera,
    pub projection: Projection,
}

impl Viewport {
    pub fn new(camera: Camera, projection: Projection) -> Self {
        Self { camera, projection }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection.matrix() * self.camera.view_matrix()
    }

    /// Ray from the near plane through the given pixel.
    ///
    /// Returns `None` for an empty viewport or a non-invertible camera.
    pub fn screen_ray(&self, screen: Vec2) -> Option<Ray> {
        let (width, height) = self.projection.size();
        if width == 0 || height == 0 {
            return None;
        }

        let ndc = Vec2::new(
            2.0 * screen.x / width as f32 - 1.0,
            1.0 - 2.0 * screen.y / height as f32,
        );
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));

        let direction = (far - near).normalize_or_zero();
        if !near.is_finite() || direction == Vec3::ZERO {
            return None;
        }
        Some(Ray::new(near, direction))
    }

    /// Pixel position of a world-space point, or `None` if it is behind the camera.
    pub fn world_to_screen(&self, world: Vec3) -> Option<Vec2> {
        let (width, height) = self.projection.size();
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width as f32,
            (1.0 - ndc.y) * 0.5 * height as f32,
        ))
    }
}
