//! Shaders, materials and per-renderer state.

use crate::resource::Handle;
use polyarea_data::Rgba;

/// Name of the flat, unlit color shader area surfaces are drawn with.
pub const UNLIT_COLOR_SHADER: &str = "polyarea/unlit-color";

/// A shader known to the renderer, identified by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    name: String,
}

impl Shader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Material instance bound to a shader.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    shader: Handle<Shader>,
    color: Rgba,
}

impl Material {
    pub fn new(shader: Handle<Shader>) -> Self {
        Self {
            shader,
            color: Rgba::WHITE,
        }
    }

    pub fn shader(&self) -> Handle<Shader> {
        self.shader
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }
}

/// How a mesh is drawn: which material and whether it takes part in shadows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderState {
    pub material: Option<Handle<Material>>,
    pub cast_shadows: bool,
    pub receive_shadows: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            material: None,
            cast_shadows: true,
            receive_shadows: true,
        }
    }
}

impl RenderState {
    /// Flat overlay surface: never casts or receives shadows.
    pub fn overlay(material: Option<Handle<Material>>) -> Self {
        Self {
            material,
            cast_shadows: false,
            receive_shadows: false,
        }
    }
}
