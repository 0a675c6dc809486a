//! Scripted edit sessions.
//!
//! A script describes the viewport, the area's transform and starting state,
//! and a list of steps replayed through the same entry points an interactive
//! editor uses.

use glam::{EulerRot, Quat, Vec3};
use polyarea_data::Rgba;
use polyarea_edit::{
    Camera, DragEvent, DragPhase, EditError, LocalFrame, PickEvent, Projection, Viewport,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::errors::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub position: Vec3,
    #[serde(default)]
    pub center: Vec3,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_fov() -> f32 {
    60.0
}

impl CameraSpec {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            Camera::new(self.position, self.center),
            Projection::new(
                self.width,
                self.height,
                self.fov_degrees.to_radians(),
                0.1,
                1000.0,
            ),
        )
    }
}

impl Default for CameraSpec {
    /// Top-down view of the origin.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 20.0, 0.0),
            center: Vec3::ZERO,
            width: default_width(),
            height: default_height(),
            fov_degrees: default_fov(),
        }
    }
}

/// Local-to-world transform of the edited area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSpec {
    pub translation: Vec3,
    /// Euler angles in degrees, applied in Y, X, Z order.
    pub rotation_degrees: Vec3,
    pub scale: Vec3,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_degrees: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl FrameSpec {
    pub fn local_frame(&self) -> Result<LocalFrame, EditError> {
        let r = self.rotation_degrees;
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            r.y.to_radians(),
            r.x.to_radians(),
            r.z.to_radians(),
        );
        LocalFrame::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

/// An extra pickable surface, given in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

/// One replayed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Viewport click.
    Pick(PickEvent),
    /// Point handle drag phase.
    Drag(DragEvent),
    /// Direct edits, as an inspector panel would issue them.
    Insert { index: usize, point: Vec3 },
    Remove { index: usize },
    Set { index: usize, point: Vec3 },
    Color(Rgba),
    Clear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditScript {
    #[serde(default)]
    pub camera: CameraSpec,
    #[serde(default)]
    pub frame: FrameSpec,
    /// Height of the ground plane picks land on; `None` disables it.
    #[serde(default = "default_ground")]
    pub ground_height: Option<f32>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub color: Rgba,
    /// Previously saved local-space points.
    #[serde(default)]
    pub points: Vec<Vec3>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_ground() -> Option<f32> {
    Some(0.0)
}

impl EditScript {
    #[tracing::instrument(skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path)?;
        let script: EditScript = serde_json::from_reader(BufReader::new(file))?;
        info!(
            "Loaded script: {} initial points, {} steps",
            script.points.len(),
            script.steps.len()
        );
        Ok(script)
    }

    /// Draw a square by clicking its corners, drag one corner outwards, then
    /// delete another.
    pub fn demo() -> Self {
        let camera = CameraSpec::default();
        let viewport = camera.viewport();
        let click = |world: Vec3| viewport.world_to_screen(world).map(PickEvent::add);

        let corners = [
            Vec3::new(-3.0, 0.0, -3.0),
            Vec3::new(3.0, 0.0, -3.0),
            Vec3::new(3.0, 0.0, 3.0),
            Vec3::new(-3.0, 0.0, 3.0),
        ];
        let mut steps: Vec<Step> = corners
            .iter()
            .filter_map(|&c| click(c))
            .map(Step::Pick)
            .collect();

        let dragged = Vec3::new(5.0, 0.0, 5.0);
        steps.extend([
            Step::Drag(DragEvent::new(2, corners[2], DragPhase::Begin)),
            Step::Drag(DragEvent::new(2, Vec3::new(4.0, 0.0, 4.0), DragPhase::Update)),
            Step::Drag(DragEvent::new(2, dragged, DragPhase::End)),
        ]);
        if let Some(at) = viewport.world_to_screen(corners[3]) {
            steps.push(Step::Pick(PickEvent::delete(at)));
        }

        Self {
            camera,
            frame: FrameSpec::default(),
            ground_height: default_ground(),
            surfaces: Vec::new(),
            color: Rgba::default(),
            points: Vec::new(),
            steps,
        }
    }
}
