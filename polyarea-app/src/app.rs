use polyarea_data::{Aabb, PointSet, Rgba};
use polyarea_edit::{
    EditConfig, EditContext, EditError, EditOutcome, EditableArea, GroundPlane,
    PointEditingController, Scene, TriangleSurface, Viewport,
};
use polyarea_mesh::{GpuVertex, ResourceRegistry};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::script::{EditScript, Step};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub enable_tracy: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_tracy: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Script to replay; the built-in demo runs when absent.
    pub script: Option<PathBuf>,
    pub edit: EditConfig,
    /// Abort on the first rejected step instead of skipping it.
    pub strict: bool,
    pub pretty: bool,
    pub logging: LoggingConfig,
}

/// Summary of the area mesh after a session.
#[derive(Debug, Clone, Serialize)]
pub struct MeshReport {
    pub points: PointSet,
    pub visible: bool,
    pub vertices: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub normals: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
    /// Upload sizes of the interleaved vertex and index buffers.
    pub vertex_buffer_bytes: usize,
    pub index_buffer_bytes: usize,
    pub bounds: Option<[[f32; 3]; 2]>,
    pub color: Option<Rgba>,
    pub cast_shadows: bool,
    pub mesh_version: u64,
    pub rejected_steps: usize,
}

/// A live edit session: one area, its controller and the picking world.
pub struct Session {
    registry: ResourceRegistry,
    viewport: Viewport,
    scene: Scene,
    area: EditableArea,
    controller: PointEditingController,
    rejected: usize,
}

impl Session {
    pub fn new(script: &EditScript, edit: EditConfig) -> Result<Self, AppError> {
        let mut registry = ResourceRegistry::with_default_shaders();

        let mut scene = Scene::new();
        if let Some(height) = script.ground_height {
            scene.add_surface(GroundPlane::horizontal(height));
        }
        for surface in &script.surfaces {
            let surface = TriangleSurface::new(surface.positions.clone(), &surface.indices);
            debug!("Pick surface with {} triangles", surface.triangle_count());
            scene.add_surface(surface);
        }
        if scene.is_empty() {
            warn!("No pickable surfaces; add clicks will be ignored");
        } else {
            debug!("Scene has {} pickable surfaces", scene.len());
        }

        let frame = script.frame.local_frame()?;
        let mut area = EditableArea::restore(
            PointSet::from_points(script.points.clone()),
            script.color,
            frame,
        );
        area.initialize(&mut registry);

        Ok(Self {
            registry,
            viewport: script.camera.viewport(),
            scene,
            area,
            controller: PointEditingController::new(edit),
            rejected: 0,
        })
    }

    pub fn apply(&mut self, step: &Step) -> Result<EditOutcome, EditError> {
        let registry = &mut self.registry;
        let area = &mut self.area;
        match step {
            Step::Pick(event) => {
                let ctx = EditContext::new(&self.viewport, &self.scene);
                self.controller.handle_pick(event, &ctx, area, registry)
            }
            Step::Drag(event) => self.controller.handle_drag(event, area, registry),
            Step::Insert { index, point } => {
                area.insert_point(registry, *index, *point)?;
                Ok(EditOutcome::Added {
                    index: *index,
                    local: *point,
                })
            }
            Step::Remove { index } => {
                let local = area.remove_point(registry, *index)?;
                Ok(EditOutcome::Removed {
                    index: *index,
                    local,
                })
            }
            Step::Set { index, point } => {
                let from = area.move_point(registry, *index, *point)?;
                Ok(EditOutcome::Moved {
                    index: *index,
                    from,
                    to: *point,
                })
            }
            Step::Color(color) => {
                area.set_color(registry, *color);
                Ok(EditOutcome::Ignored)
            }
            Step::Clear => {
                area.clear_points(registry);
                Ok(EditOutcome::Ignored)
            }
        }
    }

    /// Replay steps in order. Rejected steps leave the area untouched.
    pub fn replay(&mut self, steps: &[Step], strict: bool) -> Result<(), AppError> {
        for (i, step) in steps.iter().enumerate() {
            match self.apply(step) {
                Ok(outcome) if outcome.is_mutation() => {
                    info!("Step {}: {:?} ({} points)", i, outcome, self.area.points().len());
                }
                Ok(outcome) => {
                    debug!("Step {}: {:?} ({:?})", i, outcome, self.controller.state());
                }
                Err(source) if strict => return Err(AppError::Step { step: i, source }),
                Err(e) => {
                    warn!("Step {} rejected: {}", i, e);
                    self.rejected += 1;
                }
            }
        }
        Ok(())
    }

    pub fn report(&self) -> MeshReport {
        let mesh = self
            .area
            .mesh_handle()
            .and_then(|handle| self.registry.mesh(handle));
        let material = self
            .area
            .sync()
            .material_handle()
            .and_then(|handle| self.registry.material(handle));

        let to_arrays = |v: &[glam::Vec3]| v.iter().map(|p| p.to_array()).collect::<Vec<_>>();
        let bounds = |b: Aabb| [b.min.to_array(), b.max.to_array()];

        MeshReport {
            points: self.area.points().clone(),
            visible: mesh.is_some_and(|m| m.visible()),
            vertices: mesh.map(|m| to_arrays(m.vertices())).unwrap_or_default(),
            indices: mesh.map(|m| m.indices().to_vec()).unwrap_or_default(),
            normals: mesh.map(|m| to_arrays(m.normals())).unwrap_or_default(),
            triangles: mesh
                .map(|m| (0..).map_while(|t| m.triangle(t)).collect())
                .unwrap_or_default(),
            vertex_buffer_bytes: mesh
                .map(|m| bytemuck::cast_slice::<GpuVertex, u8>(&m.gpu_vertices()).len())
                .unwrap_or(0),
            index_buffer_bytes: mesh.map(|m| m.index_bytes().len()).unwrap_or(0),
            bounds: mesh.filter(|m| m.visible()).map(|m| bounds(m.bounds())),
            color: material.map(|m| m.color()),
            cast_shadows: self.area.sync().render_state().cast_shadows,
            mesh_version: mesh.map(|m| m.version()).unwrap_or(0),
            rejected_steps: self.rejected,
        }
    }
}

pub fn run(config: AppConfig) -> Result<(), AppError> {
    init_logging(&config.logging);

    let script = match &config.script {
        Some(path) => EditScript::load(path)?,
        None => {
            info!("No script given, running the built-in demo");
            EditScript::demo()
        }
    };

    let mut session = Session::new(&script, config.edit)?;
    session.replay(&script.steps, config.strict)?;

    let report = session.report();
    info!(
        "Final area: {} points, {} triangles, visible: {}",
        report.points.len(),
        report.triangles.len(),
        report.visible
    );

    session.area.release(&mut session.registry);
    debug!(
        "Released area resources ({} meshes, {} materials left)",
        session.registry.mesh_count(),
        session.registry.material_count()
    );

    let json = if config.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    install_subscriber(config);
    if tracy_unavailable(config) {
        warn!("--tracy was given but this build lacks the `tracy` feature; spans are not streamed");
    }
}

fn tracy_unavailable(config: &LoggingConfig) -> bool {
    config.enable_tracy && !cfg!(feature = "tracy")
}

fn install_subscriber(config: &LoggingConfig) {
    #[cfg(feature = "tracy")]
    {
        if config.enable_tracy {
            use tracing_subscriber::Layer;
            use tracing_subscriber::layer::SubscriberExt;
            use tracing_subscriber::util::SubscriberInitExt;
            tracing_subscriber::registry()
                .with(tracing_tracy::TracyLayer::default())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_filter(
                            tracing_subscriber::EnvFilter::try_from_default_env()
                                .unwrap_or_else(|_| config.level.clone().into()),
                        ),
                )
                .init();
            return;
        }
    }

    // stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use polyarea_edit::{DragEvent, DragPhase, PickEvent};

    #[test]
    fn test_demo_session_builds_visible_square() {
        let script = EditScript::demo();
        let mut session = Session::new(&script, EditConfig::default()).unwrap();
        session.replay(&script.steps, true).unwrap();

        let report = session.report();
        // four corners clicked, one deleted
        assert_eq!(report.points.len(), 3);
        assert!(report.visible);
        assert_eq!(report.indices, vec![0, 2, 1]);
        assert_eq!(report.triangles, vec![[0, 2, 1]]);
        assert_eq!(report.vertex_buffer_bytes, 3 * std::mem::size_of::<GpuVertex>());
        assert_eq!(report.index_buffer_bytes, 3 * 4);
        assert!(!report.cast_shadows);
        assert_eq!(report.color, Some(Rgba::default()));
        assert_eq!(report.rejected_steps, 0);

        let dragged = report.points.get(2).unwrap();
        assert!((dragged - Vec3::new(5.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_restored_points_render_without_edits() {
        let script: EditScript =
            serde_json::from_str(r#"{"points": [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]]}"#)
                .unwrap();
        let session = Session::new(&script, EditConfig::default()).unwrap();
        let report = session.report();
        assert!(report.visible);
        assert_eq!(report.indices, vec![0, 2, 1, 0, 3, 2]);
        assert_eq!(report.bounds, Some([[0.0, 0.0, 0.0], [1.0, 0.0, 1.0]]));
    }

    #[test]
    fn test_rejected_steps_are_counted_or_fatal() {
        let script: EditScript = serde_json::from_str(
            r#"{"points": [[0, 0, 0]], "steps": [{"remove": {"index": 5}}, {"remove": {"index": 0}}]}"#,
        )
        .unwrap();

        let mut lenient = Session::new(&script, EditConfig::default()).unwrap();
        lenient.replay(&script.steps, false).unwrap();
        let report = lenient.report();
        assert_eq!(report.rejected_steps, 1);
        assert!(report.points.is_empty());
        assert!(!report.visible);

        let mut strict = Session::new(&script, EditConfig::default()).unwrap();
        let err = strict.replay(&script.steps, true).unwrap_err();
        assert!(matches!(err, AppError::Step { step: 0, .. }));
        assert_eq!(strict.area.points().len(), 1);
    }

    #[test]
    fn test_pick_without_ground_is_ignored() {
        let script = EditScript {
            ground_height: None,
            ..EditScript::demo()
        };
        let mut session = Session::new(&script, EditConfig::default()).unwrap();
        let outcome = session
            .apply(&Step::Pick(PickEvent::add(Vec2::new(400.0, 300.0))))
            .unwrap();
        assert_eq!(outcome, EditOutcome::Ignored);
        assert!(session.area.points().is_empty());
    }

    #[test]
    fn test_drag_end_without_begin_is_rejected() {
        let script: EditScript =
            serde_json::from_str(r#"{"points": [[0, 0, 0], [1, 0, 0], [1, 0, 1]]}"#).unwrap();
        let mut session = Session::new(&script, EditConfig::default()).unwrap();
        let result = session.apply(&Step::Drag(DragEvent::new(0, Vec3::ONE, DragPhase::End)));
        assert_eq!(result, Err(EditError::NotDragging));
    }

    #[test]
    fn test_remove_step_mid_drag_rejects_drag_end() {
        let script: EditScript = serde_json::from_str(
            r#"{
                "points": [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
                "steps": [
                    {"drag": {"index": 2, "world_position": [1, 0, 1], "phase": "begin"}},
                    {"remove": {"index": 0}},
                    {"drag": {"index": 2, "world_position": [9, 9, 9], "phase": "end"}}
                ]
            }"#,
        )
        .unwrap();
        let mut session = Session::new(&script, EditConfig::default()).unwrap();
        session.replay(&script.steps, false).unwrap();

        let report = session.report();
        assert_eq!(report.rejected_steps, 1);
        assert_eq!(
            report.points.points(),
            &[
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0)
            ]
        );
    }

    #[test]
    fn test_tracy_flag_without_feature_is_reported() {
        let requested = LoggingConfig {
            enable_tracy: true,
            ..LoggingConfig::default()
        };
        assert_eq!(tracy_unavailable(&requested), !cfg!(feature = "tracy"));
        assert!(!tracy_unavailable(&LoggingConfig::default()));
    }

    #[test]
    fn test_report_serializes() {
        let session = Session::new(&EditScript::demo(), EditConfig::default()).unwrap();
        let json = serde_json::to_value(session.report()).unwrap();
        assert_eq!(json["visible"], false);
        assert_eq!(json["points"], serde_json::json!([]));
        assert_eq!(json["vertex_buffer_bytes"], 0);
    }
}
