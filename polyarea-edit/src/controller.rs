//! Viewport gestures to point edits.

use glam::{Vec2, Vec3};
use polyarea_data::PointSetError;
use polyarea_mesh::ResourceRegistry;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::area::EditableArea;
use crate::camera::Viewport;
use crate::error::EditError;
use crate::input::{DragEvent, DragPhase, PickEvent, PickModifier};
use crate::raycast::SceneRaycast;

/// Which point a delete click removes when several lie within the pick radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// The point closest to the pointer.
    #[default]
    Nearest,
    /// The highest-index point within the radius, matching a plain linear
    /// scan that keeps overwriting its candidate.
    LastWithinRadius,
}

/// Tuning for the editing controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditConfig {
    /// Screen-space radius, in pixels, for hitting an existing point.
    pub pick_radius_px: f32,
    /// Longest pointer ray considered when adding points.
    pub max_ray_distance: f32,
    pub delete_policy: DeletePolicy,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            pick_radius_px: 10.0,
            max_ray_distance: f32::MAX,
            delete_policy: DeletePolicy::Nearest,
        }
    }
}

/// Result of feeding one input event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Added { index: usize, local: Vec3 },
    Removed { index: usize, local: Vec3 },
    Moved { index: usize, from: Vec3, to: Vec3 },
    DragStarted { index: usize },
    DragUpdated { index: usize },
    DragCancelled { index: usize },
    /// Valid input that did not change anything (missed ray, empty click).
    Ignored,
}

impl EditOutcome {
    /// Whether the point set was mutated.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            EditOutcome::Added { .. } | EditOutcome::Removed { .. } | EditOutcome::Moved { .. }
        )
    }
}

/// What the pointer is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        index: usize,
        pending: Option<Vec3>,
        /// Point set revision when the drag began.
        revision: u64,
    },
}

/// World the controller picks against.
pub struct EditContext<'a> {
    pub viewport: &'a Viewport,
    pub scene: &'a dyn SceneRaycast,
}

impl<'a> EditContext<'a> {
    pub fn new(viewport: &'a Viewport, scene: &'a dyn SceneRaycast) -> Self {
        Self { viewport, scene }
    }
}

/// Turns picks and drags into edits of an [`EditableArea`].
///
/// Picks are atomic: each one mutates at most once and regenerates the mesh
/// before returning. Only drags span several events, and the point is only
/// written when the drag ends.
#[derive(Debug, Default)]
pub struct PointEditingController {
    config: EditConfig,
    state: GestureState,
}

impl PointEditingController {
    pub fn new(config: EditConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Handle a click. Picks are ignored while a drag is in progress.
    pub fn handle_pick(
        &mut self,
        event: &PickEvent,
        ctx: &EditContext<'_>,
        area: &mut EditableArea,
        registry: &mut ResourceRegistry,
    ) -> Result<EditOutcome, EditError> {
        trace!("Pick {:?} at {:?}", event.modifier, event.position);
        if let GestureState::Dragging { index, .. } = self.state {
            warn!("Ignoring pick while dragging point {}", index);
            return Ok(EditOutcome::Ignored);
        }

        match event.modifier {
            PickModifier::Add => Ok(self.add_at(event.position, ctx, area, registry)),
            PickModifier::Delete => self.delete_at(event.position, ctx.viewport, area, registry),
            PickModifier::None => Ok(EditOutcome::Ignored),
        }
    }

    /// Handle one phase of a point drag.
    pub fn handle_drag(
        &mut self,
        event: &DragEvent,
        area: &mut EditableArea,
        registry: &mut ResourceRegistry,
    ) -> Result<EditOutcome, EditError> {
        match event.phase {
            DragPhase::Begin => {
                if area.points().get(event.index).is_none() {
                    return Err(PointSetError::IndexOutOfRange {
                        index: event.index,
                        len: area.points().len(),
                    }
                    .into());
                }
                if let GestureState::Dragging { index, .. } = self.state {
                    warn!("Drag of point {} replaced by drag of {}", index, event.index);
                }
                self.state = GestureState::Dragging {
                    index: event.index,
                    pending: None,
                    revision: area.points().revision(),
                };
                Ok(EditOutcome::DragStarted { index: event.index })
            }
            DragPhase::Update => {
                let (index, revision) = self.active_drag(event.index)?;
                self.ensure_unchanged(index, revision, area)?;
                self.state = GestureState::Dragging {
                    index,
                    pending: Some(event.world_position),
                    revision,
                };
                Ok(EditOutcome::DragUpdated { index })
            }
            DragPhase::End => {
                let (index, revision) = self.active_drag(event.index)?;
                self.ensure_unchanged(index, revision, area)?;
                self.state = GestureState::Idle;
                let local = area.frame().to_local(event.world_position);
                let from = area.move_point(registry, index, local)?;
                debug!("Moved point {} to {:?}", index, local);
                Ok(EditOutcome::Moved {
                    index,
                    from,
                    to: local,
                })
            }
            DragPhase::Cancel => {
                let (index, _) = self.active_drag(event.index)?;
                self.state = GestureState::Idle;
                Ok(EditOutcome::DragCancelled { index })
            }
        }
    }

    /// Index of the point under `screen`, according to the delete policy.
    pub fn pick_point(&self, screen: Vec2, viewport: &Viewport, area: &EditableArea) -> Option<usize> {
        let radius = self.config.pick_radius_px;
        let within = area.world_points().enumerate().filter_map(|(i, world)| {
            let projected = viewport.world_to_screen(world)?;
            let distance = projected.distance(screen);
            (distance < radius).then_some((i, distance))
        });

        match self.config.delete_policy {
            DeletePolicy::Nearest => within
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i),
            DeletePolicy::LastWithinRadius => within.last().map(|(i, _)| i),
        }
    }

    fn add_at(
        &mut self,
        screen: Vec2,
        ctx: &EditContext<'_>,
        area: &mut EditableArea,
        registry: &mut ResourceRegistry,
    ) -> EditOutcome {
        let Some(ray) = ctx.viewport.screen_ray(screen) else {
            return EditOutcome::Ignored;
        };
        let Some(hit) = ctx.scene.raycast(&ray, self.config.max_ray_distance) else {
            trace!("Add pick at {:?} hit nothing", screen);
            return EditOutcome::Ignored;
        };

        let local = area.frame().to_local(hit.point);
        let index = area.add_point(registry, local);
        debug!("Added point {} at {:?}", index, local);
        EditOutcome::Added { index, local }
    }

    fn delete_at(
        &mut self,
        screen: Vec2,
        viewport: &Viewport,
        area: &mut EditableArea,
        registry: &mut ResourceRegistry,
    ) -> Result<EditOutcome, EditError> {
        let Some(index) = self.pick_point(screen, viewport, area) else {
            return Ok(EditOutcome::Ignored);
        };
        let local = area.remove_point(registry, index)?;
        debug!("Removed point {}", index);
        Ok(EditOutcome::Removed { index, local })
    }

    fn active_drag(&self, requested: usize) -> Result<(usize, u64), EditError> {
        match self.state {
            GestureState::Dragging {
                index, revision, ..
            } if index == requested => Ok((index, revision)),
            GestureState::Dragging { index, .. } => Err(EditError::DragIndexMismatch {
                active: index,
                requested,
            }),
            GestureState::Idle => Err(EditError::NotDragging),
        }
    }

    /// The dragged index only names the same point while the set is unchanged.
    fn ensure_unchanged(
        &mut self,
        index: usize,
        revision: u64,
        area: &EditableArea,
    ) -> Result<(), EditError> {
        if area.points().revision() == revision {
            return Ok(());
        }
        warn!("Points changed while dragging point {}; drag dropped", index);
        self.state = GestureState::Idle;
        Err(EditError::PointsChangedDuringDrag { index })
    }
}
