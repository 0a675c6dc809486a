//! Input events consumed by the editing controller.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Modifier held while clicking in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickModifier {
    #[default]
    None,
    Add,
    Delete,
}

/// A click in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickEvent {
    /// Pointer position in pixels, top-left origin.
    pub position: Vec2,
    #[serde(default)]
    pub modifier: PickModifier,
}

impl PickEvent {
    pub fn new(position: Vec2, modifier: PickModifier) -> Self {
        Self { position, modifier }
    }

    pub fn add(position: Vec2) -> Self {
        Self::new(position, PickModifier::Add)
    }

    pub fn delete(position: Vec2) -> Self {
        Self::new(position, PickModifier::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    Begin,
    Update,
    End,
    Cancel,
}

/// A point handle being dragged to a new world position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub index: usize,
    pub world_position: Vec3,
    pub phase: DragPhase,
}

impl DragEvent {
    pub fn new(index: usize, world_position: Vec3, phase: DragPhase) -> Self {
        Self {
            index,
            world_position,
            phase,
        }
    }
}
