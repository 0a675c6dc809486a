//! Polyarea Edit Crate
//!
//! Interactive editing of polygon areas: screen-to-world picking, raycasting
//! against scene surfaces, and the controller that turns add/delete clicks
//! and point drags into point set edits with immediate mesh regeneration.

pub mod area;
pub mod camera;
pub mod controller;
pub mod error;
pub mod frame;
pub mod input;
pub mod raycast;

pub use area::EditableArea;
pub use camera::{Camera, Projection, Viewport};
pub use controller::{
    DeletePolicy, EditConfig, EditContext, EditOutcome, GestureState, PointEditingController,
};
pub use error::EditError;
pub use frame::LocalFrame;
pub use input::{DragEvent, DragPhase, PickEvent, PickModifier};
pub use raycast::{GroundPlane, Ray, RaycastHit, Scene, SceneRaycast, TriangleSurface};
