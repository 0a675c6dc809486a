//! Error types for editing operations.

use polyarea_data::PointSetError;
use thiserror::Error;

/// Errors that can occur while editing an area.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("Point set error: {0}")]
    PointSet(#[from] PointSetError),

    #[error("No drag gesture is in progress")]
    NotDragging,

    #[error("Drag gesture is editing point {active}, not point {requested}")]
    DragIndexMismatch { active: usize, requested: usize },

    #[error("Points changed while point {index} was being dragged")]
    PointsChangedDuringDrag { index: usize },

    #[error("Local frame transform is not invertible")]
    SingularTransform,
}
