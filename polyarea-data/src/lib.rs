//! Polyarea Data Crate
//!
//! Point storage and triangulation for editable polygon areas.
//! This crate is renderer-agnostic and only deals with geometry values.

pub mod point_set;
pub mod triangulation;
pub mod types;

pub use point_set::{PointSet, PointSetError};
pub use triangulation::{MIN_POLYGON_POINTS, fan_triangles, triangle_count, triangulate_fan};
pub use types::{Aabb, Rgba};
