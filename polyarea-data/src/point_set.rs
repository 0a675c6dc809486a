//! Ordered, mutable polygon vertex storage.
//!
//! All edits go through the methods on [`PointSet`]; the backing vector is
//! never handed out mutably so every edit path bumps the same revision.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by point set edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PointSetError {
    #[error("Point index {index} is out of range for a set of {len} points")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Ordered polygon vertices in the owning entity's local frame.
///
/// Insertion order defines the polygon winding and the fan origin (index 0).
/// Coincident points are allowed and there is no upper bound on the count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointSet {
    points: Vec<Vec3>,
    #[serde(skip)]
    revision: u64,
}

impl PointSet {
    /// Create an empty point set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a point set from existing points, e.g. restored state.
    pub fn from_points(points: impl Into<Vec<Vec3>>) -> Self {
        Self {
            points: points.into(),
            revision: 0,
        }
    }

    /// Append a point. Always succeeds.
    pub fn add(&mut self, point: Vec3) {
        self.points.push(point);
        self.touch();
    }

    /// Insert a point before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, point: Vec3) -> Result<(), PointSetError> {
        if index > self.points.len() {
            return Err(self.out_of_range(index));
        }
        self.points.insert(index, point);
        self.touch();
        Ok(())
    }

    /// Remove the point at `index`, shifting later points down by one.
    pub fn remove_at(&mut self, index: usize) -> Result<Vec3, PointSetError> {
        self.check_index(index)?;
        let removed = self.points.remove(index);
        self.touch();
        Ok(removed)
    }

    /// Replace the point at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, point: Vec3) -> Result<Vec3, PointSetError> {
        self.check_index(index)?;
        let previous = std::mem::replace(&mut self.points[index], point);
        self.touch();
        Ok(previous)
    }

    /// Remove every point.
    pub fn clear(&mut self) {
        if !self.points.is_empty() {
            self.points.clear();
            self.touch();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.points.iter().copied()
    }

    /// Counter bumped by every successful mutation.
    ///
    /// Consumers compare it with the revision they last synchronized to.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    fn check_index(&self, index: usize) -> Result<(), PointSetError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(self.out_of_range(index))
        }
    }

    fn out_of_range(&self, index: usize) -> PointSetError {
        PointSetError::IndexOutOfRange {
            index,
            len: self.points.len(),
        }
    }
}
