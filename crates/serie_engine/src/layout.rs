//! Series layout
//!
//! Geometry shared by the binders: chart bounds, screen points, and the
//! pluggable computation of a series' layout centre.

use crate::model::Serie;
use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

/// A rectangle in layout coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutRect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Get the bottom-left origin of the rectangle
    pub fn origin(&self) -> LayoutPoint {
        LayoutPoint::new(self.x, self.y)
    }

    /// Get the center X coordinate
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Get the center Y coordinate
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// A point in layout coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub const ZERO: LayoutPoint = LayoutPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for LayoutPoint {
    type Output = LayoutPoint;

    fn add(self, rhs: LayoutPoint) -> LayoutPoint {
        LayoutPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for LayoutPoint {
    type Output = LayoutPoint;

    fn sub(self, rhs: LayoutPoint) -> LayoutPoint {
        LayoutPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for LayoutPoint {
    type Output = LayoutPoint;

    fn neg(self) -> LayoutPoint {
        LayoutPoint::new(-self.x, -self.y)
    }
}

/// Computes layout information the binders need from the chart
pub trait SerieLayout {
    /// Compute the layout centre of a series inside the chart bounds
    fn compute_center(&self, serie: &Serie, bounds: &LayoutRect) -> LayoutPoint;
}

/// Resolves `Serie::center` against the chart bounds.
///
/// Each component at or below `1.0` is a ratio of the chart width/height,
/// anything larger is an absolute pixel offset from the chart origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct CenterLayout;

impl SerieLayout for CenterLayout {
    fn compute_center(&self, serie: &Serie, bounds: &LayoutRect) -> LayoutPoint {
        let [cx, cy] = serie.center;
        let x = if cx <= 1.0 { bounds.width * cx } else { cx };
        let y = if cy <= 1.0 { bounds.height * cy } else { cy };
        bounds.origin() + LayoutPoint::new(x, y)
    }
}
