// Core data structures for track outlines

use serde::{Deserialize, Serialize};

use crate::errors::CircleMapError;

/// Track outline as delivered by a track map source.
///
/// The two axes are stored separately and must have the same length. Any other
/// fields in the payload are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RawTrackMap {
    /// X coordinate of every outline sample, in path order
    pub x: Vec<f64>,
    /// Y coordinate of every outline sample, in path order
    pub y: Vec<f64>,
    /// Base rotation of the circuit in degrees
    #[serde(default)]
    pub rotation: f64,
}

impl RawTrackMap {
    pub fn new(x: Vec<f64>, y: Vec<f64>, rotation: f64) -> Self {
        Self { x, y, rotation }
    }

    /// Pair up the two axes into outline points.
    pub fn points(&self) -> Result<Vec<Point2D>, CircleMapError> {
        if self.x.len() != self.y.len() {
            return Err(CircleMapError::MismatchedOutline {
                x_len: self.x.len(),
                y_len: self.y.len(),
            });
        }

        self.x
            .iter()
            .zip(self.y.iter())
            .enumerate()
            .map(|(index, (&x, &y))| {
                if x.is_finite() && y.is_finite() {
                    Ok(Point2D::new(x, y))
                } else {
                    Err(CircleMapError::InvalidOutline {
                        reason: format!("non-finite point at index {}: ({}, {})", index, x, y),
                    })
                }
            })
            .collect()
    }
}

/// A 2D coordinate
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// Axis aligned bounds of a set of points
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn from_points(points: &[Point2D]) -> Self {
        let mut bbox = Self::new();
        for point in points {
            bbox.update(*point);
        }
        bbox
    }

    pub fn update(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Half of the width and height, measured from the origin.
    ///
    /// This is the rotation pivot used for track outlines. It only matches the
    /// visual center when the outline's minimum corner sits at the origin.
    pub fn half_extent(&self) -> Point2D {
        Point2D::new(self.width() / 2.0, self.height() / 2.0)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}
