// Normalization of raw track outlines into the circle map frame

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::CircleMapError;

use super::types::{BoundingBox, Point2D, RawTrackMap};

/// Quarter turn applied on top of the circuit's base rotation so the start/finish
/// straight lines up with the display orientation.
pub const ROTATION_CORRECTION_DEG: f64 = 90.0;

/// Minimum number of outline points needed before cars can be projected.
pub const MIN_OUTLINE_POINTS: usize = 2;

/// Rotate `point` by `degrees` around `center`.
pub fn rotate(point: Point2D, center: Point2D, degrees: f64) -> Point2D {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Point2D::new(
        center.x + dx * cos - dy * sin,
        center.y + dx * sin + dy * cos,
    )
}

/// Pivot and rotation shared by the outline and every live car position of a circuit
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub center: Point2D,
    pub rotation_deg: f64,
}

impl Transform {
    pub fn apply(&self, point: Point2D) -> Point2D {
        rotate(point, self.center, self.rotation_deg)
    }

    /// Undo [`Transform::apply`].
    pub fn invert(&self, point: Point2D) -> Point2D {
        rotate(point, self.center, -self.rotation_deg)
    }
}

/// Outline of a circuit in the rotated frame, with the transform that produced it
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizedTrack {
    pub outline: Vec<Point2D>,
    pub transform: Transform,
}

impl NormalizedTrack {
    pub fn len(&self) -> usize {
        self.outline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outline.is_empty()
    }
}

/// Turns a raw outline into a [`NormalizedTrack`].
#[derive(Debug, Clone)]
pub struct CoordinateNormalizer {
    rotation_correction_deg: f64,
}

impl Default for CoordinateNormalizer {
    fn default() -> Self {
        Self {
            rotation_correction_deg: ROTATION_CORRECTION_DEG,
        }
    }
}

impl CoordinateNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rotation_correction(rotation_correction_deg: f64) -> Self {
        Self {
            rotation_correction_deg,
        }
    }

    /// Compute the transform for `raw` and rotate every outline point with it.
    ///
    /// The pivot is half the bounding box extent on each axis and the rotation is
    /// the circuit's base rotation plus the fixed correction. Point count and
    /// order are preserved.
    ///
    /// # Errors
    ///
    /// Returns [`CircleMapError::InsufficientData`] when the outline has fewer than
    /// two points, and a validation error when the axes are mismatched or hold
    /// non-finite values.
    pub fn normalize(&self, raw: &RawTrackMap) -> Result<NormalizedTrack, CircleMapError> {
        let points = raw.points()?;
        if points.len() < MIN_OUTLINE_POINTS {
            return Err(CircleMapError::InsufficientData {
                points: points.len(),
            });
        }

        let bbox = BoundingBox::from_points(&points);
        let transform = Transform {
            center: bbox.half_extent(),
            rotation_deg: raw.rotation + self.rotation_correction_deg,
        };
        debug!(
            "Track bounds {:.1}x{:.1}, pivot ({:.1}, {:.1})",
            bbox.width(),
            bbox.height(),
            transform.center.x,
            transform.center.y
        );

        let outline = points.into_iter().map(|p| transform.apply(p)).collect();

        info!(
            "Normalized outline with {} points, rotation {:.1} deg",
            raw.x.len(),
            transform.rotation_deg
        );
        Ok(NormalizedTrack { outline, transform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn square() -> RawTrackMap {
        RawTrackMap::new(
            vec![0.0, 10.0, 10.0, 0.0],
            vec![0.0, 0.0, 10.0, 10.0],
            0.0,
        )
    }

    fn assert_point_eq(actual: Point2D, expected: Point2D) {
        assert_abs_diff_eq!(actual.x, expected.x, epsilon = 1e-9);
        assert_abs_diff_eq!(actual.y, expected.y, epsilon = 1e-9);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate(Point2D::new(1.0, 0.0), Point2D::new(0.0, 0.0), 90.0);
        assert_point_eq(rotated, Point2D::new(0.0, 1.0));
    }

    #[test]
    fn test_rotate_around_pivot() {
        let rotated = rotate(Point2D::new(10.0, 5.0), Point2D::new(5.0, 5.0), 180.0);
        assert_point_eq(rotated, Point2D::new(0.0, 5.0));
    }

    #[test]
    fn test_normalize_square() {
        let track = CoordinateNormalizer::new().normalize(&square()).unwrap();

        assert_eq!(track.transform.center, Point2D::new(5.0, 5.0));
        assert_eq!(track.transform.rotation_deg, 90.0);
        assert_eq!(track.len(), 4);
        assert_point_eq(track.outline[0], Point2D::new(10.0, 0.0));
        assert_point_eq(track.outline[1], Point2D::new(10.0, 10.0));
        assert_point_eq(track.outline[2], Point2D::new(0.0, 10.0));
        assert_point_eq(track.outline[3], Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_normalize_adds_base_rotation() {
        let mut raw = square();
        raw.rotation = 45.0;
        let track = CoordinateNormalizer::new().normalize(&raw).unwrap();

        assert_eq!(track.transform.rotation_deg, 135.0);
    }

    #[test]
    fn test_center_uses_half_extent() {
        // offset outline: the pivot is not the geometric center
        let raw = RawTrackMap::new(vec![100.0, 110.0], vec![50.0, 70.0], 0.0);
        let track = CoordinateNormalizer::new().normalize(&raw).unwrap();

        assert_eq!(track.transform.center, Point2D::new(5.0, 10.0));
    }

    #[test]
    fn test_normalize_insufficient_points() {
        let normalizer = CoordinateNormalizer::new();

        let empty = RawTrackMap::new(vec![], vec![], 0.0);
        assert!(matches!(
            normalizer.normalize(&empty),
            Err(CircleMapError::InsufficientData { points: 0 })
        ));

        let single = RawTrackMap::new(vec![1.0], vec![1.0], 0.0);
        assert!(matches!(
            normalizer.normalize(&single),
            Err(CircleMapError::InsufficientData { points: 1 })
        ));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer = CoordinateNormalizer::new();
        assert_eq!(
            normalizer.normalize(&square()).unwrap(),
            normalizer.normalize(&square()).unwrap()
        );
    }

    #[test]
    fn test_custom_rotation_correction() {
        let track = CoordinateNormalizer::with_rotation_correction(0.0)
            .normalize(&square())
            .unwrap();

        assert_eq!(track.transform.rotation_deg, 0.0);
        assert_point_eq(track.outline[1], Point2D::new(10.0, 0.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_normalize_preserves_count_and_inverts(
            coords in prop::collection::vec((-10_000.0f64..10_000.0, -10_000.0f64..10_000.0), 2..200),
            base_rotation in -360.0f64..360.0,
        ) {
            let (x, y): (Vec<f64>, Vec<f64>) = coords.iter().cloned().unzip();
            let raw = RawTrackMap::new(x, y, base_rotation);
            let track = CoordinateNormalizer::new().normalize(&raw).unwrap();

            prop_assert_eq!(track.len(), coords.len());
            for (rotated, (x, y)) in track.outline.iter().zip(coords.iter()) {
                let restored = track.transform.invert(*rotated);
                prop_assert!((restored.x - x).abs() < 1e-6);
                prop_assert!((restored.y - y).abs() < 1e-6);
            }
        }
    }
}
