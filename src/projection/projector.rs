// Projection of live car positions onto the normalized outline

use log::debug;
use serde::{Deserialize, Serialize};

use crate::live::{CarPosition, LiveState};
use crate::track_map::{NormalizedTrack, Point2D};

/// A car placed on the circle map
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProjectedCar {
    pub racing_number: String,
    /// Position around the circle, in `[0, 360)`
    pub angle_deg: f64,
    /// Fraction of the outline covered, in `[0, 1)`
    pub progress: f64,
    /// Index of the nearest outline point
    pub outline_index: usize,
    pub label: String,
    pub team_colour: Option<String>,
    /// Interval to the car ahead, as shown by the timing feed
    pub gap_text: Option<String>,
}

/// Index of the outline point closest to `target`.
///
/// Ties go to the lowest index. Returns `None` for an empty outline.
pub fn nearest_point_index(outline: &[Point2D], target: Point2D) -> Option<usize> {
    let mut nearest: Option<(usize, f64)> = None;
    for (index, point) in outline.iter().enumerate() {
        let distance = point.distance_squared(&target);
        match nearest {
            Some((_, best)) if distance >= best => {}
            _ => nearest = Some((index, distance)),
        }
    }
    nearest.map(|(index, _)| index)
}

/// Progress fraction and angle in degrees for an outline index
pub fn progress_angle(index: usize, outline_len: usize) -> (f64, f64) {
    let progress = index as f64 / outline_len as f64;
    let angle = index as f64 * 360.0 / outline_len as f64;
    (progress, angle)
}

fn colour_hex(colour: &str) -> String {
    if colour.starts_with('#') {
        colour.to_string()
    } else {
        format!("#{}", colour)
    }
}

/// Places cars on a normalized outline using the outline's transform
pub struct PositionProjector<'a> {
    track: &'a NormalizedTrack,
}

impl<'a> PositionProjector<'a> {
    pub fn new(track: &'a NormalizedTrack) -> Self {
        Self { track }
    }

    /// Nearest outline index for a raw car position.
    ///
    /// Returns `None` when the outline is empty or the position is not finite.
    pub fn locate(&self, position: &CarPosition) -> Option<usize> {
        if !position.x.is_finite() || !position.y.is_finite() {
            return None;
        }
        let rotated = self
            .track
            .transform
            .apply(Point2D::new(position.x, position.y));
        nearest_point_index(&self.track.outline, rotated)
    }

    /// Project every car with a current position.
    ///
    /// Cars come out in racing number order of the position snapshot; cars
    /// without a position are left out.
    pub fn project(&self, state: &LiveState) -> Vec<ProjectedCar> {
        let outline_len = self.track.len();
        state
            .positions
            .iter()
            .filter_map(|(racing_number, position)| {
                let Some(index) = self.locate(position) else {
                    debug!("Skipping car {} with unusable position", racing_number);
                    return None;
                };
                let (progress, angle_deg) = progress_angle(index, outline_len);
                let driver = state.drivers.get(racing_number);

                Some(ProjectedCar {
                    racing_number: racing_number.clone(),
                    angle_deg,
                    progress,
                    outline_index: index,
                    label: driver
                        .and_then(|d| d.tla.clone())
                        .unwrap_or_else(|| racing_number.clone()),
                    team_colour: driver
                        .and_then(|d| d.team_colour.as_deref())
                        .map(colour_hex),
                    gap_text: state.gap_text(racing_number).map(str::to_string),
                })
            })
            .collect()
    }
}
