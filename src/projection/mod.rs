// Projection of live cars onto the circle map and placement of interval labels

pub mod gaps;
pub mod interval;
pub mod projector;

use log::debug;
use serde::{Deserialize, Serialize};

pub use gaps::{GapAnnotation, annotate_gaps, midpoint_angle, order_by_angle};
pub use interval::{Interval, parse_interval};
pub use projector::{PositionProjector, ProjectedCar, nearest_point_index};

use crate::live::LiveState;
use crate::track_map::{NormalizedTrack, TrackStatus};

/// Everything a renderer needs for one update of the circle map
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CircleMapFrame {
    pub status: TrackStatus,
    /// Cars in angle order
    pub cars: Vec<ProjectedCar>,
    pub gaps: Vec<GapAnnotation>,
}

impl CircleMapFrame {
    pub fn empty(status: TrackStatus) -> Self {
        Self {
            status,
            cars: Vec::new(),
            gaps: Vec::new(),
        }
    }
}

/// Build a frame from the current outline and live snapshot.
///
/// Without an outline the frame is empty and reports `status` (or `NotReady`
/// if `status` claims the track is ready).
pub fn project_frame(
    track: Option<&NormalizedTrack>,
    status: TrackStatus,
    state: &LiveState,
) -> CircleMapFrame {
    let Some(track) = track else {
        let status = match status {
            TrackStatus::Ready => TrackStatus::NotReady,
            other => other,
        };
        return CircleMapFrame::empty(status);
    };

    let cars = order_by_angle(PositionProjector::new(track).project(state));
    let gaps = annotate_gaps(&cars);
    debug!(
        "Projected {} cars with {} interval labels",
        cars.len(),
        gaps.len()
    );

    CircleMapFrame {
        status: TrackStatus::Ready,
        cars,
        gaps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{CarPosition, IntervalValue, LiveMessage, TimingLine};
    use crate::track_map::{CoordinateNormalizer, RawTrackMap};
    use std::collections::BTreeMap;

    fn live_state() -> LiveState {
        let mut state = LiveState::new();
        state.apply(LiveMessage::Positions(BTreeMap::from([
            ("1".to_string(), CarPosition::new(0.0, 10.0)),
            ("4".to_string(), CarPosition::new(0.0, 0.0)),
        ])));
        state.apply(LiveMessage::TimingData(BTreeMap::from([(
            "1".to_string(),
            TimingLine {
                interval_to_position_ahead: Some(IntervalValue {
                    value: "+0.500".to_string(),
                    catching: false,
                }),
                gap_to_leader: None,
            },
        )])));
        state
    }

    #[test]
    fn test_frame_without_track() {
        let frame = project_frame(None, TrackStatus::NotReady, &live_state());
        assert_eq!(frame, CircleMapFrame::empty(TrackStatus::NotReady));

        let frame = project_frame(None, TrackStatus::InsufficientData, &live_state());
        assert_eq!(frame.status, TrackStatus::InsufficientData);
        assert!(frame.cars.is_empty());

        let frame = project_frame(None, TrackStatus::Ready, &live_state());
        assert_eq!(frame.status, TrackStatus::NotReady);
    }

    #[test]
    fn test_frame_orders_cars_and_labels_gaps() {
        let track = CoordinateNormalizer::new()
            .normalize(&RawTrackMap::new(
                vec![0.0, 10.0, 10.0, 0.0],
                vec![0.0, 0.0, 10.0, 10.0],
                0.0,
            ))
            .unwrap();

        let frame = project_frame(Some(&track), TrackStatus::Ready, &live_state());

        assert_eq!(frame.status, TrackStatus::Ready);
        let order: Vec<(&str, f64)> = frame
            .cars
            .iter()
            .map(|c| (c.racing_number.as_str(), c.angle_deg))
            .collect();
        assert_eq!(order, vec![("4", 0.0), ("1", 270.0)]);
        assert_eq!(frame.gaps.len(), 1);
        assert_eq!(frame.gaps[0].racing_number, "1");
        assert_eq!(frame.gaps[0].midpoint_angle_deg, 135.0);
    }
}
