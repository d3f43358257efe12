// Ordering of projected cars and placement of interval labels between them

use std::cmp::Ordering;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::interval::{Interval, parse_interval};
use super::projector::ProjectedCar;

/// Interval label placed between a car and the car ahead of it on the circle
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GapAnnotation {
    pub racing_number: String,
    /// Label position, in `[0, 360)`
    pub midpoint_angle_deg: f64,
    pub gap_text: String,
    /// Parsed value of `gap_text`, if it could be parsed
    pub interval: Option<Interval>,
}

/// Numeric racing numbers compare by value, anything else lexically after them
pub fn compare_racing_numbers(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(a_nr), Ok(b_nr)) => a_nr.cmp(&b_nr).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Sort cars by angle, breaking ties by racing number
pub fn order_by_angle(cars: Vec<ProjectedCar>) -> Vec<ProjectedCar> {
    cars.into_iter()
        .sorted_by(|a, b| {
            a.angle_deg
                .total_cmp(&b.angle_deg)
                .then_with(|| compare_racing_numbers(&a.racing_number, &b.racing_number))
        })
        .collect()
}

/// Angle halfway between a car and its predecessor.
///
/// When the predecessor wraps around (the first car, whose predecessor is the
/// last one), the forward distance across 0° is halved instead.
pub fn midpoint_angle(prev_angle: f64, angle: f64, wraps: bool) -> f64 {
    if !wraps {
        return (prev_angle + angle) / 2.0;
    }

    let diff = angle + 360.0 - prev_angle;
    let mid = prev_angle + diff / 2.0;
    if mid >= 360.0 { mid - 360.0 } else { mid }
}

/// One label per car that has an interval, for cars already in angle order
pub fn annotate_gaps(ordered: &[ProjectedCar]) -> Vec<GapAnnotation> {
    let Some(last) = ordered.last() else {
        return Vec::new();
    };

    ordered
        .iter()
        .enumerate()
        .filter_map(|(index, car)| {
            let gap_text = car.gap_text.as_ref().filter(|gap| !gap.is_empty())?;
            let prev = if index == 0 { last } else { &ordered[index - 1] };

            Some(GapAnnotation {
                racing_number: car.racing_number.clone(),
                midpoint_angle_deg: midpoint_angle(prev.angle_deg, car.angle_deg, index == 0),
                gap_text: gap_text.clone(),
                interval: parse_interval(gap_text),
            })
        })
        .collect()
}
