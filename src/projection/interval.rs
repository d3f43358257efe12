// Parsing of interval-to-car-ahead text from the timing feed
//
// Seen values: "" (no interval), "+0.273", "1L" / "20L" (laps down) and
// "LAP 54" / "LAP1" on the leader's line.

use serde::{Deserialize, Serialize};
use uom::si::f64::Time;
use uom::si::time::{millisecond, second};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Interval {
    Time(Time),
    Laps(u32),
}

impl Interval {
    /// Interval in whole milliseconds, `None` for lapped cars
    pub fn as_millis(&self) -> Option<i64> {
        match self {
            Interval::Time(time) => Some(time.get::<millisecond>().round() as i64),
            Interval::Laps(_) => None,
        }
    }
}

pub fn parse_interval(text: &str) -> Option<Interval> {
    let text = text.trim();
    if text.is_empty() || text.to_uppercase().starts_with("LAP") {
        return None;
    }

    if let Some(laps) = text.strip_suffix(['L', 'l']) {
        return laps.trim().parse::<u32>().ok().map(Interval::Laps);
    }

    text.trim_start_matches('+')
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite())
        .map(|seconds| Interval::Time(Time::new::<second>(seconds)))
}
