pub mod config;
pub mod replay;

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

/// Raw position of one car, in track map coordinates
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CarPosition {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z", default)]
    pub z: f64,
}

impl CarPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0. }
    }
}

/// Display metadata for one entry of the driver roster
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverInfo {
    pub racing_number: String,
    #[serde(default)]
    pub full_name: Option<String>,
    /// Three letter abbreviation shown next to the car
    #[serde(default)]
    pub tla: Option<String>,
    /// Team colour as a hex string, with or without a leading `#`
    #[serde(default)]
    pub team_colour: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct IntervalValue {
    pub value: String,
    #[serde(default)]
    pub catching: bool,
}

/// Timing line of one car
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimingLine {
    #[serde(default)]
    pub interval_to_position_ahead: Option<IntervalValue>,
    #[serde(default)]
    pub gap_to_leader: Option<String>,
}

pub type PositionSnapshot = BTreeMap<String, CarPosition>;
pub type DriverRoster = BTreeMap<String, DriverInfo>;
pub type TimingSnapshot = BTreeMap<String, TimingLine>;

/// One line of a live feed. Data messages replace the matching snapshot wholesale.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum LiveMessage {
    SessionChange { circuit_key: String },
    Positions(PositionSnapshot),
    DriverList(DriverRoster),
    TimingData(TimingSnapshot),
}

/// Latest snapshot of every live input, keyed by racing number
#[derive(Clone, Debug, Default)]
pub struct LiveState {
    pub positions: PositionSnapshot,
    pub drivers: DriverRoster,
    pub timing: TimingSnapshot,
}

impl LiveState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one feed message. A session change drops every snapshot.
    pub fn apply(&mut self, message: LiveMessage) {
        match message {
            LiveMessage::SessionChange { circuit_key } => {
                debug!("Session changed to circuit {}, clearing live state", circuit_key);
                self.clear();
            }
            LiveMessage::Positions(positions) => self.positions = positions,
            LiveMessage::DriverList(drivers) => self.drivers = drivers,
            LiveMessage::TimingData(timing) => self.timing = timing,
        }
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.drivers.clear();
        self.timing.clear();
    }

    /// Interval to the car ahead, if the timing feed has a non-empty one
    pub fn gap_text(&self, racing_number: &str) -> Option<&str> {
        self.timing
            .get(racing_number)
            .and_then(|line| line.interval_to_position_ahead.as_ref())
            .map(|interval| interval.value.as_str())
            .filter(|value| !value.trim().is_empty())
    }
}
