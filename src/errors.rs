// Error types for circlemap

use crate::projection::CircleMapFrame;
use snafu::Snafu;
use std::{io, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum CircleMapError {
    // Track outline errors
    #[snafu(display("Track outline has {points} points, at least 2 are required"))]
    InsufficientData { points: usize },
    #[snafu(display("Track outline axes differ in length: {x_len} x values, {y_len} y values"))]
    MismatchedOutline { x_len: usize, y_len: usize },
    #[snafu(display("Track outline validation failed: {reason}"))]
    InvalidOutline { reason: String },

    // Track map loader errors
    #[snafu(display("Error reading track map for {circuit_key}"))]
    TrackMapIOError {
        circuit_key: String,
        source: io::Error,
    },
    #[snafu(display("Error parsing track map for {circuit_key}"))]
    TrackMapParseError {
        circuit_key: String,
        source: serde_json::Error,
    },
    #[snafu(display("Track map load task failed: {reason}"))]
    TrackMapTaskError { reason: String },
    #[snafu(display("Could not start the track map loader runtime"))]
    RuntimeError { source: io::Error },

    // Live feed errors
    #[snafu(display("Invalid live feed file: {path}"))]
    InvalidFeedFile { path: String },
    #[snafu(display("Error loading live feed file"))]
    FeedLoaderError { source: io::Error },

    // Frame output errors
    #[snafu(display("Error writing frame file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing frame"))]
    FrameSerializeError { source: serde_json::Error },
    #[snafu(display("Error broadcasting frame"))]
    FrameBroadcastError {
        source: Box<SendError<CircleMapFrame>>,
    },

    // Config management errors
    #[snafu(display("Could not find application data directory"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },
}

impl From<SendError<CircleMapFrame>> for CircleMapError {
    fn from(value: SendError<CircleMapFrame>) -> Self {
        CircleMapError::FrameBroadcastError {
            source: Box::new(value),
        }
    }
}
