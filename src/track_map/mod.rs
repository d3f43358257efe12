// Track map module
// Loads circuit outlines and normalizes them into the circle map frame

pub mod loader;
pub mod normalizer;
pub mod types;

// Re-export commonly used types
pub use loader::{
    FileTrackMapLoader, LoadOutcome, LoadTicket, TrackMapLoader, TrackSession, TrackStatus,
};
pub use normalizer::{CoordinateNormalizer, NormalizedTrack, Transform, rotate};
pub use types::{BoundingBox, Point2D, RawTrackMap};
