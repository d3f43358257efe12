// Library interface for circlemap
// This allows integration tests and benchmarks to access internal modules

pub mod errors;
pub mod live;
pub mod projection;
pub mod track_map;
pub mod writer;

// Re-export commonly used types
pub use errors::CircleMapError;
pub use live::{CarPosition, DriverInfo, LiveMessage, LiveState, TimingLine};
pub use projection::{CircleMapFrame, GapAnnotation, ProjectedCar, project_frame};
pub use track_map::{
    CoordinateNormalizer, FileTrackMapLoader, NormalizedTrack, RawTrackMap, TrackMapLoader,
    TrackSession, TrackStatus,
};
