// Track map loading and per-circuit session state

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::errors::CircleMapError;

use super::normalizer::{CoordinateNormalizer, NormalizedTrack};
use super::types::RawTrackMap;

/// Source of raw track outlines, keyed by circuit identifier
pub trait TrackMapLoader: Send + Sync {
    /// Load the outline for `circuit_key`.
    ///
    /// Returns `Ok(None)` when the source has no outline for the circuit.
    fn load_track_map(&self, circuit_key: &str) -> Result<Option<RawTrackMap>, CircleMapError>;
}

/// Loads track maps from `<dir>/<circuit key>.json` files
pub struct FileTrackMapLoader {
    maps_path: PathBuf,
    /// Parsed maps already read from disk
    cache: Mutex<HashMap<String, RawTrackMap>>,
}

impl FileTrackMapLoader {
    pub fn new(maps_path: PathBuf) -> Self {
        Self {
            maps_path,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Create a loader reading from the default application data directory
    pub fn new_default() -> Result<Self, CircleMapError> {
        Ok(Self::new(Self::default_maps_path()?))
    }

    pub fn default_maps_path() -> Result<PathBuf, CircleMapError> {
        let app_data_dir = dirs::data_dir().ok_or(CircleMapError::NoConfigDir)?;
        Ok(app_data_dir.join("circlemap").join("track_maps"))
    }

    pub fn maps_path(&self) -> &Path {
        &self.maps_path
    }

    /// Normalize a circuit key for consistent file naming
    fn normalize_circuit_key(circuit_key: &str) -> String {
        circuit_key
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn file_path_for_circuit(&self, circuit_key: &str) -> PathBuf {
        let filename = format!("{}.json", Self::normalize_circuit_key(circuit_key));
        self.maps_path.join(filename)
    }

    fn cached(&self, key: &str) -> Option<RawTrackMap> {
        self.cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(key).cloned())
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

impl TrackMapLoader for FileTrackMapLoader {
    fn load_track_map(&self, circuit_key: &str) -> Result<Option<RawTrackMap>, CircleMapError> {
        let key = Self::normalize_circuit_key(circuit_key);
        if let Some(map) = self.cached(&key) {
            debug!("Track map for {} served from cache", circuit_key);
            return Ok(Some(map));
        }

        let file_path = self.file_path_for_circuit(circuit_key);
        if !file_path.exists() {
            debug!("No track map file at {:?}", file_path);
            return Ok(None);
        }

        let content =
            fs::read_to_string(&file_path).map_err(|e| CircleMapError::TrackMapIOError {
                circuit_key: circuit_key.to_string(),
                source: e,
            })?;
        let map: RawTrackMap =
            serde_json::from_str(&content).map_err(|e| CircleMapError::TrackMapParseError {
                circuit_key: circuit_key.to_string(),
                source: e,
            })?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, map.clone());
        }
        Ok(Some(map))
    }
}

/// Readiness of the outline for the currently selected circuit
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackStatus {
    /// No usable outline yet: not selected, still loading, or unavailable
    NotReady,
    /// The loaded outline has fewer than two points
    InsufficientData,
    Ready,
}

/// Handle for one outline request. Only the most recent ticket can be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    circuit_key: String,
}

impl LoadTicket {
    pub fn circuit_key(&self) -> &str {
        &self.circuit_key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed outline request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request was issued before this one resolved
    Stale,
    /// The loader had nothing for the circuit or failed
    Unavailable,
    InsufficientData,
}

enum SessionTrack {
    Empty,
    Loading,
    Unavailable,
    InsufficientData,
    Ready(Arc<NormalizedTrack>),
}

/// Outline state for the selected circuit.
///
/// Every new circuit selection bumps a generation counter; a load result is
/// applied only when it carries the current generation, so a slow response for
/// a previous circuit can never overwrite the outline of a newer one.
pub struct TrackSession {
    normalizer: CoordinateNormalizer,
    generation: u64,
    circuit_key: Option<String>,
    track: SessionTrack,
}

impl Default for TrackSession {
    fn default() -> Self {
        Self::new(CoordinateNormalizer::default())
    }
}

impl TrackSession {
    pub fn new(normalizer: CoordinateNormalizer) -> Self {
        Self {
            normalizer,
            generation: 0,
            circuit_key: None,
            track: SessionTrack::Empty,
        }
    }

    pub fn circuit_key(&self) -> Option<&str> {
        self.circuit_key.as_deref()
    }

    /// Select `circuit_key` and get a ticket for loading its outline.
    ///
    /// Returns `None` when the circuit is already selected and its outline is
    /// loaded or being loaded. Any other selection drops the current outline.
    pub fn request(&mut self, circuit_key: &str) -> Option<LoadTicket> {
        if self.circuit_key.as_deref() == Some(circuit_key)
            && matches!(self.track, SessionTrack::Ready(_) | SessionTrack::Loading)
        {
            debug!("Circuit {} already selected, keeping outline", circuit_key);
            return None;
        }

        self.generation += 1;
        self.circuit_key = Some(circuit_key.to_string());
        self.track = SessionTrack::Loading;
        info!(
            "Requesting outline for circuit {} (generation {})",
            circuit_key, self.generation
        );
        Some(LoadTicket {
            generation: self.generation,
            circuit_key: circuit_key.to_string(),
        })
    }

    /// Apply the result of the load identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<RawTrackMap>, CircleMapError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            warn!(
                "Ignoring stale outline for circuit {} (generation {}, current {})",
                ticket.circuit_key, ticket.generation, self.generation
            );
            return LoadOutcome::Stale;
        }

        let raw = match result {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!("No outline available for circuit {}", ticket.circuit_key);
                self.track = SessionTrack::Unavailable;
                return LoadOutcome::Unavailable;
            }
            Err(e) => {
                error!(
                    "Failed to load outline for circuit {}: {}",
                    ticket.circuit_key, e
                );
                self.track = SessionTrack::Unavailable;
                return LoadOutcome::Unavailable;
            }
        };

        match self.normalizer.normalize(&raw) {
            Ok(track) => {
                self.track = SessionTrack::Ready(Arc::new(track));
                LoadOutcome::Applied
            }
            Err(CircleMapError::InsufficientData { points }) => {
                warn!(
                    "Outline for circuit {} has only {} points",
                    ticket.circuit_key, points
                );
                self.track = SessionTrack::InsufficientData;
                LoadOutcome::InsufficientData
            }
            Err(e) => {
                error!("Unusable outline for circuit {}: {}", ticket.circuit_key, e);
                self.track = SessionTrack::Unavailable;
                LoadOutcome::Unavailable
            }
        }
    }

    pub fn status(&self) -> TrackStatus {
        match self.track {
            SessionTrack::Ready(_) => TrackStatus::Ready,
            SessionTrack::InsufficientData => TrackStatus::InsufficientData,
            SessionTrack::Empty | SessionTrack::Loading | SessionTrack::Unavailable => {
                TrackStatus::NotReady
            }
        }
    }

    /// The normalized outline, when one is loaded for the selected circuit
    pub fn track(&self) -> Option<Arc<NormalizedTrack>> {
        match &self.track {
            SessionTrack::Ready(track) => Some(Arc::clone(track)),
            _ => None,
        }
    }
}
