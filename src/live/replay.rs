// Replays a recorded live feed through the circle map projection

use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use log::{debug, info};
use tokio::task::JoinHandle;

use crate::errors::CircleMapError;
use crate::projection::{CircleMapFrame, project_frame};
use crate::track_map::{
    LoadOutcome, LoadTicket, RawTrackMap, TrackMapLoader, TrackSession, TrackStatus,
};

use super::{LiveMessage, LiveState};

type PendingLoad = (
    LoadTicket,
    JoinHandle<Result<Option<RawTrackMap>, CircleMapError>>,
);

/// Counters for one replay run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    pub messages: usize,
    pub frames: usize,
    pub stale_loads: usize,
}

/// Read a JSON-lines feed file, one [`LiveMessage`] per line.
pub fn load_feed(source_file: &Path) -> Result<Vec<LiveMessage>, CircleMapError> {
    if !source_file.exists() {
        return Err(CircleMapError::InvalidFeedFile {
            path: format!("{:?}", source_file),
        });
    }

    let messages = serde_jsonlines::json_lines(source_file)
        .map_err(|e| CircleMapError::FeedLoaderError { source: e })?
        .collect::<Result<Vec<LiveMessage>, std::io::Error>>()
        .map_err(|e| CircleMapError::FeedLoaderError { source: e })?;
    info!("Loaded {} messages from {:?}", messages.len(), source_file);
    Ok(messages)
}

/// Await outstanding outline loads in request order and hand them to the session.
async fn resolve_pending(
    pending: &mut Vec<PendingLoad>,
    session: &mut TrackSession,
    summary: &mut ReplaySummary,
) {
    for (ticket, handle) in pending.drain(..) {
        let result = handle
            .await
            .map_err(|e| CircleMapError::TrackMapTaskError {
                reason: e.to_string(),
            })
            .and_then(|loaded| loaded);
        if session.complete(ticket, result) == LoadOutcome::Stale {
            summary.stale_loads += 1;
        }
    }
}

/// Drive `messages` through a track session and live state, sending one frame per
/// data message.
///
/// Outline loads run on the blocking pool as soon as a session change arrives.
/// They are awaited before the next data message is projected, so a load that
/// was superseded by a later session change resolves as stale and is dropped.
pub async fn replay_feed(
    messages: impl IntoIterator<Item = LiveMessage>,
    loader: Arc<dyn TrackMapLoader>,
    frame_sender: Sender<CircleMapFrame>,
    emit_not_ready_frames: bool,
) -> Result<ReplaySummary, CircleMapError> {
    let mut session = TrackSession::default();
    let mut state = LiveState::new();
    let mut pending: Vec<PendingLoad> = Vec::new();
    let mut summary = ReplaySummary::default();

    for message in messages {
        summary.messages += 1;
        if let LiveMessage::SessionChange { circuit_key } = &message {
            if let Some(ticket) = session.request(circuit_key) {
                let loader = Arc::clone(&loader);
                let key = circuit_key.clone();
                let handle = tokio::task::spawn_blocking(move || loader.load_track_map(&key));
                pending.push((ticket, handle));
            }
            state.apply(message);
            continue;
        }

        resolve_pending(&mut pending, &mut session, &mut summary).await;
        state.apply(message);

        let track = session.track();
        let frame = project_frame(track.as_deref(), session.status(), &state);
        if frame.status != TrackStatus::Ready && !emit_not_ready_frames {
            debug!("Dropping frame, track status {:?}", frame.status);
            continue;
        }
        frame_sender.send(frame)?;
        summary.frames += 1;
    }

    resolve_pending(&mut pending, &mut session, &mut summary).await;
    info!(
        "Replayed {} messages into {} frames ({} stale outline loads)",
        summary.messages, summary.frames, summary.stale_loads
    );
    Ok(summary)
}

/// Replay `messages` on a single-threaded runtime.
pub fn run_replay(
    messages: Vec<LiveMessage>,
    loader: Arc<dyn TrackMapLoader>,
    frame_sender: Sender<CircleMapFrame>,
    emit_not_ready_frames: bool,
) -> Result<ReplaySummary, CircleMapError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| CircleMapError::RuntimeError { source: e })?;
    runtime.block_on(replay_feed(
        messages,
        loader,
        frame_sender,
        emit_not_ready_frames,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::CarPosition;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    struct StaticLoader {
        maps: HashMap<String, RawTrackMap>,
        delays_ms: HashMap<String, u64>,
    }

    impl TrackMapLoader for StaticLoader {
        fn load_track_map(
            &self,
            circuit_key: &str,
        ) -> Result<Option<RawTrackMap>, CircleMapError> {
            if let Some(delay) = self.delays_ms.get(circuit_key) {
                thread::sleep(Duration::from_millis(*delay));
            }
            Ok(self.maps.get(circuit_key).cloned())
        }
    }

    fn square() -> RawTrackMap {
        RawTrackMap::new(
            vec![0.0, 10.0, 10.0, 0.0],
            vec![0.0, 0.0, 10.0, 10.0],
            0.0,
        )
    }

    fn loader() -> Arc<dyn TrackMapLoader> {
        Arc::new(StaticLoader {
            maps: HashMap::from([
                ("63".to_string(), square()),
                ("short".to_string(), RawTrackMap::new(vec![1.0], vec![1.0], 0.0)),
            ]),
            delays_ms: HashMap::from([("63".to_string(), 50)]),
        })
    }

    fn session_change(circuit_key: &str) -> LiveMessage {
        LiveMessage::SessionChange {
            circuit_key: circuit_key.to_string(),
        }
    }

    fn positions(x: f64, y: f64) -> LiveMessage {
        LiveMessage::Positions(BTreeMap::from([(
            "1".to_string(),
            CarPosition::new(x, y),
        )]))
    }

    fn replay(
        messages: Vec<LiveMessage>,
        emit_not_ready_frames: bool,
    ) -> (ReplaySummary, Vec<CircleMapFrame>) {
        let (tx, rx) = mpsc::channel();
        let summary = run_replay(messages, loader(), tx, emit_not_ready_frames).unwrap();
        (summary, rx.iter().collect())
    }

    #[test]
    fn test_replay_projects_after_load() {
        let (summary, frames) = replay(
            vec![session_change("63"), positions(10.0, 0.0), positions(10.0, 10.0)],
            true,
        );

        assert_eq!(summary.messages, 3);
        assert_eq!(summary.frames, 2);
        assert_eq!(frames[0].status, TrackStatus::Ready);
        assert_eq!(frames[0].cars[0].angle_deg, 90.0);
        assert_eq!(frames[1].cars[0].angle_deg, 180.0);
    }

    #[test]
    fn test_replay_without_session_is_not_ready() {
        let (summary, frames) = replay(vec![positions(10.0, 0.0)], true);

        assert_eq!(summary.frames, 1);
        assert_eq!(frames[0], CircleMapFrame::empty(TrackStatus::NotReady));
    }

    #[test]
    fn test_replay_drops_not_ready_frames() {
        let (summary, frames) = replay(
            vec![
                positions(10.0, 0.0),
                session_change("unknown"),
                positions(10.0, 0.0),
            ],
            false,
        );

        assert_eq!(summary.frames, 0);
        assert!(frames.is_empty());
    }

    #[test]
    fn test_replay_superseded_load_is_stale() {
        // the slow load for 63 finishes after "short" was requested
        let (summary, frames) = replay(
            vec![
                session_change("63"),
                session_change("short"),
                positions(10.0, 0.0),
            ],
            true,
        );

        assert_eq!(summary.stale_loads, 1);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].status, TrackStatus::InsufficientData);
        assert!(frames[0].cars.is_empty());
    }

    #[test]
    fn test_replay_session_change_clears_positions() {
        let (_, frames) = replay(
            vec![
                session_change("63"),
                positions(10.0, 0.0),
                session_change("63"),
                LiveMessage::TimingData(BTreeMap::new()),
            ],
            true,
        );

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].cars.len(), 1);
        // same circuit keeps its outline, but the old positions are gone
        assert_eq!(frames[1].status, TrackStatus::Ready);
        assert!(frames[1].cars.is_empty());
    }
}
