//! Frame-to-frame blob identity
//!
//! The detector reports anonymous `(x, y, size)` blobs every frame. The
//! tracker gives them stable ids so the note manager can tell "the same
//! finger as last frame" from "a new touch".
//!
//! Matching is greedy nearest-neighbour in observation order: each
//! observation takes the closest still-unclaimed track within the distance
//! threshold, ties going to the lowest id. This is O(n·m) and not a globally
//! optimal assignment.
//!
//! A track that goes unmatched for a single frame is retired immediately, so
//! a detector that flickers produces track churn. Retired ids go onto a free
//! list and the lowest one is handed out first, keeping ids small and the
//! derived MIDI channels (`id mod 16`) predictable.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Default maximum distance (display units) for matching a blob to a track
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 20.0;

/// Track identity
pub type TrackId = u32;

/// One detected blob in one frame, without identity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64, size: f64) -> Self {
        Self { x, y, size }
    }
}

/// Last known state of a live track
///
/// Grid cells are resolved by the note manager against its geometry; see
/// [`ActiveNote::current_cell`](crate::notes::ActiveNote::current_cell).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedBlob {
    pub position: (f64, f64),
    pub size: f64,
}

impl From<&Observation> for TrackedBlob {
    fn from(observation: &Observation) -> Self {
        Self {
            position: (observation.x, observation.y),
            size: observation.size,
        }
    }
}

/// Tracker configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Observations farther than this from every track start a new track
    pub distance_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

/// Nearest-neighbour blob tracker holding exactly one generation of tracks
#[derive(Debug, Clone, Default)]
pub struct BlobTracker {
    config: TrackerConfig,
    tracks: BTreeMap<TrackId, TrackedBlob>,
    /// Highest id ever allocated
    last_id: TrackId,
    free_ids: BTreeSet<TrackId>,
}

impl BlobTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Live tracks, ordered by id
    pub fn tracks(&self) -> &BTreeMap<TrackId, TrackedBlob> {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Fold one frame of observations into the track table
    ///
    /// Ids freed by this frame only become reusable from the next frame on,
    /// so an id never ends and starts within the same update.
    pub fn update(&mut self, observations: &[Observation]) -> &BTreeMap<TrackId, TrackedBlob> {
        let mut next: BTreeMap<TrackId, TrackedBlob> = BTreeMap::new();

        for observation in observations {
            let id = match self.closest_track(observation, &next) {
                Some(id) => id,
                None => {
                    let id = self.allocate_id();
                    log::debug!(
                        "Track {} started at ({:.1}, {:.1})",
                        id,
                        observation.x,
                        observation.y
                    );
                    id
                }
            };
            next.insert(id, TrackedBlob::from(observation));
        }

        for (&id, blob) in &self.tracks {
            if !next.contains_key(&id) {
                log::debug!(
                    "Track {} ended at ({:.1}, {:.1})",
                    id,
                    blob.position.0,
                    blob.position.1
                );
                self.free_ids.insert(id);
            }
        }

        self.tracks = next;
        &self.tracks
    }

    /// Closest live track within the threshold not yet claimed this frame
    fn closest_track(
        &self,
        observation: &Observation,
        claimed: &BTreeMap<TrackId, TrackedBlob>,
    ) -> Option<TrackId> {
        self.tracks
            .iter()
            .filter(|(id, _)| !claimed.contains_key(id))
            .map(|(&id, blob)| {
                let dx = observation.x - blob.position.0;
                let dy = observation.y - blob.position.1;
                (id, dx.hypot(dy))
            })
            .filter(|&(_, distance)| distance < self.config.distance_threshold)
            // min_by keeps the first of equal elements, i.e. the lowest id
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Lowest freed id, or the next never-used one (ids start at 1)
    fn allocate_id(&mut self) -> TrackId {
        if let Some(id) = self.free_ids.pop_first() {
            return id;
        }
        self.last_id += 1;
        self.last_id
    }
}
