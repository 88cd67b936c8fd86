//! Note lifecycle per tracked blob
//!
//! Every track id runs a small state machine:
//!
//! ```text
//!   Unmapped --enters a cell--> Active --track disappears--> (removed, note off)
//!                                 |
//!                                 +-- same cell: vibrato from the offset to the cell centre
//!                                 +-- other cell: depends on CellChangePolicy
//! ```
//!
//! The channel of a note is `track id mod 16`. All note-offs of a tick are
//! computed from the same track snapshot as its note-ons and are emitted
//! first.

use crate::error::{Error, Result};
use crate::geometry::GridGeometry;
use crate::grid::NoteGrid;
use crate::midi::{MidiMessage, PITCH_BEND_MAX, PITCH_BEND_MIN};
use crate::tracker::{TrackId, TrackedBlob};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of MIDI channels that track ids are spread over
pub const MIDI_CHANNELS: u32 = 16;

/// Default controller for vibrato (modulation wheel)
pub const DEFAULT_VIBRATO_CC: u8 = 1;

/// Default pitch-bend range of the receiving synth, in semitones
pub const DEFAULT_PITCH_BEND_RANGE: u8 = 2;

/// Default factor from blob size to note velocity
pub const DEFAULT_VELOCITY_SCALE: f64 = 1.0;

/// What an Active track does when it moves into a different cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellChangePolicy {
    /// Keep the first note sounding; no retrigger, no controller updates
    /// until the track is back in its original cell
    #[default]
    Latch,
    /// Release the old note and start the note of the new cell; leaving the
    /// grid releases the note
    Retrigger,
    /// Keep the note and bend it towards the new cell's pitch
    PitchBend,
}

impl FromStr for CellChangePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "latch" => Ok(CellChangePolicy::Latch),
            "retrigger" => Ok(CellChangePolicy::Retrigger),
            "pitch_bend" | "bend" => Ok(CellChangePolicy::PitchBend),
            other => Err(Error::Config(format!(
                "Unknown cell change policy '{}' (expected latch, retrigger or pitch-bend)",
                other
            ))),
        }
    }
}

impl fmt::Display for CellChangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellChangePolicy::Latch => write!(f, "latch"),
            CellChangePolicy::Retrigger => write!(f, "retrigger"),
            CellChangePolicy::PitchBend => write!(f, "pitch-bend"),
        }
    }
}

/// Note manager configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteConfig {
    /// Behaviour when an Active track changes cell
    pub cell_change: CellChangePolicy,
    /// Velocity = blob size * velocity_scale, clamped to 1..=127
    pub velocity_scale: f64,
    /// Controller number carrying vibrato
    pub vibrato_cc: u8,
    /// Semitones covered by a full pitch-bend deflection
    pub pitch_bend_range: u8,
}

impl Default for NoteConfig {
    fn default() -> Self {
        Self {
            cell_change: CellChangePolicy::Latch,
            velocity_scale: DEFAULT_VELOCITY_SCALE,
            vibrato_cc: DEFAULT_VIBRATO_CC,
            pitch_bend_range: DEFAULT_PITCH_BEND_RANGE,
        }
    }
}

/// A sounding note owned by one track
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveNote {
    pub track_id: TrackId,
    pub channel: u8,
    pub midi_note: u8,
    pub velocity: u8,
    pub pitch_bend: i16,
    pub vibrato: u8,
    /// Cell the note was started in
    pub cell: (usize, usize),
    /// Cell the track is in as of the last tick, `None` while off the grid
    pub current_cell: Option<(usize, usize)>,
}

/// Turns live tracks into note-on/off and controller messages
#[derive(Debug, Clone)]
pub struct NoteLifecycleManager {
    config: NoteConfig,
    geometry: GridGeometry,
    active: BTreeMap<TrackId, ActiveNote>,
}

impl NoteLifecycleManager {
    pub fn new(config: NoteConfig, geometry: GridGeometry) -> Self {
        Self {
            config,
            geometry,
            active: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &NoteConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn set_policy(&mut self, policy: CellChangePolicy) {
        self.config.cell_change = policy;
    }

    /// Currently sounding notes, by track id
    pub fn active_notes(&self) -> &BTreeMap<TrackId, ActiveNote> {
        &self.active
    }

    /// Diff this tick's tracks against the active notes
    pub fn process(
        &mut self,
        tracks: &BTreeMap<TrackId, TrackedBlob>,
        grid: &NoteGrid,
    ) -> Vec<MidiMessage> {
        let mut messages = Vec::new();
        let vibrato_cc = self.config.vibrato_cc;

        let gone: Vec<TrackId> = self
            .active
            .keys()
            .filter(|id| !tracks.contains_key(id))
            .copied()
            .collect();
        for id in gone {
            if let Some(note) = self.active.remove(&id) {
                release(&note, vibrato_cc, &mut messages);
            }
        }

        for (&id, blob) in tracks {
            let (x, y) = blob.position;
            let cell = self.geometry.cell_at(x, y, grid.rows(), grid.columns());
            match (self.active.contains_key(&id), cell) {
                (false, None) => {}
                (false, Some(cell)) => self.start(id, blob, cell, grid, &mut messages),
                (true, Some(cell)) => self.update(id, blob, cell, grid, &mut messages),
                (true, None) => {
                    if self.config.cell_change == CellChangePolicy::Retrigger {
                        log::trace!("Track {} left the grid", id);
                        if let Some(note) = self.active.remove(&id) {
                            release(&note, vibrato_cc, &mut messages);
                        }
                    } else if let Some(note) = self.active.get_mut(&id) {
                        note.current_cell = None;
                    }
                }
            }
        }

        messages
    }

    /// Release every active note (shutdown, or before the grid changes)
    pub fn flush(&mut self) -> Vec<MidiMessage> {
        let mut messages = Vec::new();
        for (_, note) in std::mem::take(&mut self.active) {
            release(&note, self.config.vibrato_cc, &mut messages);
        }
        messages
    }

    fn start(
        &mut self,
        id: TrackId,
        blob: &TrackedBlob,
        cell: (usize, usize),
        grid: &NoteGrid,
        messages: &mut Vec<MidiMessage>,
    ) {
        let note = ActiveNote {
            track_id: id,
            channel: (id % MIDI_CHANNELS) as u8,
            midi_note: grid.note_at(cell.0, cell.1),
            velocity: self.velocity_for(blob.size),
            pitch_bend: 0,
            vibrato: 0,
            cell,
            current_cell: Some(cell),
        };
        log::debug!(
            "Track {} note on {} (ch={} vel={}) at cell {:?}",
            id,
            note.midi_note,
            note.channel,
            note.velocity,
            cell
        );
        messages.push(MidiMessage::NoteOn {
            channel: note.channel,
            note: note.midi_note,
            velocity: note.velocity,
        });
        self.active.insert(id, note);
    }

    fn update(
        &mut self,
        id: TrackId,
        blob: &TrackedBlob,
        cell: (usize, usize),
        grid: &NoteGrid,
        messages: &mut Vec<MidiMessage>,
    ) {
        let policy = self.config.cell_change;
        let vibrato = self.vibrato_for(blob, cell, grid);
        let Some(note) = self.active.get_mut(&id) else {
            return;
        };
        note.current_cell = Some(cell);

        if note.cell == cell {
            if note.pitch_bend != 0 {
                note.pitch_bend = 0;
                messages.push(MidiMessage::PitchBend { channel: note.channel, value: 0 });
            }
            if note.vibrato != vibrato {
                note.vibrato = vibrato;
                messages.push(MidiMessage::ControlChange {
                    channel: note.channel,
                    controller: self.config.vibrato_cc,
                    value: vibrato,
                });
            }
            return;
        }

        match policy {
            CellChangePolicy::Latch => {}
            CellChangePolicy::Retrigger => {
                log::trace!("Track {} moved {:?} -> {:?}, retriggering", id, note.cell, cell);
                if let Some(old) = self.active.remove(&id) {
                    release(&old, self.config.vibrato_cc, messages);
                }
                self.start(id, blob, cell, grid, messages);
            }
            CellChangePolicy::PitchBend => {
                let target = grid.note_at(cell.0, cell.1);
                let bend = bend_for(note.midi_note, target, self.config.pitch_bend_range);
                if note.pitch_bend != bend {
                    note.pitch_bend = bend;
                    messages.push(MidiMessage::PitchBend { channel: note.channel, value: bend });
                }
            }
        }
    }

    /// Velocity from blob size, kept at 1 or above since a zero-velocity
    /// note-on is a note-off on the wire
    fn velocity_for(&self, size: f64) -> u8 {
        let scaled = (size * self.config.velocity_scale).round();
        if scaled.is_finite() {
            scaled.clamp(1.0, 127.0) as u8
        } else {
            1
        }
    }

    /// Vibrato from the blob's offset to the centre of its cell
    fn vibrato_for(&self, blob: &TrackedBlob, cell: (usize, usize), grid: &NoteGrid) -> u8 {
        let (cx, cy) = self
            .geometry
            .cell_center(cell.0, cell.1, grid.rows(), grid.columns());
        let dx = (blob.position.0 - cx).abs();
        let dy = (blob.position.1 - cy).abs();
        ((dx + dy) / 10.0).round().clamp(0.0, 127.0) as u8
    }
}

/// Pitch-bend value that moves `from` to `to`, saturating at the wheel's range
fn bend_for(from: u8, to: u8, range: u8) -> i16 {
    let semitones = to as i32 - from as i32;
    let bend = semitones * 8192 / range.max(1) as i32;
    bend.clamp(PITCH_BEND_MIN as i32, PITCH_BEND_MAX as i32) as i16
}

/// Note off, then re-centre any controllers the note moved
///
/// The next note on this channel starts from a centred wheel and zero
/// vibrato, so both must be reset on the wire here.
fn release(note: &ActiveNote, vibrato_cc: u8, messages: &mut Vec<MidiMessage>) {
    log::debug!(
        "Track {} note off {} (ch={})",
        note.track_id,
        note.midi_note,
        note.channel
    );
    messages.push(MidiMessage::NoteOff {
        channel: note.channel,
        note: note.midi_note,
    });
    if note.pitch_bend != 0 {
        messages.push(MidiMessage::PitchBend { channel: note.channel, value: 0 });
    }
    if note.vibrato != 0 {
        messages.push(MidiMessage::ControlChange {
            channel: note.channel,
            controller: vibrato_cc,
            value: 0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{BlobTracker, Observation};

    fn zero_padding() -> GridGeometry {
        // 50 x 50 cells on a 6 x 13 grid
        GridGeometry::new(650.0, 300.0, 0.0)
    }

    fn blob(x: f64, y: f64, size: f64) -> TrackedBlob {
        TrackedBlob { position: (x, y), size }
    }

    fn tracks(entries: &[(TrackId, TrackedBlob)]) -> BTreeMap<TrackId, TrackedBlob> {
        entries.iter().copied().collect()
    }

    fn manager(policy: CellChangePolicy) -> NoteLifecycleManager {
        let config = NoteConfig {
            cell_change: policy,
            ..NoteConfig::default()
        };
        NoteLifecycleManager::new(config, zero_padding())
    }

    #[test]
    fn test_two_blobs_start_and_stop() {
        let grid = NoteGrid::default();
        let mut tracker = BlobTracker::default();
        let mut notes = NoteLifecycleManager::new(NoteConfig::default(), zero_padding());

        let live = tracker.update(&[Observation::new(10.0, 10.0, 5.0), Observation::new(400.0, 10.0, 5.0)]);
        let on = notes.process(live, &grid);
        assert_eq!(
            on,
            vec![
                MidiMessage::NoteOn { channel: 1, note: 64, velocity: 5 },
                MidiMessage::NoteOn { channel: 2, note: 72, velocity: 5 },
            ]
        );

        let live = tracker.update(&[]);
        let off = notes.process(live, &grid);
        assert_eq!(
            off,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 64 },
                MidiMessage::NoteOff { channel: 2, note: 72 },
            ]
        );
        assert!(notes.active_notes().is_empty());

        // Both ids were freed
        let live = tracker.update(&[Observation::new(200.0, 200.0, 5.0)]);
        assert_eq!(live.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_unmapped_track_stays_silent() {
        let grid = NoteGrid::default();
        let mut notes = NoteLifecycleManager::new(NoteConfig::default(), GridGeometry::default());
        let messages = notes.process(&tracks(&[(1, blob(5.0, 5.0, 40.0))]), &grid);
        assert!(messages.is_empty());
        assert!(notes.active_notes().is_empty());

        // Entering the grid later starts the note
        let messages = notes.process(&tracks(&[(1, blob(50.0, 50.0, 40.0))]), &grid);
        assert_eq!(messages, vec![MidiMessage::NoteOn { channel: 1, note: 64, velocity: 40 }]);
    }

    #[test]
    fn test_channel_wraps_at_sixteen() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        let messages = notes.process(&tracks(&[(17, blob(25.0, 25.0, 10.0))]), &grid);
        assert_eq!(messages[0].channel(), 1);
        assert_eq!(notes.active_notes()[&17].channel, 1);
    }

    #[test]
    fn test_velocity_is_clamped() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        let messages = notes.process(
            &tracks(&[(1, blob(25.0, 25.0, 500.0)), (2, blob(75.0, 25.0, 0.0))]),
            &grid,
        );
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOn { channel: 1, note: 64, velocity: 127 },
                MidiMessage::NoteOn { channel: 2, note: 65, velocity: 1 },
            ]
        );
    }

    #[test]
    fn test_vibrato_inside_cell() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);

        // At the centre nothing changes
        let messages = notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);
        assert!(messages.is_empty());

        // 20 + 14 units off centre -> round(3.4) = 3
        let messages = notes.process(&tracks(&[(1, blob(45.0, 39.0, 10.0))]), &grid);
        assert_eq!(
            messages,
            vec![MidiMessage::ControlChange { channel: 1, controller: 1, value: 3 }]
        );
        assert_eq!(notes.active_notes()[&1].vibrato, 3);

        // Same value again is not re-sent
        let messages = notes.process(&tracks(&[(1, blob(45.0, 39.0, 10.0))]), &grid);
        assert!(messages.is_empty());
    }

    #[test]
    fn test_release_resets_vibrato() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);
        notes.process(&tracks(&[(1, blob(45.0, 39.0, 10.0))]), &grid);

        let messages = notes.process(&BTreeMap::new(), &grid);
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 64 },
                MidiMessage::ControlChange { channel: 1, controller: 1, value: 0 },
            ]
        );

        // A fresh note at the centre starts with the controller already at 0
        let messages = notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);
        assert_eq!(messages, vec![MidiMessage::NoteOn { channel: 1, note: 64, velocity: 10 }]);
        let messages = notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);
        assert!(messages.is_empty());
        assert_eq!(notes.active_notes()[&1].vibrato, 0);
    }

    #[test]
    fn test_flush_resets_vibrato_on_configured_cc() {
        let grid = NoteGrid::default();
        let config = NoteConfig {
            vibrato_cc: 74,
            ..NoteConfig::default()
        };
        let mut notes = NoteLifecycleManager::new(config, zero_padding());
        notes.process(&tracks(&[(3, blob(25.0, 25.0, 10.0))]), &grid);
        notes.process(&tracks(&[(3, blob(5.0, 5.0, 10.0))]), &grid);

        assert_eq!(
            notes.flush(),
            vec![
                MidiMessage::NoteOff { channel: 3, note: 64 },
                MidiMessage::ControlChange { channel: 3, controller: 74, value: 0 },
            ]
        );
    }

    #[test]
    fn test_set_policy_switches_behaviour() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);
        assert!(notes.process(&tracks(&[(1, blob(75.0, 25.0, 10.0))]), &grid).is_empty());

        notes.set_policy(CellChangePolicy::Retrigger);
        assert_eq!(notes.config().cell_change, CellChangePolicy::Retrigger);
        let messages = notes.process(&tracks(&[(1, blob(75.0, 25.0, 10.0))]), &grid);
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 64 },
                MidiMessage::NoteOn { channel: 1, note: 65, velocity: 10 },
            ]
        );
        assert_eq!(notes.active_notes()[&1].cell, (0, 1));
    }

    #[test]
    fn test_latch_keeps_first_note() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);

        let messages = notes.process(&tracks(&[(1, blob(130.0, 25.0, 10.0))]), &grid);
        assert!(messages.is_empty());
        assert_eq!(notes.active_notes()[&1].midi_note, 64);
        assert_eq!(notes.active_notes()[&1].cell, (0, 0));
        assert_eq!(notes.active_notes()[&1].current_cell, Some((0, 2)));

        // Off the grid the note keeps sounding too
        let messages = notes.process(&tracks(&[(1, blob(25.0, 400.0, 10.0))]), &grid);
        assert!(messages.is_empty());
        assert_eq!(notes.active_notes().len(), 1);
        assert_eq!(notes.active_notes()[&1].current_cell, None);

        let messages = notes.process(&BTreeMap::new(), &grid);
        assert_eq!(messages, vec![MidiMessage::NoteOff { channel: 1, note: 64 }]);
    }

    #[test]
    fn test_retrigger_on_cell_change() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Retrigger);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);

        let messages = notes.process(&tracks(&[(1, blob(130.0, 25.0, 10.0))]), &grid);
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 64 },
                MidiMessage::NoteOn { channel: 1, note: 66, velocity: 10 },
            ]
        );

        // Leaving the grid releases
        let messages = notes.process(&tracks(&[(1, blob(130.0, 400.0, 10.0))]), &grid);
        assert_eq!(messages, vec![MidiMessage::NoteOff { channel: 1, note: 66 }]);
        assert!(notes.active_notes().is_empty());
    }

    #[test]
    fn test_pitch_bend_on_cell_change() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::PitchBend);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);

        // One fret up is one semitone: half of a two-semitone range
        let messages = notes.process(&tracks(&[(1, blob(75.0, 25.0, 10.0))]), &grid);
        assert_eq!(messages, vec![MidiMessage::PitchBend { channel: 1, value: 4096 }]);

        // Five frets up saturates
        let messages = notes.process(&tracks(&[(1, blob(275.0, 25.0, 10.0))]), &grid);
        assert_eq!(messages, vec![MidiMessage::PitchBend { channel: 1, value: 8191 }]);

        // Back home re-centres
        let messages = notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);
        assert_eq!(messages, vec![MidiMessage::PitchBend { channel: 1, value: 0 }]);
        assert_eq!(notes.active_notes()[&1].midi_note, 64);
    }

    #[test]
    fn test_release_recentres_bend() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::PitchBend);
        notes.process(&tracks(&[(1, blob(75.0, 25.0, 10.0))]), &grid);
        notes.process(&tracks(&[(1, blob(25.0, 25.0, 10.0))]), &grid);

        let messages = notes.process(&BTreeMap::new(), &grid);
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 65 },
                MidiMessage::PitchBend { channel: 1, value: 0 },
            ]
        );
    }

    #[test]
    fn test_flush_releases_everything_once() {
        let grid = NoteGrid::default();
        let mut notes = manager(CellChangePolicy::Latch);
        notes.process(
            &tracks(&[(1, blob(25.0, 25.0, 10.0)), (2, blob(25.0, 75.0, 10.0))]),
            &grid,
        );

        let messages = notes.flush();
        assert_eq!(
            messages,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 64 },
                MidiMessage::NoteOff { channel: 2, note: 59 },
            ]
        );
        assert!(notes.flush().is_empty());
    }

    #[test]
    fn test_every_note_on_gets_one_note_off() {
        let grid = NoteGrid::default();
        let mut tracker = BlobTracker::default();
        let mut notes = manager(CellChangePolicy::Retrigger);
        let frames: Vec<Vec<Observation>> = vec![
            vec![Observation::new(25.0, 25.0, 20.0)],
            vec![Observation::new(35.0, 25.0, 20.0), Observation::new(300.0, 200.0, 20.0)],
            vec![Observation::new(45.0, 25.0, 20.0), Observation::new(305.0, 200.0, 20.0)],
            vec![Observation::new(60.0, 25.0, 20.0)],
            vec![],
            vec![Observation::new(600.0, 250.0, 20.0)],
        ];

        let mut sounding: Vec<(u8, u8)> = Vec::new();
        let mut all = Vec::new();
        for frame in &frames {
            let live = tracker.update(frame);
            all.extend(notes.process(live, &grid));
        }
        all.extend(notes.flush());

        for message in all {
            match message {
                MidiMessage::NoteOn { channel, note, .. } => {
                    assert!(!sounding.contains(&(channel, note)));
                    sounding.push((channel, note));
                }
                MidiMessage::NoteOff { channel, note } => {
                    let index = sounding.iter().position(|&n| n == (channel, note));
                    assert!(index.is_some(), "note off without note on");
                    sounding.remove(index.unwrap_or_default());
                }
                _ => {}
            }
        }
        assert!(sounding.is_empty());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("latch".parse::<CellChangePolicy>().unwrap(), CellChangePolicy::Latch);
        assert_eq!("Retrigger".parse::<CellChangePolicy>().unwrap(), CellChangePolicy::Retrigger);
        assert_eq!("pitch-bend".parse::<CellChangePolicy>().unwrap(), CellChangePolicy::PitchBend);
        assert!("wobble".parse::<CellChangePolicy>().is_err());
        assert_eq!(CellChangePolicy::PitchBend.to_string(), "pitch-bend");
    }

    #[test]
    fn test_bend_for() {
        assert_eq!(bend_for(60, 60, 2), 0);
        assert_eq!(bend_for(60, 58, 2), -8192);
        assert_eq!(bend_for(60, 61, 12), 682);
        assert_eq!(bend_for(60, 70, 0), 8191);
    }
}
