//! Per-tick processing
//!
//! The [`Engine`] owns the note grid, the blob tracker and the note manager.
//! One [`tick`](Engine::tick) takes one batch of observations, updates the
//! tracks and returns the MIDI messages for that tick; nothing blocks, and
//! the caller is expected to run at most one tick at a time.

use crate::config::Config;
use crate::control::ControlCommand;
use crate::error::{Error, Result};
use crate::frame::SensorLayout;
use crate::geometry::GridGeometry;
use crate::grid::NoteGrid;
use crate::midi::MidiMessage;
use crate::notes::{ActiveNote, NoteConfig, NoteLifecycleManager};
use crate::tracker::{BlobTracker, Observation, TrackId, TrackedBlob, TrackerConfig};
use std::collections::BTreeMap;

/// Grid, tracker and note manager driven together
#[derive(Debug, Clone)]
pub struct Engine {
    grid: NoteGrid,
    tracker: BlobTracker,
    notes: NoteLifecycleManager,
    /// More observations than sensor samples means the batch is corrupt
    max_observations: usize,
}

impl Engine {
    pub fn new(
        grid: NoteGrid,
        tracker: TrackerConfig,
        notes: NoteConfig,
        geometry: GridGeometry,
        sensor: SensorLayout,
    ) -> Self {
        Self {
            grid,
            tracker: BlobTracker::new(tracker),
            notes: NoteLifecycleManager::new(notes, geometry),
            max_observations: sensor.len(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.to_grid()?,
            config.tracker,
            config.notes,
            config.geometry,
            config.sensor,
        ))
    }

    pub fn grid(&self) -> &NoteGrid {
        &self.grid
    }

    pub fn tracks(&self) -> &BTreeMap<TrackId, TrackedBlob> {
        self.tracker.tracks()
    }

    pub fn active_notes(&self) -> &BTreeMap<TrackId, ActiveNote> {
        self.notes.active_notes()
    }

    /// Process one batch of observations
    ///
    /// A malformed batch is rejected before any state changes, so the
    /// previous tracks and notes stay as they were.
    pub fn tick(&mut self, observations: &[Observation]) -> Result<Vec<MidiMessage>> {
        self.validate(observations)?;
        let tracks = self.tracker.update(observations);
        Ok(self.notes.process(tracks, &self.grid))
    }

    /// Apply a control command between ticks
    ///
    /// Sounding notes are released first; live tracks start the notes of the
    /// new grid on the next tick.
    pub fn apply(&mut self, command: &ControlCommand) -> Vec<MidiMessage> {
        log::info!("Control: {}", command);
        let messages = self.notes.flush();
        command.apply_to(&mut self.grid);
        messages
    }

    /// Release every sounding note; call before closing the MIDI output
    pub fn shutdown(&mut self) -> Vec<MidiMessage> {
        let messages = self.notes.flush();
        if !messages.is_empty() {
            log::info!("Released {} sounding note(s)", messages.len());
        }
        messages
    }

    fn validate(&self, observations: &[Observation]) -> Result<()> {
        if observations.len() > self.max_observations {
            return Err(Error::MalformedFrame(format!(
                "{} observations for a {}-sample sensor",
                observations.len(),
                self.max_observations
            )));
        }
        if let Some(bad) = observations.iter().find(|o| {
            !o.x.is_finite() || !o.y.is_finite() || !o.size.is_finite() || o.size < 0.0
        }) {
            return Err(Error::MalformedFrame(format!("invalid observation {:?}", bad)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tuning;
    use crate::midi::MidiOutput;
    use crate::notes::CellChangePolicy;
    use crate::sim::FlashingTouch;

    /// Records raw bytes instead of talking to a port
    #[derive(Default)]
    struct CollectingOutput {
        sent: Vec<Vec<u8>>,
    }

    impl MidiOutput for CollectingOutput {
        fn send(&mut self, message: &MidiMessage) -> Result<()> {
            self.sent.push(message.to_bytes());
            Ok(())
        }

        fn port_name(&self) -> &str {
            "collect"
        }

        fn is_connected(&self) -> bool {
            true
        }
    }

    fn engine() -> Engine {
        Engine::new(
            NoteGrid::default(),
            TrackerConfig::default(),
            NoteConfig::default(),
            GridGeometry::new(650.0, 300.0, 0.0),
            SensorLayout::default(),
        )
    }

    #[test]
    fn test_tick_scenario() {
        let mut engine = engine();
        let on = engine
            .tick(&[Observation::new(10.0, 10.0, 5.0), Observation::new(400.0, 10.0, 5.0)])
            .unwrap();
        assert_eq!(on.len(), 2);
        assert_eq!(engine.active_notes().len(), 2);

        let off = engine.tick(&[]).unwrap();
        assert_eq!(
            off,
            vec![
                MidiMessage::NoteOff { channel: 1, note: 64 },
                MidiMessage::NoteOff { channel: 2, note: 72 },
            ]
        );
        assert!(engine.tracks().is_empty());
    }

    #[test]
    fn test_malformed_batch_keeps_state() {
        let mut engine = engine();
        engine.tick(&[Observation::new(25.0, 25.0, 5.0)]).unwrap();

        let result = engine.tick(&[Observation::new(f64::NAN, 10.0, 5.0)]);
        assert!(matches!(result, Err(Error::MalformedFrame(_))));
        let result = engine.tick(&[Observation::new(10.0, 10.0, -1.0)]);
        assert!(matches!(result, Err(Error::MalformedFrame(_))));

        let too_many = vec![Observation::new(10.0, 10.0, 5.0); 201];
        assert!(engine.tick(&too_many).is_err());

        // The touch survived the bad frames
        assert_eq!(engine.tracks().keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(engine.active_notes().len(), 1);
        assert!(engine.tick(&[Observation::new(25.0, 25.0, 5.0)]).unwrap().is_empty());
    }

    #[test]
    fn test_control_releases_then_retriggers() {
        let mut engine = engine();
        engine.tick(&[Observation::new(10.0, 290.0, 30.0)]).unwrap();
        assert_eq!(engine.active_notes()[&1].midi_note, 40);

        let released = engine.apply(&ControlCommand::TransposeOctave(1));
        assert_eq!(released, vec![MidiMessage::NoteOff { channel: 1, note: 40 }]);

        let on = engine.tick(&[Observation::new(10.0, 290.0, 30.0)]).unwrap();
        assert_eq!(on, vec![MidiMessage::NoteOn { channel: 1, note: 52, velocity: 30 }]);

        engine.apply(&ControlCommand::SetTuning(Tuning::DropD));
        engine.apply(&ControlCommand::ResetStandard);
        assert_eq!(engine.grid().note_at(5, 0), 40);
    }

    #[test]
    fn test_shutdown_flushes() {
        let mut engine = engine();
        engine
            .tick(&[Observation::new(10.0, 10.0, 5.0), Observation::new(400.0, 10.0, 5.0)])
            .unwrap();
        let off = engine.shutdown();
        assert_eq!(off.len(), 2);
        assert!(off.iter().all(|m| matches!(m, MidiMessage::NoteOff { .. })));
        assert!(engine.shutdown().is_empty());
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.notes.cell_change = CellChangePolicy::Retrigger;
        let engine = Engine::from_config(&config).unwrap();
        assert_eq!(engine.grid().rows(), 6);
        assert_eq!(engine.notes.config().cell_change, CellChangePolicy::Retrigger);
    }

    #[test]
    fn test_simulated_session_is_balanced() {
        let config = Config::default();
        let mut engine = Engine::from_config(&config).unwrap();
        let mut output = CollectingOutput::default();

        for frame in FlashingTouch::new(config.sensor, 3).take(20) {
            let observations = frame.unwrap().touch_points(&config.geometry);
            let messages = engine.tick(&observations).unwrap();
            output.send_all(&messages).unwrap();
        }
        output.send_all(&engine.shutdown()).unwrap();

        let status = |high: u8| output.sent.iter().filter(|b| b[0] & 0xF0 == high).count();
        assert!(status(0x90) > 2);
        assert_eq!(status(0x90), status(0x80));
    }
}
