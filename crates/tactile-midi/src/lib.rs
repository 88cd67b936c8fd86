//! tactile-midi - Pressure-matrix blob tracking to MIDI
//!
//! Turns the blobs an image-processing pipeline finds on a pressure-sensor
//! matrix into a playable MIDI instrument laid out like a fretboard.
//! Features include:
//!
//! - Stable blob identities across frames (nearest-neighbour tracking with id reuse)
//! - A 13-fret note grid with tuning presets, transposition and scale modes
//! - Per-touch note on/off with vibrato and optional pitch bend
//! - One MIDI channel per touch (`track id mod 16`)
//! - Configurable via TOML file
//!
//! # Usage as a Library
//!
//! ```no_run
//! use tactile_midi::{Config, Engine, Observation};
//!
//! let config = Config::load_or_default();
//! let mut engine = Engine::from_config(&config).unwrap();
//!
//! // One tick per detector frame
//! let messages = engine.tick(&[Observation::new(120.0, 80.0, 40.0)]).unwrap();
//! for message in &messages {
//!     println!("{:?}", message);
//! }
//!
//! // Release everything before closing the MIDI port
//! let _ = engine.shutdown();
//! ```

pub mod config;
pub mod control;
pub mod engine;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod grid;
pub mod midi;
pub mod notes;
pub mod sim;
pub mod tracker;

// Re-export main types
pub use config::{Config, GridSettings, MidiSettings, TuningPreset};
pub use control::{ControlCommand, ControlInput};
pub use engine::Engine;
pub use error::{Error, Result};
pub use frame::{FrameReader, SensorFrame, SensorLayout};
pub use geometry::GridGeometry;
pub use grid::{note_name, NoteGrid, Scale, Tuning, FRET_COLUMNS};
pub use midi::{DummyMidiOutput, MidiMessage, MidiOutput};
pub use notes::{ActiveNote, CellChangePolicy, NoteConfig, NoteLifecycleManager};
pub use sim::{FlashingTouch, WalkingTouch};
pub use tracker::{BlobTracker, Observation, TrackId, TrackedBlob, TrackerConfig};
