//! Grid control commands
//!
//! Discrete commands from a controller (keyboard, UI) that reshape the note
//! grid between ticks. The key bindings follow the grid test harness:
//!
//! | Key | Command |
//! |---|---|
//! | `z` / `x` | Octave down / up |
//! | `c` / `v` | Semitone down / up |
//! | `d` | Drop D tuning |
//! | `f` | Perfect fourths tuning |
//! | `s` | Cycle scale mode |
//! | `a` | Reset to standard |
//! | `q` | Quit |

use crate::grid::{NoteGrid, Tuning};
use std::fmt;

/// A command that changes the note grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    TransposeOctave(i32),
    TransposeSemitone(i32),
    SetTuning(Tuning),
    CycleScale,
    ResetStandard,
}

impl ControlCommand {
    /// Apply the command to a grid
    pub fn apply_to(&self, grid: &mut NoteGrid) {
        match self {
            ControlCommand::TransposeOctave(octaves) => grid.transpose_octave(*octaves),
            ControlCommand::TransposeSemitone(semitones) => grid.transpose_semitone(*semitones),
            ControlCommand::SetTuning(tuning) => grid.set_tuning(tuning.clone()),
            ControlCommand::CycleScale => grid.cycle_scale(),
            ControlCommand::ResetStandard => grid.reset_to_standard(),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlCommand::TransposeOctave(n) => write!(f, "transpose {:+} octave(s)", n),
            ControlCommand::TransposeSemitone(n) => write!(f, "transpose {:+} semitone(s)", n),
            ControlCommand::SetTuning(tuning) => write!(f, "set {}", tuning.name()),
            ControlCommand::CycleScale => write!(f, "cycle scale"),
            ControlCommand::ResetStandard => write!(f, "reset to standard"),
        }
    }
}

/// Input from the control surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlInput {
    Command(ControlCommand),
    Quit,
}

impl ControlInput {
    /// Map a controller key to its input, `None` for unbound keys
    pub fn from_key(key: char) -> Option<Self> {
        let command = match key.to_ascii_lowercase() {
            'z' => ControlCommand::TransposeOctave(-1),
            'x' => ControlCommand::TransposeOctave(1),
            'c' => ControlCommand::TransposeSemitone(-1),
            'v' => ControlCommand::TransposeSemitone(1),
            'd' => ControlCommand::SetTuning(Tuning::DropD),
            'f' => ControlCommand::SetTuning(Tuning::PerfectFourths),
            's' => ControlCommand::CycleScale,
            'a' => ControlCommand::ResetStandard,
            'q' => return Some(ControlInput::Quit),
            _ => return None,
        };
        Some(ControlInput::Command(command))
    }

    /// All bound inputs in a line of text, in order
    pub fn parse_line(line: &str) -> Vec<Self> {
        line.chars().filter_map(Self::from_key).collect()
    }
}
