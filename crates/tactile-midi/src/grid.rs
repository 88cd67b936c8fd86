//! Fretboard note grid
//!
//! Maps a (row, column) cell of the sensor surface to a MIDI note number.
//! Rows are strings, columns are frets. The grid is always derived from the
//! tuning, the transposition and the optional scale; it is never edited by
//! hand, so the same state always produces the same grid.
//!
//! Rows are stored with the lowest-pitched string last, so row 0 is the
//! string drawn at the top of the surface.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of fret columns on the grid (open string plus twelve frets)
pub const FRET_COLUMNS: usize = 13;

/// Standard guitar tuning (E A D G B e)
pub const STANDARD_TUNING: [u8; 6] = [40, 45, 50, 55, 59, 64];

/// Drop D tuning (D A D G B e)
pub const DROP_D_TUNING: [u8; 6] = [38, 45, 50, 55, 59, 64];

/// All perfect fourths (E A D G C F)
pub const PERFECT_FOURTHS_TUNING: [u8; 6] = [40, 45, 50, 55, 60, 65];

const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Open-string tuning of the grid, lowest string first
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tuning {
    Standard,
    DropD,
    PerfectFourths,
    /// Any other set of open-string notes, lowest string first
    Custom(Vec<u8>),
}

impl Tuning {
    /// Open-string MIDI notes, lowest string first
    pub fn notes(&self) -> &[u8] {
        match self {
            Tuning::Standard => &STANDARD_TUNING,
            Tuning::DropD => &DROP_D_TUNING,
            Tuning::PerfectFourths => &PERFECT_FOURTHS_TUNING,
            Tuning::Custom(notes) => notes,
        }
    }

    /// Recognise a preset from its notes, falling back to `Custom`
    pub fn from_notes(notes: &[u8]) -> Self {
        if notes == STANDARD_TUNING {
            Tuning::Standard
        } else if notes == DROP_D_TUNING {
            Tuning::DropD
        } else if notes == PERFECT_FOURTHS_TUNING {
            Tuning::PerfectFourths
        } else {
            Tuning::Custom(notes.to_vec())
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tuning::Standard => "Standard Tuning",
            Tuning::DropD => "Drop D Tuning",
            Tuning::PerfectFourths => "Perfect Fourths Tuning",
            Tuning::Custom(_) => "Custom Tuning",
        }
    }
}

/// Scale modes that can be laid across the frets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scale {
    Major,
    Minor,
    MinorPentatonic,
    MajorPentatonic,
    Chromatic,
}

impl Scale {
    /// All scales in cycling order
    pub const ALL: [Scale; 5] = [
        Scale::Major,
        Scale::Minor,
        Scale::MinorPentatonic,
        Scale::MajorPentatonic,
        Scale::Chromatic,
    ];

    /// Semitone intervals of one octave of the scale
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            Scale::Major => &[0, 2, 4, 5, 7, 9, 11],
            Scale::Minor => &[0, 2, 3, 5, 7, 8, 10],
            Scale::MinorPentatonic => &[0, 3, 5, 7, 10],
            Scale::MajorPentatonic => &[0, 2, 4, 7, 9],
            Scale::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
        }
    }

    /// The scale after this one, wrapping from the last back to the first
    pub fn next(&self) -> Scale {
        let index = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Major => "Major",
            Scale::Minor => "Minor",
            Scale::MinorPentatonic => "Minor Pentatonic",
            Scale::MajorPentatonic => "Major Pentatonic",
            Scale::Chromatic => "Chromatic",
        }
    }
}

/// The note grid and the state it is derived from
#[derive(Debug, Clone)]
pub struct NoteGrid {
    tuning: Vec<u8>,
    octave_shift: i32,
    semitone_shift: i32,
    scale: Option<Scale>,
    /// Derived; recomputed after every state change
    grid: Vec<[u8; FRET_COLUMNS]>,
}

impl Default for NoteGrid {
    fn default() -> Self {
        Self::new(Tuning::Standard)
    }
}

impl NoteGrid {
    /// Create an untransposed grid with no scale applied
    ///
    /// An empty custom tuning falls back to standard tuning.
    pub fn new(tuning: Tuning) -> Self {
        let mut grid = Self {
            tuning: STANDARD_TUNING.to_vec(),
            octave_shift: 0,
            semitone_shift: 0,
            scale: None,
            grid: Vec::new(),
        };
        grid.set_tuning(tuning);
        grid
    }

    /// Number of rows (strings)
    pub fn rows(&self) -> usize {
        self.grid.len()
    }

    /// Number of columns (frets)
    pub fn columns(&self) -> usize {
        FRET_COLUMNS
    }

    /// MIDI note at a cell
    ///
    /// # Panics
    ///
    /// Panics if the cell lies outside the grid. Callers resolve cells
    /// against [`rows`](Self::rows) and [`columns`](Self::columns) first, so
    /// reaching this is a logic error; clamping would silently play the
    /// wrong note.
    pub fn note_at(&self, row: usize, col: usize) -> u8 {
        match self.get(row, col) {
            Some(note) => note,
            None => panic!(
                "grid index ({}, {}) out of range for a {}x{} grid",
                row,
                col,
                self.rows(),
                FRET_COLUMNS
            ),
        }
    }

    /// MIDI note at a cell, or `None` outside the grid
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.grid.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Grid rows as stored (highest string first)
    pub fn grid(&self) -> &[[u8; FRET_COLUMNS]] {
        &self.grid
    }

    /// Open-string notes, lowest string first
    pub fn tuning(&self) -> &[u8] {
        &self.tuning
    }

    pub fn octave_shift(&self) -> i32 {
        self.octave_shift
    }

    pub fn semitone_shift(&self) -> i32 {
        self.semitone_shift
    }

    pub fn scale(&self) -> Option<Scale> {
        self.scale
    }

    /// Shift every string by whole octaves
    pub fn transpose_octave(&mut self, octaves: i32) {
        self.octave_shift += octaves;
        self.regenerate();
    }

    /// Shift every string by semitones
    pub fn transpose_semitone(&mut self, semitones: i32) {
        self.semitone_shift += semitones;
        self.regenerate();
    }

    /// Replace the open-string tuning, keeping transposition and scale
    pub fn set_tuning(&mut self, tuning: Tuning) {
        if tuning.notes().is_empty() {
            log::warn!("Ignoring empty tuning, keeping {}", self.tuning_name());
        } else {
            self.tuning = tuning.notes().to_vec();
        }
        self.regenerate();
    }

    /// Apply an explicit scale, or `None` for plain chromatic frets
    pub fn set_scale(&mut self, scale: Option<Scale>) {
        self.scale = scale;
        self.regenerate();
    }

    /// Move to the next scale mode
    ///
    /// From no scale this selects the first mode; after the last mode it
    /// wraps to the first again. Only [`reset_to_standard`](Self::reset_to_standard)
    /// clears the scale.
    pub fn cycle_scale(&mut self) {
        self.scale = Some(match self.scale {
            None => Scale::ALL[0],
            Some(scale) => scale.next(),
        });
        self.regenerate();
    }

    /// Standard tuning, no transposition, no scale
    pub fn reset_to_standard(&mut self) {
        self.tuning = STANDARD_TUNING.to_vec();
        self.octave_shift = 0;
        self.semitone_shift = 0;
        self.scale = None;
        self.regenerate();
    }

    /// Transposed root note of the string at `string` (0 = lowest string)
    fn string_root(&self, string: usize) -> i32 {
        self.tuning[string] as i32 + self.octave_shift * 12 + self.semitone_shift
    }

    /// Semitone distance of a fret column from the open string
    fn fret_offset(&self, col: usize) -> i32 {
        match self.scale {
            None => col as i32,
            Some(scale) => {
                let intervals = scale.intervals();
                let len = intervals.len();
                intervals[col % len] as i32 + 12 * (col / len) as i32
            }
        }
    }

    fn regenerate(&mut self) {
        self.grid = (0..self.tuning.len())
            .rev()
            .map(|string| {
                let root = self.string_root(string);
                let mut row = [0u8; FRET_COLUMNS];
                for (col, slot) in row.iter_mut().enumerate() {
                    // Extreme transposition saturates at the MIDI range
                    *slot = (root + self.fret_offset(col)).clamp(0, 127) as u8;
                }
                row
            })
            .collect();
    }

    /// Tuning name with the pitch classes of the open strings
    pub fn tuning_name(&self) -> String {
        let notes: Vec<String> = self.tuning.iter().map(|&n| note_name(n, false)).collect();
        format!("{} ({})", Tuning::from_notes(&self.tuning).name(), notes.join(", "))
    }

    /// One-paragraph summary of the grid state
    pub fn summary(&self) -> String {
        let scale = self.scale.map(|s| s.name()).unwrap_or("None");
        let root = note_name(self.string_root(0).clamp(0, 127) as u8, false);
        format!(
            "Tuning: {}\nOctave: {}\tSemitone: {}\nScale: {}\tRoot Note: {}",
            self.tuning_name(),
            self.octave_shift,
            self.semitone_shift,
            scale,
            root
        )
    }
}

impl fmt::Display for NoteGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        writeln!(f)?;
        for row in &self.grid {
            let names: Vec<String> = row.iter().map(|&n| note_name(n, true)).collect();
            writeln!(f, "{}", names.join("\t"))?;
        }
        Ok(())
    }
}

/// Convert a MIDI note number to a note name ("E", or "E2" with the octave)
pub fn note_name(note: u8, include_octave: bool) -> String {
    let name = NOTE_NAMES[(note % 12) as usize];
    if include_octave {
        let octave = (note / 12) as i32 - 1;
        format!("{}{}", name, octave)
    } else {
        name.to_string()
    }
}
