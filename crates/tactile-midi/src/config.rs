//! Configuration file support for tactile
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/tactile/config.toml`
//! - macOS: `~/Library/Application Support/tactile/config.toml`
//! - Windows: `%APPDATA%\tactile\config.toml`

use crate::error::{Error, Result};
use crate::frame::SensorLayout;
use crate::geometry::GridGeometry;
use crate::grid::{NoteGrid, Scale, Tuning};
use crate::notes::NoteConfig;
use crate::tracker::TrackerConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Note grid configuration
    pub grid: GridSettings,
    /// Display-space geometry of the grid
    pub geometry: GridGeometry,
    /// Blob tracking
    pub tracker: TrackerConfig,
    /// Note lifecycle
    pub notes: NoteConfig,
    /// Sensor matrix shape
    pub sensor: SensorLayout,
    /// MIDI configuration
    pub midi: MidiSettings,
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "tactile") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(path)
    }

    /// Build the note grid described by the `[grid]` section
    pub fn to_grid(&self) -> Result<NoteGrid> {
        let mut grid = NoteGrid::new(self.grid.tuning()?);
        grid.transpose_octave(self.grid.octave_shift);
        grid.transpose_semitone(self.grid.semitone_shift);
        grid.set_scale(self.grid.scale);
        Ok(grid)
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# tactile configuration file

[grid]
# Tuning preset: "standard", "drop_d", "perfect_fourths", or "custom"
tuning = "standard"

# Open-string MIDI notes, lowest string first (only used when tuning = "custom")
# custom_tuning = [40, 45, 50, 55, 59, 64]

# Transposition
octave_shift = 0
semitone_shift = 0

# Scale laid across the frets (optional):
# "major", "minor", "minor_pentatonic", "major_pentatonic", "chromatic"
# scale = "major"

[geometry]
# Display space the detector reports blob positions in
width = 600.0
height = 300.0
# Border around the grid
padding = 30.0

[tracker]
# Maximum distance for a blob to keep its id between frames
distance_threshold = 20.0

[notes]
# What a sounding note does when its blob moves to another cell:
# "latch" (keep the first note), "retrigger", or "pitch_bend"
cell_change = "latch"

# Velocity = blob size * velocity_scale (clamped to 1-127)
velocity_scale = 1.0

# Controller carrying vibrato (1 = modulation wheel)
vibrato_cc = 1

# Pitch-bend range of the receiving synth in semitones
pitch_bend_range = 2

[sensor]
# Pressure matrix shape and sample range
rows = 10
cols = 20
max_value = 1023
# Samples at or below this value count as touched
touch_threshold = 512

[midi]
# MIDI client name
client_name = "tactile"

# Output port to connect to (substring match); created as a virtual port if missing
port_name = "TacTile"
"#;

/// Tuning preset names used in the config file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TuningPreset {
    #[default]
    Standard,
    DropD,
    PerfectFourths,
    /// Use `custom_tuning`
    Custom,
}

/// Note grid settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Tuning preset
    pub tuning: TuningPreset,
    /// Open-string notes, lowest string first (only used when tuning = "custom")
    pub custom_tuning: Option<Vec<u8>>,
    /// Octaves to transpose by
    pub octave_shift: i32,
    /// Semitones to transpose by
    pub semitone_shift: i32,
    /// Scale laid across the frets
    pub scale: Option<Scale>,
}

impl GridSettings {
    /// Resolve the preset into a tuning
    pub fn tuning(&self) -> Result<Tuning> {
        match self.tuning {
            TuningPreset::Standard => Ok(Tuning::Standard),
            TuningPreset::DropD => Ok(Tuning::DropD),
            TuningPreset::PerfectFourths => Ok(Tuning::PerfectFourths),
            TuningPreset::Custom => match &self.custom_tuning {
                Some(notes) if notes.is_empty() => {
                    Err(Error::Config("custom_tuning must list at least one string".to_string()))
                }
                Some(notes) if notes.iter().any(|&n| n > 127) => Err(Error::Config(
                    "custom_tuning notes must be MIDI notes (0-127)".to_string(),
                )),
                Some(notes) => Ok(Tuning::Custom(notes.clone())),
                None => Err(Error::Config(
                    "tuning = \"custom\" requires custom_tuning".to_string(),
                )),
            },
        }
    }
}

/// MIDI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiSettings {
    /// MIDI client name
    pub client_name: String,
    /// Output port name (substring match)
    pub port_name: String,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            client_name: "tactile".to_string(),
            port_name: "TacTile".to_string(),
        }
    }
}
