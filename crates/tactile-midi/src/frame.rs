//! Raw sensor frames
//!
//! The pressure matrix reports one line of whitespace-separated samples per
//! frame, row-major. An idle cell reads near `max_value`; pressure pulls the
//! reading down towards 0.

use crate::error::{Error, Result};
use crate::geometry::GridGeometry;
use crate::tracker::Observation;
use serde::{Deserialize, Serialize};
use std::io::BufRead;

/// Sensor rows
pub const DEFAULT_SENSOR_ROWS: usize = 10;

/// Sensor columns
pub const DEFAULT_SENSOR_COLS: usize = 20;

/// Largest sample the ADC reports (10-bit)
pub const DEFAULT_MAX_VALUE: u16 = 1023;

/// Samples at or below this count as touched
pub const DEFAULT_TOUCH_THRESHOLD: u16 = 512;

/// Observation size for a sample pressed all the way to 0
pub const FULL_PRESS_SIZE: f64 = 100.0;

/// Shape and range of the sensor matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorLayout {
    pub rows: usize,
    pub cols: usize,
    pub max_value: u16,
    pub touch_threshold: u16,
}

impl Default for SensorLayout {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SENSOR_ROWS,
            cols: DEFAULT_SENSOR_COLS,
            max_value: DEFAULT_MAX_VALUE,
            touch_threshold: DEFAULT_TOUCH_THRESHOLD,
        }
    }
}

impl SensorLayout {
    /// Samples per frame
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One validated frame of samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorFrame {
    layout: SensorLayout,
    samples: Vec<u16>,
}

impl SensorFrame {
    /// Validate samples against the layout
    pub fn new(samples: Vec<u16>, layout: SensorLayout) -> Result<Self> {
        if samples.len() != layout.len() {
            return Err(Error::MalformedFrame(format!(
                "expected {} samples ({}x{}), got {}",
                layout.len(),
                layout.rows,
                layout.cols,
                samples.len()
            )));
        }
        if let Some(bad) = samples.iter().find(|&&s| s > layout.max_value) {
            return Err(Error::MalformedFrame(format!(
                "sample {} exceeds maximum {}",
                bad, layout.max_value
            )));
        }
        Ok(Self { layout, samples })
    }

    /// A frame with nothing pressed
    pub fn idle(layout: SensorLayout) -> Self {
        Self {
            layout,
            samples: vec![layout.max_value; layout.len()],
        }
    }

    /// Parse one line of whitespace-separated samples
    pub fn parse_line(line: &str, layout: SensorLayout) -> Result<Self> {
        let samples = line
            .split_whitespace()
            .map(|token| {
                token
                    .parse::<u16>()
                    .map_err(|_| Error::MalformedFrame(format!("invalid sample '{}'", token)))
            })
            .collect::<Result<Vec<u16>>>()?;
        Self::new(samples, layout)
    }

    pub fn layout(&self) -> &SensorLayout {
        &self.layout
    }

    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    pub fn sample(&self, row: usize, col: usize) -> Option<u16> {
        if row >= self.layout.rows || col >= self.layout.cols {
            return None;
        }
        self.samples.get(row * self.layout.cols + col).copied()
    }

    /// Set one sample by flat index, clamped to the layout's range
    pub fn press(&mut self, index: usize, value: u16) {
        if let Some(sample) = self.samples.get_mut(index) {
            *sample = value.min(self.layout.max_value);
        }
    }

    /// One observation per touched sample, placed in display space
    ///
    /// A stand-in for a real blob detector: neighbouring touched samples are
    /// not merged. Each touched sample is reported at the centre of its patch
    /// of the padded grid area, with a size proportional to its pressure.
    pub fn touch_points(&self, geometry: &GridGeometry) -> Vec<Observation> {
        let (width, height) = geometry.effective_size();
        let patch_width = width / self.layout.cols as f64;
        let patch_height = height / self.layout.rows as f64;
        let max = self.layout.max_value.max(1) as f64;

        self.samples
            .iter()
            .enumerate()
            .filter(|(_, &sample)| sample <= self.layout.touch_threshold)
            .map(|(index, &sample)| {
                let row = index / self.layout.cols;
                let col = index % self.layout.cols;
                let pressure = (max - sample as f64) / max;
                Observation::new(
                    geometry.padding + (col as f64 + 0.5) * patch_width,
                    geometry.padding + (row as f64 + 0.5) * patch_height,
                    pressure * FULL_PRESS_SIZE,
                )
            })
            .collect()
    }
}

/// Reads frames line by line, e.g. from a serial tty or a capture file
///
/// Yields `Err(MalformedFrame)` for lines that do not parse, including
/// lines with bytes that are not UTF-8, so the caller can skip them. Ends at
/// end of input. Blank lines are ignored.
pub struct FrameReader<R> {
    reader: R,
    layout: SensorLayout,
    line: Vec<u8>,
}

impl<R: BufRead> FrameReader<R> {
    pub fn new(reader: R, layout: SensorLayout) -> Self {
        Self {
            reader,
            layout,
            line: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<SensorFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => return None,
                Ok(_) => {
                    // Serial noise turns into replacement characters that fail to parse
                    let line = String::from_utf8_lossy(&self.line);
                    if line.trim().is_empty() {
                        continue;
                    }
                    return Some(SensorFrame::parse_line(&line, self.layout));
                }
                Err(e) => return Some(Err(Error::Io(e))),
            }
        }
    }
}
