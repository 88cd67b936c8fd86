//! MIDI messages and output backends
//!
//! The core only produces [`MidiMessage`] values; sending them is the job of
//! a [`MidiOutput`]. With the `native` feature, [`MidirOutput`] talks to a
//! system MIDI port. Without it, [`DummyMidiOutput`] logs what would be sent.

use crate::config::MidiSettings;
use crate::error::Result;

/// Lowest pitch-bend value
pub const PITCH_BEND_MIN: i16 = -8192;

/// Highest pitch-bend value
pub const PITCH_BEND_MAX: i16 = 8191;

/// MIDI channel-voice messages produced by the note manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiMessage {
    /// Note on: channel, note, velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off: channel, note
    NoteOff { channel: u8, note: u8 },
    /// Control change: channel, controller, value
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Pitch bend: channel, signed value centred on 0 (-8192..=8191)
    PitchBend { channel: u8, value: i16 },
}

impl MidiMessage {
    pub fn channel(&self) -> u8 {
        match self {
            MidiMessage::NoteOn { channel, .. }
            | MidiMessage::NoteOff { channel, .. }
            | MidiMessage::ControlChange { channel, .. }
            | MidiMessage::PitchBend { channel, .. } => *channel,
        }
    }

    /// Convert to raw MIDI bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                vec![0x90 | (channel & 0x0F), *note & 0x7F, *velocity & 0x7F]
            }
            MidiMessage::NoteOff { channel, note } => {
                vec![0x80 | (channel & 0x0F), *note & 0x7F, 0]
            }
            MidiMessage::ControlChange { channel, controller, value } => {
                vec![0xB0 | (channel & 0x0F), *controller & 0x7F, *value & 0x7F]
            }
            MidiMessage::PitchBend { channel, value } => {
                // 14-bit, centred on 8192, LSB first
                let raw = ((*value).clamp(PITCH_BEND_MIN, PITCH_BEND_MAX) + 8192) as u16;
                vec![0xE0 | (channel & 0x0F), (raw & 0x7F) as u8, (raw >> 7) as u8]
            }
        }
    }
}

/// MIDI output trait
pub trait MidiOutput {
    /// Send one message
    fn send(&mut self, message: &MidiMessage) -> Result<()>;

    /// Get the port name
    fn port_name(&self) -> &str;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Send messages in order, stopping at the first failure
    fn send_all(&mut self, messages: &[MidiMessage]) -> Result<()> {
        for message in messages {
            self.send(message)?;
        }
        Ok(())
    }
}

/// MIDI output through midir
#[cfg(feature = "native")]
pub struct MidirOutput {
    connection: midir::MidiOutputConnection,
    port_name: String,
}

#[cfg(feature = "native")]
impl MidirOutput {
    /// Connect to the first output port whose name contains `port_name`
    ///
    /// If none exists, a virtual port with that name is created where the
    /// platform supports it.
    pub fn open(client_name: &str, port_name: &str) -> Result<Self> {
        use crate::error::Error;

        let output = midir::MidiOutput::new(client_name).map_err(|e| Error::Midi(e.to_string()))?;
        let matching = output.ports().into_iter().find(|port| {
            output
                .port_name(port)
                .map(|name| name.contains(port_name))
                .unwrap_or(false)
        });

        match matching {
            Some(port) => {
                let full_name = output
                    .port_name(&port)
                    .unwrap_or_else(|_| port_name.to_string());
                let connection = output
                    .connect(&port, client_name)
                    .map_err(|e| Error::Midi(e.to_string()))?;
                log::info!("Connected to MIDI output: {}", full_name);
                Ok(Self {
                    connection,
                    port_name: full_name,
                })
            }
            None => Self::open_virtual(output, port_name),
        }
    }

    /// Create from settings
    pub fn from_settings(settings: &MidiSettings) -> Result<Self> {
        Self::open(&settings.client_name, &settings.port_name)
    }

    #[cfg(unix)]
    fn open_virtual(output: midir::MidiOutput, port_name: &str) -> Result<Self> {
        use midir::os::unix::VirtualOutput;

        let connection = output
            .create_virtual(port_name)
            .map_err(|e| crate::error::Error::Midi(e.to_string()))?;
        log::info!("Created virtual MIDI output: {}", port_name);
        Ok(Self {
            connection,
            port_name: port_name.to_string(),
        })
    }

    #[cfg(not(unix))]
    fn open_virtual(_output: midir::MidiOutput, port_name: &str) -> Result<Self> {
        Err(crate::error::Error::Midi(format!(
            "No MIDI output port matching '{}'",
            port_name
        )))
    }
}

#[cfg(feature = "native")]
impl MidiOutput for MidirOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<()> {
        self.connection
            .send(&message.to_bytes())
            .map_err(|e| crate::error::Error::Midi(e.to_string()))
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }

    fn is_connected(&self) -> bool {
        true // If we got this far, we're connected
    }
}

/// Dummy MIDI output (for testing or when no backend is available)
#[derive(Debug, Default)]
pub struct DummyMidiOutput;

impl MidiOutput for DummyMidiOutput {
    fn send(&mut self, message: &MidiMessage) -> Result<()> {
        match message {
            MidiMessage::NoteOn { channel, note, velocity } => {
                log::debug!("MIDI Note On: ch={} note={} vel={}", channel, note, velocity)
            }
            MidiMessage::NoteOff { channel, note } => {
                log::debug!("MIDI Note Off: ch={} note={}", channel, note)
            }
            MidiMessage::ControlChange { channel, controller, value } => {
                log::debug!("MIDI CC: ch={} cc={} val={}", channel, controller, value)
            }
            MidiMessage::PitchBend { channel, value } => {
                log::debug!("MIDI Pitch Bend: ch={} val={}", channel, value)
            }
        }
        Ok(())
    }

    fn port_name(&self) -> &str {
        "dummy"
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// Open the configured output, falling back to the dummy output
pub fn open_output(settings: &MidiSettings) -> Box<dyn MidiOutput> {
    #[cfg(feature = "native")]
    {
        match MidirOutput::from_settings(settings) {
            Ok(output) => return Box::new(output),
            Err(e) => log::warn!("Failed to open MIDI output '{}': {}", settings.port_name, e),
        }
    }
    #[cfg(not(feature = "native"))]
    log::warn!(
        "Built without the `native` feature, MIDI for '{}' is only logged",
        settings.port_name
    );
    Box::new(DummyMidiOutput)
}

/// List available MIDI output ports
pub fn list_output_ports() -> Vec<String> {
    #[cfg(feature = "native")]
    {
        if let Ok(output) = midir::MidiOutput::new("tactile-list") {
            return output
                .ports()
                .iter()
                .filter_map(|port| output.port_name(port).ok())
                .collect();
        }
    }
    Vec::new()
}
