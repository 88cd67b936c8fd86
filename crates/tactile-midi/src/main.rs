//! tactile - Play a pressure-sensor matrix as a MIDI fretboard
//!
//! Reads sensor frames from a serial device or a built-in simulation, tracks
//! the touches and sends the resulting notes to a MIDI output port.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use crossbeam_channel::{Receiver, TryRecvError};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tactile_midi::{
    config::Config,
    control::ControlInput,
    engine::Engine,
    error::Error,
    frame::{FrameReader, SensorFrame},
    midi::{self, MidiMessage, MidiOutput},
    notes::CellChangePolicy,
    sim::{FlashingTouch, WalkingTouch},
};

#[derive(Parser)]
#[command(name = "tactile")]
#[command(author, version, about = "Pressure-matrix MIDI fretboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/tactile/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// List available MIDI output ports
    ListPorts,
    /// Print the note grid for the configured tuning
    Grid,
    /// Track touches and play them
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Where sensor frames come from
    #[arg(short, long, value_enum, default_value_t = Source::Walk)]
    source: Source,

    /// Serial device or capture file (with --source device)
    #[arg(short, long)]
    device: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(short = 'n', long)]
    frames: Option<usize>,

    /// Delay between simulated frames in milliseconds
    #[arg(long, default_value = "50")]
    interval_ms: u64,

    /// Frames per position (walk) or per flash (flash)
    #[arg(long, default_value = "10")]
    hold: u32,

    /// What a held note does when its touch changes cell (latch, retrigger, pitch-bend)
    #[arg(short, long)]
    policy: Option<CellChangePolicy>,

    /// Output port name, overrides the config file
    #[arg(long)]
    port: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// One touch walking across the matrix
    Walk,
    /// A steady touch and a blinking one
    Flash,
    /// Line-based frames from a serial device or file
    Device,
}

type Frames = Box<dyn Iterator<Item = tactile_midi::Result<SensorFrame>>>;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        Some(Commands::ListPorts) => {
            let ports = midi::list_output_ports();
            if ports.is_empty() {
                println!("No MIDI output ports found");
            } else {
                println!("Available MIDI output ports:");
                for port in ports {
                    println!("  {}", port);
                }
            }
            return Ok(());
        }
        _ => {}
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(),
    };

    let args = match cli.command {
        Some(Commands::Grid) => {
            println!("{}", config.to_grid()?);
            return Ok(());
        }
        Some(Commands::Run(args)) => args,
        _ => {
            Cli::command().print_help()?;
            return Ok(());
        }
    };

    // Apply CLI overrides
    if let Some(policy) = args.policy {
        config.notes.cell_change = policy;
    }
    if let Some(port) = &args.port {
        config.midi.port_name = port.clone();
    }

    run(config, args)
}

fn open_source(config: &Config, args: &RunArgs) -> Result<Frames> {
    let frames: Frames = match args.source {
        Source::Walk => Box::new(WalkingTouch::new(config.sensor, args.hold)),
        Source::Flash => Box::new(FlashingTouch::new(config.sensor, args.hold)),
        Source::Device => {
            let path = args
                .device
                .as_ref()
                .context("--source device needs --device PATH")?;
            let file = File::open(path)
                .with_context(|| format!("Failed to open sensor device {}", path.display()))?;
            log::info!("Reading frames from {}", path.display());
            Box::new(FrameReader::new(BufReader::new(file), config.sensor))
        }
    };
    Ok(match args.frames {
        Some(limit) => Box::new(frames.take(limit)),
        None => frames,
    })
}

/// Forward control keys typed on stdin, one line at a time
fn spawn_control_reader() -> Receiver<ControlInput> {
    let (tx, rx) = crossbeam_channel::unbounded();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            for input in ControlInput::parse_line(&line) {
                if tx.send(input).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

fn send(output: &mut dyn MidiOutput, messages: &[MidiMessage]) {
    if let Err(e) = output.send_all(messages) {
        log::warn!("MIDI send failed: {}", e);
    }
}

fn run(config: Config, args: RunArgs) -> Result<()> {
    let mut engine = Engine::from_config(&config)?;
    let frames = open_source(&config, &args)?;
    let mut output = midi::open_output(&config.midi);
    log::info!(
        "Playing on '{}' ({}, {})",
        output.port_name(),
        engine.grid().tuning_name(),
        config.notes.cell_change
    );

    // Shutdown signal shared with the signal handlers
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))?;
    }

    let controls = spawn_control_reader();
    let interval = match args.source {
        Source::Device => None,
        _ => Some(Duration::from_millis(args.interval_ms)),
    };

    'frames: for frame in frames {
        if shutdown.load(Ordering::Relaxed) {
            log::info!("Interrupted");
            break;
        }

        // Control commands only land between ticks
        loop {
            match controls.try_recv() {
                Ok(ControlInput::Quit) => break 'frames,
                Ok(ControlInput::Command(command)) => {
                    let released = engine.apply(&command);
                    send(output.as_mut(), &released);
                    println!("{}", engine.grid().summary());
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        let frame = match frame {
            Ok(frame) => frame,
            Err(Error::MalformedFrame(msg)) => {
                log::warn!("Skipping frame: {}", msg);
                continue;
            }
            Err(e) => {
                log::error!("Sensor input failed: {}", e);
                break;
            }
        };

        match engine.tick(&frame.touch_points(&config.geometry)) {
            Ok(messages) => send(output.as_mut(), &messages),
            Err(e) => log::warn!("Skipping tick: {}", e),
        }

        if let Some(interval) = interval {
            std::thread::sleep(interval);
        }
    }

    // Release everything before the port closes
    let released = engine.shutdown();
    send(output.as_mut(), &released);
    Ok(())
}
