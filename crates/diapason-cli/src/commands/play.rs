//! Main loop: scripted touches through the arbiter into the synth.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use diapason_audio::{
    AudioEngine, DEFAULT_SAMPLE_RATE, EngineConfig, EngineParams, OutputDevice, OutputStream,
    WavRecorder,
};
use diapason_config::Settings;
use diapason_synth::NoteDispatcher;
use diapason_touch::{
    Clock, ElectrodeScanner, PlayingMode, ScriptedSensor, TouchArbiter, TouchScript,
};

use super::common::{apply_sound, settings_path};
use crate::midi::MidiPort;

/// Control pass period.
const PASS_MS: u64 = 5;
/// Audio rendered after the final note-offs so releases finish.
const RELEASE_TAIL_MS: u64 = 300;

#[derive(Args)]
pub struct PlayArgs {
    /// Touch script (`<ms> <on|off> <string> <fret>` per line)
    #[arg(short, long, value_name = "FILE")]
    script: PathBuf,

    /// Render to this WAV file instead of an audio device
    #[arg(short, long, value_name = "WAV")]
    output: Option<PathBuf>,

    /// Output device (index, exact name, or partial name)
    #[arg(short, long)]
    device: Option<String>,

    /// Also send notes to this MIDI output port (index or partial name)
    #[arg(short, long)]
    midi: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Load preset slot 1 to 4 before playing
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
    preset: Option<u8>,

    /// Force strum mode
    #[arg(long)]
    strum: bool,

    /// Mirror the string order
    #[arg(long)]
    left_handed: bool,

    /// How long to keep playing after the last scripted touch, in milliseconds
    #[arg(long, default_value_t = 500)]
    tail_ms: u64,
}

enum Target {
    File(PathBuf),
    Device(OutputDevice),
}

enum Sink {
    Wav(WavRecorder, PathBuf),
    Device(OutputStream),
}

fn load_script(path: &Path) -> anyhow::Result<TouchScript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read script '{}'", path.display()))?;
    TouchScript::parse(&text).with_context(|| format!("invalid script '{}'", path.display()))
}

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let settings_file = settings_path(args.settings.as_deref());
    let mut settings = Settings::load_or_default(&settings_file)?;
    if let Some(slot) = args.preset {
        settings.apply_preset(usize::from(slot - 1))?;
    }
    if args.strum {
        settings.set_playing_mode(PlayingMode::Strum);
    }
    let left_handed = args.left_handed || settings.left_handed;

    let script = load_script(&args.script)?;
    println!(
        "Playing {} ({} events, {:.1}s)",
        args.script.display(),
        script.events().len(),
        script.duration_ms() as f32 / 1000.0
    );

    let params = Arc::new(EngineParams::default());
    apply_sound(&params, &settings);

    let target = match args.output.clone() {
        Some(path) => Target::File(path),
        None => Target::Device(OutputDevice::open(args.device.as_deref())?),
    };
    let config = EngineConfig {
        sample_rate: match &target {
            Target::File(_) => DEFAULT_SAMPLE_RATE,
            Target::Device(device) => device.sample_rate(),
        },
        ..EngineConfig::default()
    };
    let mut engine = AudioEngine::new(config, Arc::clone(&params))?;

    let sink = match target {
        Target::File(path) => {
            let recorder = WavRecorder::spawn(&path, Arc::clone(engine.pool()))?;
            Sink::Wav(recorder, path)
        }
        Target::Device(device) => {
            println!("Output: {} ({} Hz)", device.name(), device.sample_rate());
            Sink::Device(device.play(Arc::clone(engine.pool()))?)
        }
    };

    let midi = args.midi.as_deref().map(MidiPort::connect).transpose()?;
    if let Some(port) = &midi {
        println!("MIDI: {}", port.name());
    }
    let mut dispatcher = NoteDispatcher::with_midi(engine.event_sender(), midi);

    let mut arbiter = TouchArbiter::new(settings.sound.tuning(), settings.timing());
    arbiter.set_left_handed(left_handed, &mut dispatcher);
    arbiter.set_playing_mode(settings.sound.playing_mode(), &mut dispatcher);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        println!("\nStopping...");
        r.store(false, Ordering::SeqCst);
    })?;

    let clock = engine.clock();
    let mut sensor = ScriptedSensor::new(script, left_handed).starting_at(clock.now_ms());
    let mut scanner = ElectrodeScanner::new();

    let end_ms = sensor.end_ms() + args.tail_ms;
    while running.load(Ordering::SeqCst) && (!sensor.finished() || clock.now_ms() < end_ms) {
        let now = clock.now_ms();
        scanner.poll(&mut sensor, &mut arbiter, now, &mut dispatcher);
        engine.delay_ms(PASS_MS);
    }

    arbiter.all_notes_off(&mut dispatcher);
    engine.delay_ms(RELEASE_TAIL_MS);
    if matches!(sink, Sink::Device(_)) {
        // let the device drain what is queued, up to one second
        for _ in 0..1000 / PASS_MS {
            if engine.pool().prepared_len() == 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(PASS_MS));
        }
    }

    let stats = engine.render_stats();
    let dropped = dispatcher.dropped();
    drop(engine);

    match sink {
        Sink::Wav(recorder, path) => {
            let frames = recorder.finish()?;
            println!(
                "Wrote {} frames ({:.2}s) to {}",
                frames,
                frames as f32 / config.sample_rate as f32,
                path.display()
            );
        }
        Sink::Device(stream) => {
            if stream.underruns() > 0 {
                println!("Underruns: {}", stream.underruns());
            }
        }
    }

    println!(
        "Blocks: {} (secondary timeouts {}, skipped {}, degraded {})",
        stats.blocks, stats.timeouts, stats.skipped, stats.degraded
    );
    if dropped > 0 {
        println!("Dropped note events: {dropped}");
    }
    Ok(())
}
