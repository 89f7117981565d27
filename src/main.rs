// MyMusic Keyboard - Generative scale keyboard with pattern slots and WAV capture

use clap::{Parser, Subcommand};
use mymusic_keyboard::audio::{OutputDevice, capture_channel, save_recording, write_wav_file};
use mymusic_keyboard::messaging::COMMAND_HELP;
use mymusic_keyboard::{
    AudioTiming, Clock, Command, GeneratorKind, OfflineRenderer, Session, SessionConfig,
    SynthPlayer, SystemClock, Tempo, create_command_channel, create_notification_channel,
};
use ringbuf::traits::{Consumer, Producer};
use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

const COMMAND_RINGBUFFER_CAPACITY: usize = 256;
const NOTIFICATION_RINGBUFFER_CAPACITY: usize = 256;

/// Longest the live loop sleeps between two timer checks (seconds)
const LIVE_POLL_SECONDS: f64 = 0.005;

/// Extra render time after the last note so it can ring out
const RENDER_TAIL_SECONDS: f64 = 2.0;

#[derive(Parser)]
#[command(name = "mymusic_keyboard")]
#[command(
    about = "Generative scale keyboard with pattern slots and WAV capture",
    long_about = None
)]
struct Cli {
    /// RON session config (defaults are used for anything it omits)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fixed random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a generator loop offline to a WAV file
    Render {
        /// Loop length in seconds
        #[arg(short, long, default_value = "8.0")]
        seconds: f64,

        /// Generator driven by the loop: note or chord
        #[arg(short, long, default_value = "note", value_parser = parse_generator)]
        generator: GeneratorKind,

        /// Tempo in BPM (overrides the config)
        #[arg(short, long)]
        tempo: Option<u32>,

        /// Record the loop into slot A, then replay it at this tempo
        #[arg(long)]
        replay_tempo: Option<u32>,

        /// Output file (default: timestamped file in the recordings directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive session on the default output device, commands from stdin
    Live {
        /// Tempo in BPM (overrides the config)
        #[arg(short, long)]
        tempo: Option<u32>,
    },
}

fn parse_generator(value: &str) -> Result<GeneratorKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "note" => Ok(GeneratorKind::Note),
        "chord" => Ok(GeneratorKind::Chord),
        other => Err(format!("unknown generator '{}' (expected note or chord)", other)),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = SessionConfig::load_or_default(cli.config.as_deref())?;
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    match cli.command {
        Commands::Render {
            seconds,
            generator,
            tempo,
            replay_tempo,
            output,
        } => {
            if let Some(bpm) = tempo {
                config.performance.tempo = Tempo::new(bpm);
            }
            run_render(config, seconds, generator, replay_tempo, output)
        }
        Commands::Live { tempo } => {
            if let Some(bpm) = tempo {
                config.performance.tempo = Tempo::new(bpm);
            }
            run_live(config)
        }
    }
}

fn run_render(
    config: SessionConfig,
    seconds: f64,
    generator: GeneratorKind,
    replay_tempo: Option<u32>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let audio = config.audio;
    let synth = SynthPlayer::new(audio.sample_rate);
    let timing = AudioTiming::new(audio.sample_rate);

    let mut session = Session::builder()
        .params(config.performance)
        .seed_opt(config.seed)
        .build(synth.clone(), timing.clone());
    if !session.is_instrument_ready() {
        return Err(session.status().to_string().into());
    }

    let mut renderer = OfflineRenderer::new(synth, timing, &audio);
    info!(%generator, seconds, tempo = %session.params().tempo, "Rendering loop");

    if replay_tempo.is_some() {
        session.start_recording();
    }
    session.start_loop(generator);
    renderer.render_for(&mut session, seconds)?;
    session.stop_loop();

    match replay_tempo {
        Some(bpm) => {
            session.stop_recording();
            info!(
                events = session.active_pattern().len(),
                "{}",
                session.status()
            );
            session.set_tempo(bpm);
            session.play_pattern();
            // A pattern can never outlast its recording rescaled to 20 BPM
            let limit = seconds * Tempo::MAX_BPM as f64 / Tempo::MIN_BPM as f64;
            renderer.render_to_idle(&mut session, RENDER_TAIL_SECONDS, limit)?;
        }
        None => renderer.render_for(&mut session, RENDER_TAIL_SECONDS)?,
    }

    let (samples, sample_rate) = renderer.finish();
    let path = match output {
        Some(path) => {
            write_wav_file(&path, &samples, sample_rate)?;
            path
        }
        None => save_recording(&audio.output_dir, &samples, sample_rate)?,
    };
    println!("Wrote {}", path.display());
    Ok(())
}

fn run_live(config: SessionConfig) -> Result<(), Box<dyn Error>> {
    let audio = config.audio;
    let wall_clock = SystemClock::new();
    let (mut command_tx, mut command_rx) = create_command_channel(COMMAND_RINGBUFFER_CAPACITY);
    let (notification_tx, mut notification_rx) =
        create_notification_channel(NOTIFICATION_RINGBUFFER_CAPACITY);

    // The device decides the sample rate; the session clock counts its frames
    let device = OutputDevice::open_default()?;
    let sample_rate = device.sample_rate();
    let synth = SynthPlayer::new(sample_rate);
    let timing = AudioTiming::new(sample_rate);
    let (processor, mut accumulator, capture) =
        capture_channel(audio.capture_capacity, sample_rate);

    let mut session = Session::builder()
        .params(config.performance)
        .seed_opt(config.seed)
        .notifications(notification_tx)
        .build(synth.clone(), timing.clone());

    let engine = device.start(synth, processor, timing)?;
    println!(
        "Audio engine started: {} Hz, {} channels",
        engine.sample_rate(),
        engine.channels()
    );

    // Stdin thread: one command per line
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("help") {
                COMMAND_HELP.iter().for_each(|usage| println!("{}", usage));
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if command_tx.try_push(command).is_err() {
                        warn!("Command queue full, command dropped");
                    }
                }
                Err(e) => eprintln!("{}", e),
            }
        }
        let _ = command_tx.try_push(Command::Quit);
    });

    println!("=== MyMusic Keyboard ===");
    println!("Type 'help' for the command list.");

    'session: loop {
        while let Some(command) = command_rx.try_pop() {
            match command {
                Command::Quit => break 'session,
                Command::StartCapture => {
                    accumulator.reset();
                    capture.start();
                    info!("Audio capture started");
                    println!("Capturing audio...");
                }
                Command::StopCapture => {
                    if !capture.is_recording() {
                        continue;
                    }
                    capture.stop();
                    let samples = accumulator.finish();
                    match save_recording(&audio.output_dir, &samples, sample_rate) {
                        Ok(path) => println!("Saved {}", path.display()),
                        Err(e) => {
                            error!("Capture not saved: {}", e);
                            eprintln!("Capture not saved: {}", e);
                        }
                    }
                }
                other => session.apply(other),
            }
        }

        session.run_pending();
        if capture.is_recording() {
            accumulator.drain();
        }
        while let Some(notification) = notification_rx.try_pop() {
            println!("{}", notification);
        }

        let wait = session
            .next_deadline()
            .map(|deadline| deadline - session.now())
            .unwrap_or(LIVE_POLL_SECONDS)
            .clamp(0.0005, LIVE_POLL_SECONDS);
        thread::sleep(Duration::from_secs_f64(wait));
    }

    drop(engine);
    if capture.overruns() > 0 {
        warn!(overruns = capture.overruns(), "Capture blocks were dropped");
    }
    info!(seconds = wall_clock.now(), "Session closed");
    Ok(())
}
