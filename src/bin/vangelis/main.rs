//! vangelis - play the polyphonic engine on the default output device
//!
//! Run with: cargo run -- --waveform saw --unison 3 --detune 12

mod app;

use clap::Parser;
use vangelis::{dsp::Waveform, DEFAULT_MAX_VOICES};

#[derive(Parser)]
#[command(name = "vangelis")]
#[command(about = "Polyphonic synth voice engine demo", long_about = None)]
struct Cli {
    /// Oscillator waveform (sine, saw, square, triangle)
    #[arg(short, long, default_value = "saw")]
    waveform: Waveform,

    /// Voices that sound before stealing kicks in
    #[arg(short, long, default_value_t = DEFAULT_MAX_VOICES)]
    polyphony: usize,

    /// Seed for unison phase jitter
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,

    /// Low-pass cutoff in Hz (filter is off when omitted)
    #[arg(short, long)]
    cutoff: Option<f32>,

    /// Filter resonance (0.1 - 10)
    #[arg(short, long, default_value_t = 0.7)]
    resonance: f32,

    /// Unison copies per note (1 - 4)
    #[arg(short, long, default_value_t = 1)]
    unison: usize,

    /// Cents between unison copies
    #[arg(short, long, default_value_t = 0.0)]
    detune: f32,

    /// Seconds each chord is held
    #[arg(long, default_value_t = 1.5)]
    hold: f32,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    app::Demo {
        waveform: cli.waveform,
        polyphony: cli.polyphony,
        seed: cli.seed,
        cutoff: cli.cutoff,
        resonance: cli.resonance,
        unison: cli.unison,
        detune: cli.detune,
        hold_secs: cli.hold,
    }
    .run()
}
