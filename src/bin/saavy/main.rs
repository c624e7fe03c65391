//! saavy-drums - play a groove on the default output device
//!
//! Run with: cargo run -- --seconds 8 --tempo 96

use std::{thread, time::Duration};

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use saavy_drums::{
    engine::params::{DelayUpdate, ReverbUpdate},
    sequencing::StepUpdate,
    DrumMachine, EngineConfig, EventKind, SequencerEvent,
};

#[derive(Parser)]
#[command(version, about = "Analog-style drum machine demo.")]
struct Cli {
    /// How long to play, in seconds.
    #[arg(short, long, default_value_t = 8.0)]
    seconds: f64,
    /// Tempo in BPM (30 - 300).
    #[arg(short, long, default_value_t = 120.0)]
    tempo: f64,
    /// Swing amount (0 - 100).
    #[arg(long, default_value_t = 20.0)]
    swing: f32,
    /// Master volume (0 - 100).
    #[arg(long, default_value_t = 80.0)]
    volume: f32,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let machine = DrumMachine::new(EngineConfig {
        tempo: cli.tempo,
        volume: cli.volume,
        ..EngineConfig::default()
    });
    machine.try_initialize().map_err(|e| eyre!("audio unavailable: {e}"))?;

    seed_groove(&machine, cli.swing);
    machine.set_delay_params(DelayUpdate {
        time: Some(0.375),
        mix: Some(0.15),
        ..DelayUpdate::default()
    });
    machine.set_reverb_params(ReverbUpdate {
        size: Some(0.35),
        mix: Some(0.15),
        ..ReverbUpdate::default()
    });

    let steps = machine.subscribe(EventKind::Step);
    machine.start();
    println!("Playing {:.1}s at {} BPM...", cli.seconds, machine.tempo());

    let deadline = Duration::from_secs_f64(cli.seconds.max(0.0));
    let started = std::time::Instant::now();
    while started.elapsed() < deadline {
        while let Ok(SequencerEvent::Step { step_index }) = steps.receiver().try_recv() {
            if step_index % 4 == 0 {
                print!("{} ", step_index / 4 + 1);
            }
        }
        thread::sleep(Duration::from_millis(20));
    }
    println!();

    machine.stop();
    // Let the last hits ring out.
    thread::sleep(Duration::from_millis(500));
    Ok(())
}

fn seed_groove(machine: &DrumMachine, swing: f32) {
    machine.create_pattern("demo", "Demo", 16);

    let on = |velocity: u8| StepUpdate {
        active: Some(true),
        velocity: Some(velocity),
        ..StepUpdate::default()
    };

    // Kick
    for step in [0, 6, 8, 11] {
        machine.update_step(0, step, on(115));
    }
    // Snare and clap on the backbeat
    for step in [4, 12] {
        machine.update_step(1, step, on(105));
        machine.update_step(3, step, on(70));
    }
    // Hats, accented on the beat
    for step in 0..16 {
        machine.update_step(2, step, on(if step % 4 == 0 { 100 } else { 60 }));
    }
    machine.update_step(5, 14, on(90));
    machine.update_step(7, 10, on(80));

    machine.set_swing(swing);
}
