//! Play a short phrase through the default audio device.
//!
//! ```bash
//! cargo run --example play_tone --features output [-- path/to/bank.sf2]
//! ```
//!
//! Without a path, a generated sine bank is used.

use clavier::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn main() -> clavier::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clavier=debug".into()),
        )
        .init();

    let engine = Arc::new(RenderEngine::builder().build()?);
    let info = match std::env::args().nth(1) {
        Some(path) => engine.load_bank_file(path)?,
        None => engine.load_bank(&clavier::synth::testing::tone_bank())?,
    };
    for program in &info.programs {
        println!(
            "{:>3}  {:>3}:{:<3}  {}",
            program.index, program.bank_number, program.patch_number, program.name
        );
    }

    let output = AudioOutput::start(Arc::clone(&engine), None)?;
    println!("Playing on {} at {} Hz", output.device_name(), output.sample_rate());

    for (i, tuning) in [440.0, 432.0].into_iter().enumerate() {
        engine.set_tuning(tuning)?;
        engine.select_program(0, i % info.program_count().max(1));
        for note in [60, 64, 67, 72] {
            engine.post_event(Event::note_on(note, 0.8));
            std::thread::sleep(Duration::from_millis(300));
            engine.post_event(Event::note_off(note));
        }
    }

    std::thread::sleep(Duration::from_millis(500));
    engine.all_notes_off();
    Ok(())
}
