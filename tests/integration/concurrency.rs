//! Control and render threads running together.
//!
//! A render thread plays the role of the audio callback while the test thread
//! posts events, retunes, selects programs and swaps banks.

use crate::helpers::*;
use clavier::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Spawn a thread that renders until `stop` is set. Returns the number of
/// blocks rendered.
fn spawn_renderer<S: SynthesisCapability>(
    engine: Arc<RenderEngine<S>>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<usize> {
    thread::spawn(move || {
        let mut block = AudioBuffer::new(2, 128);
        let mut blocks = 0;
        while !stop.load(Ordering::Acquire) {
            engine.render_into(&mut block);
            assert_eq!(block.len(), 256);
            blocks += 1;
            thread::yield_now();
        }
        blocks
    })
}

#[test]
fn test_every_posted_event_applied_once() {
    let (engine, log) = recording_engine(1024);
    let engine = Arc::new(engine);
    let stop = Arc::new(AtomicBool::new(false));
    let renderer = spawn_renderer(Arc::clone(&engine), Arc::clone(&stop));

    let mut posted = Vec::new();
    for i in 0..500u32 {
        let note = (i % 128) as u8;
        if engine.post_event(Event::note_on(note, 1.0)) {
            posted.push(Applied::NoteOn { channel: 0, note });
        }
        if i % 50 == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }

    // Let the renderer drain the rest
    while log.lock().len() < posted.len() {
        thread::sleep(Duration::from_millis(1));
    }
    stop.store(true, Ordering::Release);
    renderer.join().unwrap();

    assert_eq!(*log.lock(), posted);
    assert_eq!(posted.len() as u64 + engine.dropped_events(), 500);
}

#[test]
fn test_multiple_producers() {
    let (engine, log) = recording_engine(4096);
    let engine = Arc::new(engine);
    let stop = Arc::new(AtomicBool::new(false));
    let renderer = spawn_renderer(Arc::clone(&engine), Arc::clone(&stop));

    let accepted = Arc::new(AtomicUsize::new(0));
    let producers: Vec<_> = (0..4u8)
        .map(|channel| {
            let engine = Arc::clone(&engine);
            let accepted = Arc::clone(&accepted);
            thread::spawn(move || {
                for note in 0..100u8 {
                    if engine.post_event(Event::note_on(note, 1.0).on_channel(channel)) {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    let accepted = accepted.load(Ordering::Relaxed);
    while log.lock().len() < accepted {
        thread::sleep(Duration::from_millis(1));
    }
    stop.store(true, Ordering::Release);
    renderer.join().unwrap();

    // Per channel, notes arrive in the order that producer posted them
    let log = log.lock();
    for channel in 0..4u8 {
        let notes: Vec<u8> = log
            .iter()
            .filter_map(|a| match a {
                Applied::NoteOn { channel: c, note } if *c == channel => Some(*note),
                _ => None,
            })
            .collect();
        assert!(notes.windows(2).all(|w| w[0] < w[1]), "channel {channel}");
    }
}

#[test]
fn test_bank_swaps_during_render() {
    let engine = Arc::new(test_engine());
    let stop = Arc::new(AtomicBool::new(false));
    let renderer = spawn_renderer(Arc::clone(&engine), Arc::clone(&stop));

    let bank = tone_bank();
    let mut last = None;
    for i in 0..10u8 {
        engine.post_event(Event::note_on(60 + i, 0.8));
        let info = engine.load_bank(&bank).unwrap();
        assert_ne!(Some(info.id), last);
        last = Some(info.id);

        engine.set_tuning(if i % 2 == 0 { 432.0 } else { 440.0 }).unwrap();
        engine.select_program(0, (i % 2) as usize);
        assert!(engine.load_bank(b"garbage").is_err());
    }

    stop.store(true, Ordering::Release);
    let blocks = renderer.join().unwrap();
    assert!(blocks > 0);

    assert_eq!(engine.status(), EngineStatus::Ready);
    assert_eq!(engine.bank().unwrap().id, last.unwrap());
    assert_eq!(engine.tuning(), 440.0);
}

#[test]
fn test_prepare_during_render() {
    let engine = Arc::new(loaded_engine());
    let stop = Arc::new(AtomicBool::new(false));
    let renderer = spawn_renderer(Arc::clone(&engine), Arc::clone(&stop));

    for rate in [44100.0, 96000.0, 48000.0, 22050.0, TEST_SAMPLE_RATE] {
        engine.prepare(rate).unwrap();
        engine.post_event(Event::note_on(69, 0.8));
        thread::sleep(Duration::from_millis(2));
    }

    stop.store(true, Ordering::Release);
    renderer.join().unwrap();
    assert_eq!(engine.sample_rate(), TEST_SAMPLE_RATE);
}
