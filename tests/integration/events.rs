//! Event delivery through the engine: ordering, overflow and release handling.

use crate::helpers::*;
use clavier::prelude::*;
use clavier::NoteKind;
use proptest::prelude::*;

#[test]
fn test_events_applied_in_posting_order() {
    let (engine, log) = recording_engine(16);

    engine.post_event(Event::note_on(60, 0.8));
    engine.post_event(Event::note_on(64, 0.8).on_channel(1));
    engine.post_event(Event::note_off(60));
    engine.post_event(Event::note_on(67, 0.8).on_channel(15));
    engine.render_block(2, TEST_BUFFER_SIZE);

    assert_eq!(
        *log.lock(),
        [
            Applied::NoteOn { channel: 0, note: 60 },
            Applied::NoteOn { channel: 1, note: 64 },
            Applied::NoteOff { channel: 0, note: 60 },
            Applied::NoteOn { channel: 15, note: 67 },
        ]
    );
}

#[test]
fn test_each_event_applied_once() {
    let (engine, log) = recording_engine(16);
    engine.post_event(Event::note_on(60, 0.8));

    engine.render_block(2, TEST_BUFFER_SIZE);
    engine.render_block(2, TEST_BUFFER_SIZE);
    engine.render_block(2, TEST_BUFFER_SIZE);

    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_zero_velocity_note_on_releases() {
    let (engine, log) = recording_engine(16);
    let event = Event::note_on(60, 0.0);
    assert_eq!(event.kind(), NoteKind::NoteOn);

    engine.post_event(event);
    engine.render_block(2, TEST_BUFFER_SIZE);

    assert_eq!(*log.lock(), [Applied::NoteOff { channel: 0, note: 60 }]);
}

#[test]
fn test_midi_bytes_become_events() {
    let (engine, log) = recording_engine(16);
    for bytes in [[0x93, 48, 100], [0x83, 48, 0], [0x90, 50, 0]] {
        engine.post_event(Event::from_midi(&bytes).unwrap());
    }
    assert!(Event::from_midi(&[0xB0, 7, 100]).is_none());
    engine.render_block(2, TEST_BUFFER_SIZE);

    assert_eq!(
        *log.lock(),
        [
            Applied::NoteOn { channel: 3, note: 48 },
            Applied::NoteOff { channel: 3, note: 48 },
            Applied::NoteOff { channel: 0, note: 50 },
        ]
    );
}

#[test]
fn test_overflow_drops_newest() {
    let capacity = 8;
    let (engine, log) = recording_engine(capacity);

    for note in 0..=capacity as u8 {
        let accepted = engine.post_event(Event::note_on(note, 1.0));
        assert_eq!(accepted, (note as usize) < capacity);
    }
    assert_eq!(engine.dropped_events(), 1);

    engine.render_block(2, TEST_BUFFER_SIZE);
    let log = log.lock();
    assert_eq!(log.len(), capacity);
    assert_eq!(
        log.last(),
        Some(&Applied::NoteOn {
            channel: 0,
            note: capacity as u8 - 1
        })
    );
}

#[test]
fn test_inbox_reusable_after_drain() {
    let (engine, log) = recording_engine(2);
    for _ in 0..5 {
        assert!(engine.post_event(Event::note_on(60, 1.0)));
        assert!(engine.post_event(Event::note_off(60)));
        engine.render_block(2, 64);
    }
    assert_eq!(engine.dropped_events(), 0);
    assert_eq!(log.lock().len(), 10);
}

#[test]
fn test_prepare_discards_queued_events() {
    let (engine, log) = recording_engine(16);
    engine.post_event(Event::note_on(60, 1.0));
    engine.prepare(TEST_SAMPLE_RATE).unwrap();
    engine.render_block(2, TEST_BUFFER_SIZE);
    assert!(log.lock().is_empty());
}

#[test]
fn test_events_survive_bank_swap() {
    let (engine, log) = recording_engine(16);
    engine.load_bank(&[1, 2, 3]).unwrap();
    engine.post_event(Event::note_on(72, 1.0));
    engine.render_block(2, TEST_BUFFER_SIZE);
    assert_eq!(*log.lock(), [Applied::NoteOn { channel: 0, note: 72 }]);
}

fn arb_event() -> impl Strategy<Value = Event> {
    (any::<bool>(), 0u8..16, 0u8..128, 0.0f32..=1.0).prop_map(|(on, channel, note, velocity)| {
        if on {
            Event::note_on(note, velocity).on_channel(channel)
        } else {
            Event::note_off(note).on_channel(channel)
        }
    })
}

fn expected(event: &Event) -> Applied {
    let (channel, note) = (event.channel(), event.note());
    if event.is_release() {
        Applied::NoteOff { channel, note }
    } else {
        Applied::NoteOn { channel, note }
    }
}

proptest! {
    #[test]
    fn prop_block_preserves_order(events in prop::collection::vec(arb_event(), 0..64)) {
        let (engine, log) = recording_engine(64);
        for event in &events {
            prop_assert!(engine.post_event(*event));
        }
        engine.render_block(2, 32);

        let want: Vec<Applied> = events.iter().map(expected).collect();
        prop_assert_eq!(&*log.lock(), &want);
    }

    #[test]
    fn prop_overflow_accounting(capacity in 1usize..32, extra in 0usize..32) {
        let (engine, log) = recording_engine(capacity);
        let accepted = (0..capacity + extra)
            .filter(|_| engine.post_event(Event::note_on(60, 1.0)))
            .count();
        prop_assert_eq!(accepted, capacity);
        prop_assert_eq!(engine.dropped_events(), extra as u64);

        engine.render_block(2, 32);
        prop_assert_eq!(log.lock().len(), capacity);
    }
}
