//! RenderEngine that turns queued note events into host audio

use crate::Result;
use clavier_core::config::{validate_sample_rate, validate_tuning};
use clavier_core::{
    format, AudioBuffer, BankId, EngineConfig, Event, EventInbox, LoadError, Program,
    SynthesisCapability, MIDI_CHANNELS,
};
use clavier_synth::SoundFontSynth;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Replaced capabilities waiting to be dropped on the control side.
const RETIRE_CAPACITY: usize = 4;

/// Creates fresh, bank-less capability instances.
pub type CapabilityFactory<S> = Box<dyn Fn() -> S + Send + Sync>;

/// Lifecycle of the active bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineStatus {
    /// No bank has been loaded yet.
    Empty,
    /// A bank is being parsed. The previous bank (if any) is still playing.
    Loading,
    /// A bank is active.
    Ready,
}

/// Published description of the active bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankInfo {
    pub id: BankId,
    pub programs: Vec<Program>,
}

impl BankInfo {
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn program_name(&self, index: usize) -> Option<&str> {
        self.programs.get(index).map(|p| p.name.as_str())
    }
}

/// Configuration the render thread copies once per block.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Snapshot {
    tuning_hz: f32,
    selected: [Option<usize>; MIDI_CHANNELS],
    revision: u64,
}

/// Control-side state, guarded by one short critical section.
struct EngineState<S> {
    sample_rate: f64,
    tuning_hz: f32,
    bank: Option<Arc<BankInfo>>,
    selected: [Option<usize>; MIDI_CHANNELS],
    /// Bumped on every tuning or selection change.
    revision: u64,
    /// Fully loaded capability waiting to be installed by the render thread.
    pending: Option<S>,
    status: EngineStatus,
}

impl<S> EngineState<S> {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            tuning_hz: self.tuning_hz,
            selected: self.selected,
            revision: self.revision,
        }
    }
}

/// Everything `render_into` touches besides the inbox.
struct RenderSide<S> {
    capability: S,
    /// Last configuration pushed into `capability`; `None` forces a full re-apply.
    applied: Option<Snapshot>,
    /// Interleaved stereo, `max_block_frames * 2` samples.
    scratch: Vec<f32>,
    events: Vec<Event>,
}

impl<S: SynthesisCapability> RenderSide<S> {
    fn install(&mut self, capability: S) -> S {
        self.applied = None;
        std::mem::replace(&mut self.capability, capability)
    }

    fn apply(&mut self, snapshot: Snapshot) {
        let previous = self.applied;
        if previous.is_some_and(|p| p.revision == snapshot.revision) {
            return;
        }

        if previous.map_or(true, |p| p.tuning_hz != snapshot.tuning_hz) {
            self.capability.set_tuning(snapshot.tuning_hz);
        }
        for (channel, index) in snapshot.selected.iter().enumerate() {
            let changed = previous.map_or(true, |p| p.selected[channel] != *index);
            if let (true, Some(index)) = (changed, *index) {
                self.capability.select_program(channel as u8, index);
            }
        }
        self.applied = Some(snapshot);
    }

    fn apply_event(&mut self, event: Event) {
        if event.is_release() {
            self.capability.note_off(event.channel(), event.note());
        } else {
            self.capability
                .note_on(event.channel(), event.note(), event.velocity());
        }
    }
}

/// Real-time instrument engine.
///
/// Shared between a control thread (input, UI, bank loading) and the audio
/// thread, typically behind an `Arc`. The audio thread only calls
/// [`render_into`](Self::render_into) (or [`render_block`](Self::render_block));
/// everything else is control side.
///
/// Two mechanisms keep the render path from blocking:
/// - note events travel through a bounded [`EventInbox`],
/// - configuration changes are recorded in a shared state that the render
///   thread samples with `try_lock` once per block. Newly loaded banks are
///   built on the control thread in a fresh capability and swapped in whole.
///
/// # Example
///
/// ```ignore
/// use clavier::prelude::*;
///
/// let engine = RenderEngine::builder().build()?;
/// engine.load_bank_file("piano.sf2")?;
/// engine.prepare(48000.0)?;
///
/// engine.post_event(Event::note_on(60, 0.8));
/// let block = engine.render_block(2, 512);
/// ```
pub struct RenderEngine<S: SynthesisCapability = SoundFontSynth> {
    inbox: EventInbox,
    state: Mutex<EngineState<S>>,
    render: Mutex<RenderSide<S>>,
    factory: CapabilityFactory<S>,
    /// Serializes bank loads.
    load_lock: Mutex<()>,
    retire_tx: Sender<S>,
    retire_rx: Receiver<S>,
    release_all: AtomicBool,
    max_block_frames: usize,
}

impl RenderEngine {
    /// Create a new engine builder
    pub fn builder() -> crate::RenderEngineBuilder {
        crate::RenderEngineBuilder::default()
    }
}

impl<S: SynthesisCapability> RenderEngine<S> {
    /// Build an engine around `factory`. Every bank load asks the factory for a
    /// fresh instance.
    pub fn new(config: EngineConfig, factory: CapabilityFactory<S>) -> Result<Self> {
        config.validate()?;

        let mut capability = factory();
        capability.configure_output(config.sample_rate);
        capability.set_tuning(config.tuning_hz);

        let (retire_tx, retire_rx) = crossbeam_channel::bounded(RETIRE_CAPACITY);

        tracing::debug!(
            sample_rate = config.sample_rate,
            tuning_hz = config.tuning_hz,
            inbox_capacity = config.inbox_capacity,
            max_block_frames = config.max_block_frames,
            "render engine created"
        );

        Ok(Self {
            inbox: EventInbox::new(config.inbox_capacity),
            state: Mutex::new(EngineState {
                sample_rate: config.sample_rate,
                tuning_hz: config.tuning_hz,
                bank: None,
                selected: [None; MIDI_CHANNELS],
                revision: 0,
                pending: None,
                status: EngineStatus::Empty,
            }),
            render: Mutex::new(RenderSide {
                capability,
                applied: None,
                scratch: vec![0.0; config.max_block_frames * 2],
                events: Vec::with_capacity(config.inbox_capacity),
            }),
            factory,
            load_lock: Mutex::new(()),
            retire_tx,
            retire_rx,
            release_all: AtomicBool::new(false),
            max_block_frames: config.max_block_frames,
        })
    }

    /// Adopt a new host sample rate.
    ///
    /// Reconfigures the live capability and any bank still waiting to be
    /// installed, and discards every pending event. Blocks until an in-flight
    /// render finishes; call it from the host's format-change notification,
    /// not from the audio callback.
    pub fn prepare(&self, sample_rate_hz: f64) -> Result<()> {
        validate_sample_rate(sample_rate_hz)?;

        let mut side = self.render.lock();
        let pending = {
            let mut state = self.state.lock();
            state.sample_rate = sample_rate_hz;
            state.pending.take()
        };
        let replaced = pending.map(|capability| side.install(capability));
        side.capability.configure_output(sample_rate_hz);
        let discarded = self.inbox.clear();
        drop(side);

        drop(replaced);
        self.reclaim();

        tracing::debug!(sample_rate = sample_rate_hz, discarded, "engine prepared");
        Ok(())
    }

    /// Render one host block into a new buffer of `channels * frames` samples.
    pub fn render_block(&self, channels: usize, frames: usize) -> AudioBuffer {
        let mut output = AudioBuffer::new(channels, frames);
        self.render_into(&mut output);
        output
    }

    /// Render into `output`, using its channel count and length.
    ///
    /// Applies every event queued before the call, in order, then renders.
    /// Never blocks: if `prepare` is reconfiguring the engine the block is
    /// silent and queued events wait for the next one.
    pub fn render_into(&self, output: &mut AudioBuffer) {
        let Some(mut guard) = self.render.try_lock() else {
            output.fill(0.0);
            return;
        };
        let side = &mut *guard;

        let (pending, snapshot) = match self.state.try_lock() {
            Some(mut state) => (state.pending.take(), Some(state.snapshot())),
            None => (None, None),
        };

        if let Some(capability) = pending {
            let retired = side.install(capability);
            // Fails only if the control side stopped draining; the old
            // instance is then dropped here.
            let _ = self.retire_tx.try_send(retired);
        }
        if let Some(snapshot) = snapshot {
            side.apply(snapshot);
        }

        if self.release_all.swap(false, Ordering::AcqRel) {
            side.capability.all_notes_off();
        }

        let mut events = std::mem::take(&mut side.events);
        self.inbox.drain_into(&mut events);
        for event in events.drain(..) {
            side.apply_event(event);
        }
        side.events = events;

        let frames = output.frames();
        let mut offset = 0;
        while offset < frames {
            let chunk = (frames - offset).min(self.max_block_frames);
            let scratch = &mut side.scratch[..chunk * 2];
            side.capability.render(scratch, chunk);
            format::convert_into(scratch, output, offset);
            offset += chunk;
        }
    }

    /// Queue an event for the next render block. Returns `false` if the inbox
    /// is full and the event was dropped.
    pub fn post_event(&self, event: Event) -> bool {
        self.inbox.push(event)
    }

    /// Parse a bank and make it active.
    ///
    /// The bank is loaded into a fresh capability on the calling thread,
    /// configured with the current sample rate and tuning, and handed to the
    /// render thread, which swaps it in at the start of its next block. On
    /// error the previous bank keeps playing.
    pub fn load_bank(&self, bytes: &[u8]) -> std::result::Result<BankInfo, LoadError> {
        let _load = self.load_lock.lock();
        self.reclaim();

        let (mut sample_rate, tuning_hz, previous) = {
            let mut state = self.state.lock();
            let previous = state.status;
            state.status = EngineStatus::Loading;
            (state.sample_rate, state.tuning_hz, previous)
        };

        let mut capability = (self.factory)();
        capability.configure_output(sample_rate);
        capability.set_tuning(tuning_hz);

        let handle = match capability.load_bank(bytes) {
            Ok(handle) => handle,
            Err(e) => {
                self.state.lock().status = previous;
                tracing::warn!(error = %e, "bank load failed, keeping previous bank");
                return Err(e);
            }
        };

        let info = Arc::new(BankInfo {
            id: handle.id,
            programs: capability.programs(),
        });
        let first = if info.programs.is_empty() {
            None
        } else {
            Some(0)
        };

        // prepare() may run while the bank is parsed; publish only at the
        // sample rate currently in effect.
        let replaced = loop {
            let mut state = self.state.lock();
            if state.sample_rate != sample_rate {
                sample_rate = state.sample_rate;
                drop(state);
                capability.configure_output(sample_rate);
                continue;
            }
            state.bank = Some(Arc::clone(&info));
            state.selected = [first; MIDI_CHANNELS];
            state.revision += 1;
            state.status = EngineStatus::Ready;
            break state.pending.replace(capability);
        };
        drop(replaced);

        tracing::info!(
            bank = info.id.id(),
            programs = info.program_count(),
            sample_rate,
            "bank loaded"
        );
        Ok(BankInfo::clone(&info))
    }

    /// Read a bank file on the calling thread and load it.
    pub fn load_bank_file(&self, path: impl AsRef<Path>) -> Result<BankInfo> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read bank file");
        Ok(self.load_bank(&bytes)?)
    }

    /// Set the reference pitch of A4 (415 to 466 Hz). Takes effect at the
    /// start of the next render block.
    pub fn set_tuning(&self, tuning_hz: f32) -> Result<()> {
        validate_tuning(tuning_hz)?;
        self.reclaim();
        let mut state = self.state.lock();
        state.tuning_hz = tuning_hz;
        state.revision += 1;
        drop(state);
        tracing::debug!(tuning_hz, "tuning changed");
        Ok(())
    }

    /// Select program `index` of the active bank on `channel`. Ignored when
    /// either is out of range.
    pub fn select_program(&self, channel: u8, index: usize) {
        self.reclaim();
        let mut state = self.state.lock();
        let count = state.bank.as_ref().map_or(0, |b| b.program_count());
        if channel as usize >= MIDI_CHANNELS || index >= count {
            tracing::debug!(channel, index, count, "program selection ignored");
            return;
        }
        state.selected[channel as usize] = Some(index);
        state.revision += 1;
    }

    /// Release every sounding note and discard queued events.
    pub fn all_notes_off(&self) {
        let discarded = self.inbox.clear();
        self.release_all.store(true, Ordering::Release);
        tracing::debug!(discarded, "all notes off");
    }

    pub fn sample_rate(&self) -> f64 {
        self.state.lock().sample_rate
    }

    pub fn tuning(&self) -> f32 {
        self.state.lock().tuning_hz
    }

    pub fn status(&self) -> EngineStatus {
        self.reclaim();
        self.state.lock().status
    }

    /// The active bank, if any.
    pub fn bank(&self) -> Option<Arc<BankInfo>> {
        self.reclaim();
        self.state.lock().bank.clone()
    }

    pub fn program_count(&self) -> usize {
        self.state
            .lock()
            .bank
            .as_ref()
            .map_or(0, |b| b.program_count())
    }

    pub fn program_name(&self, index: usize) -> Option<String> {
        self.state
            .lock()
            .bank
            .as_ref()
            .and_then(|b| b.program_name(index).map(str::to_owned))
    }

    pub fn selected_program(&self, channel: u8) -> Option<usize> {
        self.state
            .lock()
            .selected
            .get(channel as usize)
            .copied()
            .flatten()
    }

    /// Events dropped because the inbox was full.
    pub fn dropped_events(&self) -> u64 {
        self.inbox.dropped_count()
    }

    pub fn inbox_capacity(&self) -> usize {
        self.inbox.capacity()
    }

    pub fn max_block_frames(&self) -> usize {
        self.max_block_frames
    }

    /// Current configuration.
    pub fn config(&self) -> EngineConfig {
        let state = self.state.lock();
        EngineConfig {
            sample_rate: state.sample_rate,
            tuning_hz: state.tuning_hz,
            inbox_capacity: self.inbox.capacity(),
            max_block_frames: self.max_block_frames,
        }
    }

    /// Drop capabilities the render thread has swapped out. Control-side
    /// calls run this so a replaced bank is freed soon after the swap.
    fn reclaim(&self) {
        let count = self.retire_rx.try_iter().count();
        if count > 0 {
            tracing::debug!(count, "released retired capabilities");
        }
    }
}
