use std::f32::consts::TAU;

use rand::Rng;

use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeStage},
        filter::SvFilter,
        lfo::{amplitude_gain, cutoff_scale, pitch_ratio, Lfo, LfoTarget},
        oscillator::{wrap_phase, Waveform},
        unison::Unison,
    },
    synth::{message::NoteId, params::{ParamUpdate, SynthParams}},
    MIN_GAIN,
};

/*
Voice
=====

One sounding (or idle) note. Every voice is built once when the engine starts
and then recycled forever; `start` rewrites its whole state for a new note.

Per-sample signal chain
-----------------------

    LFO ──┬─ pitch ──→ frequency ──→ dt
          │                           │
          │      FM modulator ──→ phase offset
          │                           ↓
          │                    unison oscillators (mean)
          │                           ↓
          │                  × envelope × velocity
          ├─ amplitude ──→     × max(0, 1 + lfo)
          └─ cutoff ─────→      filter (optional)
                                      ↓
                              × steal fade gain

FM is phase modulation: a sine modulator running at `fm_ratio × dt` is scaled
by the index (radians converted to cycles, index / 2π) and added to every
unison copy's phase before the waveform lookup.

Lifetime
--------

    free ──start──→ sounding ──release──→ releasing ──envelope idle──→ free
                       │                      │
                       └──────begin_steal─────┴──→ fading ──fade = 0──→ free

A fading voice still owns its `note_id` for bookkeeping, but the pool never
hands it out again for that id. Once the fade reaches zero the voice drops
the id and becomes available immediately.

Unison count and detune are captured at `start`; changing them only affects
later notes. Everything else follows `update_params` live.
*/

/// Highest phase increment we render; keeps the PolyBLEP windows disjoint.
const MAX_DT: f32 = 0.5;

/// Everything a note-on carries that is specific to that note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteStart {
    pub id: NoteId,
    pub frequency: f32,
    pub waveform: Waveform,
    pub velocity: f32,
}

#[derive(Debug, Clone)]
pub struct Voice {
    sample_rate: f32,

    note_id: Option<NoteId>,
    active: bool,
    start_frame: u64,

    frequency: f32,
    velocity: f32,
    waveform: Waveform,

    unison: Unison,
    mod_phase: f32,
    use_fm: bool,
    fm_ratio: f32,
    fm_index_cycles: f32,

    envelope: Envelope,

    filter: SvFilter,
    use_filter: bool,

    lfo: Lfo,
    lfo_target: LfoTarget,

    being_stolen: bool,
    fade_gain: f32,
    fade_step: f32,
}

impl Voice {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            note_id: None,
            active: false,
            start_frame: 0,
            frequency: 440.0,
            velocity: 0.0,
            waveform: Waveform::Sine,
            unison: Unison::default(),
            mod_phase: 0.0,
            use_fm: false,
            fm_ratio: 2.0,
            fm_index_cycles: 0.0,
            envelope: Envelope::new(sample_rate),
            filter: SvFilter::new(sample_rate),
            use_filter: false,
            lfo: Lfo::new(sample_rate),
            lfo_target: LfoTarget::None,
            being_stolen: false,
            fade_gain: 1.0,
            fade_step: 0.0,
        }
    }

    /// Reinitialize the voice for a new note.
    ///
    /// Restarting a voice that is still sounding the same note keeps the
    /// envelope level and filter memory so the retrigger does not click.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        note: NoteStart,
        params: &SynthParams,
        frame: u64,
        rng: &mut R,
    ) {
        let retrigger = self.active && !self.being_stolen && self.note_id == Some(note.id);
        if !retrigger {
            self.envelope.reset();
            self.filter.reset();
        }

        self.note_id = Some(note.id);
        self.active = true;
        self.start_frame = frame;
        self.frequency = note.frequency;
        self.velocity = note.velocity.clamp(0.0, 1.0);
        self.waveform = note.waveform;

        let base_phase = wrap_phase(params.phase_offset_cycles());
        self.unison
            .start(params.unison_voices, params.unison_detune, base_phase, rng);
        self.mod_phase = 0.0;

        self.apply_envelope(params);
        self.apply_filter(params);
        self.apply_lfo(params);
        self.apply_fm(params);
        self.filter.snap_cutoff();
        self.lfo.snap_depth();
        self.lfo.reset_phase();

        self.being_stolen = false;
        self.fade_gain = 1.0;
        self.fade_step = 0.0;

        self.envelope.note_on();
    }

    /// Gate off. The voice keeps sounding through its release.
    pub fn release(&mut self) {
        if self.active {
            self.envelope.note_off();
        }
    }

    /// Pick up a global parameter change while the note is sounding.
    pub fn update_params(&mut self, params: &SynthParams, update: &ParamUpdate) {
        if update.touches_envelope() {
            self.apply_envelope(params);
        }
        if update.touches_filter() {
            let was_enabled = self.use_filter;
            self.apply_filter(params);
            if self.use_filter && !was_enabled {
                self.filter.reset();
                self.filter.snap_cutoff();
            }
        }
        if update.touches_lfo() {
            self.apply_lfo(params);
        }
        if update.touches_fm() {
            self.apply_fm(params);
        }
    }

    fn apply_envelope(&mut self, params: &SynthParams) {
        self.envelope
            .set_times(params.attack, params.decay, params.sustain, params.release);
        self.envelope.set_enabled(params.use_adsr);
    }

    fn apply_filter(&mut self, params: &SynthParams) {
        self.use_filter = params.use_filter;
        self.filter.set_cutoff(params.filter_cutoff);
        self.filter.set_resonance(params.filter_resonance);
        self.filter.set_mode(params.filter_mode);
    }

    fn apply_lfo(&mut self, params: &SynthParams) {
        self.lfo.set_rate(params.lfo_rate);
        self.lfo.set_depth(params.lfo_depth);
        self.lfo_target = params.lfo_target;
    }

    fn apply_fm(&mut self, params: &SynthParams) {
        self.use_fm = params.use_fm;
        self.fm_ratio = params.fm_ratio;
        self.fm_index_cycles = params.fm_index / TAU;
    }

    /// Start a linear fade to silence over `fade_secs`.
    pub fn begin_steal(&mut self, fade_secs: f32) {
        if !self.active || self.being_stolen {
            return;
        }
        self.being_stolen = true;
        self.fade_step = 1.0 / (fade_secs * self.sample_rate).max(1.0);
    }

    /// Silence the voice and give up its note.
    pub fn free(&mut self) {
        self.active = false;
        self.note_id = None;
        self.being_stolen = false;
        self.fade_gain = 1.0;
        self.envelope.reset();
        self.filter.reset();
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let lfo = self.lfo.next_value();

        let mut frequency = self.frequency;
        if self.lfo_target == LfoTarget::Pitch {
            frequency *= pitch_ratio(lfo);
        }
        let dt = (frequency / self.sample_rate).min(MAX_DT);

        let fm_offset = if self.use_fm {
            let modulator = (TAU * self.mod_phase).sin() * self.fm_index_cycles;
            self.mod_phase = wrap_phase(self.mod_phase + self.fm_ratio * dt);
            modulator
        } else {
            0.0
        };

        let osc = self.unison.next(self.waveform, dt, fm_offset);
        let env = self.envelope.next_sample();
        let mut out = osc * env * self.velocity;

        if self.lfo_target == LfoTarget::Amplitude {
            out *= amplitude_gain(lfo);
        }

        if self.use_filter {
            let scale = if self.lfo_target == LfoTarget::FilterCutoff {
                cutoff_scale(lfo)
            } else {
                1.0
            };
            out = self.filter.next_sample(out, scale);
        }

        if self.being_stolen {
            out *= self.fade_gain;
            self.fade_gain -= self.fade_step;
            if self.fade_gain <= 0.0 {
                self.free();
                return out;
            }
        }

        if self.envelope.is_idle() && self.envelope.level() < MIN_GAIN {
            self.free();
        }

        out
    }

    /// Add this voice's output into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            if !self.active {
                break;
            }
            *sample += self.next_sample();
        }
    }

    /// Holds `id` and is not on its way out.
    pub fn owns(&self, id: NoteId) -> bool {
        self.active && !self.being_stolen && self.note_id == Some(id)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_being_stolen(&self) -> bool {
        self.being_stolen
    }

    pub fn note_id(&self) -> Option<NoteId> {
        self.note_id
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.envelope.stage()
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn fade_gain(&self) -> f32 {
        self.fade_gain
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Phases of every unison copy; the first is the carrier.
    pub fn phases(&self) -> &[f32] {
        self.unison.phases()
    }

    pub fn mod_phase(&self) -> f32 {
        self.mod_phase
    }

    pub fn unison_count(&self) -> usize {
        self.unison.count()
    }

    pub fn filter(&self) -> &SvFilter {
        &self.filter
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}
