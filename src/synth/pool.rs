//! Fixed voice pool with note lookup and voice stealing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand::Rng;

use crate::{
    dsp::envelope::EnvelopeStage,
    synth::{
        message::NoteId,
        params::{ParamUpdate, SynthParams},
        voice::{NoteStart, Voice},
    },
};

/*
Admission Control
=================

The pool holds `polyphony + steal_slots` voices, all allocated up front.
At most `polyphony` of them sound normally; the spare slots exist so a
stolen voice can fade out while the new note already plays somewhere else.

note_on(id)
-----------

  1. A voice already owning `id`           → retrigger it in place.
  2. `polyphony` voices already sounding   → steal one (below), then go on.
  3. Any free slot                         → start the note there.
  4. Every slot busy (spares all fading)   → reclaim the quietest fade.

Step 4 cuts a voice that is already part way to silence. It only happens
when notes arrive faster than fades complete.

Steal Score
-----------

Every sounding voice gets a score; the lowest one is stolen:

    score = - release_bonus                  if the envelope is releasing
            - age_per_frame · frames since note-on
            - quietness · (1 - envelope level)

With the default weights a releasing voice always loses to a held one
unless the held one is more than ~100k frames (≈2 s) older. Among held
voices the oldest and quietest go first. Only the ordering matters; the
weights are plain configuration.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StealWeights {
    pub release_bonus: f64,
    pub age_per_frame: f64,
    pub quietness: f64,
}

impl Default for StealWeights {
    fn default() -> Self {
        Self {
            release_bonus: 100_000.0,
            age_per_frame: 1.0,
            quietness: 10_000.0,
        }
    }
}

pub struct VoicePool {
    voices: Vec<Voice>,
    polyphony: usize,
    fade_secs: f32,
    weights: StealWeights,
    steals: u64,
}

impl VoicePool {
    pub fn new(
        sample_rate: f32,
        polyphony: usize,
        steal_slots: usize,
        fade_secs: f32,
        weights: StealWeights,
    ) -> Self {
        let polyphony = polyphony.max(1);
        let voices = (0..polyphony + steal_slots)
            .map(|_| Voice::new(sample_rate))
            .collect();

        Self {
            voices,
            polyphony,
            fade_secs,
            weights,
            steals: 0,
        }
    }

    /// Start (or retrigger) a note. Returns the slot it landed in.
    pub fn note_on<R: Rng + ?Sized>(
        &mut self,
        note: NoteStart,
        params: &SynthParams,
        frame: u64,
        rng: &mut R,
    ) -> usize {
        if let Some(idx) = self.find(note.id) {
            self.voices[idx].start(note, params, frame, rng);
            return idx;
        }

        if self.sounding_count() >= self.polyphony {
            self.steal(frame);
        }

        let idx = match self.voices.iter().position(|v| !v.is_active()) {
            Some(idx) => idx,
            None => self.quietest_fade(),
        };
        self.voices[idx].start(note, params, frame, rng);
        idx
    }

    pub fn note_off(&mut self, id: NoteId) {
        if let Some(idx) = self.find(id) {
            self.voices[idx].release();
        }
    }

    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.release();
        }
    }

    pub fn update_params(&mut self, params: &SynthParams, update: &ParamUpdate) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.update_params(params, update);
        }
    }

    /// Lower means more stealable.
    pub fn steal_score(&self, voice: &Voice, frame: u64) -> f64 {
        let mut score = 0.0;
        if voice.stage() == EnvelopeStage::Release {
            score -= self.weights.release_bonus;
        }
        score -= frame.saturating_sub(voice.start_frame()) as f64 * self.weights.age_per_frame;
        score -= (1.0 - voice.envelope_level() as f64) * self.weights.quietness;
        score
    }

    fn steal(&mut self, frame: u64) {
        let victim = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active() && !v.is_being_stolen())
            .map(|(idx, v)| (idx, self.steal_score(v, frame)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx);

        if let Some(idx) = victim {
            self.voices[idx].begin_steal(self.fade_secs);
            self.steals += 1;
        }
    }

    fn quietest_fade(&mut self) -> usize {
        let idx = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_being_stolen())
            .min_by(|a, b| a.1.fade_gain().total_cmp(&b.1.fade_gain()))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        self.voices[idx].free();
        idx
    }

    /// Slot currently sounding `id`, skipping voices that are fading out.
    pub fn find(&self, id: NoteId) -> Option<usize> {
        self.voices.iter().position(|v| v.owns(id))
    }

    /// Sum every active voice into `out`.
    pub fn render_add(&mut self, out: &mut [f32]) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.render_add(out);
        }
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn polyphony(&self) -> usize {
        self.polyphony
    }

    /// Voices producing sound, fading ones included.
    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Voices holding a note, fading ones excluded.
    pub fn sounding_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| v.is_active() && !v.is_being_stolen())
            .count()
    }

    pub fn stealing_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_being_stolen()).count()
    }

    /// Total voices stolen since construction.
    pub fn steal_count(&self) -> u64 {
        self.steals
    }
}
