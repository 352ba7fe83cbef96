use crate::{MIN_GAIN, MIN_STAGE_TIME};

/*
ADSR Envelope Implementation
============================

This module implements an exponential ADSR envelope generator. Every voice
owns one and multiplies its oscillator output by the envelope level.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  stage       Idle, Attack, Decay, Sustain or Release. A state machine
              governs transitions.

  target      The value the current stage is gliding towards.

  coeff       Per-sample multiplier for the remaining distance to target.
              Computed once whenever the stage times change, never per sample.


The Shape: One-Pole Curves
--------------------------

  Level
    1.0 ┐   ╭╮
        │  ╱  ╲___________
    S   │ ╱               ╲
        │╱                 ╲_
    0.0 └─────────────────────╲───→ Time
         A   D     Sustain     R

Each sample, every moving stage runs the same recurrence:

    level = target + (level - target) * coeff
    coeff = exp(-1 / (time * sample_rate / TIME_CONSTANTS))

With TIME_CONSTANTS = 4 the curve covers all but e^-4 ≈ 1.8% of the
distance to `target` in `time` seconds. That is exponential, so it sounds
natural, but it never quite *arrives*. If the target were exactly 1.0 the
attack would need ~1.7× its nominal time to cross 0.999.

The fix is an overshoot target. Each stage aims past the point where it
should end, by exactly the amount the curve will fall short:

    target = (landing - start * R) / (1 - R)        R = e^-4

so that after `time` seconds the level sits on `landing`:

    Attack   start 0       landing 0.9995   (just past the 0.999 hand-off)
    Decay    start 1       landing sustain
    Release  start level   landing MIN_GAIN (and never above 0)

Levels are clamped to [0, 1] after every step, so the overshoot itself is
never audible.


The State Machine
-----------------

    Idle ──note_on──→ Attack ──level ≥ 0.999──→ Decay ──|level - S| < 0.001──→ Sustain
     ↑                  │                         │                              │
     │                  └────────note_off─────────┴──────────note_off────────────┘
     │                                            ↓
     └───────────level ≤ MIN_GAIN────────── Release

note_off is a no-op in Idle or Release, so repeated releases are harmless.

Bypass mode (`enabled = false`) jumps straight to Sustain at full level on
note_on, but still honours Release so notes stop without a click.
*/

/// Time constants covered by one stage time.
const TIME_CONSTANTS: f32 = 4.0;
/// Level the attack curve sits on after exactly `attack` seconds.
const ATTACK_LANDING: f32 = 0.9995;
const ATTACK_DONE: f32 = 0.999;
const DECAY_DONE: f32 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[derive(Debug, Clone)]
pub struct Envelope {
    sample_rate: f32,

    attack_time: f32,
    decay_time: f32,
    sustain_level: f32,
    release_time: f32,
    enabled: bool,

    attack_coeff: f32,
    decay_coeff: f32,
    release_coeff: f32,
    attack_target: f32,
    decay_target: f32,

    stage: EnvelopeStage,
    level: f32,
    target: f32,
}

/// Residual distance left after one stage time.
#[inline]
fn residual() -> f32 {
    (-TIME_CONSTANTS).exp()
}

/// Overshoot target that carries `start` onto `landing` in one stage time.
#[inline]
fn landing_target(start: f32, landing: f32) -> f32 {
    let r = residual();
    (landing - start * r) / (1.0 - r)
}

#[inline]
fn stage_coeff(time: f32, sample_rate: f32) -> f32 {
    let samples = time.max(MIN_STAGE_TIME) * sample_rate / TIME_CONSTANTS;
    (-1.0 / samples).exp()
}

impl Envelope {
    pub fn new(sample_rate: f32) -> Self {
        let mut env = Self {
            sample_rate,
            attack_time: 0.01,
            decay_time: 0.1,
            sustain_level: 0.8,
            release_time: 0.3,
            enabled: true,
            attack_coeff: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
            attack_target: 1.0,
            decay_target: 0.8,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            target: 0.0,
        };
        env.set_times(0.01, 0.1, 0.8, 0.3);
        env
    }

    pub fn adsr(sample_rate: f32, attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        let mut env = Self::new(sample_rate);
        env.set_times(attack, decay, sustain, release);
        env
    }

    /// Recompute stage coefficients. The only place they change.
    pub fn set_times(&mut self, attack: f32, decay: f32, sustain: f32, release: f32) {
        self.attack_time = attack.max(MIN_STAGE_TIME);
        self.decay_time = decay.max(MIN_STAGE_TIME);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(MIN_STAGE_TIME);

        self.attack_coeff = stage_coeff(self.attack_time, self.sample_rate);
        self.decay_coeff = stage_coeff(self.decay_time, self.sample_rate);
        self.release_coeff = stage_coeff(self.release_time, self.sample_rate);

        self.attack_target = landing_target(0.0, ATTACK_LANDING);
        self.decay_target = landing_target(1.0, self.sustain_level);

        match self.stage {
            EnvelopeStage::Attack => self.target = self.attack_target,
            EnvelopeStage::Decay => self.target = self.decay_target,
            EnvelopeStage::Release => self.target = self.release_target(),
            EnvelopeStage::Idle | EnvelopeStage::Sustain => {}
        }
    }

    /// Switch between ADSR shaping and the flat bypass mode.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        match self.stage {
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain if !enabled => {
                self.set_immediate();
            }
            EnvelopeStage::Sustain if self.level - self.sustain_level >= DECAY_DONE => {
                self.stage = EnvelopeStage::Decay;
                self.target = self.decay_target;
            }
            _ => {}
        }
    }

    /// Gate high. Retriggers keep the current level so there is no jump.
    pub fn note_on(&mut self) {
        if !self.enabled {
            self.set_immediate();
            return;
        }

        if self.level < MIN_GAIN {
            self.level = MIN_GAIN;
        }
        self.stage = EnvelopeStage::Attack;
        self.target = self.attack_target;
    }

    /// Gate low. No-op once idle or already releasing.
    pub fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.stage = EnvelopeStage::Release;
        self.target = self.release_target();
    }

    fn set_immediate(&mut self) {
        self.stage = EnvelopeStage::Sustain;
        self.level = 1.0;
        self.target = 1.0;
    }

    fn release_target(&self) -> f32 {
        landing_target(self.level, MIN_GAIN).min(0.0)
    }

    /// Advance one sample and return the new level.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level = self.target + (self.level - self.target) * self.attack_coeff;
                if self.level >= ATTACK_DONE {
                    self.level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                    self.target = self.decay_target;
                }
            }

            EnvelopeStage::Decay => {
                self.level = self.target + (self.level - self.target) * self.decay_coeff;
                // Decay only ever moves down, so "at or below" covers overshoot too
                if self.level - self.sustain_level < DECAY_DONE {
                    self.level = self.sustain_level;
                    self.stage = EnvelopeStage::Sustain;
                    self.target = self.sustain_level;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = if self.enabled { self.sustain_level } else { 1.0 };
            }

            EnvelopeStage::Release => {
                self.level = self.target + (self.level - self.target) * self.release_coeff;
                if self.level <= MIN_GAIN {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Render a block of envelope values into the buffer.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.stage == EnvelopeStage::Idle
    }

    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.target = 0.0;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn sustain_level(&self) -> f32 {
        self.sustain_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn render_samples(env: &mut Envelope, samples: usize) {
        for _ in 0..samples {
            env.next_sample();
        }
    }

    fn run_to_sustain(env: &mut Envelope) {
        for _ in 0..SAMPLE_RATE as usize {
            env.next_sample();
            if env.stage() == EnvelopeStage::Sustain {
                return;
            }
        }
        panic!("envelope never reached sustain");
    }

    #[test]
    fn attack_completes_within_attack_time() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.1, 0.8, 0.3);
        env.note_on();

        let attack_samples = (0.01 * SAMPLE_RATE).ceil() as usize;
        render_samples(&mut env, attack_samples);

        assert_eq!(env.stage(), EnvelopeStage::Decay);
        assert!(env.level() >= 0.999, "level was {}", env.level());
    }

    #[test]
    fn attack_is_not_instant() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.1, 0.8, 0.3);
        env.note_on();

        render_samples(&mut env, 400);
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        assert!(env.level() < 0.999);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, sustain, 0.2);
        env.note_on();

        let attack_decay_samples = ((0.01 + 0.05) * SAMPLE_RATE) as usize + 5;
        render_samples(&mut env, attack_decay_samples);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert!((env.level() - sustain).abs() < 1e-6);
    }

    #[test]
    fn release_reaches_silence_on_time() {
        let release = 0.05;
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.8, release);
        env.note_on();
        run_to_sustain(&mut env);

        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Release);

        let release_samples = (release * SAMPLE_RATE).round() as usize;
        render_samples(&mut env, release_samples - 2);
        assert_eq!(env.stage(), EnvelopeStage::Release);
        assert!(env.level() > MIN_GAIN);

        render_samples(&mut env, 3);
        assert!(env.is_idle(), "still at {}", env.level());
        assert_eq!(env.level(), 0.0);
    }

    #[test]
    fn repeated_note_off_is_idempotent() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, 0.1);
        env.note_on();
        render_samples(&mut env, 200);
        env.note_off();
        render_samples(&mut env, 100);
        let level = env.level();

        env.note_off();
        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Release);
        assert_eq!(env.level(), level);
    }

    #[test]
    fn note_off_on_idle_envelope_does_nothing() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.note_off();
        assert!(env.is_idle());
        assert_eq!(env.next_sample(), 0.0);
    }

    fn assert_legal(previous: EnvelopeStage, stage: EnvelopeStage) {
        let legal = matches!(
            (previous, stage),
            (EnvelopeStage::Idle, EnvelopeStage::Attack)
                | (EnvelopeStage::Attack, EnvelopeStage::Decay)
                | (EnvelopeStage::Decay, EnvelopeStage::Sustain)
                | (EnvelopeStage::Attack, EnvelopeStage::Release)
                | (EnvelopeStage::Decay, EnvelopeStage::Release)
                | (EnvelopeStage::Sustain, EnvelopeStage::Release)
                | (EnvelopeStage::Release, EnvelopeStage::Idle)
        );
        assert!(legal, "illegal transition {previous:?} -> {stage:?}");
    }

    #[test]
    fn level_stays_in_unit_range_and_stages_follow_order() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.002, 0.003, 0.0, 0.002);
        let mut previous = env.stage();

        for cycle in 0..20 {
            env.note_on();
            for i in 0..600 {
                if i == 50 + cycle * 13 {
                    env.note_off();
                    // Release can last a single sample at sustain 0, so
                    // check the gate transition before advancing.
                    let stage = env.stage();
                    if stage != previous {
                        assert_legal(previous, stage);
                        previous = stage;
                    }
                }
                let level = env.next_sample();
                assert!((0.0..=1.0).contains(&level), "level {level} out of range");

                let stage = env.stage();
                if stage != previous {
                    assert_legal(previous, stage);
                    previous = stage;
                }
            }
            // note_on is the only way out of Idle
            previous = EnvelopeStage::Idle;
            assert!(env.is_idle());
        }
    }

    #[test]
    fn release_from_zero_sustain_goes_idle_next_sample() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.002, 0.003, 0.0, 0.002);
        env.note_on();
        render_samples(&mut env, 1_000);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);

        env.note_off();
        assert_eq!(env.stage(), EnvelopeStage::Release);
        assert_eq!(env.next_sample(), 0.0);
        assert!(env.is_idle());
    }

    #[test]
    fn bypass_mode_is_flat_but_still_releases() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.5, 0.5, 0.3, 0.01);
        env.set_enabled(false);
        env.note_on();

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert_eq!(env.next_sample(), 1.0);
        render_samples(&mut env, 1_000);
        assert_eq!(env.level(), 1.0);

        env.note_off();
        render_samples(&mut env, (0.01 * SAMPLE_RATE) as usize + 2);
        assert!(env.is_idle());
    }

    #[test]
    fn disabling_never_resurrects_a_release() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, 0.2);
        env.note_on();
        render_samples(&mut env, 100);
        env.note_off();
        render_samples(&mut env, 10);

        env.set_enabled(false);
        assert_eq!(env.stage(), EnvelopeStage::Release);
        assert!(env.level() < 1.0);
    }

    #[test]
    fn retrigger_starts_from_current_level() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.01, 0.05, 0.5, 0.2);
        env.note_on();
        run_to_sustain(&mut env);
        env.note_off();
        render_samples(&mut env, 50);
        let before = env.level();

        env.note_on();
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        let after = env.next_sample();
        assert!(after >= before, "retrigger dropped from {before} to {after}");
        assert!(after - before < 0.05);
    }

    #[test]
    fn zero_times_are_clamped() {
        let mut env = Envelope::adsr(SAMPLE_RATE, 0.0, 0.0, 0.5, 0.0);
        env.note_on();
        for _ in 0..1_000 {
            let level = env.next_sample();
            assert!(level.is_finite());
        }
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
    }
}
