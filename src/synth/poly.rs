use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    config::EngineConfig,
    dsp::distortion::soft_clip,
    error::ConfigError,
    synth::{
        message::{MessageReceiver, SynthMessage},
        params::SynthParams,
        pool::VoicePool,
        voice::NoteStart,
    },
    MAX_BLOCK_SIZE,
};

/// The realtime engine: control queue in, mixed audio out.
///
/// Everything is allocated in `new`. The render methods drain pending
/// messages once, at the start of the block, then mix every active voice,
/// apply the headroom gain and soft clip. Call them only from the audio
/// thread.
pub struct PolySynth<R: MessageReceiver> {
    sample_rate: f32,
    mix_gain: f32,
    params: SynthParams,
    pool: VoicePool,
    rx: R,
    rng: SmallRng,
    scratch: Vec<f32>,
    frame_counter: u64,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(config: EngineConfig, rx: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let params = config.params.sanitized();
        if params != config.params {
            log::warn!("initial synth parameters were out of range and have been clamped");
        }

        let pool = VoicePool::new(
            config.sample_rate,
            config.polyphony,
            config.steal_slots,
            config.steal_fade_secs,
            config.steal_weights,
        );

        log::info!(
            "engine ready: {} Hz, {} voices (+{} steal slots), seed {:#x}",
            config.sample_rate,
            config.polyphony,
            config.steal_slots,
            config.seed
        );

        Ok(Self {
            sample_rate: config.sample_rate,
            mix_gain: config.mix_gain,
            params,
            pool,
            rx,
            rng: SmallRng::seed_from_u64(config.seed),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
            frame_counter: 0,
        })
    }

    /// Apply one control message immediately. Malformed messages are dropped.
    pub fn apply(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                id,
                frequency,
                waveform,
                velocity,
            } => {
                if !frequency.is_finite() || frequency <= 0.0 || !velocity.is_finite() {
                    return;
                }
                let note = NoteStart {
                    id,
                    frequency,
                    waveform,
                    velocity: velocity.clamp(0.0, 1.0),
                };
                self.pool
                    .note_on(note, &self.params, self.frame_counter, &mut self.rng);
            }
            SynthMessage::NoteOff { id } => self.pool.note_off(id),
            SynthMessage::AllNotesOff => self.pool.all_notes_off(),
            SynthMessage::SetParams(update) => {
                self.params.merge(&update);
                self.pool.update_params(&self.params, &update);
            }
        }
    }

    fn drain_messages(&mut self) {
        while let Some(message) = self.rx.pop() {
            self.apply(message);
        }
    }

    fn mix(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        self.pool.render_add(out);
        for sample in out.iter_mut() {
            *sample = soft_clip(*sample * self.mix_gain);
        }
        self.frame_counter += out.len() as u64;
    }

    /// Render one mono block.
    pub fn render_block(&mut self, out: &mut [f32]) {
        self.drain_messages();
        self.mix(out);
    }

    /// Render one block into two channels carrying the same signal.
    pub fn render_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.render_block(left);
        let frames = left.len().min(right.len());
        right[..frames].copy_from_slice(&left[..frames]);
        right[frames..].fill(0.0);
    }

    /// Render into an interleaved buffer, mono duplicated to every channel.
    pub fn render_interleaved(&mut self, buffer: &mut [f32], channels: usize) {
        if channels == 0 {
            return;
        }
        self.drain_messages();

        let mut scratch = std::mem::take(&mut self.scratch);
        for chunk in buffer.chunks_mut(MAX_BLOCK_SIZE * channels) {
            let frames = chunk.len() / channels;
            let mono = &mut scratch[..frames];
            self.mix(mono);
            for (frame, &sample) in chunk.chunks_exact_mut(channels).zip(mono.iter()) {
                frame.fill(sample);
            }
            chunk[frames * channels..].fill(0.0);
        }
        self.scratch = scratch;
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    /// Frames rendered since construction.
    pub fn frame(&self) -> u64 {
        self.frame_counter
    }

    pub fn active_voices(&self) -> usize {
        self.pool.active_count()
    }

    pub fn steal_count(&self) -> u64 {
        self.pool.steal_count()
    }
}
