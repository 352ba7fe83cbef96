//! Audio device setup and the chord demo that drives the engine.

use std::{thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use vangelis::{
    dsp::Waveform,
    io::midi_note_to_freq,
    synth::{channel, NoteId, SynthHandle},
    EngineConfig, ParamUpdate, PolySynth, SynthParams,
};

const QUEUE_CAPACITY: usize = 256;

/// I, IV, V, I in C major, as MIDI keys.
const PROGRESSION: [[u8; 3]; 4] = [[60, 64, 67], [65, 69, 72], [67, 71, 74], [60, 64, 67]];

pub struct Demo {
    pub waveform: Waveform,
    pub polyphony: usize,
    pub seed: u64,
    pub cutoff: Option<f32>,
    pub resonance: f32,
    pub unison: usize,
    pub detune: f32,
    pub hold_secs: f32,
}

impl Demo {
    fn engine_config(&self, sample_rate: f32) -> EngineConfig {
        let mut params = SynthParams::default();
        params.merge(&ParamUpdate {
            use_filter: Some(self.cutoff.is_some()),
            filter_cutoff: self.cutoff,
            filter_resonance: Some(self.resonance),
            unison_voices: Some(self.unison),
            unison_detune: Some(self.detune),
            ..Default::default()
        });

        EngineConfig {
            sample_rate,
            polyphony: self.polyphony,
            seed: self.seed,
            params,
            ..Default::default()
        }
    }

    /// Open the default device, start the stream and play the progression.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        log::info!("output: {sample_rate} Hz, {channels} channels");

        let (mut handle, rx) = channel(QUEUE_CAPACITY);
        let mut synth = PolySynth::new(self.engine_config(sample_rate), rx)
            .wrap_err("invalid engine configuration")?;

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| synth.render_interleaved(data, channels),
            |err| log::error!("audio stream error: {err}"),
            None,
        )?;
        stream.play()?;

        self.play(&mut handle)?;

        // Let the last release ring out.
        thread::sleep(Duration::from_millis(800));
        Ok(())
    }

    fn play(&self, handle: &mut SynthHandle) -> EyreResult<()> {
        let hold = Duration::from_secs_f32(self.hold_secs.max(0.05));

        for (step, chord) in PROGRESSION.iter().enumerate() {
            log::info!("chord {} of {}", step + 1, PROGRESSION.len());
            for &key in chord {
                handle.note_on(note_id(key), midi_note_to_freq(key), self.waveform, 0.8)?;
            }
            thread::sleep(hold);
            for &key in chord {
                handle.note_off(note_id(key))?;
            }
            if let Some(cutoff) = self.cutoff {
                // Open the filter a little further on every chord.
                let opened = cutoff * 1.5f32.powi(step as i32 + 1);
                handle.set_params(ParamUpdate::default().with_filter_cutoff(opened))?;
            }
        }

        handle.all_notes_off()?;
        Ok(())
    }
}

fn note_id(key: u8) -> NoteId {
    NoteId::from_midi(0, key)
}
