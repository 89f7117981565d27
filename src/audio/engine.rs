// Moteur audio - Callback CPAL temps-réel
//
// Le callback de sortie rend la banque de voix, pousse chaque bloc dans
// l'anneau de capture puis avance l'horloge en frames lue par la session.
// Jamais de verrou bloquant dans le callback : si la session tient la banque,
// le bloc est silencieux et l'horloge n'avance pas.

use crate::audio::capture::CaptureProcessor;
use crate::audio::player::AudioError;
use crate::audio::synth::SynthPlayer;
use crate::audio::timing::AudioTiming;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use tracing::{error, info};

/// Plus grand bloc rendu d'un coup dans le callback
const MAX_BLOCK_FRAMES: usize = 4096;

/// Périphérique de sortie par défaut et sa configuration
pub struct OutputDevice {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
}

impl OutputDevice {
    pub fn open_default() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Device("No audio device found".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Device(format!("Configuration error: {}", e)))?;
        info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config = ?supported,
            "Output device"
        );

        Ok(Self {
            device,
            sample_format: supported.sample_format(),
            config: supported.into(),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> usize {
        self.config.channels as usize
    }

    /// Open the output stream and start pulling blocks from `synth`
    pub fn start(
        self,
        synth: SynthPlayer,
        processor: CaptureProcessor,
        timing: AudioTiming,
    ) -> Result<AudioEngine, AudioError> {
        let sample_rate = self.sample_rate();
        let channels = self.channels();
        let callback = OutputCallback::new(synth, processor, timing, channels);

        let stream = match self.sample_format {
            SampleFormat::F32 => build_stream::<f32>(&self.device, &self.config, callback),
            SampleFormat::I16 => build_stream::<i16>(&self.device, &self.config, callback),
            SampleFormat::U16 => build_stream::<u16>(&self.device, &self.config, callback),
            other => {
                return Err(AudioError::Device(format!(
                    "Unsupported sample format: {:?}. Supported formats: F32, I16, U16",
                    other
                )));
            }
        }?;

        stream
            .play()
            .map_err(|e| AudioError::Device(format!("Error in stream beginning: {}", e)))?;
        info!(sample_rate, channels, "Audio engine started");

        Ok(AudioEngine {
            _stream: stream,
            sample_rate,
            channels,
        })
    }
}

/// Flux de sortie en cours. Le son s'arrête quand il est détruit.
pub struct AudioEngine {
    _stream: Stream,
    sample_rate: u32,
    channels: usize,
}

impl AudioEngine {
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut callback: OutputCallback,
) -> Result<Stream, AudioError>
where
    T: SizedSample + FromSample<f32> + Send + 'static,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| callback.fill(data),
            // Hors du callback audio, les I/O sont permises ici
            |err| error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Device(format!("Error in stream creation: {}", e)))
}

/// État possédé par le callback de sortie
pub struct OutputCallback {
    synth: SynthPlayer,
    processor: CaptureProcessor,
    timing: AudioTiming,
    channels: usize,
    left: Vec<f32>,
    right: Vec<f32>,
}

impl OutputCallback {
    pub fn new(
        synth: SynthPlayer,
        processor: CaptureProcessor,
        timing: AudioTiming,
        channels: usize,
    ) -> Self {
        Self {
            synth,
            processor,
            timing,
            channels: channels.max(1),
            left: vec![0.0; MAX_BLOCK_FRAMES],
            right: vec![0.0; MAX_BLOCK_FRAMES],
        }
    }

    /// Fill an interleaved device buffer
    pub fn fill<T>(&mut self, data: &mut [T])
    where
        T: Sample + FromSample<f32>,
    {
        for chunk in data.chunks_mut(MAX_BLOCK_FRAMES * self.channels) {
            let frames = chunk.len() / self.channels;
            let left = &mut self.left[..frames];
            let right = &mut self.right[..frames];

            // Silence (déjà écrite) si la banque est occupée ou empoisonnée
            if let Ok(true) = self.synth.render(left, right) {
                self.processor.process(&[&*left, &*right]);
                self.timing.advance(frames);
            }

            for (frame, (&l, &r)) in chunk
                .chunks_mut(self.channels)
                .zip(left.iter().zip(right.iter()))
            {
                write_stereo_frame((l, r), frame);
            }
        }
    }
}

/// Écrit une frame stéréo dans le format du device (mono : moyenne L/R,
/// canaux au-delà de 2 : silence)
pub fn write_stereo_frame<T>((left, right): (f32, f32), frame: &mut [T])
where
    T: Sample + FromSample<f32>,
{
    if frame.len() >= 2 {
        frame[0] = T::from_sample(left);
        frame[1] = T::from_sample(right);
        for sample in frame.iter_mut().skip(2) {
            *sample = T::from_sample(0.0f32);
        }
    } else if let Some(sample) = frame.first_mut() {
        *sample = T::from_sample((left + right) * 0.5);
    }
}
