//! Microphone input via cpal.
//!
//! A stream is opened per capture and dropped afterwards, so the device is
//! only held while the assistant is actually listening. Samples are mixed
//! to mono and resampled to the recognizer rate before they leave the
//! audio callback.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use neon_core::error::{NeonError, Result};

/// How long to wait for the device to deliver any audio.
const STALL_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Microphone {
    device: cpal::Device,
    config: StreamConfig,
    format: SampleFormat,
    target_rate: u32,
}

impl std::fmt::Debug for Microphone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Microphone")
            .field("native_rate", &self.config.sample_rate.0)
            .field("channels", &self.config.channels)
            .field("format", &self.format)
            .field("target_rate", &self.target_rate)
            .finish()
    }
}

impl Microphone {
    /// Open the default input device.
    ///
    /// Fails with [`NeonError::DeviceUnavailable`] when the host has no
    /// input device or it reports no usable configuration.
    pub fn open(target_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| NeonError::DeviceUnavailable("no default input device".into()))?;

        let name = device.name().unwrap_or_else(|_| "<unknown>".into());
        let supported = device
            .default_input_config()
            .map_err(|e| NeonError::DeviceUnavailable(format!("{name}: {e}")))?;

        let format = supported.sample_format();
        let config: StreamConfig = supported.into();
        tracing::info!(
            device = %name,
            native_rate = config.sample_rate.0,
            channels = config.channels,
            format = ?format,
            target_rate,
            "Input device opened"
        );

        Ok(Self {
            device,
            config,
            format,
            target_rate: target_rate.max(1),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.target_rate
    }

    /// Start a live input stream. Audio flows until the returned value is
    /// dropped.
    pub fn start(&self) -> Result<LiveInput> {
        let (tx, rx) = mpsc::channel();
        let stream = match self.format {
            SampleFormat::F32 => self.build::<f32>(tx),
            SampleFormat::I16 => self.build::<i16>(tx),
            SampleFormat::U16 => self.build::<u16>(tx),
            SampleFormat::I32 => self.build::<i32>(tx),
            other => Err(NeonError::DeviceUnavailable(format!(
                "unsupported sample format {other:?}"
            ))),
        }?;
        stream
            .play()
            .map_err(|e| NeonError::Audio(format!("failed to start input stream: {e}")))?;

        Ok(LiveInput {
            _stream: stream,
            frames: FrameBuffer::new(rx, STALL_TIMEOUT),
        })
    }

    /// Record a fixed stretch of audio, used for ambient calibration.
    pub fn record(&self, duration: Duration) -> Result<Vec<f32>> {
        let wanted = (duration.as_secs_f32() * self.target_rate as f32) as usize;
        let mut input = self.start()?;
        input.next_frame(wanted)
    }

    fn build<T>(&self, tx: Sender<Vec<f32>>) -> Result<cpal::Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = self.config.channels;
        let native_rate = self.config.sample_rate.0;
        let target_rate = self.target_rate;

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _info: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> = data.iter().map(|s| f32::from_sample(*s)).collect();
                    let mono = to_mono(&floats, channels);
                    let samples = resample(&mono, native_rate, target_rate);
                    // The receiver is gone once the capture is finished.
                    let _ = tx.send(samples);
                },
                |err| tracing::error!(error = %err, "Audio input stream error"),
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::DeviceNotAvailable => {
                    NeonError::DeviceUnavailable("input device disconnected".into())
                }
                other => NeonError::Audio(format!("failed to build input stream: {other}")),
            })
    }
}

/// A running input stream delivering mono samples at the target rate.
pub struct LiveInput {
    _stream: cpal::Stream,
    frames: FrameBuffer,
}

impl LiveInput {
    /// Block until `len` samples are available and return exactly that many.
    pub fn next_frame(&mut self, len: usize) -> Result<Vec<f32>> {
        self.frames.next_frame(len)
    }
}

/// Re-chunks callback-sized buffers into fixed-length frames.
struct FrameBuffer {
    rx: Receiver<Vec<f32>>,
    pending: Vec<f32>,
    stall: Duration,
}

impl FrameBuffer {
    fn new(rx: Receiver<Vec<f32>>, stall: Duration) -> Self {
        Self {
            rx,
            pending: Vec::new(),
            stall,
        }
    }

    fn next_frame(&mut self, len: usize) -> Result<Vec<f32>> {
        let started = Instant::now();
        while self.pending.len() < len {
            match self.rx.recv_timeout(self.stall) {
                Ok(chunk) => self.pending.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(NeonError::Audio(format!(
                        "no audio from input device after {:.1}s",
                        started.elapsed().as_secs_f32()
                    )))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(NeonError::DeviceUnavailable("input stream closed".into()))
                }
            }
        }
        let rest = self.pending.split_off(len);
        Ok(std::mem::replace(&mut self.pending, rest))
    }
}

/// Average interleaved channels into one.
fn to_mono(data: &[f32], channels: u16) -> Vec<f32> {
    let ch = channels.max(1) as usize;
    if ch == 1 {
        return data.to_vec();
    }
    data.chunks_exact(ch)
        .map(|frame| frame.iter().sum::<f32>() / ch as f32)
        .collect()
}

/// Linear-interpolation resampler. Adequate for speech, which carries
/// little energy above 8 kHz.
fn resample(samples: &[f32], src_rate: u32, dst_rate: u32) -> Vec<f32> {
    if src_rate == dst_rate || samples.is_empty() {
        return samples.to_vec();
    }
    let ratio = src_rate as f64 / dst_rate as f64;
    let out_len = (samples.len() as f64 / ratio) as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = samples[idx.min(samples.len() - 1)];
            let b = samples[(idx + 1).min(samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect()
}
