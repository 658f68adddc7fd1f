use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AudioError;
use crate::render::{render_queue, Mixer, RenderFeed};
use crate::scheduler::{PooledScheduler, SchedulerConfig, SilentScheduler, VoiceScheduler};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct StreamConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channels: 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    RenderThread,
    Silent,
}

/// A started backend. Dropping it stops the output stream.
pub struct ActiveBackend {
    pub scheduler: Box<dyn VoiceScheduler>,
    pub kind: BackendKind,
    pub stream: Option<StreamConfig>,
    _output: Option<cpal::Stream>,
}

impl ActiveBackend {
    pub fn silent() -> Self {
        Self {
            scheduler: Box::new(SilentScheduler::default()),
            kind: BackendKind::Silent,
            stream: None,
            _output: None,
        }
    }

    pub fn take_scheduler(&mut self) -> Box<dyn VoiceScheduler> {
        std::mem::replace(&mut self.scheduler, Box::new(SilentScheduler::default()))
    }
}

pub trait AudioBackend {
    fn kind(&self) -> BackendKind;
    fn start(&self, config: &SchedulerConfig) -> Result<ActiveBackend>;
}

pub struct CpalBackend;

impl AudioBackend for CpalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RenderThread
    }

    fn start(&self, config: &SchedulerConfig) -> Result<ActiveBackend> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::Unavailable)?;
        let supported = device
            .default_output_config()
            .map_err(|err| AudioError::Device(err.to_string()))
            .context("querying output config")?;
        let format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.config();
        let stream = StreamConfig {
            sample_rate: stream_config.sample_rate.0,
            channels: stream_config.channels,
        };
        debug!(?stream, ?format, "opening output stream");

        let mixer = Mixer::new(stream.sample_rate, stream.channels)
            .with_channels(config.pool_size.saturating_mul(4));
        let (queue, feed) = render_queue(config.queue_capacity, mixer);
        let output = build_stream(&device, &stream_config, format, feed)?;
        output
            .play()
            .map_err(|err| AudioError::Device(err.to_string()))
            .context("starting output stream")?;
        info!(sample_rate = stream.sample_rate, channels = stream.channels, "audio output running");

        Ok(ActiveBackend {
            scheduler: Box::new(PooledScheduler::new(*config, queue)),
            kind: BackendKind::RenderThread,
            stream: Some(stream),
            _output: Some(output),
        })
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    format: SampleFormat,
    mut feed: RenderFeed,
) -> Result<cpal::Stream> {
    let err_fn = |err: cpal::StreamError| warn!(error = %err, "output stream error");
    let stream = match format {
        SampleFormat::F32 => device.build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| feed.fill(data),
            err_fn,
            None,
        ),
        SampleFormat::I16 => {
            let mut scratch = Vec::new();
            device.build_output_stream(
                config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    feed.fill(&mut scratch);
                    for (out, sample) in data.iter_mut().zip(&scratch) {
                        *out = to_i16(*sample);
                    }
                },
                err_fn,
                None,
            )
        }
        SampleFormat::U16 => {
            let mut scratch = Vec::new();
            device.build_output_stream(
                config,
                move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                    scratch.resize(data.len(), 0.0);
                    feed.fill(&mut scratch);
                    for (out, sample) in data.iter_mut().zip(&scratch) {
                        *out = to_u16(*sample);
                    }
                },
                err_fn,
                None,
            )
        }
        other => {
            return Err(AudioError::Device(format!("unsupported sample format {other:?}")).into())
        }
    };
    stream
        .map_err(|err| AudioError::Device(err.to_string()))
        .context("building output stream")
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn to_u16(sample: f32) -> u16 {
    ((sample.clamp(-1.0, 1.0) * 0.5 + 0.5) * u16::MAX as f32) as u16
}

pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Silent
    }

    fn start(&self, config: &SchedulerConfig) -> Result<ActiveBackend> {
        debug!(?config, "starting silent backend");
        Ok(ActiveBackend::silent())
    }
}

pub fn select_backend(disable_audio: bool) -> Box<dyn AudioBackend> {
    if disable_audio {
        return Box::new(NullBackend);
    }
    if cpal::default_host().default_output_device().is_some() {
        Box::new(CpalBackend)
    } else {
        warn!("no output device found, running without sound");
        Box::new(NullBackend)
    }
}

pub fn start_backend(backend: &dyn AudioBackend, config: &SchedulerConfig) -> ActiveBackend {
    match backend.start(config) {
        Ok(active) => active,
        Err(err) => {
            warn!(error = %err, "audio backend failed to start, running without sound");
            ActiveBackend::silent()
        }
    }
}
