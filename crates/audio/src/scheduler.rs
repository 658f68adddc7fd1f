use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stickwork_domain::Hand;
use time::Duration;
use tracing::{debug, trace};

use crate::bank::{SampleBank, SampleBuffer};
use crate::dynamics::{unit_gain, VelocityBands};
use crate::render::VoiceSink;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub pool_size: usize,
    pub release_ms: u64,
    pub queue_capacity: usize,
    pub velocity: VelocityBands,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            release_ms: 500,
            queue_capacity: 256,
            velocity: VelocityBands::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn release_after(&self) -> Duration {
        Duration::milliseconds(self.release_ms as i64)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub hand: Hand,
    pub sound_set: u8,
    pub velocity: f32,
    pub at: Duration,
}

pub trait VoiceScheduler: Send {
    fn trigger(&mut self, hit: Hit) -> Option<usize>;

    fn on_samples_updated(&mut self, hand: Hand, sound_set: u8, buffer: Arc<SampleBuffer>);

    fn pool_size(&self) -> usize;
}

#[derive(Clone, Copy, Debug, Default)]
struct Channel {
    gain: f32,
    busy_until: Option<Duration>,
}

impl Channel {
    fn in_use(&self, now: Duration) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }
}

/// Each trigger holds its channel for `release_ms`, whether or not the sound has finished.
pub struct PooledScheduler<S> {
    config: SchedulerConfig,
    bank: SampleBank,
    channels: Vec<Channel>,
    sink: S,
}

impl<S: VoiceSink> PooledScheduler<S> {
    pub fn new(config: SchedulerConfig, sink: S) -> Self {
        Self {
            channels: vec![Channel::default(); config.pool_size],
            config,
            bank: SampleBank::new(),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn busy_channels(&self, now: Duration) -> usize {
        self.channels.iter().filter(|c| c.in_use(now)).count()
    }

    pub fn channel_gain(&self, channel: usize) -> Option<f32> {
        self.channels.get(channel).map(|c| c.gain)
    }

    fn acquire(&mut self, now: Duration) -> usize {
        if let Some(index) = self.channels.iter().position(|c| !c.in_use(now)) {
            return index;
        }
        self.channels.push(Channel::default());
        debug!(size = self.channels.len(), "voice pool grown");
        self.channels.len() - 1
    }
}

impl<S: VoiceSink> VoiceScheduler for PooledScheduler<S> {
    fn trigger(&mut self, hit: Hit) -> Option<usize> {
        let Some(buffer) = self.bank.resolve(hit.hand, hit.sound_set) else {
            trace!(hand = %hit.hand, sound_set = hit.sound_set, "no sample loaded yet");
            return None;
        };
        let index = self.acquire(hit.at);
        let gain = unit_gain(hit.velocity).unwrap_or_else(|| self.config.velocity.floor_gain());
        if !self.sink.start(index, buffer, gain) {
            return None;
        }
        let release = self.config.release_after();
        let channel = &mut self.channels[index];
        channel.gain = gain;
        channel.busy_until = Some(hit.at + release);
        Some(index)
    }

    fn on_samples_updated(&mut self, hand: Hand, sound_set: u8, buffer: Arc<SampleBuffer>) {
        debug!(%hand, sound_set, frames = buffer.frames(), "sample ready");
        self.bank.insert(hand, sound_set, buffer);
    }

    fn pool_size(&self) -> usize {
        self.channels.len()
    }
}

/// Used when no output device is available. Decoded samples are discarded.
#[derive(Debug, Default)]
pub struct SilentScheduler;

impl VoiceScheduler for SilentScheduler {
    fn trigger(&mut self, _hit: Hit) -> Option<usize> {
        None
    }

    fn on_samples_updated(&mut self, _hand: Hand, _sound_set: u8, _buffer: Arc<SampleBuffer>) {}

    fn pool_size(&self) -> usize {
        0
    }
}
