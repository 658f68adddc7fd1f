use std::sync::Arc;

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use tracing::warn;

use crate::bank::SampleBuffer;

const DEFAULT_CHANNELS: usize = 16;
const VOICES_PER_CHANNEL: usize = 4;

#[derive(Debug, Clone)]
pub enum RenderCommand {
    Start {
        channel: usize,
        buffer: Arc<SampleBuffer>,
        gain: f32,
    },
}

pub trait VoiceSink: Send {
    fn start(&mut self, channel: usize, buffer: Arc<SampleBuffer>, gain: f32) -> bool;
}

struct PlayingVoice {
    buffer: Arc<SampleBuffer>,
    position: f64,
}

struct MixChannel {
    gain: f32,
    voices: Vec<PlayingVoice>,
}

impl MixChannel {
    fn new() -> Self {
        Self {
            gain: 0.0,
            voices: Vec::with_capacity(VOICES_PER_CHANNEL),
        }
    }
}

/// A channel reused while an earlier hit is still ringing plays both, at the
/// gain of the latest start. Past the preallocated capacity, channels wrap
/// around and a full channel drops its oldest voice.
pub struct Mixer {
    sample_rate: u32,
    output_channels: u16,
    channels: Vec<MixChannel>,
}

impl Mixer {
    pub fn new(sample_rate: u32, output_channels: u16) -> Self {
        Self {
            sample_rate: sample_rate.max(1),
            output_channels: output_channels.max(1),
            channels: (0..DEFAULT_CHANNELS).map(|_| MixChannel::new()).collect(),
        }
    }

    pub fn with_channels(mut self, count: usize) -> Self {
        self.channels.resize_with(count.max(1), MixChannel::new);
        self
    }

    pub fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Start {
                channel,
                buffer,
                gain,
            } => {
                let index = channel % self.channels.len();
                let slot = &mut self.channels[index];
                if slot.voices.len() >= VOICES_PER_CHANNEL {
                    slot.voices.remove(0);
                }
                slot.gain = if gain.is_finite() { gain.clamp(0.0, 1.0) } else { 0.0 };
                slot.voices.push(PlayingVoice {
                    buffer,
                    position: 0.0,
                });
            }
        }
    }

    pub fn active_voices(&self) -> usize {
        self.channels.iter().map(|c| c.voices.len()).sum()
    }

    pub fn render(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        let width = self.output_channels as usize;
        for channel in &mut self.channels {
            let gain = channel.gain;
            for voice in &mut channel.voices {
                let source = &voice.buffer;
                let source_width = source.channels() as usize;
                let samples = source.samples();
                let frames = source.frames();
                let step = source.sample_rate() as f64 / self.sample_rate as f64;
                for frame in out.chunks_mut(width) {
                    let index = voice.position as usize;
                    if index >= frames {
                        break;
                    }
                    let base = index * source_width;
                    for (lane, sample) in frame.iter_mut().enumerate() {
                        let source_lane = lane.min(source_width - 1);
                        *sample += samples[base + source_lane] * gain;
                    }
                    voice.position += step;
                }
            }
            channel
                .voices
                .retain(|voice| (voice.position as usize) < voice.buffer.frames());
        }
        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}

impl VoiceSink for Mixer {
    fn start(&mut self, channel: usize, buffer: Arc<SampleBuffer>, gain: f32) -> bool {
        self.apply(RenderCommand::Start {
            channel,
            buffer,
            gain,
        });
        true
    }
}

pub struct RenderQueue {
    producer: HeapProducer<RenderCommand>,
}

impl RenderQueue {
    pub fn send(&mut self, command: RenderCommand) -> bool {
        match self.producer.push(command) {
            Ok(()) => true,
            Err(_) => {
                warn!("render queue full, dropping command");
                false
            }
        }
    }
}

impl VoiceSink for RenderQueue {
    fn start(&mut self, channel: usize, buffer: Arc<SampleBuffer>, gain: f32) -> bool {
        self.send(RenderCommand::Start {
            channel,
            buffer,
            gain,
        })
    }
}

pub struct RenderFeed {
    consumer: HeapConsumer<RenderCommand>,
    mixer: Mixer,
}

impl RenderFeed {
    pub fn fill(&mut self, out: &mut [f32]) {
        while let Some(command) = self.consumer.pop() {
            self.mixer.apply(command);
        }
        self.mixer.render(out);
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }
}

pub fn render_queue(capacity: usize, mixer: Mixer) -> (RenderQueue, RenderFeed) {
    let (producer, consumer) = HeapRb::<RenderCommand>::new(capacity.max(1)).split();
    (RenderQueue { producer }, RenderFeed { consumer, mixer })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(channels: u16, frames: usize) -> Arc<SampleBuffer> {
        let samples = (0..frames * channels as usize)
            .map(|i| (i / channels as usize) as f32 * 0.1)
            .collect();
        Arc::new(SampleBuffer::new(48_000, channels, samples))
    }

    #[test]
    fn mono_voice_spreads_to_every_output_lane() {
        let mut mixer = Mixer::new(48_000, 2);
        mixer.start(0, ramp(1, 4), 0.5);
        let mut out = vec![0.0; 8];
        mixer.render(&mut out);
        assert_relative_eq!(out[2], 0.05);
        assert_relative_eq!(out[3], 0.05);
        assert_relative_eq!(out[6], 0.15);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn voices_survive_across_render_calls() {
        let mut mixer = Mixer::new(48_000, 1);
        mixer.start(0, ramp(1, 6), 1.0);
        let mut out = vec![0.0; 4];
        mixer.render(&mut out);
        assert_eq!(mixer.active_voices(), 1);
        mixer.render(&mut out);
        assert_relative_eq!(out[0], 0.4);
        assert_relative_eq!(out[1], 0.5);
        assert_eq!(out[2], 0.0);
        assert_eq!(mixer.active_voices(), 0);
    }

    #[test]
    fn reused_channel_overlaps_voices_at_latest_gain() {
        let mut mixer = Mixer::new(48_000, 1);
        let flat = Arc::new(SampleBuffer::new(48_000, 1, vec![0.5; 8]));
        mixer.start(3, flat.clone(), 1.0);
        mixer.start(3, flat, 0.5);
        let mut out = vec![0.0; 2];
        mixer.render(&mut out);
        assert_relative_eq!(out[0], 0.5);
        assert_eq!(mixer.active_voices(), 2);
    }

    #[test]
    fn mix_is_clipped() {
        let mut mixer = Mixer::new(48_000, 1);
        let loud = Arc::new(SampleBuffer::new(48_000, 1, vec![0.9; 2]));
        mixer.start(0, loud.clone(), 1.0);
        mixer.start(1, loud, 1.0);
        let mut out = vec![0.0; 1];
        mixer.render(&mut out);
        assert_relative_eq!(out[0], 1.0);
    }

    #[test]
    fn queue_delivers_to_feed() {
        let (mut queue, mut feed) = render_queue(4, Mixer::new(48_000, 1));
        assert!(queue.start(0, ramp(1, 3), 1.0));
        assert!(queue.start(1, ramp(1, 3), 1.0));
        let mut out = vec![0.0; 2];
        feed.fill(&mut out);
        assert_eq!(feed.mixer().active_voices(), 2);
        assert_relative_eq!(out[1], 0.2);
        feed.fill(&mut out);
        assert_eq!(feed.mixer().active_voices(), 0);
    }

    #[test]
    fn channels_past_the_preallocated_count_wrap() {
        let mut mixer = Mixer::new(48_000, 1).with_channels(2);
        let flat = Arc::new(SampleBuffer::new(48_000, 1, vec![0.5; 4]));
        mixer.start(1, flat.clone(), 1.0);
        // lands on channel 1 and takes over its gain
        mixer.start(3, flat, 0.5);
        let mut out = vec![0.0; 1];
        mixer.render(&mut out);
        assert_relative_eq!(out[0], 0.5);
    }

    #[test]
    fn full_channel_drops_oldest_voice() {
        let mut mixer = Mixer::new(48_000, 1);
        for _ in 0..VOICES_PER_CHANNEL + 2 {
            mixer.start(0, ramp(1, 8), 0.1);
        }
        assert_eq!(mixer.active_voices(), VOICES_PER_CHANNEL);
    }

    #[test]
    fn non_finite_gain_is_muted() {
        let mut mixer = Mixer::new(48_000, 1);
        mixer.start(0, Arc::new(SampleBuffer::new(48_000, 1, vec![0.5; 2])), f32::NAN);
        let mut out = vec![0.0; 1];
        mixer.render(&mut out);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn full_queue_drops_without_blocking() {
        let (mut queue, _feed) = render_queue(1, Mixer::new(48_000, 1));
        assert!(queue.start(0, ramp(1, 2), 1.0));
        assert!(!queue.start(1, ramp(1, 2), 1.0));
    }
}
