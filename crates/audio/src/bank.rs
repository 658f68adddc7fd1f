use std::collections::HashMap;
use std::sync::Arc;

use stickwork_domain::Hand;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Arc<[f32]>,
}

impl SampleBuffer {
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: channels.max(1),
            samples: samples.into(),
        }
    }

    pub fn silence(sample_rate: u32, channels: u16, frames: usize) -> Self {
        Self::new(sample_rate, channels, vec![0.0; frames * channels.max(1) as usize])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn is_silent(&self) -> bool {
        self.samples.iter().all(|s| *s == 0.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct SampleBank {
    slots: HashMap<(Hand, u8), Arc<SampleBuffer>>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hand: Hand, sound_set: u8, buffer: Arc<SampleBuffer>) {
        self.slots.insert((hand, sound_set), buffer);
    }

    pub fn get(&self, hand: Hand, sound_set: u8) -> Option<&Arc<SampleBuffer>> {
        self.slots.get(&(hand, sound_set))
    }

    pub fn max_loaded(&self, hand: Hand) -> Option<u8> {
        self.slots
            .keys()
            .filter(|(h, _)| *h == hand)
            .map(|(_, set)| *set)
            .max()
    }

    /// Best available buffer for `sound_set`: the requested set when loaded,
    /// otherwise the highest loaded set below it.
    pub fn resolve(&self, hand: Hand, sound_set: u8) -> Option<Arc<SampleBuffer>> {
        let top = self.max_loaded(hand)?;
        let start = sound_set.min(top);
        (1..=start)
            .rev()
            .find_map(|set| self.get(hand, set))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(marker: f32) -> Arc<SampleBuffer> {
        Arc::new(SampleBuffer::new(44_100, 1, vec![marker; 4]))
    }

    #[test]
    fn silence_has_requested_shape() {
        let buffer = SampleBuffer::silence(44_100, 2, 44_100);
        assert_eq!(buffer.frames(), 44_100);
        assert_eq!(buffer.samples().len(), 88_200);
        assert!(buffer.is_silent());
    }

    #[test]
    fn zero_channels_is_treated_as_mono() {
        let buffer = SampleBuffer::new(44_100, 0, vec![0.5; 3]);
        assert_eq!(buffer.channels(), 1);
        assert_eq!(buffer.frames(), 3);
    }

    #[test]
    fn resolve_prefers_exact_set() {
        let mut bank = SampleBank::new();
        bank.insert(Hand::Left, 1, tone(0.1));
        bank.insert(Hand::Left, 3, tone(0.3));
        let hit = bank.resolve(Hand::Left, 3).unwrap();
        assert_eq!(hit.samples()[0], 0.3);
    }

    #[test]
    fn resolve_degrades_to_highest_loaded() {
        let mut bank = SampleBank::new();
        bank.insert(Hand::Right, 1, tone(0.1));
        bank.insert(Hand::Right, 2, tone(0.2));
        assert_eq!(bank.resolve(Hand::Right, 5).unwrap().samples()[0], 0.2);

        bank.insert(Hand::Right, 4, tone(0.4));
        // set 3 is missing, so the request falls through to set 2
        assert_eq!(bank.resolve(Hand::Right, 3).unwrap().samples()[0], 0.2);
    }

    #[test]
    fn resolve_without_buffers_is_none() {
        let mut bank = SampleBank::new();
        assert!(bank.resolve(Hand::Left, 1).is_none());
        bank.insert(Hand::Right, 1, tone(0.1));
        assert!(bank.resolve(Hand::Left, 1).is_none());
        assert!(bank.resolve(Hand::Right, 0).is_none());
    }
}
