use stickwork_domain::{TempoThresholds, Tier};
use time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct TempoEvaluator;

impl TempoEvaluator {
    /// Strokes per minute over the attempt, counting every stroke as a beat.
    pub fn compute_bpm(&self, started: Option<Duration>, finished: Duration, strokes: usize) -> Option<u32> {
        let started = started?;
        if strokes == 0 {
            return None;
        }
        let elapsed = (finished - started).as_seconds_f64();
        if elapsed <= 0.0 {
            return None;
        }
        Some((strokes as f64 / elapsed * 60.0).round() as u32)
    }

    /// A completed pattern always earns at least Bronze, with or without a tempo.
    pub fn grade(&self, bpm: Option<u32>, thresholds: &TempoThresholds) -> Tier {
        match bpm {
            Some(bpm) if bpm >= thresholds.gold() => Tier::Gold,
            Some(bpm) if bpm >= thresholds.silver() => Tier::Silver,
            _ => Tier::Bronze,
        }
    }

    pub fn merge_achievement(&self, existing: Tier, candidate: Tier) -> Tier {
        existing.max(candidate)
    }
}
