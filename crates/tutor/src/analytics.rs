use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionAnalytics {
    pub strokes: u64,
    pub mismatches: u64,
    pub completions: u64,
    pub best_bpm: BTreeMap<u32, u32>,
}

impl SessionAnalytics {
    pub fn record_stroke(&mut self) {
        self.strokes += 1;
    }

    pub fn record_mismatch(&mut self) {
        self.mismatches += 1;
    }

    pub fn record_completion(&mut self, level: u32, bpm: Option<u32>) {
        self.completions += 1;
        if let Some(bpm) = bpm {
            let best = self.best_bpm.entry(level).or_insert(bpm);
            *best = (*best).max(bpm);
        }
    }

    pub fn accuracy(&self) -> f32 {
        if self.strokes == 0 {
            return 0.0;
        }
        (self.strokes - self.mismatches) as f32 / self.strokes as f32
    }
}
