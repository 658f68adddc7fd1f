use serde::{Deserialize, Serialize};
use stickwork_domain::{Hand, Rudiment};
use time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatcherPhase {
    Idle,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Advanced { index: usize },
    Completed {
        started: Option<Duration>,
        finished: Duration,
    },
    /// Wrong hand. The attempt was thrown away.
    Mismatch { expected: Option<Hand> },
}

/// The attempt clock starts on the first correct stroke.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    rudiment: Rudiment,
    index: usize,
    attempt_start: Option<Duration>,
}

impl PatternMatcher {
    pub fn new(rudiment: Rudiment) -> Self {
        Self {
            rudiment,
            index: 0,
            attempt_start: None,
        }
    }

    pub fn rudiment(&self) -> &Rudiment {
        &self.rudiment
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn attempt_start(&self) -> Option<Duration> {
        self.attempt_start
    }

    pub fn phase(&self) -> MatcherPhase {
        if self.index == 0 {
            MatcherPhase::Idle
        } else if self.index >= self.rudiment.len() {
            MatcherPhase::Completed
        } else {
            MatcherPhase::InProgress
        }
    }

    pub fn expected(&self) -> Option<Hand> {
        self.rudiment.expected(self.index)
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.attempt_start = None;
    }

    pub fn reset(&mut self, rudiment: Rudiment) {
        self.rudiment = rudiment;
        self.restart();
    }

    pub fn on_stroke(&mut self, hand: Hand, timestamp: Duration) -> MatchOutcome {
        if self.phase() == MatcherPhase::Completed {
            self.restart();
        }
        let current = self.rudiment.sequence().get(self.index);
        if !current.is_some_and(|stroke| stroke.matches(hand)) {
            let expected = current.map(|stroke| stroke.hand);
            self.restart();
            return MatchOutcome::Mismatch { expected };
        }
        if self.index == 0 {
            self.attempt_start = Some(timestamp);
        }
        self.index += 1;
        if self.index == self.rudiment.len() {
            MatchOutcome::Completed {
                started: self.attempt_start,
                finished: timestamp,
            }
        } else {
            MatchOutcome::Advanced { index: self.index }
        }
    }
}
