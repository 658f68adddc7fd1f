use serde::{Deserialize, Serialize};
use stickwork_audio::{Hit, SampleUpdate, VelocityBands, VoiceScheduler};
use stickwork_domain::{
    sound_set_for, DomainError, Hand, ProgressState, ProgressStore, Rudiment, RudimentCatalog,
    StrokeEvent, Tier,
};
use tracing::{debug, info, warn};

use crate::analytics::SessionAnalytics;
use crate::matcher::{MatchOutcome, PatternMatcher};
use crate::scoring::TempoEvaluator;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NextLevel {
    Level(u32),
    AllComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionNotice {
    pub level_completed: u32,
    pub rudiment: String,
    pub tier: Tier,
    pub achievement: Tier,
    pub bpm: Option<u32>,
    pub sound_unlocked: bool,
    pub next: NextLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeOutcome {
    Advanced { index: usize, total: usize },
    Mismatch { expected: Option<Hand>, played: Hand },
    Completed(CompletionNotice),
}

pub struct ProgressionController {
    catalog: RudimentCatalog,
    state: ProgressState,
    matcher: PatternMatcher,
    evaluator: TempoEvaluator,
    voices: Box<dyn VoiceScheduler>,
    velocity: VelocityBands,
    store: Box<dyn ProgressStore>,
    analytics: SessionAnalytics,
    all_complete: bool,
}

impl ProgressionController {
    pub fn new(
        catalog: RudimentCatalog,
        store: Box<dyn ProgressStore>,
        voices: Box<dyn VoiceScheduler>,
        velocity: VelocityBands,
    ) -> Self {
        let state = match store.load() {
            Ok(Some(saved)) => saved.sanitized(&catalog),
            Ok(None) => ProgressState::new(&catalog),
            Err(err) => {
                warn!(error = %err, "could not restore progress, starting fresh");
                ProgressState::new(&catalog)
            }
        };
        let rudiment = catalog
            .get(state.current_level)
            .expect("sanitized level is in the catalog")
            .clone();
        info!(
            level = state.current_level,
            sound_set = state.sound_set,
            rudiment = %rudiment.name,
            "progress restored"
        );
        Self {
            catalog,
            state,
            matcher: PatternMatcher::new(rudiment),
            evaluator: TempoEvaluator,
            voices,
            velocity,
            store,
            analytics: SessionAnalytics::default(),
            all_complete: false,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn catalog(&self) -> &RudimentCatalog {
        &self.catalog
    }

    pub fn matcher(&self) -> &PatternMatcher {
        &self.matcher
    }

    pub fn current_rudiment(&self) -> &Rudiment {
        self.matcher.rudiment()
    }

    pub fn analytics(&self) -> &SessionAnalytics {
        &self.analytics
    }

    pub fn is_all_complete(&self) -> bool {
        self.all_complete
    }

    /// Sounds the stroke before matching it, so the completing stroke is heard too.
    pub fn handle_stroke(&mut self, stroke: StrokeEvent) -> StrokeOutcome {
        self.analytics.record_stroke();
        let velocity = self.velocity.resolve(stroke.velocity, stroke.position);
        self.voices.trigger(Hit {
            hand: stroke.hand,
            sound_set: self.state.sound_set,
            velocity,
            at: stroke.timestamp,
        });

        match self.matcher.on_stroke(stroke.hand, stroke.timestamp) {
            MatchOutcome::Advanced { index } => StrokeOutcome::Advanced {
                index,
                total: self.matcher.rudiment().len(),
            },
            MatchOutcome::Mismatch { expected } => {
                self.analytics.record_mismatch();
                debug!(?expected, played = %stroke.hand, "pattern broken");
                StrokeOutcome::Mismatch {
                    expected,
                    played: stroke.hand,
                }
            }
            MatchOutcome::Completed { started, finished } => {
                let strokes = self.matcher.rudiment().len();
                let bpm = self.evaluator.compute_bpm(started, finished, strokes);
                StrokeOutcome::Completed(self.on_pattern_completed(bpm))
            }
        }
    }

    pub fn on_pattern_completed(&mut self, bpm: Option<u32>) -> CompletionNotice {
        let level = self.state.current_level;
        let rudiment = self.matcher.rudiment();
        let name = rudiment.name.clone();
        let tier = self.evaluator.grade(bpm, &rudiment.thresholds);
        let achievement = self
            .evaluator
            .merge_achievement(self.state.achievement(level), tier);
        self.state.achievements.insert(level, achievement);
        self.analytics.record_completion(level, bpm);

        let next_level = level + 1;
        let (next, sound_unlocked) = if self.catalog.contains(next_level) {
            let next_set = sound_set_for(next_level);
            let unlocked = next_set > self.state.sound_set;
            self.state.current_level = next_level;
            // advancing never lowers the sound set
            self.state.sound_set = self.state.sound_set.max(next_set);
            (NextLevel::Level(next_level), unlocked)
        } else {
            self.all_complete = true;
            (NextLevel::AllComplete, false)
        };
        info!(level, %tier, ?bpm, sound_unlocked, ?next, "pattern completed");

        self.reset_matcher();
        self.save();
        CompletionNotice {
            level_completed: level,
            rudiment: name,
            tier,
            achievement,
            bpm,
            sound_unlocked,
            next,
        }
    }

    /// Moving back recomputes the sound set from the target, so it can drop.
    pub fn change_level(&mut self, target: u32) -> Result<(), DomainError> {
        if target == self.state.current_level {
            return Ok(());
        }
        let rudiment = self.catalog.get(target)?.clone();
        if !self.state.is_accessible(target) {
            return Err(DomainError::Locked(target));
        }
        self.state.current_level = target;
        self.state.sound_set = sound_set_for(target);
        self.all_complete = false;
        self.matcher.reset(rudiment);
        info!(level = target, sound_set = self.state.sound_set, "level changed");
        self.save();
        Ok(())
    }

    pub fn on_samples_updated(&mut self, update: SampleUpdate) {
        self.voices
            .on_samples_updated(update.hand, update.sound_set, update.buffer);
    }

    pub fn save(&self) -> bool {
        match self.store.save(&self.state) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to save progress");
                false
            }
        }
    }

    fn reset_matcher(&mut self) {
        match self.catalog.get(self.state.current_level) {
            Ok(rudiment) => self.matcher.reset(rudiment.clone()),
            Err(_) => self.matcher.restart(),
        }
    }
}
