pub mod analytics;
pub mod matcher;
pub mod persist;
pub mod progression;
pub mod scoring;

pub use analytics::SessionAnalytics;
pub use matcher::{MatchOutcome, MatcherPhase, PatternMatcher};
pub use persist::BackgroundStore;
pub use progression::{CompletionNotice, NextLevel, ProgressionController, StrokeOutcome};
pub use scoring::TempoEvaluator;
