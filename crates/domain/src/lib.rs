pub mod catalog;
pub mod error;
pub mod events;
pub mod io;
pub mod progress;
pub mod rudiment;
pub mod tempo;

pub use crate::catalog::RudimentCatalog;
pub use crate::error::DomainError;
pub use crate::events::{Hand, Stroke, StrokeEvent};
pub use crate::io::{JsonFileStore, MemoryStore, ProgressStore};
pub use crate::progress::{sound_set_for, ProgressState, MAX_SOUND_SET, MIN_SOUND_SET};
pub use crate::rudiment::Rudiment;
pub use crate::tempo::{TempoThresholds, Tier};
