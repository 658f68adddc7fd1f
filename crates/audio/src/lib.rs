pub mod backend;
pub mod bank;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod loader;
pub mod render;
pub mod scheduler;

pub use backend::{
    select_backend, start_backend, ActiveBackend, AudioBackend, BackendKind, CpalBackend,
    NullBackend, StreamConfig,
};
pub use bank::{SampleBank, SampleBuffer};
pub use dynamics::VelocityBands;
pub use error::AudioError;
pub use io::AudioDecoder;
pub use loader::{FileSource, SampleLoader, SampleManifest, SampleSource, SampleUpdate};
pub use render::{render_queue, Mixer, RenderCommand, RenderFeed, RenderQueue, VoiceSink};
pub use scheduler::{Hit, PooledScheduler, SchedulerConfig, SilentScheduler, VoiceScheduler};
