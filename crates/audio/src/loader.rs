use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use stickwork_domain::{Hand, MAX_SOUND_SET, MIN_SOUND_SET};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

use crate::bank::SampleBuffer;
use crate::error::{AudioError, Result};
use crate::io::AudioDecoder;

const ATTEMPTS: u32 = 2;
const FALLBACK_RATE: u32 = 44_100;

#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch(&self, hand: Hand, sound_set: u8) -> Result<SampleBuffer>;
}

/// Sound set 1 maps to `<stem>.<ext>`, set `n > 1` to `<stem><n-1>.<ext>`.
#[derive(Debug, Clone)]
pub struct SampleManifest {
    pub root: PathBuf,
    pub left_stem: String,
    pub right_stem: String,
    pub extension: String,
}

impl SampleManifest {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            left_stem: "snare".into(),
            right_stem: "bass".into(),
            extension: "mp3".into(),
        }
    }

    pub fn path_for(&self, hand: Hand, sound_set: u8) -> PathBuf {
        let stem = match hand {
            Hand::Left => &self.left_stem,
            Hand::Right => &self.right_stem,
        };
        let file = match sound_set {
            0 | 1 => format!("{stem}.{}", self.extension),
            n => format!("{stem}{}.{}", n - 1, self.extension),
        };
        self.root.join(file)
    }
}

pub struct FileSource {
    manifest: SampleManifest,
}

impl FileSource {
    pub fn new(manifest: SampleManifest) -> Self {
        Self { manifest }
    }
}

#[async_trait]
impl SampleSource for FileSource {
    async fn fetch(&self, hand: Hand, sound_set: u8) -> Result<SampleBuffer> {
        let path = self.manifest.path_for(hand, sound_set);
        tokio::task::spawn_blocking(move || AudioDecoder::open(path))
            .await
            .map_err(|err| AudioError::Decode(format!("decode task failed: {err}")))?
    }
}

#[derive(Debug, Clone)]
pub struct SampleUpdate {
    pub hand: Hand,
    pub sound_set: u8,
    pub buffer: Arc<SampleBuffer>,
}

pub struct SampleLoader<S> {
    source: S,
}

impl<S: SampleSource> SampleLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[instrument(skip(self))]
    pub async fn load(&self, hand: Hand, sound_set: u8) -> Arc<SampleBuffer> {
        for attempt in 1..=ATTEMPTS {
            match self.source.fetch(hand, sound_set).await {
                Ok(buffer) => return Arc::new(buffer),
                Err(err) => warn!(attempt, error = %err, "sample load failed"),
            }
        }
        warn!("using silence for sample slot");
        Arc::new(SampleBuffer::silence(FALLBACK_RATE, 2, FALLBACK_RATE as usize))
    }

    pub async fn load_progressive(&self, updates: UnboundedSender<SampleUpdate>) {
        let (left, right) = tokio::join!(
            self.load(Hand::Left, MIN_SOUND_SET),
            self.load(Hand::Right, MIN_SOUND_SET)
        );
        for (hand, buffer) in [(Hand::Left, left), (Hand::Right, right)] {
            if updates
                .send(SampleUpdate {
                    hand,
                    sound_set: MIN_SOUND_SET,
                    buffer,
                })
                .is_err()
            {
                return;
            }
        }
        info!("initial samples ready");

        for sound_set in MIN_SOUND_SET + 1..=MAX_SOUND_SET {
            for hand in [Hand::Left, Hand::Right] {
                let buffer = self.load(hand, sound_set).await;
                let update = SampleUpdate {
                    hand,
                    sound_set,
                    buffer,
                };
                if updates.send(update).is_err() {
                    return;
                }
            }
        }
        info!("all samples loaded");
    }
}
