use std::sync::Arc;

use stickwork_domain::{DomainError, ProgressState, ProgressStore};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Hands saves to a writer task so `save` never touches the disk.
pub struct BackgroundStore {
    inner: Arc<dyn ProgressStore + Sync>,
    pending: watch::Sender<Option<ProgressState>>,
}

impl BackgroundStore {
    pub fn spawn(inner: Arc<dyn ProgressStore + Sync>, runtime: &Handle) -> (Self, JoinHandle<()>) {
        let (pending, mut updates) = watch::channel(None);
        let writer = inner.clone();
        let task = runtime.spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                let Some(state) = snapshot else {
                    continue;
                };
                let store = writer.clone();
                match tokio::task::spawn_blocking(move || store.save(&state)).await {
                    Ok(Ok(())) => debug!("progress saved"),
                    Ok(Err(err)) => warn!(error = %err, "failed to save progress"),
                    Err(err) => warn!(error = %err, "save task failed"),
                }
            }
        });
        (Self { inner, pending }, task)
    }
}

impl ProgressStore for BackgroundStore {
    fn save(&self, state: &ProgressState) -> Result<(), DomainError> {
        self.pending.send_replace(Some(state.clone()));
        Ok(())
    }

    fn load(&self) -> Result<Option<ProgressState>, DomainError> {
        self.inner.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration as StdDuration, Instant};
    use stickwork_audio::{SilentScheduler, VelocityBands};
    use stickwork_domain::{Hand, Rudiment, RudimentCatalog, StrokeEvent, TempoThresholds};
    use time::Duration;

    use crate::progression::{ProgressionController, StrokeOutcome};

    struct SlowStore {
        delay: StdDuration,
        written: Mutex<Vec<u32>>,
    }

    impl SlowStore {
        fn new(delay_ms: u64) -> Arc<Self> {
            Arc::new(Self {
                delay: StdDuration::from_millis(delay_ms),
                written: Mutex::new(Vec::new()),
            })
        }
    }

    impl ProgressStore for SlowStore {
        fn save(&self, state: &ProgressState) -> Result<(), DomainError> {
            std::thread::sleep(self.delay);
            self.written.lock().unwrap().push(state.current_level);
            Ok(())
        }

        fn load(&self) -> Result<Option<ProgressState>, DomainError> {
            Ok(None)
        }
    }

    fn two_levels() -> RudimentCatalog {
        let thresholds = TempoThresholds::new(60, 120, 160).unwrap();
        RudimentCatalog::new(vec![
            Rudiment::from_sticking(1, "One", "R L", thresholds).unwrap(),
            Rudiment::from_sticking(2, "Two", "L R", thresholds).unwrap(),
        ])
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn completing_stroke_does_not_wait_for_slow_store() {
        let slow = SlowStore::new(300);
        let (store, writer) = BackgroundStore::spawn(slow.clone(), &Handle::current());
        let mut controller = ProgressionController::new(
            two_levels(),
            Box::new(store),
            Box::new(SilentScheduler::default()),
            VelocityBands::default(),
        );
        controller.handle_stroke(StrokeEvent::new(Hand::Right, Duration::ZERO));
        let started = Instant::now();
        let outcome = controller.handle_stroke(StrokeEvent::new(Hand::Left, Duration::milliseconds(100)));
        assert!(started.elapsed() < StdDuration::from_millis(50));
        assert!(matches!(outcome, StrokeOutcome::Completed(_)));

        drop(controller);
        writer.await.unwrap();
        assert_eq!(slow.written.lock().unwrap().last(), Some(&2));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn newest_snapshot_wins() {
        let slow = SlowStore::new(50);
        let (store, writer) = BackgroundStore::spawn(slow.clone(), &Handle::current());
        let mut state = ProgressState::new(&two_levels());
        for level in 1..=5 {
            state.current_level = level;
            store.save(&state).unwrap();
        }
        drop(store);
        writer.await.unwrap();
        let written = slow.written.lock().unwrap();
        assert_eq!(written.last(), Some(&5));
        assert!(written.len() < 5);
    }
}
