//! # Fade Controller
//!
//! Time-stepped volume ramp from silence to a target level.
//!
//! The ramp writes `0.0` immediately, then `target * i / steps` after each
//! step interval, with the last step writing exactly `target`. The returned
//! future resolves only after that final write.

use bridge_traits::MediaHandle;
use core_async::time::{sleep, step_interval, Duration};
use core_runtime::config::{AudioSettings, DEFAULT_FADE_DURATION_MS, DEFAULT_FADE_STEPS};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a fade-in ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeOutcome {
    /// Every step was applied and the volume equals the target.
    Completed,
    /// The guard reported the fade stale; the handle was left untouched
    /// from that point on.
    Superseded,
    /// No handle was available; nothing happened.
    NoHandle,
    /// The handle rejected a volume write.
    Aborted,
}

impl FadeOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, FadeOutcome::Completed)
    }
}

/// Drives fade-in ramps on media handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeController {
    steps: u32,
    default_duration: Duration,
}

impl Default for FadeController {
    fn default() -> Self {
        Self::new(
            DEFAULT_FADE_STEPS,
            Duration::from_millis(DEFAULT_FADE_DURATION_MS),
        )
    }
}

impl FadeController {
    /// A controller ramping in `steps` increments (at least one).
    pub fn new(steps: u32, default_duration: Duration) -> Self {
        Self {
            steps: steps.max(1),
            default_duration,
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(settings.fade_steps, settings.fade_duration())
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn default_duration(&self) -> Duration {
        self.default_duration
    }

    /// Ramp `handle` from 0 to `target` over `duration`.
    pub async fn fade_in(
        &self,
        handle: Option<&Arc<dyn MediaHandle>>,
        target: f32,
        duration: Duration,
    ) -> FadeOutcome {
        self.fade_in_guarded(handle, target, duration, || true).await
    }

    /// Like [`FadeController::fade_in`], but `is_current` is consulted before
    /// every write; once it returns `false` the ramp stops.
    pub async fn fade_in_guarded<G>(
        &self,
        handle: Option<&Arc<dyn MediaHandle>>,
        target: f32,
        duration: Duration,
        is_current: G,
    ) -> FadeOutcome
    where
        G: Fn() -> bool,
    {
        let Some(handle) = handle else {
            debug!("Fade requested without a media handle");
            return FadeOutcome::NoHandle;
        };

        let target = if target.is_finite() {
            target.clamp(0.0, 1.0)
        } else {
            0.0
        };

        if !is_current() {
            return FadeOutcome::Superseded;
        }
        if let Err(err) = handle.set_volume(0.0) {
            warn!(handle = %handle.id(), error = %err, "Fade aborted before first step");
            return FadeOutcome::Aborted;
        }

        let interval = step_interval(duration, self.steps);
        for step in 1..=self.steps {
            sleep(interval).await;

            if !is_current() {
                debug!(handle = %handle.id(), step, "Fade superseded");
                return FadeOutcome::Superseded;
            }

            let volume = if step == self.steps {
                target
            } else {
                target * step as f32 / self.steps as f32
            };

            if let Err(err) = handle.set_volume(volume) {
                warn!(handle = %handle.id(), step, error = %err, "Fade aborted");
                return FadeOutcome::Aborted;
            }
        }

        debug!(handle = %handle.id(), target, ?duration, "Fade completed");
        FadeOutcome::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::{BridgeError, DynMediaEventStream, MediaHandleId};
    use core_async::time::Instant;
    use mockall::mock;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    mock! {
        Handle {}

        #[async_trait::async_trait]
        impl MediaHandle for Handle {
            fn id(&self) -> MediaHandleId;
            fn set_source(&self, uri: &str) -> BridgeResult<()>;
            fn source(&self) -> Option<String>;
            fn set_volume(&self, volume: f32) -> BridgeResult<()>;
            fn volume(&self) -> f32;
            fn set_muted(&self, muted: bool) -> BridgeResult<()>;
            fn set_position(&self, position: Duration) -> BridgeResult<()>;
            fn position(&self) -> Duration;
            fn duration(&self) -> Option<Duration>;
            async fn play(&self) -> BridgeResult<()>;
            fn pause(&self) -> BridgeResult<()>;
            fn subscribe(&self) -> DynMediaEventStream;
            fn release(&self) -> BridgeResult<()>;
        }
    }

    fn recording_handle() -> (Arc<dyn MediaHandle>, Arc<Mutex<Vec<f32>>>) {
        let volumes = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&volumes);

        let mut handle = MockHandle::new();
        handle.expect_id().returning(MediaHandleId::new);
        handle.expect_set_volume().returning(move |volume| {
            log.lock().push(volume);
            Ok(())
        });

        (Arc::new(handle), volumes)
    }

    #[core_async::test(start_paused)]
    async fn test_fade_is_monotonic_and_exact() {
        let (handle, volumes) = recording_handle();
        let controller = FadeController::default();

        let started = Instant::now();
        let outcome = controller
            .fade_in(Some(&handle), 0.7, Duration::from_millis(600))
            .await;

        assert_eq!(outcome, FadeOutcome::Completed);
        assert!(started.elapsed() >= Duration::from_millis(600));

        let volumes = volumes.lock();
        assert_eq!(volumes.len(), 61);
        assert_eq!(volumes[0], 0.0);
        assert!(volumes.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(*volumes.last().unwrap(), 0.7);
    }

    #[core_async::test(start_paused)]
    async fn test_fade_without_handle() {
        let controller = FadeController::default();
        let outcome = controller
            .fade_in(None, 0.7, Duration::from_millis(2000))
            .await;
        assert_eq!(outcome, FadeOutcome::NoHandle);
    }

    #[core_async::test(start_paused)]
    async fn test_stale_fade_stops_writing() {
        let (handle, volumes) = recording_handle();
        let controller = FadeController::new(10, Duration::from_millis(100));
        let checks = AtomicUsize::new(0);

        // Current for the initial write and three steps
        let outcome = controller
            .fade_in_guarded(Some(&handle), 0.5, Duration::from_millis(100), || {
                checks.fetch_add(1, Ordering::SeqCst) < 4
            })
            .await;

        assert_eq!(outcome, FadeOutcome::Superseded);
        assert_eq!(volumes.lock().len(), 4);
    }

    #[core_async::test(start_paused)]
    async fn test_rejected_volume_write_aborts() {
        let mut handle = MockHandle::new();
        handle.expect_id().returning(MediaHandleId::new);
        handle
            .expect_set_volume()
            .times(1)
            .returning(|_| Err(BridgeError::OperationFailed("element detached".into())));
        let handle: Arc<dyn MediaHandle> = Arc::new(handle);

        let outcome = FadeController::default()
            .fade_in(Some(&handle), 0.7, Duration::from_millis(600))
            .await;
        assert_eq!(outcome, FadeOutcome::Aborted);
    }

    #[test]
    fn test_controller_from_settings() {
        let settings = AudioSettings::default()
            .with_fade_steps(0)
            .with_fade_duration(Duration::from_millis(500));
        let controller = FadeController::from_settings(&settings);

        assert_eq!(controller.steps(), 1);
        assert_eq!(controller.default_duration(), Duration::from_millis(500));
    }
}
