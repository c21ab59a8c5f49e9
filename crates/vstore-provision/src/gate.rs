//! Startup throttle for backend construction.
//!
//! A backend that fails to come up is not retried for
//! [`START_RETRY_MIN_INTERVAL`]. Callers arriving inside that window get
//! [`ProvisionError::StartupThrottled`] without touching the backend.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{error, warn};

use crate::error::{ProvisionError, ProvisionResult};

/// Minimum time between a failed construction attempt and the next one.
pub const START_RETRY_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Source of monotonic time for the gate.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *lock(&self.now) += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *lock(&self.now)
    }
}

/// When the most recent construction attempt failed, if it did.
#[derive(Debug, Default)]
pub struct FailureWindow {
    last_failure: Mutex<Option<Instant>>,
}

impl FailureWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_failure(&self) -> Option<Instant> {
        *lock(&self.last_failure)
    }

    pub fn record_failure(&self, at: Instant) {
        *lock(&self.last_failure) = Some(at);
    }

    pub fn clear(&self) {
        *lock(&self.last_failure) = None;
    }
}

// The guarded values are plain timestamps, valid whatever a panicking
// holder was doing.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Serializes construction attempts and throttles them after a failure.
///
/// The window check, the construct call and the window update happen under
/// one lock, so a caller racing a failing attempt waits for it and is then
/// throttled.
#[derive(Clone)]
pub struct StartupRetryGate {
    window: Arc<FailureWindow>,
    clock: Arc<dyn Clock>,
    attempts: Arc<Mutex<()>>,
}

impl StartupRetryGate {
    pub fn new() -> Self {
        Self::with_parts(Arc::new(FailureWindow::new()), Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::with_parts(Arc::new(FailureWindow::new()), clock)
    }

    pub fn with_parts(window: Arc<FailureWindow>, clock: Arc<dyn Clock>) -> Self {
        Self {
            window,
            clock,
            attempts: Arc::new(Mutex::new(())),
        }
    }

    pub fn window(&self) -> &FailureWindow {
        &self.window
    }

    /// Run `construct` unless the last attempt failed less than
    /// [`START_RETRY_MIN_INTERVAL`] ago.
    ///
    /// `label` names what is being constructed in logs and in the throttle
    /// error. A failure from `construct` is returned unchanged.
    pub fn attempt<T, F>(&self, label: &str, construct: F) -> ProvisionResult<T>
    where
        F: FnOnce() -> ProvisionResult<T>,
    {
        let _serial = lock(&self.attempts);

        if let Some(failed_at) = self.window.last_failure() {
            let since = self.clock.now().saturating_duration_since(failed_at);
            if since < START_RETRY_MIN_INTERVAL {
                let retry_in = START_RETRY_MIN_INTERVAL - since;
                warn!(
                    backend = label,
                    retry_in_ms = retry_in.as_millis() as u64,
                    "version store failed to start recently, not retrying yet"
                );
                return Err(ProvisionError::StartupThrottled {
                    kind: label.to_string(),
                    retry_in,
                });
            }
        }

        match construct() {
            Ok(value) => {
                self.window.clear();
                Ok(value)
            }
            Err(e) => {
                self.window.record_failure(self.clock.now());
                error!(backend = label, error = %e, "failed to start version store");
                Err(e)
            }
        }
    }
}

impl Default for StartupRetryGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StartupRetryGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupRetryGate")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
