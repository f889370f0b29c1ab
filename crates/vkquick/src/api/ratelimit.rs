//! Minimum spacing between the requests of one client
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant, sleep_until};
use tracing::trace;

/// Statistics about pacer usage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PacerStats {
    /// Total number of requests that passed through the pacer
    pub total_requests: u64,
    /// Number of requests that had to sleep before going out
    pub delayed_requests: u64,
}

#[derive(Debug, Default)]
struct PacerState {
    /// Time slot taken by the most recent request
    last_request: Option<Instant>,
    stats: PacerStats,
}

/// ### Minimal spacing between API requests
///
/// VK rejects a token that calls methods too often (error 6), so every
/// request made through one [`Api`](crate::Api) waits for its slot:
/// - if the previous slot is at least `delay` old, the request goes out now
/// - otherwise the next slot is `previous + delay`, reserved before sleeping
///
/// Reserving the slot under the lock and sleeping outside of it lets
/// concurrent callers queue up one `delay` apart.
#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    state: Mutex<PacerState>,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Mutex::new(PacerState::default()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until the next request is allowed to go out
    #[tracing::instrument(skip(self))]
    pub async fn wait(&self) {
        let slot = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            state.stats.total_requests += 1;
            match state.last_request {
                Some(last) if now.saturating_duration_since(last) < self.delay => {
                    let slot = last + self.delay;
                    state.last_request = Some(slot);
                    state.stats.delayed_requests += 1;
                    Some(slot)
                }
                _ => {
                    state.last_request = Some(now);
                    None
                }
            }
        };

        if let Some(slot) = slot {
            trace!(
                "Waiting {:?} for the next request slot",
                slot.saturating_duration_since(Instant::now())
            );
            sleep_until(slot).await;
        }
    }

    pub async fn stats(&self) -> PacerStats {
        self.state.lock().await.stats.clone()
    }
}
