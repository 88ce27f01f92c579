//! Request pacing for the chart API.

use std::time::{Duration, Instant};

/// Default spacing between requests (RapidAPI basic plans allow ~5 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// Enforces a minimum spacing between consecutive chart requests.
#[derive(Debug)]
pub struct RequestPacer {
    /// Minimum spacing between requests.
    min_interval: Duration,
    /// When the previous request was released.
    last_release: Option<Instant>,
}

impl RequestPacer {
    /// Creates a pacer with the given minimum spacing.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_release: None,
        }
    }

    /// Creates a pacer with the default spacing (250ms).
    pub(crate) const fn with_default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// How long a request issued at `now` has to wait.
    fn delay_at(&self, now: Instant) -> Duration {
        self.last_release.map_or(Duration::ZERO, |last| {
            self.min_interval
                .saturating_sub(now.saturating_duration_since(last))
        })
    }

    /// Sleeps until the next request may be sent, then records it.
    pub async fn wait(&mut self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.last_release = Some(Instant::now());
    }
}
