//! Request pacing for the forum API
//!
//! The forum API tolerates roughly 30 requests a minute. Every fetch, from
//! any task, takes a slot from a shared [`Throttle`] first, so the effective
//! request rate never exceeds the configured ceiling no matter how many
//! fetches run concurrently.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Fixed-interval pacer shared by all fetch tasks
#[derive(Debug)]
pub struct Throttle {
    /// Minimum spacing between two requests
    interval: Duration,

    /// Earliest instant the next request may start
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    /// Creates a throttle that spaces requests `interval` apart
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Creates a throttle from a requests-per-minute ceiling
    ///
    /// A ceiling of 0 is treated as 1 request per minute.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let rpm = requests_per_minute.max(1);
        Self::new(Duration::from_secs(60) / rpm)
    }

    /// A throttle that never waits (for tests)
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// The spacing between requests
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request slot is free and claims it
    ///
    /// The first call returns immediately. Callers queue on the internal
    /// lock, so slots are handed out in arrival order.
    pub async fn acquire(&self) {
        if self.interval.is_zero() {
            return;
        }

        let mut next_slot = self.next_slot.lock().await;
        let now = Instant::now();

        let start = match *next_slot {
            Some(slot) if slot > now => {
                tracing::trace!("Throttling request for {:?}", slot - now);
                tokio::time::sleep_until(slot).await;
                slot
            }
            _ => now,
        };

        *next_slot = Some(start + self.interval);
    }
}
