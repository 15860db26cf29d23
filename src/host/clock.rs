use std::cell::Cell;
use std::time::Instant;

/// Time source consumed by transitions, the frame limiter and the day/night cycle.
pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> f64;
    /// Wall-clock seconds since the Unix epoch.
    fn now_epoch_secs(&self) -> i64;
}

#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock that only moves when told to. Epoch time advances together with `now_ms`.
#[derive(Debug)]
pub struct ManualClock {
    now_ms: Cell<f64>,
    epoch_base_secs: Cell<i64>,
}

impl ManualClock {
    pub fn new(epoch_secs: i64) -> Self {
        Self {
            now_ms: Cell::new(0.0),
            epoch_base_secs: Cell::new(epoch_secs),
        }
    }

    pub fn advance(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    pub fn set(&self, ms: f64) {
        self.now_ms.set(ms);
    }

    /// Moves the wall clock without touching monotonic time.
    pub fn set_epoch_secs(&self, secs: i64) {
        let elapsed = (self.now_ms.get() / 1000.0).floor() as i64;
        self.epoch_base_secs.set(secs - elapsed);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    fn now_epoch_secs(&self) -> i64 {
        self.epoch_base_secs.get() + (self.now_ms.get() / 1000.0).floor() as i64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/clock.rs"]
mod tests;
