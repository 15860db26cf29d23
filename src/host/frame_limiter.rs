use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::foundation::error::{WeatherscapeError, WeatherscapeResult};
use crate::host::Host;
use crate::host::scheduler::FrameRequestId;

type TickCallback = Box<dyn FnMut()>;

/// Caps how often a callback runs to a target FPS on top of the host's per-frame signal.
///
/// Every raw frame re-registers itself while running; the callback only fires once more
/// than one interval has elapsed since the last accepted frame. The accepted timestamp is
/// rebased by the remainder (`now - elapsed % interval`) so skipped frames do not drift.
pub struct FrameLimiter {
    state: Rc<LimiterState>,
}

struct LimiterState {
    host: Host,
    interval_ms: f64,
    last_ms: Cell<f64>,
    running: Cell<bool>,
    pending: Cell<Option<FrameRequestId>>,
    callback: RefCell<Option<TickCallback>>,
}

impl FrameLimiter {
    pub fn new(fps: f64, host: &Host) -> WeatherscapeResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(WeatherscapeError::configuration(format!(
                "frame limiter fps must be finite and > 0, got {fps}"
            )));
        }
        Ok(Self {
            state: Rc::new(LimiterState {
                host: host.clone(),
                interval_ms: 1000.0 / fps,
                last_ms: Cell::new(0.0),
                running: Cell::new(false),
                pending: Cell::new(None),
                callback: RefCell::new(None),
            }),
        })
    }

    pub fn interval_ms(&self) -> f64 {
        self.state.interval_ms
    }

    pub fn start(&self, callback: impl FnMut() + 'static) {
        *self.state.callback.borrow_mut() = Some(Box::new(callback));
        if self.state.running.replace(true) {
            return;
        }
        if self.state.pending.get().is_none() {
            schedule(&self.state);
        }
    }

    /// Cooperative: the next raw frame observes the flag and stops re-registering.
    pub fn stop(&self) {
        self.state.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }
}

impl Drop for FrameLimiter {
    fn drop(&mut self) {
        if let Some(id) = self.state.pending.take() {
            self.state.host.scheduler.cancel_frame(id);
        }
    }
}

fn schedule(state: &Rc<LimiterState>) {
    let weak = Rc::downgrade(state);
    let id = state.host.scheduler.request_frame(Box::new(move || {
        if let Some(state) = weak.upgrade() {
            on_frame(&state);
        }
    }));
    state.pending.set(Some(id));
}

fn on_frame(state: &Rc<LimiterState>) {
    state.pending.set(None);
    if !state.running.get() {
        return;
    }
    schedule(state);

    let now = state.host.clock.now_ms();
    let elapsed = now - state.last_ms.get();
    if elapsed <= state.interval_ms {
        return;
    }
    state.last_ms.set(now - elapsed % state.interval_ms);

    // Taken out for the call so the callback may restart or stop the limiter.
    let callback = state.callback.borrow_mut().take();
    if let Some(mut callback) = callback {
        callback();
        let mut slot = state.callback.borrow_mut();
        if slot.is_none() {
            *slot = Some(callback);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/frame_limiter.rs"]
mod tests;
