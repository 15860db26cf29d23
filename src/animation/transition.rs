use std::cell::RefCell;
use std::rc::Rc;

use crate::events::target::{Event, EventTarget, EventType, Listener, ListenerId, notify};
use crate::host::Host;
use crate::host::scheduler::FrameRequestId;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionParams {
    pub start_value: f64,
    pub end_value: f64,
    pub duration_ms: f64,
}

impl TransitionParams {
    pub fn linear(start_value: f64, end_value: f64, duration_ms: f64) -> Self {
        Self {
            start_value,
            end_value,
            duration_ms,
        }
    }
}

/// Emitted on every tick and once on completion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionEvent {
    pub ty: EventType,
    pub value: f64,
}

impl Event for TransitionEvent {
    fn event_type(&self) -> EventType {
        self.ty
    }
}

/// One-shot scalar animation that drives itself through the host's frame scheduler.
///
/// Construction records the start time and requests the first frame. Each frame
/// recomputes the value from elapsed time and emits `Tick`; the frame where progress
/// reaches 1 also emits `Complete` and no further frame is requested. The pending
/// frame holds a strong handle, so a transition keeps running even when its creator
/// drops its copy; [`Transition::destroy`] is the way to stop it early.
#[derive(Clone)]
pub struct Transition {
    inner: Rc<RefCell<TransitionState>>,
}

struct TransitionState {
    params: TransitionParams,
    host: Host,
    start_ms: f64,
    value: f64,
    running: bool,
    pending: Option<FrameRequestId>,
    events: EventTarget<TransitionEvent>,
}

impl Transition {
    pub fn new(params: TransitionParams, host: &Host) -> Self {
        let transition = Self {
            inner: Rc::new(RefCell::new(TransitionState {
                params,
                host: host.clone(),
                start_ms: host.clock.now_ms(),
                value: params.start_value,
                running: true,
                pending: None,
                events: EventTarget::new(),
            })),
        };
        transition.schedule();
        transition
    }

    pub fn value(&self) -> f64 {
        self.inner.borrow().value
    }

    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    pub fn params(&self) -> TransitionParams {
        self.inner.borrow().params
    }

    pub fn add_listener(
        &self,
        ty: EventType,
        listener: impl Fn(&TransitionEvent) + 'static,
    ) -> ListenerId {
        let listener: Listener<TransitionEvent> = Rc::new(listener);
        self.inner.borrow_mut().events.add_listener(ty, listener)
    }

    pub fn remove_listener(&self, ty: EventType, id: ListenerId) -> bool {
        self.inner.borrow_mut().events.remove_listener(ty, id)
    }

    /// Stops scheduling and drops every listener. Safe to call repeatedly.
    pub fn destroy(&self) {
        let (pending, host) = {
            let mut state = self.inner.borrow_mut();
            state.running = false;
            state.events.remove_all_listeners();
            (state.pending.take(), state.host.clone())
        };
        if let Some(id) = pending {
            host.scheduler.cancel_frame(id);
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    fn schedule(&self) {
        let me = self.clone();
        let scheduler = self.inner.borrow().host.scheduler.clone();
        let id = scheduler.request_frame(Box::new(move || me.tick()));
        self.inner.borrow_mut().pending = Some(id);
    }

    fn tick(&self) {
        let (value, done, on_tick) = {
            let mut state = self.inner.borrow_mut();
            state.pending = None;
            if !state.running {
                return;
            }
            let p = state.params;
            let delta = if p.duration_ms <= 0.0 {
                1.0
            } else {
                ((state.host.clock.now_ms() - state.start_ms) / p.duration_ms).clamp(0.0, 1.0)
            };
            let value = lerp(p.start_value, p.end_value, delta);
            state.value = value;
            let done = delta >= 1.0;
            if done {
                state.running = false;
            }
            (value, done, state.events.listeners(EventType::Tick))
        };

        notify(
            &on_tick,
            &TransitionEvent {
                ty: EventType::Tick,
                value,
            },
        );
        if done {
            // Re-read so a tick listener that destroyed us also silences completion.
            let on_complete = self.inner.borrow().events.listeners(EventType::Complete);
            notify(
                &on_complete,
                &TransitionEvent {
                    ty: EventType::Complete,
                    value,
                },
            );
        } else if self.is_running() {
            self.schedule();
        }
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Transition")
            .field("params", &state.params)
            .field("value", &state.value)
            .field("running", &state.running)
            .finish()
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/transition.rs"]
mod tests;
