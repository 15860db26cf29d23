use std::cell::{Cell, RefCell};

/// Identifies a pending per-frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequestId(u64);

pub type FrameCallback = Box<dyn FnOnce()>;

/// Request-animation-frame style primitive: each callback runs once, on the next frame.
pub trait FrameScheduler {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId;
    fn cancel_frame(&self, id: FrameRequestId);
}

/// Scheduler pumped explicitly with [`FrameQueue::run_frame`].
///
/// Callbacks requested while a frame runs are deferred to the following frame.
#[derive(Default)]
pub struct FrameQueue {
    next_id: Cell<u64>,
    pending: RefCell<Vec<(FrameRequestId, FrameCallback)>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every callback that was pending when the frame started; returns how many ran.
    pub fn run_frame(&self) -> usize {
        let ids: Vec<FrameRequestId> = self.pending.borrow().iter().map(|(id, _)| *id).collect();
        let mut ran = 0;
        for id in ids {
            // Earlier callbacks in this frame may have cancelled later ones.
            let callback = {
                let mut pending = self.pending.borrow_mut();
                pending
                    .iter()
                    .position(|(p, _)| *p == id)
                    .map(|idx| pending.remove(idx).1)
            };
            if let Some(callback) = callback {
                callback();
                ran += 1;
            }
        }
        ran
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending_count())
            .finish()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, callback: FrameCallback) -> FrameRequestId {
        let id = FrameRequestId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.pending.borrow_mut().push((id, callback));
        id
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        self.pending.borrow_mut().retain(|(p, _)| *p != id);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scheduler.rs"]
mod tests;
