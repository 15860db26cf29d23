pub(crate) mod clock;
pub(crate) mod frame_limiter;
pub(crate) mod scheduler;

use std::rc::Rc;

use clock::{Clock, ManualClock, SystemClock};
use scheduler::{FrameQueue, FrameScheduler};

/// Clock plus per-frame scheduler, cloned into everything that animates itself.
#[derive(Clone)]
pub struct Host {
    pub clock: Rc<dyn Clock>,
    pub scheduler: Rc<dyn FrameScheduler>,
}

impl Host {
    pub fn new(clock: Rc<dyn Clock>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self { clock, scheduler }
    }

    /// Wall clock with a frame queue the caller pumps.
    pub fn system() -> (Self, Rc<FrameQueue>) {
        let queue = Rc::new(FrameQueue::new());
        (Self::new(Rc::new(SystemClock::new()), queue.clone()), queue)
    }

    /// Fully manual host: time only moves when the returned clock is advanced.
    pub fn manual(epoch_secs: i64) -> (Self, Rc<ManualClock>, Rc<FrameQueue>) {
        let clock = Rc::new(ManualClock::new(epoch_secs));
        let queue = Rc::new(FrameQueue::new());
        (Self::new(clock.clone(), queue.clone()), clock, queue)
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("now_ms", &self.clock.now_ms())
            .finish_non_exhaustive()
    }
}
