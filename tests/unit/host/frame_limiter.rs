use super::*;

fn counting(limiter: &FrameLimiter) -> Rc<Cell<u32>> {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    limiter.start(move || h.set(h.get() + 1));
    hits
}

#[test]
fn rejects_non_positive_fps() {
    let (host, _, _) = Host::manual(0);
    assert!(FrameLimiter::new(0.0, &host).is_err());
    assert!(FrameLimiter::new(-5.0, &host).is_err());
    assert!(FrameLimiter::new(f64::NAN, &host).is_err());
}

#[test]
fn caps_rate_below_raw_signal() {
    let (host, clock, queue) = Host::manual(0);
    let limiter = FrameLimiter::new(30.0, &host).unwrap();
    let hits = counting(&limiter);

    // 120 raw frames at ~8.3 ms, i.e. one second of a 120 Hz display.
    for _ in 0..120 {
        clock.advance(1000.0 / 120.0);
        queue.run_frame();
    }
    assert!(hits.get() <= 30, "{}", hits.get());
    assert!(hits.get() >= 25, "{}", hits.get());
}

#[test]
fn no_callback_when_elapsed_does_not_exceed_interval() {
    let (host, clock, queue) = Host::manual(0);
    let limiter = FrameLimiter::new(10.0, &host).unwrap();
    let hits = counting(&limiter);

    clock.set(100.0);
    queue.run_frame();
    assert_eq!(hits.get(), 0);

    clock.set(101.0);
    queue.run_frame();
    assert_eq!(hits.get(), 1);
    assert_eq!(queue.pending_count(), 1);
}

#[test]
fn stop_takes_effect_on_next_raw_frame() {
    let (host, clock, queue) = Host::manual(0);
    let limiter = FrameLimiter::new(60.0, &host).unwrap();
    let hits = counting(&limiter);

    clock.advance(20.0);
    queue.run_frame();
    assert_eq!(hits.get(), 1);

    limiter.stop();
    assert!(!limiter.is_running());
    for _ in 0..5 {
        clock.advance(20.0);
        queue.run_frame();
    }
    assert_eq!(hits.get(), 1);
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn dropping_the_limiter_cancels_its_frame() {
    let (host, _, queue) = Host::manual(0);
    let limiter = FrameLimiter::new(60.0, &host).unwrap();
    let _hits = counting(&limiter);
    assert_eq!(queue.pending_count(), 1);
    drop(limiter);
    assert_eq!(queue.pending_count(), 0);
}
