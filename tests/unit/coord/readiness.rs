use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    task::Wake,
};

use super::*;

struct CountingWaker(AtomicUsize);

impl Wake for CountingWaker {
    fn wake(self: Arc<Self>) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn try_get_follows_resolve_and_clear() {
    let ready: Readiness<u32> = Readiness::new();
    let dependent = ready.clone();
    assert!(dependent.try_get().is_none());
    ready.resolve(7);
    assert_eq!(dependent.try_get(), Some(7));
    ready.clear();
    assert!(!dependent.is_ready());
}

#[test]
fn future_wakes_on_resolve() {
    let ready: Readiness<&'static str> = Readiness::new();
    let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
    let waker = Waker::from(Arc::clone(&counter));
    let mut cx = Context::from_waker(&waker);

    let mut fut = ready.wait();
    assert!(Pin::new(&mut fut).poll(&mut cx).is_pending());
    assert!(Pin::new(&mut fut).poll(&mut cx).is_pending());

    ready.resolve("anchor");
    assert_eq!(counter.0.load(Ordering::SeqCst), 1);
    assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Ready("anchor"));
}

#[test]
fn resolved_future_is_ready_immediately() {
    let ready = Readiness::new();
    ready.resolve(3_u8);
    let mut cx = Context::from_waker(Waker::noop());
    let mut fut = ready.wait();
    assert_eq!(Pin::new(&mut fut).poll(&mut cx), Poll::Ready(3));
}

#[test]
fn retry_respects_interval_and_budget() {
    let policy = RetryPolicy::default();
    let mut state = RetryState::default();
    assert_eq!(state.poll(&policy, Millis(0)), RetryDecision::Attempt);
    assert_eq!(state.poll(&policy, Millis(50)), RetryDecision::Wait);
    assert_eq!(state.poll(&policy, Millis(100)), RetryDecision::Attempt);
    assert_eq!(state.poll(&policy, Millis(2_000)), RetryDecision::Attempt);
    assert_eq!(state.poll(&policy, Millis(2_001)), RetryDecision::GiveUp);
    assert_eq!(state.attempts(), 3);

    state.reset();
    assert_eq!(state.poll(&policy, Millis(5_000)), RetryDecision::Attempt);
}
