use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll, Waker},
};

use crate::foundation::core::Millis;

struct Slot<T> {
    value: Option<T>,
    wakers: Vec<Waker>,
}

/// Single-threaded readiness promise resolved by the component that owns an anchor.
///
/// Cloning shares the same slot. Dependents either poll [`Readiness::try_get`] from their tick
/// or await a [`ReadyFuture`].
pub struct Readiness<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T> Clone for Readiness<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> Default for Readiness<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Readiness<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Readiness")
            .field("ready", &self.is_ready())
            .finish()
    }
}

impl<T> Readiness<T> {
    /// Unresolved promise.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot {
                value: None,
                wakers: Vec::new(),
            })),
        }
    }

    /// Store `value` and wake every pending waiter. A later resolve replaces the value.
    pub fn resolve(&self, value: T) {
        let wakers = {
            let mut slot = self.slot.borrow_mut();
            slot.value = Some(value);
            std::mem::take(&mut slot.wakers)
        };
        for w in wakers {
            w.wake();
        }
    }

    /// Forget the value when the owning component unmounts.
    pub fn clear(&self) {
        self.slot.borrow_mut().value = None;
    }

    /// `true` once resolved.
    pub fn is_ready(&self) -> bool {
        self.slot.borrow().value.is_some()
    }
}

impl<T: Clone> Readiness<T> {
    /// Current value, if resolved.
    pub fn try_get(&self) -> Option<T> {
        self.slot.borrow().value.clone()
    }

    /// Future completing with the value once resolved.
    pub fn wait(&self) -> ReadyFuture<T> {
        ReadyFuture {
            slot: Rc::clone(&self.slot),
        }
    }
}

/// Future returned by [`Readiness::wait`].
pub struct ReadyFuture<T> {
    slot: Rc<RefCell<Slot<T>>>,
}

impl<T: Clone> Future for ReadyFuture<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut slot = self.slot.borrow_mut();
        if let Some(v) = &slot.value {
            return Poll::Ready(v.clone());
        }
        if !slot.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            slot.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}

/// Polling schedule for anchors that never get a readiness promise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Delay between attempts.
    pub interval_ms: u64,
    /// Total time before giving up.
    pub budget_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            budget_ms: 2_000,
        }
    }
}

/// What a caller should do at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Try now.
    Attempt,
    /// Too early for the next attempt.
    Wait,
    /// Budget exhausted.
    GiveUp,
}

/// Per-activation retry bookkeeping for a [`RetryPolicy`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryState {
    started: Option<Millis>,
    last_attempt: Option<Millis>,
    attempts: u32,
}

impl RetryState {
    /// Decide whether to attempt at `now`, recording the attempt when it is due.
    pub fn poll(&mut self, policy: &RetryPolicy, now: Millis) -> RetryDecision {
        let started = *self.started.get_or_insert(now);
        if now.since(started) > policy.budget_ms {
            return RetryDecision::GiveUp;
        }
        if let Some(last) = self.last_attempt
            && now.since(last) < policy.interval_ms
        {
            return RetryDecision::Wait;
        }
        self.last_attempt = Some(now);
        self.attempts += 1;
        RetryDecision::Attempt
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Forget every attempt.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/coord/readiness.rs"]
mod tests;
