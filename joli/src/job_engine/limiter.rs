// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::task::Poll;

use futures::future::poll_fn;
use futures::task::AtomicWaker;

/// Counting semaphore bounding the number of concurrently running jobs.
///
/// A slot is taken with [`Limiter::acquire`] or [`Limiter::try_acquire`] and
/// handed out as a [`Permit`]. Dropping the permit gives the slot back, so a
/// worker frees its slot on every exit path, unwinding included.
///
/// Only a single task is expected to wait in `acquire` at a time (the
/// dispatcher). Releases may come from any number of threads.
#[derive(Debug)]
pub struct Limiter {
    capacity: usize,
    in_use: AtomicUsize,
    acquire_waker: AtomicWaker,
    idle: (Mutex<()>, Condvar),
}

impl Limiter {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            in_use: AtomicUsize::new(0),
            acquire_waker: AtomicWaker::new(),
            idle: (Mutex::new(()), Condvar::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held. A snapshot, only good for monitoring.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.in_use())
    }

    /// Takes a slot if one is free right now.
    pub fn try_acquire(self: &Arc<Self>) -> Option<Permit> {
        let mut current = self.in_use.load(Ordering::Acquire);
        loop {
            if current >= self.capacity {
                return None;
            }
            match self.in_use.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(Permit {
                        limiter: Arc::clone(self),
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Waits until a slot is free and takes it.
    pub async fn acquire(self: &Arc<Self>) -> Permit {
        poll_fn(|cx| {
            if let Some(permit) = self.try_acquire() {
                return Poll::Ready(permit);
            }
            self.acquire_waker.register(cx.waker());
            // a release between the first attempt and the registration would be missed otherwise
            match self.try_acquire() {
                Some(permit) => Poll::Ready(permit),
                None => Poll::Pending,
            }
        })
        .await
    }

    /// Blocks the calling thread until no slot is held.
    pub fn wait_idle(&self) {
        let (lock, cvar) = &self.idle;
        let mut guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while self.in_use() > 0 {
            guard = cvar.wait(guard).unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn release(&self) {
        let previous = self.in_use.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "released a slot that was never acquired");
        self.acquire_waker.wake();
        if previous == 1 {
            let (lock, cvar) = &self.idle;
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            cvar.notify_all();
        }
    }
}

/// One occupied limiter slot. Released on drop.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct Permit {
    limiter: Arc<Limiter>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.limiter.release();
    }
}
