//! Lock-free multi-producer multi-consumer queue (C7).
//!
//! Grounded in `astrolib::concurrent::lf_queue<T>`: an intrusive singly
//! linked chain `tail_sentinel <- ... <- newest`, a `head` atomic pointing
//! at the most recently pushed node (or the sentinel when empty), and a
//! mutex+condvar pair touched only on the empty↔non-empty edge so idle
//! consumers park cheaply instead of spinning.
//!
//! One defect from the source is intentionally not carried over: `nap()`'s
//! wait predicate there assigns into its own condition
//! (`result = tail.next.load()`), which can observe stale state across a
//! spurious wakeup. Here the wait loop re-derives the value fresh every
//! time it wakes, before deciding whether to keep waiting.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicPtr, Ordering};
use std::sync::{Condvar, Mutex};

struct Node<T> {
    value: Option<T>,
    next: AtomicPtr<Node<T>>,
}

impl<T> Node<T> {
    fn sentinel() -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            value: None,
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }

    fn with_value(value: T) -> *mut Node<T> {
        Box::into_raw(Box::new(Node {
            value: Some(value),
            next: AtomicPtr::new(ptr::null_mut()),
        }))
    }
}

/// Outcome of a blocking [`LockFreeQueue::pop`]: either an item, or the
/// control signal that the queue has been interrupted with nothing left to
/// drain. `Interrupted` is not an error — it is the expected way a worker
/// learns to stop (§7).
#[derive(Debug)]
pub enum PopOutcome<T> {
    Item(T),
    Interrupted,
}

impl<T> PopOutcome<T> {
    pub fn item(self) -> Option<T> {
        match self {
            PopOutcome::Item(v) => Some(v),
            PopOutcome::Interrupted => None,
        }
    }
}

pub struct LockFreeQueue<T> {
    head: AtomicPtr<Node<T>>,
    tail: *mut Node<T>,
    interrupted: AtomicBool,
    park_mutex: Mutex<()>,
    park_cond: Condvar,
}

unsafe impl<T: Send> Send for LockFreeQueue<T> {}
unsafe impl<T: Send> Sync for LockFreeQueue<T> {}

impl<T> Default for LockFreeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LockFreeQueue<T> {
    pub fn new() -> Self {
        let sentinel = Node::sentinel();
        LockFreeQueue {
            head: AtomicPtr::new(sentinel),
            tail: sentinel,
            interrupted: AtomicBool::new(false),
            park_mutex: Mutex::new(()),
            park_cond: Condvar::new(),
        }
    }

    /// Pushes `value` onto the queue. Wakes any consumer parked on an
    /// empty queue.
    pub fn push(&self, value: T) {
        let node = Node::with_value(value);

        let mut h = self.head.load(Ordering::Acquire);
        loop {
            let h_next = unsafe { &(*h).next };
            match h_next.compare_exchange(
                ptr::null_mut(),
                node,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(_) => h = self.head.load(Ordering::Acquire),
            }
        }

        let prev = self.head.swap(node, Ordering::AcqRel);
        if prev == self.tail {
            // Empty-to-non-empty transition: publish tail.next, then wake
            // parked consumers. No racing pop could have observed
            // `tail.next` non-null before this store.
            unsafe {
                (*self.tail).next.store(node, Ordering::Release);
            }
            let _guard = self.park_mutex.lock().unwrap_or_else(|e| e.into_inner());
            self.park_cond.notify_all();
        }
    }

    /// Pops the oldest value, blocking while the queue is empty. Returns
    /// [`PopOutcome::Interrupted`] if `interrupt()` has been called and the
    /// queue is (or becomes) empty; items pushed before the interrupt are
    /// still delivered.
    pub fn pop(&self) -> PopOutcome<T> {
        loop {
            let t = unsafe { (*self.tail).next.load(Ordering::Acquire) };
            if t.is_null() {
                if let Some(outcome) = self.park_until_non_empty() {
                    return outcome;
                }
                continue;
            }

            let n = unsafe { (*t).next.load(Ordering::Acquire) };
            if unsafe {
                (*self.tail)
                    .next
                    .compare_exchange(t, n, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            } {
                let value = unsafe { Box::from_raw(t) }
                    .value
                    .expect("item nodes always carry a value");
                return PopOutcome::Item(value);
            }
        }
    }

    /// Parks until `tail.next` is non-null or the queue is interrupted.
    /// Returns `Some(Interrupted)` in the latter case so the caller can
    /// return immediately without re-checking `tail.next` itself.
    fn park_until_non_empty(&self) -> Option<PopOutcome<T>> {
        let mut guard = self.park_mutex.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            // Re-derive fresh state every wakeup rather than trusting a
            // value captured inside the wait predicate.
            let current = unsafe { (*self.tail).next.load(Ordering::Acquire) };
            if !current.is_null() {
                return None;
            }
            if self.interrupted.load(Ordering::Acquire) {
                return Some(PopOutcome::Interrupted);
            }
            guard = self
                .park_cond
                .wait(guard)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Sets the interrupt flag and wakes every parked consumer. Pops that
    /// still find work proceed normally; pops on an empty queue begin
    /// returning `Interrupted`.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Release);
        let _guard = self.park_mutex.lock().unwrap_or_else(|e| e.into_inner());
        self.park_cond.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Acquire)
    }
}

impl<T> Drop for LockFreeQueue<T> {
    fn drop(&mut self) {
        let mut current = self.tail;
        while !current.is_null() {
            let next = unsafe { (*current).next.load(Ordering::Acquire) };
            unsafe {
                drop(Box::from_raw(current));
            }
            current = next;
        }
    }
}
