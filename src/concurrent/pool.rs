//! Worker pool draining a [`LockFreeQueue`] (C8).
//!
//! Grounded in `astrolib::concurrent::ThreadPool<T, Q>`: `N =
//! min(configured, hardware_concurrency)` threads each loop popping a task,
//! running it, and routing any failure to a virtual `exception_handler`
//! (here, a boxed closure) instead of letting it escape the worker. The
//! pool's own `main.cpp` usage overrides that handler to log via the
//! console sink and continue — the default here does the same.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::concurrent::queue::{LockFreeQueue, PopOutcome};
use crate::console;
use crate::error::MapIndexError;

pub type Task = Box<dyn FnOnce() -> Result<(), MapIndexError> + Send + 'static>;
pub type ExceptionHandler = Arc<dyn Fn(MapIndexError) + Send + Sync>;

fn default_exception_handler() -> ExceptionHandler {
    Arc::new(|e| console::err(&format!("worker task failed: {e}")))
}

/// A fixed-size pool of OS threads consuming tasks from a shared
/// [`LockFreeQueue`].
pub struct WorkerPool {
    queue: Arc<LockFreeQueue<Task>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `min(num_threads, available_parallelism)` worker threads.
    pub fn new(num_threads: usize, on_exception: Option<ExceptionHandler>) -> Self {
        let queue = Arc::new(LockFreeQueue::new());
        let on_exception = on_exception.unwrap_or_else(default_exception_handler);

        let hardware_concurrency = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let worker_count = num_threads.min(hardware_concurrency).max(1);

        let handles = (0..worker_count)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let on_exception = Arc::clone(&on_exception);
                thread::spawn(move || worker_loop(queue, on_exception))
            })
            .collect();

        WorkerPool { queue, handles }
    }

    /// Enqueues a task for some worker to run.
    pub fn submit(&self, task: Task) {
        self.queue.push(task);
    }

    /// Number of worker threads in the pool.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Interrupts the queue and joins every worker. Safe to call more than
    /// once; only the first call does anything.
    pub fn shutdown(&mut self) {
        self.queue.interrupt();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(queue: Arc<LockFreeQueue<Task>>, on_exception: ExceptionHandler) {
    loop {
        match queue.pop() {
            PopOutcome::Interrupted => break,
            PopOutcome::Item(task) => {
                let outcome = panic::catch_unwind(AssertUnwindSafe(task));
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => on_exception(e),
                    Err(panic) => {
                        let message = panic
                            .downcast_ref::<&str>()
                            .map(|s| s.to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "worker task panicked".to_string());
                        on_exception(MapIndexError::Decode(message));
                    }
                }
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn runs_submitted_tasks() {
        let mut pool = WorkerPool::new(4, None);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..50 {
            let counter = Arc::clone(&counter);
            pool.submit(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }));
        }

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn task_errors_reach_the_exception_handler() {
        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let handler_errors = Arc::clone(&errors);
        let handler: ExceptionHandler = Arc::new(move |e| {
            handler_errors.lock().unwrap().push(e.to_string());
        });

        let mut pool = WorkerPool::new(2, Some(handler));
        pool.submit(Box::new(|| Err(MapIndexError::Decode("boom".to_string()))));
        pool.shutdown();

        let errors = errors.lock().unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("boom"));
    }

    #[test]
    fn worker_count_is_capped_by_hardware_concurrency() {
        let pool = WorkerPool::new(1_000_000, None);
        let hardware_concurrency = thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(pool.worker_count(), hardware_concurrency);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut pool = WorkerPool::new(2, None);
        pool.shutdown();
        pool.shutdown();
    }
}
