//! Process-wide, mutex-serialized console sink.
//!
//! Grounded in `astrolib::console`: a single lock guards interleaved writes
//! from worker threads so diagnostic lines never interleave mid-line. This
//! is the default [`crate::concurrent::pool::WorkerPool`] exception sink.

use std::io::Write;
use std::sync::Mutex;

static CONSOLE_LOCK: Mutex<()> = Mutex::new(());

/// Writes a line to standard output under the process-wide console lock.
pub fn out(message: &str) {
    let _guard = CONSOLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{message}");
}

/// Writes a line to standard error under the process-wide console lock.
pub fn err(message: &str) {
    let _guard = CONSOLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "{message}");
}
