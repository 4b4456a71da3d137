pub mod pool;
pub mod queue;

pub use pool::{ExceptionHandler, Task, WorkerPool};
pub use queue::{LockFreeQueue, PopOutcome};
