//! # Task System Core Types
//!
//! ## Core Components
//! - `Task`: a unit of work executed on a pool worker
//! - `TaskOutcome`: what the task reports back when it returns
//! - `TaskHandle`: the owning thread's view of a published task
//!
//! ## Task Lifecycle
//! 1. A `Task` is published via `WorkerPool::publish_task()`, which returns a handle
//! 2. A worker takes it off the queue and calls `process()`
//! 3. The worker records the outcome in the handle
//! 4. The owning thread reaps finished handles whenever it likes, without blocking

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

/// A unit of work executed on a worker thread.
///
/// Tasks own everything they need and deliver their results themselves (for example
/// by pushing into a channel), so the pool never inspects what a task produced.
pub trait Task: Send {
    /// Runs the task to completion or until it decides to give up.
    fn process(self: Box<Self>) -> TaskOutcome;
}

/// How a task ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The task did its work and delivered its result.
    Completed,
    /// The task stopped at a checkpoint without delivering anything.
    Abandoned,
}

/// Lifecycle state of a published task.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    Queued = 0,
    Running = 1,
    Completed = 2,
    Abandoned = 3,
    /// The task panicked; the worker caught it and carried on.
    Panicked = 4,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TaskState::Queued,
            1 => TaskState::Running,
            2 => TaskState::Completed,
            3 => TaskState::Abandoned,
            _ => TaskState::Panicked,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Abandoned | TaskState::Panicked
        )
    }
}

impl From<TaskOutcome> for TaskState {
    fn from(outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Completed => TaskState::Completed,
            TaskOutcome::Abandoned => TaskState::Abandoned,
        }
    }
}

/// Shared view of a task's state. Cloning is cheap; all clones observe the same task.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
}

impl TaskHandle {
    pub(crate) fn new() -> Self {
        TaskHandle {
            state: Arc::new(AtomicU8::new(TaskState::Queued as u8)),
        }
    }

    pub(crate) fn set_state(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `true` once the task can no longer touch shared state.
    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }
}
