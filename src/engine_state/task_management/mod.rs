//! # Task Management System
//!
//! A fixed-size pool of worker threads executing [`Task`]s in the background.
//!
//! ## Architecture Overview
//! - `WorkerPool`: owns the worker threads and the shared task queue
//! - `Task`: a unit of work that can be executed asynchronously
//! - `TaskHandle`: lets the publisher find out when a task has finished
//!
//! ## Task Lifecycle
//! 1. Tasks are published via `WorkerPool::publish_task()`; this never blocks
//! 2. Idle workers pull tasks from the shared queue in FIFO order
//! 3. Each worker runs the task under `catch_unwind` and records the outcome
//! 4. The publisher polls the handles whenever it wants to know what has drained
//!
//! A panicking task is logged and marked [`TaskState::Panicked`]; the worker survives
//! and keeps serving the queue.
//!
//! ## Example Usage
//! ```rust
//! use voxel_world::task_management::{Task, TaskOutcome, WorkerPool};
//!
//! struct Noop;
//! impl Task for Noop {
//!     fn process(self: Box<Self>) -> TaskOutcome {
//!         TaskOutcome::Completed
//!     }
//! }
//!
//! let mut pool = WorkerPool::new(2, "doc").unwrap();
//! let handle = pool.publish_task(Box::new(Noop));
//! pool.shutdown();
//! assert!(handle.is_finished());
//! ```

pub mod task;

use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

pub use task::{Task, TaskHandle, TaskOutcome, TaskState};

struct QueuedTask {
    task: Box<dyn Task>,
    handle: TaskHandle,
}

/// Lifetime totals of finished tasks.
#[derive(Debug, Default)]
struct PoolCounters {
    completed: AtomicUsize,
    abandoned: AtomicUsize,
    panicked: AtomicUsize,
}

/// Point-in-time copy of the pool counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub completed: usize,
    pub abandoned: usize,
    pub panicked: usize,
    /// Tasks published but not yet picked up by a worker.
    pub queued: usize,
}

/// Manages a pool of worker threads and the queue feeding them.
pub struct WorkerPool {
    task_sender: Option<Sender<QueuedTask>>,
    workers: Vec<JoinHandle<()>>,
    counters: Arc<PoolCounters>,
}

impl WorkerPool {
    /// Spawns `num_workers` threads named `{name}-worker-{index}`.
    pub fn new(num_workers: usize, name: &str) -> io::Result<Self> {
        let (task_sender, task_receiver) = unbounded::<QueuedTask>();
        let counters = Arc::new(PoolCounters::default());

        let mut workers = Vec::with_capacity(num_workers);
        for index in 0..num_workers {
            let receiver = task_receiver.clone();
            let counters = counters.clone();
            let worker = thread::Builder::new()
                .name(format!("{name}-worker-{index}"))
                .spawn(move || worker_loop(receiver, counters))?;
            workers.push(worker);
        }
        info!("started {} {} workers", num_workers, name);

        Ok(WorkerPool {
            task_sender: Some(task_sender),
            workers,
            counters,
        })
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Queues a task for execution and returns its handle. Never blocks.
    ///
    /// After [`shutdown`](Self::shutdown) the task is dropped unrun and its handle is
    /// already [`TaskState::Abandoned`].
    pub fn publish_task(&self, task: Box<dyn Task>) -> TaskHandle {
        let handle = TaskHandle::new();
        let queued = QueuedTask {
            task,
            handle: handle.clone(),
        };
        let sent = match &self.task_sender {
            Some(sender) => sender.send(queued).is_ok(),
            None => false,
        };
        if !sent {
            debug!("worker pool is shut down, dropping task");
            handle.set_state(TaskState::Abandoned);
            self.counters.abandoned.fetch_add(1, Ordering::Relaxed);
        }
        handle
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            completed: self.counters.completed.load(Ordering::Relaxed),
            abandoned: self.counters.abandoned.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
            queued: self.task_sender.as_ref().map_or(0, Sender::len),
        }
    }

    /// Closes the queue and blocks until every worker has drained it and exited.
    pub fn shutdown(&mut self) {
        let Some(sender) = self.task_sender.take() else {
            return;
        };
        drop(sender);
        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("worker").to_string();
            if worker.join().is_err() {
                error!("{} exited abnormally", name);
            }
        }
        debug!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(receiver: Receiver<QueuedTask>, counters: Arc<PoolCounters>) {
    while let Ok(QueuedTask { task, handle }) = receiver.recv() {
        handle.set_state(TaskState::Running);
        let state = match panic::catch_unwind(AssertUnwindSafe(|| task.process())) {
            Ok(TaskOutcome::Completed) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
                TaskState::Completed
            }
            Ok(TaskOutcome::Abandoned) => {
                counters.abandoned.fetch_add(1, Ordering::Relaxed);
                TaskState::Abandoned
            }
            Err(_) => {
                error!(
                    "task panicked on {}",
                    thread::current().name().unwrap_or("worker")
                );
                counters.panicked.fetch_add(1, Ordering::Relaxed);
                TaskState::Panicked
            }
        };
        handle.set_state(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct Counting(Arc<AtomicUsize>);

    impl Task for Counting {
        fn process(self: Box<Self>) -> TaskOutcome {
            self.0.fetch_add(1, Ordering::SeqCst);
            TaskOutcome::Completed
        }
    }

    struct GiveUp;

    impl Task for GiveUp {
        fn process(self: Box<Self>) -> TaskOutcome {
            TaskOutcome::Abandoned
        }
    }

    struct Explode;

    impl Task for Explode {
        fn process(self: Box<Self>) -> TaskOutcome {
            panic!("invariant violated");
        }
    }

    #[test]
    fn runs_every_published_task() {
        let mut pool = WorkerPool::new(3, "test").unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..50)
            .map(|_| pool.publish_task(Box::new(Counting(counter.clone()))))
            .collect();
        pool.shutdown();

        assert_eq!(counter.load(Ordering::SeqCst), 50);
        assert!(handles.iter().all(|h| h.state() == TaskState::Completed));
        assert_eq!(pool.stats().completed, 50);
    }

    #[test]
    fn panicking_task_does_not_kill_the_worker() {
        let mut pool = WorkerPool::new(1, "test").unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let exploded = pool.publish_task(Box::new(Explode));
        let after = pool.publish_task(Box::new(Counting(counter.clone())));
        pool.shutdown();

        assert_eq!(exploded.state(), TaskState::Panicked);
        assert_eq!(after.state(), TaskState::Completed);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(pool.stats().panicked, 1);
    }

    #[test]
    fn abandoned_outcome_is_recorded() {
        let mut pool = WorkerPool::new(1, "test").unwrap();
        let handle = pool.publish_task(Box::new(GiveUp));
        pool.shutdown();
        assert_eq!(handle.state(), TaskState::Abandoned);
        assert_eq!(pool.stats().abandoned, 1);
    }

    #[test]
    fn publishing_after_shutdown_abandons_immediately() {
        let mut pool = WorkerPool::new(1, "test").unwrap();
        pool.shutdown();
        let ran = Arc::new(AtomicBool::new(false));

        struct Flag(Arc<AtomicBool>);
        impl Task for Flag {
            fn process(self: Box<Self>) -> TaskOutcome {
                self.0.store(true, Ordering::SeqCst);
                TaskOutcome::Completed
            }
        }

        let handle = pool.publish_task(Box::new(Flag(ran.clone())));
        assert_eq!(handle.state(), TaskState::Abandoned);
        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(pool.num_workers(), 0);
    }
}
