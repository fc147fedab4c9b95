// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Fixed-size worker pool for CPU-heavy jobs.
//!
//! Each worker is a dedicated OS thread with its own inbox. The pool keeps a
//! slot per worker (busy or idle) and a FIFO queue; it never holds results.
//! A task's result goes back through the task's own oneshot channel. When a
//! worker finishes it takes the next queued task itself, so a queued task
//! never waits for a scheduler.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("worker pool terminated")]
    Terminated,
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("{0}")]
    Task(String),
}

type Handler<T, R> = dyn Fn(T) -> Result<R, PoolError> + Send + Sync;

/// A queued unit of work and the channel its result travels back on.
pub struct WorkerTask<T, R> {
    payload: T,
    reply: oneshot::Sender<Result<R, PoolError>>,
}

struct WorkerSlot<T, R> {
    busy: bool,
    inbox: Option<mpsc::Sender<WorkerTask<T, R>>>,
}

struct PoolState<T, R> {
    slots: Vec<WorkerSlot<T, R>>,
    queue: VecDeque<WorkerTask<T, R>>,
    terminated: bool,
}

struct Shared<T, R> {
    state: Mutex<PoolState<T, R>>,
    handler: Box<Handler<T, R>>,
}

impl<T, R> Shared<T, R> {
    fn lock(&self) -> MutexGuard<'_, PoolState<T, R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub pool_size: usize,
    pub active: usize,
    pub queued: usize,
    pub idle: usize,
}

pub struct WorkerPool<T, R> {
    shared: Arc<Shared<T, R>>,
    size: usize,
}

impl<T, R> WorkerPool<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Spawns `size` workers (at least one) that run `handler` on each payload.
    pub fn new<F>(size: usize, handler: F) -> std::io::Result<Self>
    where
        F: Fn(T) -> Result<R, PoolError> + Send + Sync + 'static,
    {
        let size = size.max(1);
        tracing::info!("[WorkerPool] Initializing {} workers...", size);

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                slots: Vec::with_capacity(size),
                queue: VecDeque::new(),
                terminated: false,
            }),
            handler: Box::new(handler),
        });

        for id in 0..size {
            let (tx, rx) = mpsc::channel();
            let worker_shared = Arc::clone(&shared);
            thread::Builder::new()
                .name(format!("proof-worker-{id}"))
                .spawn(move || worker_loop(id, worker_shared, rx))?;
            shared.lock().slots.push(WorkerSlot {
                busy: false,
                inbox: Some(tx),
            });
        }

        tracing::info!("[WorkerPool] All workers initialized");
        Ok(Self { shared, size })
    }

    /// Runs `payload` on an idle worker, or queues it behind the running ones.
    pub async fn exec(&self, payload: T) -> Result<R, PoolError> {
        let (reply, rx) = oneshot::channel();
        self.submit(WorkerTask { payload, reply })?;
        rx.await.unwrap_or(Err(PoolError::Terminated))
    }

    fn submit(&self, mut task: WorkerTask<T, R>) -> Result<(), PoolError> {
        let mut state = self.shared.lock();
        if state.terminated {
            return Err(PoolError::Terminated);
        }

        for slot in state.slots.iter_mut().filter(|slot| !slot.busy) {
            let Some(inbox) = slot.inbox.as_ref() else {
                continue;
            };
            match inbox.send(task) {
                Ok(()) => {
                    slot.busy = true;
                    return Ok(());
                }
                // The worker thread is gone; retire its slot and try the next.
                Err(mpsc::SendError(returned)) => {
                    slot.inbox = None;
                    task = returned;
                }
            }
        }

        // Queued work is only drained by live workers.
        if state.slots.iter().any(|slot| slot.inbox.is_some()) {
            state.queue.push_back(task);
            Ok(())
        } else {
            tracing::error!("[WorkerPool] No live workers left, rejecting task");
            Err(PoolError::Terminated)
        }
    }

    /// Stops accepting work and shuts every worker down. Queued tasks resolve
    /// with [`PoolError::Terminated`]; running tasks may or may not finish.
    pub fn terminate(&self) {
        let mut state = self.shared.lock();
        if state.terminated {
            return;
        }
        tracing::info!("[WorkerPool] Terminating all workers...");
        state.terminated = true;
        state.queue.clear();
        for slot in state.slots.iter_mut() {
            slot.inbox = None;
        }
        tracing::info!("[WorkerPool] All workers terminated");
    }

    /// `idle` counts only workers that can still take a task.
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.lock();
        let active = state.slots.iter().filter(|s| s.busy).count();
        let idle = state
            .slots
            .iter()
            .filter(|s| !s.busy && s.inbox.is_some())
            .count();
        PoolStats {
            pool_size: self.size,
            active,
            queued: state.queue.len(),
            idle,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<T, R> Drop for WorkerPool<T, R> {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.terminated = true;
        state.queue.clear();
        for slot in state.slots.iter_mut() {
            slot.inbox = None;
        }
    }
}

fn worker_loop<T, R>(id: usize, shared: Arc<Shared<T, R>>, inbox: mpsc::Receiver<WorkerTask<T, R>>) {
    while let Ok(first) = inbox.recv() {
        let mut task = first;
        loop {
            let WorkerTask { payload, reply } = task;
            let result = catch_unwind(AssertUnwindSafe(|| (shared.handler)(payload)))
                .unwrap_or_else(|panic| Err(PoolError::WorkerPanicked(panic_message(&*panic))));

            // Slot bookkeeping settles before the caller hears back.
            let next = {
                let mut state = shared.lock();
                if state.terminated {
                    let _ = reply.send(result);
                    return;
                }
                let next = state.queue.pop_front();
                if next.is_none() {
                    state.slots[id].busy = false;
                }
                next
            };
            // The caller may have stopped waiting; that is not an error here.
            let _ = reply.send(result);

            match next {
                Some(next) => task = next,
                None => break,
            }
        }
    }
    tracing::debug!("[WorkerPool] worker {} exiting", id);
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
