//! Bounded worker pool
//!
//! Scoped threads pull item indexes from a shared counter. `run_phased`
//! puts a [`LeaderBarrier`] between two phases so a global action runs
//! exactly once, after every first-phase task has finished.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::application::build::barrier::LeaderBarrier;
use crate::error::{DnsbError, DnsbResult};

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    pub fn new(jobs: usize) -> Self {
        Self {
            workers: jobs.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `task` for every item; outcomes come back in item order
    pub fn map<T, R, F>(&self, items: &[T], task: F) -> Vec<DnsbResult<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> DnsbResult<R> + Sync,
    {
        self.run_phased(items, task, |_| {}, |_, _| Ok(()))
    }

    /// Two phases with a one-shot leader action in between.
    ///
    /// The leader receives whether every first-phase task succeeded. The
    /// second phase only runs when they all did.
    pub fn run_phased<T, R, F, L, S>(&self, items: &[T], first: F, leader: L, second: S) -> Vec<DnsbResult<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> DnsbResult<R> + Sync,
        L: FnOnce(bool) + Send,
        S: Fn(&T, &R) -> DnsbResult<()> + Sync,
    {
        if items.is_empty() {
            leader(true);
            return Vec::new();
        }

        let workers = self.workers.min(items.len());
        let slots: Vec<Mutex<Option<DnsbResult<R>>>> = items.iter().map(|_| Mutex::new(None)).collect();
        let first_queue = AtomicUsize::new(0);
        let second_queue = AtomicUsize::new(0);
        let all_ok = AtomicBool::new(false);
        let barrier = LeaderBarrier::new(workers);
        let leader = Mutex::new(Some(leader));

        std::thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| {
                    while let Some(idx) = claim(&first_queue, items.len()) {
                        let outcome = guarded(|| first(&items[idx]));
                        *lock(&slots[idx]) = Some(outcome);
                    }

                    barrier.wait(|| {
                        let ok = slots.iter().all(|slot| matches!(*lock(slot), Some(Ok(_))));
                        all_ok.store(ok, Ordering::SeqCst);
                        if let Some(action) = lock(&leader).take() {
                            action(ok);
                        }
                    });

                    if !all_ok.load(Ordering::SeqCst) {
                        return;
                    }
                    while let Some(idx) = claim(&second_queue, items.len()) {
                        let mut slot = lock(&slots[idx]);
                        let failed = match slot.as_ref() {
                            Some(Ok(value)) => guarded(|| second(&items[idx], value)).err(),
                            _ => None,
                        };
                        if let Some(err) = failed {
                            *slot = Some(Err(err));
                        }
                    }
                });
            }
        });

        slots
            .into_iter()
            .map(|slot| {
                slot.into_inner()
                    .unwrap_or_else(PoisonError::into_inner)
                    .unwrap_or_else(|| Err(DnsbError::Build("worker task did not run".to_string())))
            })
            .collect()
    }
}

fn claim(queue: &AtomicUsize, len: usize) -> Option<usize> {
    let idx = queue.fetch_add(1, Ordering::SeqCst);
    (idx < len).then_some(idx)
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Turn a panicking task into an error so its worker still reaches the barrier
fn guarded<R>(task: impl FnOnce() -> DnsbResult<R>) -> DnsbResult<R> {
    catch_unwind(AssertUnwindSafe(task))
        .unwrap_or_else(|_| Err(DnsbError::Build("worker task panicked".to_string())))
}
