//! Leader barrier
//!
//! A counting barrier with a one-shot action: `parties` threads arrive,
//! the last one runs the action while the others wait, then everyone is
//! released together.

use std::sync::{Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
struct State {
    arrived: usize,
    released: bool,
}

#[derive(Debug)]
pub struct LeaderBarrier {
    parties: usize,
    state: Mutex<State>,
    released: Condvar,
}

impl LeaderBarrier {
    pub fn new(parties: usize) -> Self {
        Self {
            parties: parties.max(1),
            state: Mutex::new(State::default()),
            released: Condvar::new(),
        }
    }

    /// Arrive and block until every party has arrived.
    ///
    /// Only the last arrival runs `action`, before anyone is released.
    /// Returns whether this caller was the leader.
    pub fn wait(&self, action: impl FnOnce()) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.arrived += 1;

        if state.arrived == self.parties {
            drop(state);
            let release = Release(self);
            action();
            drop(release);
            return true;
        }

        while !state.released {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        false
    }
}

/// Releases waiters even if the leader's action panics
struct Release<'a>(&'a LeaderBarrier);

impl Drop for Release<'_> {
    fn drop(&mut self) {
        let mut state = self.0.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.released = true;
        self.0.released.notify_all();
    }
}
