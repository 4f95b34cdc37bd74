//! Reusable rendezvous point for the worker pool.
//!
//! Behaves like [`std::sync::Barrier`] with one addition: a failing worker can
//! [`abort`](PhaseBarrier::abort) the barrier, which releases every waiter with
//! [`MarchError::BarrierAborted`] instead of leaving them blocked forever.

use std::sync::{Condvar, Mutex};

use tracing::warn;

use crate::error::{MarchError, Result};

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

/// A cyclic barrier for a fixed number of parties.
#[derive(Debug)]
pub struct PhaseBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl PhaseBarrier {
    /// Create a barrier that releases once `parties` threads are waiting.
    pub fn new(parties: usize) -> Result<Self> {
        if parties == 0 {
            return Err(MarchError::Barrier(
                "barrier needs at least one party".to_string(),
            ));
        }

        Ok(Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            cvar: Condvar::new(),
        })
    }

    /// Number of parties the barrier waits for.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until every party has called `wait` for the current generation.
    ///
    /// Returns `Ok(true)` for exactly one caller per generation (the last to
    /// arrive), `Ok(false)` for the others.
    pub fn wait(&self) -> Result<bool> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| MarchError::Poisoned("barrier"))?;

        if state.aborted {
            return Err(MarchError::BarrierAborted);
        }

        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(true);
        }

        while state.generation == generation && !state.aborted {
            state = self
                .cvar
                .wait(state)
                .map_err(|_| MarchError::Poisoned("barrier"))?;
        }

        if state.generation == generation {
            // Woken by abort before the generation completed
            return Err(MarchError::BarrierAborted);
        }
        Ok(false)
    }

    /// Release every current and future waiter with `BarrierAborted`.
    pub fn abort(&self) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !state.aborted {
            warn!(waiting = state.arrived, "Aborting phase barrier");
            state.aborted = true;
        }
        self.cvar.notify_all();
    }

    /// Whether the barrier has been aborted.
    pub fn is_aborted(&self) -> bool {
        match self.state.lock() {
            Ok(state) => state.aborted,
            Err(poisoned) => poisoned.into_inner().aborted,
        }
    }
}
