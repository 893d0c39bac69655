//! Reusable phase barrier with abort support
//!
//! `std::sync::Barrier` has no way to release waiters when a participant
//! dies, so a crashed worker would hang its peers forever. This barrier
//! counts arrivals per generation and carries a `broken` flag: once a
//! participant aborts, every current and future `wait` returns
//! [`BarrierBroken`].
//!
//! The mutex hand-off on `wait` orders all writes made before arrival with
//! all reads made after release, for every participant.

use parking_lot::{Condvar, Mutex};

/// Returned by [`PhaseBarrier::wait`] once the barrier has been aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierBroken;

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    broken: bool,
}

/// Counting rendezvous for a fixed number of participants
#[derive(Debug)]
pub struct PhaseBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl PhaseBarrier {
    /// Create a barrier for `parties` participants
    pub fn new(parties: usize) -> Self {
        Self {
            parties: parties.max(1),
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                broken: false,
            }),
            released: Condvar::new(),
        }
    }

    /// Number of participants per crossing
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Block until all participants have arrived.
    ///
    /// Returns `Ok(true)` for exactly one participant per crossing (the last
    /// to arrive), `Ok(false)` for the others. Resets automatically for the
    /// next crossing.
    pub fn wait(&self) -> Result<bool, BarrierBroken> {
        let mut state = self.state.lock();
        if state.broken {
            return Err(BarrierBroken);
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return Ok(true);
        }

        let generation = state.generation;
        while state.generation == generation && !state.broken {
            self.released.wait(&mut state);
        }

        if state.generation == generation {
            // Woken by abort, not by the last arrival
            Err(BarrierBroken)
        } else {
            Ok(false)
        }
    }

    /// Break the barrier, releasing every waiter with an error
    pub fn abort(&self) {
        let mut state = self.state.lock();
        if !state.broken {
            state.broken = true;
            self.released.notify_all();
        }
    }

    /// Whether the barrier has been aborted
    pub fn is_broken(&self) -> bool {
        self.state.lock().broken
    }
}

/// Aborts the barrier on drop unless disarmed.
///
/// Held by each worker for its whole run so that an early return or a panic
/// releases peers instead of leaving them parked.
pub struct AbortOnDrop<'a> {
    barrier: &'a PhaseBarrier,
    armed: bool,
}

impl<'a> AbortOnDrop<'a> {
    pub fn new(barrier: &'a PhaseBarrier) -> Self {
        Self {
            barrier,
            armed: true,
        }
    }

    /// Worker finished cleanly; leave the barrier intact
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbortOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.barrier.abort();
        }
    }
}
